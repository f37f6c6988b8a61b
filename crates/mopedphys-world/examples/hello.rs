use mopedphys_world::*;
use mopedphys_core::{hex32, pose, vec2, SurfaceId, SurfaceMask, Velocity};
use mopedphys_controllers::StabilityParams;
use mopedphys_dynamics::BodyDesc;
use mopedphys_terrain::GroundProfile;
use mopedphys_vehicles::{AxisInput, DriveParams, SuspensionParams};

fn main() -> anyhow::Result<()> {
    let mut w = WorldBuilder::new().build();
    w.set_ground(GroundProfile::flat(1.0, 128, 0.0, SurfaceId(0), SurfaceMask(1)));

    // Two-wheel bike dropped just above the springs' rest height
    let body = w.add_body(BodyDesc {
        pose: pose(vec2(10.0, 0.9), 0.0),
        vel: Velocity::default(),
        mass: MassProps::from_box(vec2(0.8, 0.25), 1.25),
        dynamic: true,
    });
    let bike = w.add_vehicle(
        body,
        DriveParams::default(),
        StabilityParams::default(),
        &[
            SuspensionParams { local_pos: vec2(-0.6, -0.2), ..Default::default() },
            SuspensionParams { local_pos: vec2(0.6, -0.2), ..Default::default() },
        ],
    )?;

    for step in 0..300u32 {
        if step == 120 {
            w.set_vehicle_input(bike, AxisInput { drive: 1.0, spin: 0.0 });
        }
        let stats = w.step(1.0 / 60.0);
        if step % 30 == 0 {
            let p = w.body_pose(body);
            println!(
                "step {step:03}  pos=({:+.2},{:+.2})  speed={:+.2}  grounded={}  wheels={}  hash={}",
                p.pos.x,
                p.pos.y,
                w.vehicle_speed(bike),
                w.vehicle_grounded(bike),
                stats.wheels_grounded,
                &hex32(w.step_hash())[..16]
            );
        }
    }
    Ok(())
}
