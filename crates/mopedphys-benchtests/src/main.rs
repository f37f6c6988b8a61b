// Scripted locomotion bench: two bikes on a flat-into-ramp course, driven
// through a drive / launch / flip / land / destroy sequence with periodic
// state-hash prints for cross-machine comparison.

use mopedphys_core::{hex32, pose, vec2, BodyId, SurfaceId, SurfaceMask, VehicleId, Velocity};
use mopedphys_dynamics::BodyDesc;
use mopedphys_io::TuningData;
use mopedphys_terrain::GroundProfile;
use mopedphys_vehicles::AxisInput;
use mopedphys_viz::DebugSettings;
use mopedphys_world::{MassProps, World, WorldBuilder};

/* ---------- tiny env helpers ---------- */
fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|s| s.parse::<u32>().ok()).unwrap_or(default)
}
fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key).ok().and_then(|s| s.parse::<f32>().ok()).unwrap_or(default)
}

/* ====================== SCENE BUILDER ====================== */
struct Scene {
    world: World,
    bike: VehicleId,
    bike_body: BodyId,
    chaser: VehicleId,
    chaser_body: BodyId,
}

/// 60 m of flat road, a 10 m ramp up to 2.5 m, then a drop back to flat.
/// The gap after the ramp lip is what sends a fast bike airborne.
fn build_course() -> GroundProfile {
    let cell = 0.5_f32;
    let mut heights = Vec::with_capacity(200);
    for i in 0..200usize {
        let x = i as f32 * cell;
        let h = if x < 60.0 {
            0.0
        } else if x < 70.0 {
            (x - 60.0) * 0.25
        } else {
            0.0
        };
        heights.push(h);
    }
    GroundProfile::from_heights(cell, heights, SurfaceId(0), SurfaceMask(1))
}

fn build_scene(print_every: u32) -> anyhow::Result<Scene> {
    let mut w = WorldBuilder::new().with_capacity(16).build();
    w.set_ground(build_course());
    w.set_debug(DebugSettings {
        print_every,
        show_bodies: true,
        show_vehicles: true,
        max_lines: 8,
        ..DebugSettings::default()
    });

    let tuning = TuningData::reference_bike();

    let bike_body = w.add_body(BodyDesc {
        pose: pose(vec2(5.0, 0.9), 0.0),
        vel: Velocity::default(),
        mass: MassProps::from_box(vec2(0.8, 0.25), 1.25),
        dynamic: true,
    });
    let bike = w.add_vehicle(
        bike_body,
        tuning.drive_params(),
        tuning.stability_params(),
        &tuning.suspension_params(),
    )?;

    let chaser_body = w.add_body(BodyDesc {
        pose: pose(vec2(2.0, 0.9), 0.0),
        vel: Velocity::default(),
        mass: MassProps::from_box(vec2(0.8, 0.25), 1.25),
        dynamic: true,
    });
    let chaser = w.add_vehicle(
        chaser_body,
        tuning.drive_params(),
        tuning.stability_params(),
        &tuning.suspension_params(),
    )?;

    Ok(Scene { world: w, bike, bike_body, chaser, chaser_body })
}

/// Input script for the lead bike: settle, drive hard at the ramp, tuck a
/// forward flip over the lip, level out for the landing, then die on impact.
fn lead_input(tick: u32, airborne: bool) -> AxisInput {
    match tick {
        0..=119 => AxisInput { drive: 0.0, spin: 0.0 },
        120..=899 => {
            if airborne {
                AxisInput { drive: 1.0, spin: -0.6 }
            } else {
                AxisInput { drive: 1.0, spin: 0.0 }
            }
        }
        _ => AxisInput { drive: 0.2, spin: 0.0 },
    }
}

/* ====================== MAIN ====================== */
fn main() -> anyhow::Result<()> {
    let hz = env_u32("MPHYS_HZ", 60).clamp(30, 240);
    let dt = env_f32("MPHYS_DT", 1.0 / hz as f32);
    let ticks = env_u32("MPHYS_TICKS", 1200);
    let print_every = env_u32("MPHYS_PRINT_EVERY", 120);
    let destroy_at = env_u32("MPHYS_DESTROY_AT", 1000);

    let Scene { mut world, bike, bike_body, chaser, chaser_body } = build_scene(print_every)?;

    let mut peak_height = 0.0_f32;
    let mut airborne_ticks = 0u32;

    for tick in 0..ticks {
        world.set_vehicle_input(bike, lead_input(tick, !world.vehicle_grounded(bike)));
        // the chaser just cruises, giving the hash a second body to cover
        world.set_vehicle_input(chaser, AxisInput { drive: 0.6, spin: 0.0 });

        if tick == destroy_at {
            world.notify_destroyed(bike);
            println!("tick {tick}  lead bike destroyed (latched)");
        }

        let stats = world.step(dt);

        let p = world.body_pose(bike_body);
        peak_height = peak_height.max(p.pos.y);
        if !world.vehicle_grounded(bike) {
            airborne_ticks += 1;
        }

        if print_every != 0 && tick % print_every == 0 {
            println!(
                "tick {tick:4}  lead=({:+7.2},{:+5.2}) ang={:+7.1} speed={:+.2} g={}  chaser_x={:+7.2}  wheels={}  hash={}",
                p.pos.x,
                p.pos.y,
                p.angle_deg,
                world.vehicle_speed(bike),
                world.vehicle_grounded(bike),
                world.body_pose(chaser_body).pos.x,
                stats.wheels_grounded,
                &hex32(world.step_hash())[..16]
            );
        }
    }

    println!("peak height = {peak_height:.2} m   airborne = {airborne_ticks} ticks");
    println!("lead state  = {:?}", world.vehicle_state(bike));
    println!("chaser x    = {:+.2}", world.body_pose(chaser_body).pos.x);
    println!("final hash  = {}", hex32(world.step_hash()));
    Ok(())
}
