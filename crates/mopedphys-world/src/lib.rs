use anyhow::{bail, Result};
use mopedphys_core::types::{Pose, Vec2, Velocity};
use mopedphys_core::{
    hash_scalar, hash_vec2, BodyId, GroundRay, HostBody, RayHit, Scalar, StepCtx, StepHasher,
    StepStage, StepStats, SurfaceMask, VehicleId,
};
use mopedphys_controllers::StabilityParams;
use mopedphys_dynamics::{Bodies, BodyDesc};
use mopedphys_terrain::GroundProfile;
use mopedphys_vehicles::{AxisInput, DriveParams, SuspensionParams, VehicleInstance, VehicleState, INPUT_DEADZONE};
use mopedphys_viz::{DebugSettings, Ledger, LedgerEvent, ScheduleRecorder};

pub use mopedphys_dynamics::MassProps;
pub use mopedphys_vehicles as vehicles;

/* ---------------- Builder ---------------- */
pub struct WorldBuilder {
    pub bodies: usize,
    pub gravity: Vec2,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self { bodies: 64, gravity: Vec2::new(0.0, -9.81) }
    }

    pub fn with_capacity(mut self, bodies: usize) -> Self {
        self.bodies = bodies;
        self
    }

    pub fn with_gravity(mut self, g: Vec2) -> Self {
        self.gravity = g;
        self
    }

    pub fn build(self) -> World {
        World::with_capacity(self.bodies, self.gravity)
    }
}

impl Default for WorldBuilder {
    fn default() -> Self { Self::new() }
}

/* ---------------- Scripted inputs ---------------- */

/// Input events to apply at a tick boundary, before any force computation.
/// Keeps the disabled latch and last-value-wins sampling deterministic.
#[derive(Clone, Debug, Default)]
pub struct Inputs {
    pub events: Vec<InputEvent>,
}

#[derive(Copy, Clone, Debug)]
pub enum InputEvent {
    SetAxis { vehicle: VehicleId, drive: Scalar, spin: Scalar },
    Destroy { vehicle: VehicleId },
}

/* ---------------- World ---------------- */

struct VehicleSlot {
    body: BodyId,
    inst: VehicleInstance,
}

pub struct World {
    pub gravity: Vec2,

    bodies: Bodies,
    terrain: Option<GroundProfile>,
    vehicles: Vec<VehicleSlot>,

    tick: u64,
    schedule: ScheduleRecorder,
    ledger: Ledger,
    debug: DebugSettings,
}

impl World {
    pub fn with_capacity(bodies: usize, gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Bodies::with_capacity(bodies),
            terrain: None,
            vehicles: Vec::new(),
            tick: 0,
            schedule: ScheduleRecorder::new(),
            ledger: Ledger::new(4096),
            debug: DebugSettings::default(),
        }
    }

    /* ---------- Composition ---------- */

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        BodyId(self.bodies.add(desc))
    }

    pub fn set_ground(&mut self, profile: GroundProfile) {
        self.terrain = Some(profile);
    }

    pub fn ground(&self) -> Option<&GroundProfile> {
        self.terrain.as_ref()
    }

    /// Assemble a vehicle on an existing dynamic body. Misconfiguration is a
    /// fatal setup error reported here, never a per-tick failure.
    pub fn add_vehicle(
        &mut self,
        body: BodyId,
        drive: DriveParams,
        stability: StabilityParams,
        wheels: &[SuspensionParams],
    ) -> Result<VehicleId> {
        if (body.0 as usize) >= self.bodies.len() {
            bail!("vehicle references unknown body {}", body);
        }
        if !self.bodies.is_dynamic(body.0) {
            bail!("vehicle body {} must be dynamic", body);
        }
        let inst = VehicleInstance::new(drive, stability, wheels)?;
        let id = VehicleId(self.vehicles.len() as u32);
        self.vehicles.push(VehicleSlot { body, inst });
        Ok(id)
    }

    pub fn set_debug(&mut self, cfg: DebugSettings) {
        self.debug = cfg;
    }

    /* ---------- Read surface (camera / animation / game logic) ---------- */

    pub fn body_pose(&self, id: BodyId) -> Pose { self.bodies.pose(id.0) }
    pub fn body_vel(&self, id: BodyId) -> Velocity { self.bodies.vel(id.0) }
    pub fn set_body_vel(&mut self, id: BodyId, vel: Velocity) { self.bodies.set_vel(id.0, vel); }

    pub fn vehicle_body(&self, id: VehicleId) -> BodyId { self.vehicles[id.0 as usize].body }
    pub fn vehicle_grounded(&self, id: VehicleId) -> bool { self.vehicles[id.0 as usize].inst.is_grounded() }
    pub fn vehicle_speed(&self, id: VehicleId) -> Scalar { self.vehicles[id.0 as usize].inst.speed() }
    pub fn vehicle_last_dir(&self, id: VehicleId) -> Scalar { self.vehicles[id.0 as usize].inst.last_move_direction() }
    pub fn vehicle_state(&self, id: VehicleId) -> VehicleState { self.vehicles[id.0 as usize].inst.state() }

    /* ---------- Inputs ---------- */

    pub fn set_vehicle_input(&mut self, id: VehicleId, input: AxisInput) {
        self.vehicles[id.0 as usize].inst.set_input(input);
    }

    /// The external "vehicle died" signal; latches `Disabled` before the next
    /// step so no further locomotion forces are queued.
    pub fn notify_destroyed(&mut self, id: VehicleId) {
        let slot = &mut self.vehicles[id.0 as usize];
        if slot.inst.state() != VehicleState::Disabled {
            slot.inst.notify_destroyed();
            self.ledger.push(LedgerEvent::Destroyed { vehicle: id.0 });
        }
    }

    pub fn apply_inputs(&mut self, inputs: &Inputs) {
        for ev in &inputs.events {
            match *ev {
                InputEvent::SetAxis { vehicle, drive, spin } => {
                    self.set_vehicle_input(vehicle, AxisInput { drive, spin });
                }
                InputEvent::Destroy { vehicle } => {
                    self.notify_destroyed(vehicle);
                }
            }
        }
    }

    /* ---------- Step ---------- */

    pub fn step(&mut self, dt: Scalar) -> StepStats {
        if dt <= 0.0 {
            return StepStats::default();
        }

        self.schedule.clear();
        self.tick = self.tick.wrapping_add(1);
        self.ledger.clear();

        let ctx = StepCtx { dt, tick: self.tick, gravity: self.gravity };
        let mut stats = StepStats { vehicles: self.vehicles.len() as u32, ..Default::default() };

        // inputs are latched outside the step; the stage marks where they bind
        self.schedule.push(StepStage::ApplyInputs);
        self.schedule.push(StepStage::Vehicles);
        match &self.terrain {
            Some(ground) => {
                step_vehicles(&ctx, &mut self.bodies, &mut self.vehicles, ground, &mut self.ledger, &mut stats);
            }
            None => {
                step_vehicles(&ctx, &mut self.bodies, &mut self.vehicles, &NoGround, &mut self.ledger, &mut stats);
            }
        }

        self.schedule.push(StepStage::Integrate);
        self.bodies.integrate_all(self.gravity, dt);

        if self.debug.print_every != 0 && (self.tick as u32) % self.debug.print_every == 0 {
            self.print_debug_block();
        }
        if self.debug.json_every != 0 && (self.tick as u32) % self.debug.json_every == 0 {
            let _ = self.ledger.write_jsonl("out", self.tick);
        }

        stats
    }

    pub fn tick_index(&self) -> u64 { self.tick }

    pub fn ledger(&self) -> &Ledger { &self.ledger }

    /// Stable digest of the whole simulation state, for lockstep comparisons.
    pub fn step_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.update_bytes(&self.tick.to_le_bytes());
        h.update_bytes(&self.schedule.digest());
        for i in self.bodies.indices() {
            let pose = self.bodies.pose(i);
            let vel = self.bodies.vel(i);
            h.update_bytes(&i.to_le_bytes());
            hash_vec2(&mut h, &pose.pos);
            hash_scalar(&mut h, pose.angle_deg);
            hash_vec2(&mut h, &vel.lin);
            hash_scalar(&mut h, vel.ang_deg);
        }
        for (i, slot) in self.vehicles.iter().enumerate() {
            h.update_bytes(&(i as u32).to_le_bytes());
            hash_scalar(&mut h, slot.inst.speed());
            hash_scalar(&mut h, slot.inst.last_move_direction());
            h.update_bytes(&[slot.inst.is_grounded() as u8, (slot.inst.state() == VehicleState::Disabled) as u8]);
        }
        h.finalize()
    }

    /* ---------- Debug printer ---------- */
    fn print_debug_block(&self) {
        println!("--- debug @ tick {} ---", self.tick);

        if self.debug.show_bodies {
            let mut lines = 0usize;
            for i in self.bodies.indices() {
                let p = self.bodies.pose(i);
                let v = self.bodies.vel(i);
                println!(
                    "body {:3}  pos=({:+.3},{:+.3})  ang={:+.2}  vel=({:+.3},{:+.3})  w={:+.2}",
                    i, p.pos.x, p.pos.y, p.angle_deg, v.lin.x, v.lin.y, v.ang_deg
                );
                lines += 1;
                if lines >= self.debug.max_lines { break; }
            }
        }

        if self.debug.show_vehicles {
            for (i, slot) in self.vehicles.iter().enumerate() {
                println!(
                    "veh {:2}  speed={:+.3}  grounded={}  dir={:+.0}  state={:?}",
                    i,
                    slot.inst.speed(),
                    slot.inst.is_grounded(),
                    slot.inst.last_move_direction(),
                    slot.inst.state()
                );
            }
        }
    }
}

/* ---------- glue: body view + no-ground fallback ---------- */

struct BodyView<'a> {
    bodies: &'a mut Bodies,
    id: u32,
}

impl HostBody for BodyView<'_> {
    fn pose(&self) -> Pose { self.bodies.pose(self.id) }
    fn velocity(&self) -> Velocity { self.bodies.vel(self.id) }
    fn mass(&self) -> Scalar { self.bodies.mass_of(self.id) }

    fn set_linear_vel(&mut self, lin: Vec2) {
        let v = self.bodies.vel(self.id);
        self.bodies.set_vel(self.id, Velocity { lin, ang_deg: v.ang_deg });
    }
    fn set_angular_vel(&mut self, ang_deg: Scalar) {
        let v = self.bodies.vel(self.id);
        self.bodies.set_vel(self.id, Velocity { lin: v.lin, ang_deg });
    }
    fn apply_force_at(&mut self, force: Vec2, world_point: Vec2, dt: Scalar) {
        self.bodies.apply_force_at(self.id, force, world_point, dt);
    }
    fn apply_torque(&mut self, torque: Scalar, dt: Scalar) {
        self.bodies.apply_torque(self.id, torque, dt);
    }
}

struct NoGround;

impl GroundRay for NoGround {
    fn cast(&self, _o: Vec2, _d: Vec2, _m: Scalar, _mask: SurfaceMask) -> Option<RayHit> {
        None
    }
}

fn step_vehicles<R: GroundRay>(
    ctx: &StepCtx,
    bodies: &mut Bodies,
    vehicles: &mut [VehicleSlot],
    rays: &R,
    ledger: &mut Ledger,
    stats: &mut StepStats,
) {
    for (vi, slot) in vehicles.iter_mut().enumerate() {
        let active = slot.inst.state() == VehicleState::Active;
        let mut view = BodyView { bodies: &mut *bodies, id: slot.body.0 };
        slot.inst.step(ctx, &mut view, rays);

        if !active {
            continue;
        }
        stats.rays_cast += slot.inst.wheels.len() as u32;

        for (wi, wheel) in slot.inst.wheels.iter().enumerate() {
            let s = wheel.sample();
            if s.grounded {
                stats.wheels_grounded += 1;
                ledger.push(LedgerEvent::Spring {
                    vehicle: vi as u32,
                    wheel: wi as u32,
                    force: s.spring_force,
                    compression: s.compression,
                });
                if s.stability_torque != 0.0 {
                    ledger.push(LedgerEvent::StabilityTorque {
                        vehicle: vi as u32,
                        torque: s.stability_torque,
                    });
                }
                if s.despun {
                    ledger.push(LedgerEvent::Despin {
                        vehicle: vi as u32,
                        factor: slot.inst.stability.params.spin_damping,
                    });
                }
            }
        }

        if slot.inst.is_grounded() {
            ledger.push(LedgerEvent::Drive {
                vehicle: vi as u32,
                speed: slot.inst.speed(),
                target: slot.inst.input().drive * slot.inst.drive.max_speed,
            });
        } else if slot.inst.input().spin.abs() > INPUT_DEADZONE {
            ledger.push(LedgerEvent::Flip {
                vehicle: vi as u32,
                torque: slot.inst.input().spin * slot.inst.drive.flip_torque,
            });
        }
    }
}
