use anyhow::{bail, Result};
use mopedphys_core::types::Vec2;
use mopedphys_core::{GroundRay, HostBody, Scalar, StepCtx};
use mopedphys_controllers::{StabilityCtrl, StabilityParams};

use crate::suspension::{SuspensionParams, SuspensionPoint};

/// Axis magnitudes below this are treated as "no input": coasting on the
/// ground, no last-direction update.
pub const INPUT_DEADZONE: Scalar = 0.1;

/// Longitudinal speed model and air-control parameters.
#[derive(Copy, Clone, Debug)]
pub struct DriveParams {
    /// Top longitudinal speed (m/s).
    pub max_speed: Scalar,
    /// Approach rate toward the commanded speed (m/s²).
    pub acceleration: Scalar,
    /// Coasting rate toward zero when input is inside the deadzone (m/s²).
    pub deceleration: Scalar,
    /// Acceleration multiplier (< 1) while commanded direction opposes the
    /// current one; reversing costs more than speeding up.
    pub direction_change_penalty: Scalar,
    /// Airborne flip torque (N·m). Positive spin input produces
    /// counter-clockwise (positive) torque; that sign is fixed, not tunable.
    pub flip_torque: Scalar,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration: 10.0,
            deceleration: 15.0,
            direction_change_penalty: 0.5,
            flip_torque: 400.0,
        }
    }
}

impl DriveParams {
    /// Assembly-time precondition check.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_speed >= 0.0) {
            bail!("max speed must be non-negative, got {}", self.max_speed);
        }
        if !(self.acceleration > 0.0) || !(self.deceleration > 0.0) {
            bail!(
                "acceleration rates must be positive, got accel {} decel {}",
                self.acceleration,
                self.deceleration
            );
        }
        if !(self.direction_change_penalty > 0.0 && self.direction_change_penalty <= 1.0) {
            bail!(
                "direction change penalty must be in (0, 1], got {}",
                self.direction_change_penalty
            );
        }
        if !self.flip_torque.is_finite() {
            bail!("flip torque must be finite");
        }
        Ok(())
    }
}

/// Driver input for a tick, sampled last-value-wins between ticks.
#[derive(Copy, Clone, Debug, Default)]
pub struct AxisInput {
    /// Longitudinal axis in [-1, 1]; + drives toward +x.
    pub drive: Scalar,
    /// Flip axis in [-1, 1]; + spins counter-clockwise while airborne.
    pub spin: Scalar,
}

/// Controller lifecycle. `Disabled` is terminal: entered via
/// [`VehicleInstance::notify_destroyed`], never left.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VehicleState {
    /// Normal operation.
    Active,
    /// Inputs ignored, no locomotion forces; ambient physics still applies
    /// through the host body.
    Disabled,
}

/// Runtime vehicle you update every tick. Owns its suspension points
/// (created and destroyed together); holds no body reference, the host
/// passes its [`HostBody`] into [`step`](Self::step).
///
/// [`HostBody`]: mopedphys_core::HostBody
#[derive(Clone, Debug)]
pub struct VehicleInstance {
    /// Speed model setup.
    pub drive: DriveParams,
    /// Upright controller shared by all suspension points.
    pub stability: StabilityCtrl,
    /// Per-wheel suspension, index 0..N.
    pub wheels: Vec<SuspensionPoint>,
    input: AxisInput,
    state: VehicleState,
    current_speed: Scalar,
    grounded: bool,
    last_move_dir: Scalar,
}

impl VehicleInstance {
    /// Assemble a vehicle, validating every parameter block. Misconfiguration
    /// is refused here; `step` never fails.
    pub fn new(drive: DriveParams, stability: StabilityParams, wheels: &[SuspensionParams]) -> Result<Self> {
        drive.validate()?;
        let wheels = wheels
            .iter()
            .map(|&p| SuspensionPoint::new(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            drive,
            stability: StabilityCtrl::new(stability),
            wheels,
            input: AxisInput::default(),
            state: VehicleState::Active,
            current_speed: 0.0,
            grounded: false,
            last_move_dir: 0.0,
        })
    }

    /// Latch the current input, clamped to [-1, 1]. Ignored once disabled.
    pub fn set_input(&mut self, input: AxisInput) {
        if self.state == VehicleState::Disabled {
            return;
        }
        self.input = AxisInput {
            drive: input.drive.clamp(-1.0, 1.0),
            spin: input.spin.clamp(-1.0, 1.0),
        };
    }

    /// External "vehicle destroyed" signal: zero inputs and stop reacting.
    /// Terminal; applied before the next tick's force computation.
    pub fn notify_destroyed(&mut self) {
        self.state = VehicleState::Disabled;
        self.input = AxisInput::default();
    }

    /// True if any suspension point touched ground this tick.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Signed longitudinal speed the controller is holding.
    #[inline]
    pub fn speed(&self) -> Scalar {
        self.current_speed
    }

    /// Sign of the last movement input outside the deadzone (0 before any).
    /// Exposed for animation/FX logic; not consumed internally.
    #[inline]
    pub fn last_move_direction(&self) -> Scalar {
        self.last_move_dir
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Currently latched input.
    #[inline]
    pub fn input(&self) -> AxisInput {
        self.input
    }

    /// Advance one fixed tick: suspension first, then ground drive or air
    /// control against this tick's grounded aggregate.
    pub fn step<B, R>(&mut self, ctx: &StepCtx, body: &mut B, rays: &R)
    where
        B: HostBody,
        R: GroundRay,
    {
        if ctx.dt <= 0.0 || self.state == VehicleState::Disabled {
            return;
        }

        for wheel in &mut self.wheels {
            wheel.tick(ctx, body, rays, &self.stability);
        }
        self.grounded = self.wheels.iter().any(|w| w.is_grounded());

        if self.grounded {
            self.apply_ground_drive(ctx, body);
        } else {
            body.apply_torque(self.input.spin * self.drive.flip_torque, ctx.dt);
            // keep horizontal momentum through the air
            let v = body.velocity();
            body.set_linear_vel(Vec2::new(self.current_speed, v.lin.y));
        }

        if self.input.drive.abs() > INPUT_DEADZONE {
            self.last_move_dir = self.input.drive.signum();
        }
    }

    fn apply_ground_drive<B: HostBody>(&mut self, ctx: &StepCtx, body: &mut B) {
        let target = self.input.drive * self.drive.max_speed;
        let mut rate = self.drive.acceleration;
        if self.current_speed != 0.0 && target.signum() != self.current_speed.signum() {
            rate *= self.drive.direction_change_penalty;
        }

        if self.input.drive.abs() < INPUT_DEADZONE {
            self.current_speed = move_towards(self.current_speed, 0.0, self.drive.deceleration * ctx.dt);
        } else {
            self.current_speed = move_towards(self.current_speed, target, rate * ctx.dt);
        }

        // drive owns the horizontal component; gravity/suspension own vertical
        let v = body.velocity();
        body.set_linear_vel(Vec2::new(self.current_speed, v.lin.y));
    }
}

/// Rate-limited approach: never overshoots `target` within one call.
#[inline]
fn move_towards(current: Scalar, target: Scalar, max_delta: Scalar) -> Scalar {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mopedphys_core::types::{Pose, Velocity};
    use mopedphys_core::{vec2, RayHit, SurfaceId, SurfaceMask};

    struct TestBody {
        pose: Pose,
        vel: Velocity,
        torques: Vec<Scalar>,
    }

    impl TestBody {
        fn new() -> Self {
            Self { pose: Pose::default(), vel: Velocity::default(), torques: vec![] }
        }
    }

    impl HostBody for TestBody {
        fn pose(&self) -> Pose { self.pose }
        fn velocity(&self) -> Velocity { self.vel }
        fn mass(&self) -> Scalar { 1.0 }
        fn set_linear_vel(&mut self, lin: Vec2) { self.vel.lin = lin; }
        fn set_angular_vel(&mut self, ang_deg: Scalar) { self.vel.ang_deg = ang_deg; }
        fn apply_force_at(&mut self, _f: Vec2, _p: Vec2, _dt: Scalar) {}
        fn apply_torque(&mut self, torque: Scalar, _dt: Scalar) { self.torques.push(torque); }
    }

    struct FixedRay(Option<RayHit>);

    impl GroundRay for FixedRay {
        fn cast(&self, _o: Vec2, _d: Vec2, _m: Scalar, _mask: SurfaceMask) -> Option<RayHit> {
            self.0
        }
    }

    fn grounded_ray() -> FixedRay {
        // rest-height contact: spring balanced, wheel grounded
        FixedRay(Some(RayHit { distance: 0.5, point: vec2(0.0, -0.5), surface: SurfaceId(0) }))
    }

    fn airborne_ray() -> FixedRay {
        FixedRay(None)
    }

    fn ctx(dt: Scalar) -> StepCtx {
        StepCtx { dt, tick: 1, gravity: vec2(0.0, -9.81) }
    }

    fn bike(wheels: usize) -> VehicleInstance {
        let params = vec![SuspensionParams::default(); wheels];
        VehicleInstance::new(DriveParams::default(), StabilityParams::default(), &params).unwrap()
    }

    #[test]
    fn speed_approach_never_overshoots() {
        // accel 10, dt 1: a raw Euler step would blow past a target of 5
        let mut v = bike(1);
        let mut body = TestBody::new();
        v.set_input(AxisInput { drive: 1.0, spin: 0.0 });
        v.step(&ctx(1.0), &mut body, &grounded_ray());
        assert!(v.speed() <= v.drive.max_speed + 1e-6);
        assert_eq!(v.speed(), v.drive.max_speed);
    }

    #[test]
    fn direction_change_penalty_halves_accel() {
        let dt = 0.1;

        let mut fwd = bike(1);
        let mut body = TestBody::new();
        fwd.set_input(AxisInput { drive: 1.0, spin: 0.0 });
        fwd.step(&ctx(dt), &mut body, &grounded_ray());
        let gain_from_rest = fwd.speed();

        let mut rev = bike(1);
        rev.current_speed = 3.0;
        rev.set_input(AxisInput { drive: -0.4, spin: 0.0 });
        rev.step(&ctx(dt), &mut body, &grounded_ray());
        let gain_reversing = (rev.speed() - 3.0).abs();

        let expected = rev.drive.acceleration * rev.drive.direction_change_penalty * dt;
        assert!((gain_reversing - expected).abs() < 1e-5);
        assert!(gain_reversing < gain_from_rest);
    }

    #[test]
    fn deadzone_input_coasts_to_zero() {
        let mut v = bike(1);
        let mut body = TestBody::new();
        v.current_speed = 2.0;
        v.set_input(AxisInput { drive: 0.05, spin: 0.0 });
        for _ in 0..100 {
            v.step(&ctx(0.02), &mut body, &grounded_ray());
        }
        assert_eq!(v.speed(), 0.0);
        assert_eq!(body.velocity().lin.x, 0.0);
    }

    #[test]
    fn grounded_drive_writes_horizontal_only() {
        let mut v = bike(1);
        let mut body = TestBody::new();
        body.vel.lin = vec2(0.0, -3.0);
        v.set_input(AxisInput { drive: 1.0, spin: 0.0 });
        v.step(&ctx(0.02), &mut body, &grounded_ray());
        assert!(body.vel.lin.x > 0.0);
        assert_eq!(body.vel.lin.y, -3.0);
    }

    #[test]
    fn airborne_applies_flip_torque_and_keeps_momentum() {
        let mut v = bike(1);
        let mut body = TestBody::new();
        v.current_speed = 4.0;
        body.vel.lin = vec2(4.0, 1.0);
        v.set_input(AxisInput { drive: 0.0, spin: 1.0 });
        v.step(&ctx(0.02), &mut body, &airborne_ray());

        assert!(!v.is_grounded());
        // positive spin input -> counter-clockwise (positive) torque
        assert_eq!(body.torques.last().copied(), Some(v.drive.flip_torque));
        assert_eq!(body.vel.lin.x, 4.0);
        assert_eq!(body.vel.lin.y, 1.0);
    }

    #[test]
    fn grounded_aggregation_is_any_not_all() {
        // ground exists only under x < 0: rear wheel touches, front does not
        struct HalfRay;
        impl GroundRay for HalfRay {
            fn cast(&self, o: Vec2, _d: Vec2, _m: Scalar, _mask: SurfaceMask) -> Option<RayHit> {
                (o.x < 0.0).then(|| RayHit { distance: 0.4, point: vec2(o.x, -0.4), surface: SurfaceId(0) })
            }
        }

        let wheels = [
            SuspensionParams { local_pos: vec2(-0.5, 0.0), ..Default::default() },
            SuspensionParams { local_pos: vec2(0.5, 0.0), ..Default::default() },
        ];
        let mut v = VehicleInstance::new(DriveParams::default(), StabilityParams::default(), &wheels).unwrap();
        let mut body = TestBody::new();

        v.step(&ctx(0.02), &mut body, &HalfRay);
        assert!(v.wheels[0].is_grounded());
        assert!(!v.wheels[1].is_grounded());
        assert!(v.is_grounded());

        v.step(&ctx(0.02), &mut body, &airborne_ray());
        assert!(!v.is_grounded());
    }

    #[test]
    fn disabled_is_sticky_and_silences_locomotion() {
        let mut v = bike(1);
        let mut body = TestBody::new();
        v.set_input(AxisInput { drive: 1.0, spin: 0.0 });
        v.step(&ctx(0.02), &mut body, &grounded_ray());
        assert!(v.speed() > 0.0);

        v.notify_destroyed();
        assert_eq!(v.state(), VehicleState::Disabled);
        assert_eq!(v.input().drive, 0.0);

        let speed_at_death = v.speed();
        for _ in 0..10 {
            v.set_input(AxisInput { drive: 1.0, spin: 1.0 });
            body.torques.clear();
            let before = body.vel;
            v.step(&ctx(0.02), &mut body, &grounded_ray());
            assert_eq!(v.speed(), speed_at_death);
            assert!(body.torques.is_empty());
            assert_eq!(body.vel.lin, before.lin);
        }
    }

    #[test]
    fn last_move_direction_tracks_deadzone() {
        let mut v = bike(1);
        let mut body = TestBody::new();
        assert_eq!(v.last_move_direction(), 0.0);

        v.set_input(AxisInput { drive: -1.0, spin: 0.0 });
        v.step(&ctx(0.02), &mut body, &grounded_ray());
        assert_eq!(v.last_move_direction(), -1.0);

        // sub-deadzone input leaves the recorded direction alone
        v.set_input(AxisInput { drive: 0.05, spin: 0.0 });
        v.step(&ctx(0.02), &mut body, &grounded_ray());
        assert_eq!(v.last_move_direction(), -1.0);
    }

    #[test]
    fn input_is_clamped() {
        let mut v = bike(0);
        v.set_input(AxisInput { drive: 7.0, spin: -3.0 });
        assert_eq!(v.input().drive, 1.0);
        assert_eq!(v.input().spin, -1.0);
    }

    #[test]
    fn bad_drive_params_rejected() {
        let bad = DriveParams { direction_change_penalty: 0.0, ..Default::default() };
        assert!(VehicleInstance::new(bad, StabilityParams::default(), &[]).is_err());
        let bad = DriveParams { acceleration: -1.0, ..Default::default() };
        assert!(VehicleInstance::new(bad, StabilityParams::default(), &[]).is_err());
    }
}
