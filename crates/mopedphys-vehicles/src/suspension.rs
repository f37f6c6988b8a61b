use anyhow::{bail, Result};
use mopedphys_core::types::Vec2;
use mopedphys_core::{GroundRay, HostBody, Scalar, StepCtx, SurfaceMask};
use mopedphys_controllers::StabilityCtrl;

/// Geometry and spring/damper parameters of one suspension point.
#[derive(Copy, Clone, Debug)]
pub struct SuspensionParams {
    /// Mount point in chassis space.
    pub local_pos: Vec2,
    /// Ray length along chassis-local down (m).
    pub ray_len: Scalar,
    /// Rest compression height (m); compression past this loads the spring.
    pub rest_height: Scalar,
    /// Spring rate (N/m).
    pub stiffness: Scalar,
    /// Damping (N·s/m) on the compression velocity.
    pub damping: Scalar,
    /// Which surfaces count as ground. Must exclude the vehicle's own
    /// colliders; overlapping rays are not filtered here.
    pub mask: SurfaceMask,
}

impl Default for SuspensionParams {
    fn default() -> Self {
        Self {
            local_pos: Vec2::ZERO,
            ray_len: 1.0,
            rest_height: 0.5,
            stiffness: 800.0,
            damping: 15.0,
            mask: SurfaceMask::ALL,
        }
    }
}

impl SuspensionParams {
    /// Assembly-time precondition check; a bad setup is refused here, never
    /// tolerated mid-simulation.
    pub fn validate(&self) -> Result<()> {
        if !(self.ray_len > 0.0) {
            bail!("suspension ray length must be positive, got {}", self.ray_len);
        }
        if !(self.stiffness > 0.0) {
            bail!("suspension stiffness must be positive, got {}", self.stiffness);
        }
        if self.damping < 0.0 {
            bail!("suspension damping must be non-negative, got {}", self.damping);
        }
        if self.rest_height < 0.0 || self.rest_height > self.ray_len {
            bail!(
                "rest height {} outside [0, ray length {}]",
                self.rest_height,
                self.ray_len
            );
        }
        Ok(())
    }
}

/// What the most recent tick measured. Fully recomputed every tick; the only
/// cross-tick memory is the previous hit distance feeding the damper term.
#[derive(Copy, Clone, Debug, Default)]
pub struct SuspensionSample {
    /// True iff this tick's ray hit a ground surface within the ray length.
    pub grounded: bool,
    /// Hit distance along the ray (undefined content when not grounded).
    pub distance: Scalar,
    /// Spring travel closed from full extension, clamped to [0, ray_len].
    pub compression: Scalar,
    /// d(distance)/dt; zero on the first sample after a miss.
    pub compression_vel: Scalar,
    /// Spring-damper force as computed (may be ≤ 0; only positive values are
    /// applied; the spring never pulls).
    pub spring_force: Scalar,
    /// Stability torque pushed into the body this tick (already dt-scaled,
    /// zero when the spring applied nothing).
    pub stability_torque: Scalar,
    /// Whether the emergency de-spin fired this tick.
    pub despun: bool,
    /// World-space contact point of the hit.
    pub contact: Vec2,
}

/// One raycast spring-damper wheel. Owned by a [`VehicleInstance`], alive for
/// the vehicle's lifetime.
///
/// [`VehicleInstance`]: crate::VehicleInstance
#[derive(Clone, Debug)]
pub struct SuspensionPoint {
    /// Static setup.
    pub p: SuspensionParams,
    last_distance: Option<Scalar>,
    sample: SuspensionSample,
}

impl SuspensionPoint {
    /// Build a suspension point, validating its parameters.
    pub fn new(p: SuspensionParams) -> Result<Self> {
        p.validate()?;
        Ok(Self { p, last_distance: None, sample: SuspensionSample::default() })
    }

    /// This tick's measurements.
    #[inline]
    pub fn sample(&self) -> &SuspensionSample {
        &self.sample
    }

    /// Whether the most recent ray touched ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.sample.grounded
    }

    /// Last world-space contact point (meaningful while grounded).
    #[inline]
    pub fn last_contact_point(&self) -> Vec2 {
        self.sample.contact
    }

    /// Cast, measure, and push this wheel's forces into the body.
    ///
    /// Stable without an iterative solver because compression is recomputed
    /// from the absolute ray distance each tick instead of integrated, which
    /// bounds drift.
    pub fn tick<B, R>(&mut self, ctx: &StepCtx, body: &mut B, rays: &R, stability: &StabilityCtrl)
    where
        B: HostBody,
        R: GroundRay,
    {
        if ctx.dt <= 0.0 {
            return;
        }

        let pose = body.pose();
        let origin = pose.transform_point(self.p.local_pos);
        let down = pose.local_down();

        let Some(hit) = rays.cast(origin, down, self.p.ray_len, self.p.mask) else {
            self.sample = SuspensionSample::default();
            self.last_distance = None;
            return;
        };

        let compression = (self.p.ray_len - hit.distance).max(0.0);
        let compression_vel = match self.last_distance {
            Some(prev) => (hit.distance - prev) / ctx.dt,
            None => 0.0,
        };
        self.last_distance = Some(hit.distance);

        let spring = (compression - self.p.rest_height) * self.p.stiffness;
        let force = spring - compression_vel * self.p.damping;

        self.sample = SuspensionSample {
            grounded: true,
            distance: hit.distance,
            compression,
            compression_vel,
            spring_force: force,
            contact: hit.point,
            stability_torque: 0.0,
            despun: false,
        };

        if force <= 0.0 {
            return;
        }

        body.apply_force_at(-down * force, hit.point, ctx.dt);

        // Partial gravity cancellation, scaled by how compressed we are.
        // Pre-scaled by dt before force-mode application, same as the
        // reference tuning.
        let ratio = (compression / self.p.ray_len).clamp(0.0, 1.0);
        body.apply_force_at(-ctx.gravity * body.mass() * ratio * ctx.dt, hit.point, ctx.dt);

        let vel = body.velocity();
        let tau = stability.torque(pose.angle_deg, vel.ang_deg, ctx.dt);
        body.apply_torque(tau, ctx.dt);
        self.sample.stability_torque = tau;

        let w = body.velocity().ang_deg;
        if stability.over_spin(w) {
            body.set_angular_vel(w * stability.params.spin_damping);
            self.sample.despun = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mopedphys_core::types::{Pose, Velocity};
    use mopedphys_core::{vec2, RayHit, SurfaceId};
    use mopedphys_controllers::StabilityParams;

    struct TestBody {
        pose: Pose,
        vel: Velocity,
        mass: Scalar,
        forces: Vec<(Vec2, Vec2)>,
        torques: Vec<Scalar>,
    }

    impl TestBody {
        fn at_rest() -> Self {
            Self { pose: Pose::default(), vel: Velocity::default(), mass: 1.0, forces: vec![], torques: vec![] }
        }
    }

    impl HostBody for TestBody {
        fn pose(&self) -> Pose { self.pose }
        fn velocity(&self) -> Velocity { self.vel }
        fn mass(&self) -> Scalar { self.mass }
        fn set_linear_vel(&mut self, lin: Vec2) { self.vel.lin = lin; }
        fn set_angular_vel(&mut self, ang_deg: Scalar) { self.vel.ang_deg = ang_deg; }
        fn apply_force_at(&mut self, force: Vec2, world_point: Vec2, _dt: Scalar) {
            self.forces.push((force, world_point));
        }
        fn apply_torque(&mut self, torque: Scalar, _dt: Scalar) { self.torques.push(torque); }
    }

    struct FixedRay(Option<RayHit>);

    impl GroundRay for FixedRay {
        fn cast(&self, _o: Vec2, _d: Vec2, _m: Scalar, _mask: SurfaceMask) -> Option<RayHit> {
            self.0
        }
    }

    fn ctx(dt: Scalar) -> StepCtx {
        StepCtx { dt, tick: 1, gravity: vec2(0.0, -9.81) }
    }

    fn stab() -> StabilityCtrl {
        StabilityCtrl::new(StabilityParams::default())
    }

    #[test]
    fn first_contact_scenario_applies_160n_up() {
        // ray 1.0, rest 0.5, k 800, c 15, hit at 0.3:
        // compression 0.7, first-tick velocity 0 -> (0.7 - 0.5) * 800 = 160
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        let rays = FixedRay(Some(RayHit { distance: 0.3, point: vec2(0.0, -0.3), surface: SurfaceId(0) }));

        sp.tick(&ctx(0.02), &mut body, &rays, &stab());

        let s = sp.sample();
        assert!(s.grounded);
        assert!((s.compression - 0.7).abs() < 1e-5);
        assert_eq!(s.compression_vel, 0.0);
        assert!((s.spring_force - 160.0).abs() < 1e-3);

        let (f, at) = body.forces[0];
        assert!((f - vec2(0.0, 160.0)).length() < 1e-3);
        assert_eq!(at, vec2(0.0, -0.3));
    }

    #[test]
    fn miss_resets_state_and_applies_nothing() {
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        let hit = FixedRay(Some(RayHit { distance: 0.3, point: vec2(0.0, -0.3), surface: SurfaceId(0) }));
        let miss = FixedRay(None);

        sp.tick(&ctx(0.02), &mut body, &hit, &stab());
        assert!(sp.is_grounded());

        body.forces.clear();
        sp.tick(&ctx(0.02), &mut body, &miss, &stab());
        assert!(!sp.is_grounded());
        assert_eq!(sp.sample().compression, 0.0);
        assert!(body.forces.is_empty());

        // re-contact after a miss is a fresh first sample: no damping spike
        sp.tick(&ctx(0.02), &mut body, &hit, &stab());
        assert_eq!(sp.sample().compression_vel, 0.0);
    }

    #[test]
    fn zero_dt_is_a_noop() {
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        let rays = FixedRay(Some(RayHit { distance: 0.3, point: vec2(0.0, -0.3), surface: SurfaceId(0) }));

        sp.tick(&ctx(0.0), &mut body, &rays, &stab());
        sp.tick(&ctx(-0.02), &mut body, &rays, &stab());
        assert!(!sp.is_grounded());
        assert!(body.forces.is_empty());
    }

    #[test]
    fn overextended_spring_never_pulls() {
        // hit close to full ray length: compression well below rest height
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        let rays = FixedRay(Some(RayHit { distance: 0.9, point: vec2(0.0, -0.9), surface: SurfaceId(0) }));

        sp.tick(&ctx(0.02), &mut body, &rays, &stab());
        assert!(sp.is_grounded());
        assert!(sp.sample().spring_force <= 0.0);
        assert!(body.forces.is_empty());
        assert!(body.torques.is_empty());
    }

    #[test]
    fn force_grows_monotonically_past_rest() {
        let stab = stab();
        let mut last = 0.0;
        for dist in [0.45, 0.35, 0.25, 0.15, 0.05] {
            let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
            let mut body = TestBody::at_rest();
            let rays = FixedRay(Some(RayHit { distance: dist, point: vec2(0.0, -dist), surface: SurfaceId(0) }));
            sp.tick(&ctx(0.02), &mut body, &rays, &stab);
            let f = sp.sample().spring_force;
            assert!(f > last, "force not monotone at distance {}", dist);
            last = f;
        }
    }

    #[test]
    fn compression_velocity_uses_previous_distance() {
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        let dt = 0.02;
        let first = FixedRay(Some(RayHit { distance: 0.4, point: vec2(0.0, -0.4), surface: SurfaceId(0) }));
        let second = FixedRay(Some(RayHit { distance: 0.3, point: vec2(0.0, -0.3), surface: SurfaceId(0) }));

        sp.tick(&ctx(dt), &mut body, &first, &stab());
        sp.tick(&ctx(dt), &mut body, &second, &stab());
        // distance shrank 0.1 over one tick
        assert!((sp.sample().compression_vel - (-0.1 / dt)).abs() < 1e-3);
    }

    #[test]
    fn sample_reports_stability_torque_and_despin() {
        let mut sp = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        let mut body = TestBody::at_rest();
        body.pose.angle_deg = 30.0;
        body.vel.ang_deg = 2000.0;
        let rays = FixedRay(Some(RayHit { distance: 0.3, point: vec2(0.0, -0.3), surface: SurfaceId(0) }));
        let dt = 0.02;

        sp.tick(&ctx(dt), &mut body, &rays, &stab());

        let s = sp.sample();
        // leaning right while spinning hard: max restoring torque, dt-scaled
        assert!((s.stability_torque - (-200.0 * dt)).abs() < 1e-4);
        assert_eq!(s.stability_torque, body.torques[0]);
        assert!(s.despun);
        assert!((body.vel.ang_deg - 1800.0).abs() < 1e-3);

        // settled wheel reports neither
        let mut calm = TestBody::at_rest();
        let mut sp2 = SuspensionPoint::new(SuspensionParams::default()).unwrap();
        sp2.tick(&ctx(dt), &mut calm, &rays, &stab());
        assert_eq!(sp2.sample().stability_torque, 0.0);
        assert!(!sp2.sample().despun);
    }

    #[test]
    fn bad_params_rejected_at_assembly() {
        assert!(SuspensionPoint::new(SuspensionParams { ray_len: 0.0, ..Default::default() }).is_err());
        assert!(SuspensionPoint::new(SuspensionParams { stiffness: -1.0, ..Default::default() }).is_err());
        assert!(SuspensionPoint::new(SuspensionParams { rest_height: 2.0, ..Default::default() }).is_err());
        assert!(SuspensionPoint::new(SuspensionParams { damping: -0.1, ..Default::default() }).is_err());
    }
}
