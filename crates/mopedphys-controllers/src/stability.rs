use mopedphys_core::Scalar;

/// Wrap an angle into [-180, 180] by repeated ±360. Both boundaries are
/// reachable: 540 → 180 and -540 → -180. Idempotent on the range.
pub fn normalize_angle_deg(mut angle: Scalar) -> Scalar {
    while angle > 180.0 { angle -= 360.0; }
    while angle < -180.0 { angle += 360.0; }
    angle
}

/// Tuning for the PD stability controller.
#[derive(Copy, Clone, Debug)]
pub struct StabilityParams {
    /// Proportional gain on tilt (torque per degree of lean).
    pub restoring_gain: Scalar,
    /// Derivative gain on angular velocity.
    pub damping_gain: Scalar,
    /// Hard clamp on the combined torque (N·m).
    pub max_torque: Scalar,
    /// Angular speed (deg/s) past which the emergency de-spin kicks in.
    pub spin_limit: Scalar,
    /// Multiplier the caller applies to angular velocity when over the limit.
    pub spin_damping: Scalar,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self { restoring_gain: 0.5, damping_gain: 10.0, max_torque: 200.0, spin_limit: 1000.0, spin_damping: 0.9 }
    }
}

/// PD controller on orientation: pure function of the body's current angle and
/// angular velocity, no state between calls. Gains want critical damping:
/// under-damped setups bounce, over-damped ones level sluggishly.
#[derive(Copy, Clone, Debug)]
pub struct StabilityCtrl {
    /// Active gains and limits.
    pub params: StabilityParams,
}

impl StabilityCtrl {
    /// Build a controller around the given tuning.
    pub fn new(params: StabilityParams) -> Self {
        Self { params }
    }

    /// Corrective torque for the current tilt, pre-scaled by `dt` so the
    /// caller applies it force-mode as-is.
    pub fn torque(&self, angle_deg: Scalar, ang_vel_deg: Scalar, dt: Scalar) -> Scalar {
        let angle = normalize_angle_deg(angle_deg);
        let restore = -angle * self.params.restoring_gain;
        let damp = -ang_vel_deg * self.params.damping_gain;
        let total = (restore + damp).clamp(-self.params.max_torque, self.params.max_torque);
        total * dt
    }

    /// Out-of-band runaway-spin check; independent of the torque path. When
    /// true, the caller scales the body's angular velocity by `spin_damping`
    /// directly.
    #[inline]
    pub fn over_spin(&self, ang_vel_deg: Scalar) -> bool {
        ang_vel_deg.abs() > self.params.spin_limit
    }
}
