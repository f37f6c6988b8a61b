use crate::types::{Pose, Vec2};
use crate::Scalar;

/// The rigid-body surface the vehicle core mutates. One shared body per
/// vehicle, one writer per tick; the host owns storage and integration.
///
/// `apply_force_at` and `apply_torque` follow the force-mode convention: the
/// change in velocity is `force * inv_mass * dt` (and the induced torque
/// integrates the same way), so callers pass plain forces, not impulses.
pub trait HostBody {
    fn pose(&self) -> Pose;
    fn velocity(&self) -> crate::types::Velocity;
    fn mass(&self) -> Scalar;

    fn set_linear_vel(&mut self, lin: Vec2);
    fn set_angular_vel(&mut self, ang_deg: Scalar);
    fn apply_force_at(&mut self, force: Vec2, world_point: Vec2, dt: Scalar);
    fn apply_torque(&mut self, torque: Scalar, dt: Scalar);
}
