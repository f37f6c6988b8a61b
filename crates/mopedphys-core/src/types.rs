use crate::Scalar;

pub type Vec2 = glam::Vec2;

#[inline] pub fn vec2(x: Scalar, y: Scalar) -> Vec2 { Vec2::new(x, y) }
#[inline] pub fn pose(pos: Vec2, angle_deg: Scalar) -> Pose { Pose { pos, angle_deg } }

/// 2D pose. Rotation is stored in degrees, counter-clockwise positive,
/// because the stability controller works in the degree domain.
#[derive(Copy, Clone, Debug)]
pub struct Pose {
    pub pos: Vec2,
    pub angle_deg: Scalar,
}

impl Pose {
    /// World point of a chassis-space offset.
    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.pos + self.rotate_vector(local)
    }

    /// World direction of a chassis-space direction.
    #[inline]
    pub fn rotate_vector(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.angle_deg * crate::DEG_TO_RAD).rotate(local)
    }

    /// Chassis-local down in world space.
    #[inline]
    pub fn local_down(&self) -> Vec2 {
        self.rotate_vector(Vec2::NEG_Y)
    }
}

impl Default for Pose {
    fn default() -> Self { Self { pos: Vec2::ZERO, angle_deg: 0.0 } }
}

/// Linear velocity in m/s, angular velocity in deg/s.
#[derive(Copy, Clone, Debug, Default)]
pub struct Velocity {
    pub lin: Vec2,
    pub ang_deg: Scalar,
}
