use crate::types::Vec2;
use crate::{Scalar, SurfaceId};

/// Bit filter over ground surfaces. A suspension ray only accepts hits whose
/// surface mask intersects its own; hosts use this to keep a vehicle's own
/// colliders out of its wheel rays.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const ALL: SurfaceMask = SurfaceMask(!0);
    pub const NONE: SurfaceMask = SurfaceMask(0);

    #[inline] pub fn intersects(self, other: SurfaceMask) -> bool { self.0 & other.0 != 0 }
}

impl Default for SurfaceMask {
    fn default() -> Self { Self::ALL }
}

/// Result of a ground ray query. `distance` is measured along the ray from its
/// origin; `point` is the world-space contact.
#[derive(Copy, Clone, Debug)]
pub struct RayHit {
    pub distance: Scalar,
    pub point: Vec2,
    pub surface: SurfaceId,
}

/// Ray-intersection service the host must provide. "No hit" is a normal
/// outcome, not an error.
pub trait GroundRay {
    fn cast(&self, origin: Vec2, dir: Vec2, max_dist: Scalar, mask: SurfaceMask) -> Option<RayHit>;
}
