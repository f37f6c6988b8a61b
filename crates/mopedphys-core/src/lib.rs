pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod time;
pub mod schedule;
pub mod step_ctx;
pub mod queries;
pub mod host;

pub use scalar::{Scalar, RAD_TO_DEG, DEG_TO_RAD};
pub use ids::{BodyId, VehicleId, SurfaceId};
pub use types::{Vec2, Pose, Velocity, vec2, pose};
pub use hash::{StepHasher, hash_vec2, hash_scalar, hex32};
pub use time::StepStats;
pub use schedule::{StepStage, schedule_digest};
pub use step_ctx::StepCtx;
pub use queries::{GroundRay, RayHit, SurfaceMask};
pub use host::HostBody;
