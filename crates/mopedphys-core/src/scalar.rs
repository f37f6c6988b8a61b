/// Simulation scalar. f32 everywhere; keep one alias so a swap stays cheap.
pub type Scalar = f32;

pub const RAD_TO_DEG: Scalar = 180.0 / core::f32::consts::PI;
pub const DEG_TO_RAD: Scalar = core::f32::consts::PI / 180.0;
