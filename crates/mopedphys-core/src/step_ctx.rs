use crate::types::Vec2;
use crate::Scalar;

/// Per-tick context handed into vehicle and suspension updates.
/// `dt <= 0` marks a tick every consumer must treat as a no-op.
#[derive(Copy, Clone, Debug)]
pub struct StepCtx {
    pub dt: Scalar,
    pub tick: u64,
    pub gravity: Vec2,
}
