use crate::StepHasher;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StepStage {
    ApplyInputs = 1,
    Vehicles = 2,
    Integrate = 3,
}

pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}
