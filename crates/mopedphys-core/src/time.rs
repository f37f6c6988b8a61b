#[derive(Copy, Clone, Debug, Default)]
pub struct StepStats {
    pub rays_cast: u32,
    pub wheels_grounded: u32,
    pub vehicles: u32,
}
