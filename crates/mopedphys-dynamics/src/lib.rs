use mopedphys_core::types::{Pose, Velocity, Vec2};
use mopedphys_core::{Scalar, RAD_TO_DEG};

/// Mass and rotational inertia (about the center of mass, kg·m²).
#[derive(Copy, Clone, Debug)]
pub struct MassProps {
    pub mass: Scalar,
    pub inv_mass: Scalar,
    pub inv_inertia: Scalar,
}

impl MassProps {
    pub fn infinite() -> Self {
        Self { mass: f32::INFINITY, inv_mass: 0.0, inv_inertia: 0.0 }
    }

    pub fn from_box(half: Vec2, density: Scalar) -> Self {
        let dims = half * 2.0;
        let m = density * dims.x * dims.y;
        let i = (1.0 / 12.0) * m * (dims.x * dims.x + dims.y * dims.y);
        Self { mass: m, inv_mass: 1.0 / m, inv_inertia: 1.0 / i }
    }

    pub fn from_circle(radius: Scalar, density: Scalar) -> Self {
        let m = density * core::f32::consts::PI * radius * radius;
        let i = 0.5 * m * radius * radius;
        Self { mass: m, inv_mass: 1.0 / m, inv_inertia: 1.0 / i }
    }
}

/// Input descriptor when creating a body.
#[derive(Copy, Clone, Debug)]
pub struct BodyDesc {
    pub pose: Pose,
    pub vel: Velocity,
    pub mass: MassProps,
    pub dynamic: bool,
}

/// SoA body storage with deterministic ID = index semantics.
pub struct Bodies {
    pos: Vec<Vec2>,
    angle_deg: Vec<Scalar>,
    linvel: Vec<Vec2>,
    angvel_deg: Vec<Scalar>,
    mass: Vec<Scalar>,
    inv_mass: Vec<Scalar>,
    inv_inertia: Vec<Scalar>,
    dynamic: Vec<bool>,
}

impl Bodies {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            pos: Vec::with_capacity(cap),
            angle_deg: Vec::with_capacity(cap),
            linvel: Vec::with_capacity(cap),
            angvel_deg: Vec::with_capacity(cap),
            mass: Vec::with_capacity(cap),
            inv_mass: Vec::with_capacity(cap),
            inv_inertia: Vec::with_capacity(cap),
            dynamic: Vec::with_capacity(cap),
        }
    }

    pub fn add(&mut self, desc: BodyDesc) -> u32 {
        self.pos.push(desc.pose.pos);
        self.angle_deg.push(desc.pose.angle_deg);
        self.linvel.push(desc.vel.lin);
        self.angvel_deg.push(desc.vel.ang_deg);
        self.mass.push(desc.mass.mass);
        let (im, ii) = if desc.dynamic {
            (desc.mass.inv_mass, desc.mass.inv_inertia)
        } else {
            (0.0, 0.0)
        };
        self.inv_mass.push(im);
        self.inv_inertia.push(ii);
        self.dynamic.push(desc.dynamic);
        (self.pos.len() as u32) - 1
    }

    #[inline] pub fn len(&self) -> usize { self.pos.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pos.is_empty() }

    // -------- Accessors used by world/hash --------
    #[inline] pub fn pose(&self, id: u32) -> Pose {
        let i = id as usize;
        Pose { pos: self.pos[i], angle_deg: self.angle_deg[i] }
    }
    #[inline] pub fn set_pose(&mut self, id: u32, p: Pose) {
        let i = id as usize;
        self.pos[i] = p.pos;
        self.angle_deg[i] = p.angle_deg;
    }

    #[inline] pub fn vel(&self, id: u32) -> Velocity {
        let i = id as usize;
        Velocity { lin: self.linvel[i], ang_deg: self.angvel_deg[i] }
    }
    #[inline] pub fn set_vel(&mut self, id: u32, v: Velocity) {
        let i = id as usize;
        self.linvel[i] = v.lin;
        self.angvel_deg[i] = v.ang_deg;
    }

    #[inline] pub fn mass_of(&self, id: u32) -> Scalar { self.mass[id as usize] }
    #[inline] pub fn inv_mass_of(&self, id: u32) -> Scalar { self.inv_mass[id as usize] }
    #[inline] pub fn is_dynamic(&self, id: u32) -> bool { self.dynamic[id as usize] }

    // -------- Force application (force-mode: dv = F * inv_m * dt) --------

    /// Apply a world-space force at a world point. The lever arm about the
    /// center of mass induces a torque; angular state is in deg/s so the
    /// angular delta converts through RAD_TO_DEG.
    pub fn apply_force_at(&mut self, id: u32, force: Vec2, world_point: Vec2, dt: Scalar) {
        let i = id as usize;
        if self.inv_mass[i] == 0.0 { return; }
        self.linvel[i] += force * self.inv_mass[i] * dt;
        let r = world_point - self.pos[i];
        let torque = r.perp_dot(force);
        self.angvel_deg[i] += torque * self.inv_inertia[i] * dt * RAD_TO_DEG;
    }

    /// Apply a pure torque (N·m), counter-clockwise positive.
    pub fn apply_torque(&mut self, id: u32, torque: Scalar, dt: Scalar) {
        let i = id as usize;
        if self.inv_mass[i] == 0.0 { return; }
        self.angvel_deg[i] += torque * self.inv_inertia[i] * dt * RAD_TO_DEG;
    }

    /// Semi-implicit Euler over all dynamic bodies.
    pub fn integrate_all(&mut self, gravity: Vec2, dt: Scalar) {
        for i in 0..self.len() {
            if !self.dynamic[i] || self.inv_mass[i] == 0.0 { continue; }
            self.linvel[i] += gravity * dt;
            self.pos[i] += self.linvel[i] * dt;
            self.angle_deg[i] += self.angvel_deg[i] * dt;
        }
    }

    // Iterator for hashing in stable order
    pub fn indices(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        0..(self.len() as u32)
    }
}

impl Default for Bodies {
    fn default() -> Self { Self::with_capacity(0) }
}
