use anyhow::{Context, Result};
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::path::Path;

use mopedphys_core::{vec2, SurfaceMask};
use mopedphys_controllers::StabilityParams;
use mopedphys_vehicles::{DriveParams, SuspensionParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspensionTuning {
    /// Mount point in chassis space.
    pub local_pos: [f32; 2],
    pub ray_len: f32,
    pub rest_height: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Ground filter bits.
    pub mask: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityTuning {
    pub restoring_gain: f32,
    pub damping_gain: f32,
    pub max_torque: f32,
    pub spin_limit: f32,
    pub spin_damping: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub direction_change_penalty: f32,
    pub flip_torque: f32,
}

/// On-disk tuning for one vehicle: everything needed to assemble a
/// `VehicleInstance`, stable enough to hash for provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningData {
    pub version: u32,      // bump if layout changes
    pub name: String,
    pub drive: DriveTuning,
    pub stability: StabilityTuning,
    pub suspension: Vec<SuspensionTuning>,
}

impl TuningData {
    /// Reference bike tuning (the two-wheel moped the benches drive).
    pub fn reference_bike() -> Self {
        let d = DriveParams::default();
        let s = StabilityParams::default();
        let w = SuspensionParams::default();
        Self {
            version: 1,
            name: "reference-bike".to_string(),
            drive: DriveTuning {
                max_speed: d.max_speed,
                acceleration: d.acceleration,
                deceleration: d.deceleration,
                direction_change_penalty: d.direction_change_penalty,
                flip_torque: d.flip_torque,
            },
            stability: StabilityTuning {
                restoring_gain: s.restoring_gain,
                damping_gain: s.damping_gain,
                max_torque: s.max_torque,
                spin_limit: s.spin_limit,
                spin_damping: s.spin_damping,
            },
            suspension: vec![
                SuspensionTuning { local_pos: [-0.6, -0.2], ray_len: w.ray_len, rest_height: w.rest_height, stiffness: w.stiffness, damping: w.damping, mask: SurfaceMask::ALL.0 },
                SuspensionTuning { local_pos: [0.6, -0.2], ray_len: w.ray_len, rest_height: w.rest_height, stiffness: w.stiffness, damping: w.damping, mask: SurfaceMask::ALL.0 },
            ],
        }
    }

    pub fn drive_params(&self) -> DriveParams {
        DriveParams {
            max_speed: self.drive.max_speed,
            acceleration: self.drive.acceleration,
            deceleration: self.drive.deceleration,
            direction_change_penalty: self.drive.direction_change_penalty,
            flip_torque: self.drive.flip_torque,
        }
    }

    pub fn stability_params(&self) -> StabilityParams {
        StabilityParams {
            restoring_gain: self.stability.restoring_gain,
            damping_gain: self.stability.damping_gain,
            max_torque: self.stability.max_torque,
            spin_limit: self.stability.spin_limit,
            spin_damping: self.stability.spin_damping,
        }
    }

    pub fn suspension_params(&self) -> Vec<SuspensionParams> {
        self.suspension
            .iter()
            .map(|t| SuspensionParams {
                local_pos: vec2(t.local_pos[0], t.local_pos[1]),
                ray_len: t.ray_len,
                rest_height: t.rest_height,
                stiffness: t.stiffness,
                damping: t.damping,
                mask: SurfaceMask(t.mask),
            })
            .collect()
    }
}

/// Compute a stable blake3 hash of a tuning's numeric data.
pub fn tuning_hash(t: &TuningData) -> [u8; 32] {
    let mut h = Hasher::new();
    h.update(b"TUNEv1\0");
    h.update(&t.version.to_le_bytes());
    let n = t.name.as_bytes();
    h.update(&(n.len() as u64).to_le_bytes());
    h.update(n);
    for f in [t.drive.max_speed, t.drive.acceleration, t.drive.deceleration, t.drive.direction_change_penalty, t.drive.flip_torque] {
        h.update(&f.to_le_bytes());
    }
    for f in [t.stability.restoring_gain, t.stability.damping_gain, t.stability.max_torque, t.stability.spin_limit, t.stability.spin_damping] {
        h.update(&f.to_le_bytes());
    }
    h.update(&(t.suspension.len() as u64).to_le_bytes());
    for s in &t.suspension {
        for f in [s.local_pos[0], s.local_pos[1], s.ray_len, s.rest_height, s.stiffness, s.damping] {
            h.update(&f.to_le_bytes());
        }
        h.update(&s.mask.to_le_bytes());
    }
    *h.finalize().as_bytes()
}

/// Write tuning to JSON at `out_path`. If `pretty=true`, pretty-print JSON.
pub fn write_tuning_json(t: &TuningData, out_path: &Path, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(t)?
    } else {
        serde_json::to_string(t)?
    };
    std::fs::write(out_path, json)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(())
}

/// Load tuning JSON from `path`.
pub fn load_tuning(path: &Path) -> Result<TuningData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let t: TuningData = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse tuning JSON {}", path.display()))?;
    Ok(t)
}
