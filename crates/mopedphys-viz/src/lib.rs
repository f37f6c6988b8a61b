use serde::Serialize;
use mopedphys_core::{schedule_digest, StepStage};
use std::io::Write;
use std::path::Path;

#[derive(Default)]
pub struct ScheduleRecorder { stages: Vec<StepStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::new() } }
    pub fn push(&mut self, s: StepStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}

/// Gates for the world's periodic debug output. Zero disables a channel.
#[derive(Copy, Clone, Debug)]
pub struct DebugSettings {
    pub print_every: u32,
    pub json_every: u32,
    pub show_bodies: bool,
    pub show_vehicles: bool,
    pub max_lines: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self { print_every: 0, json_every: 0, show_bodies: false, show_vehicles: false, max_lines: 8 }
    }
}

/// One telemetry record per notable event inside a step. Cheap to push,
/// dumped as JSONL when the debug gates say so.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(tag = "ev")]
pub enum LedgerEvent {
    Spring { vehicle: u32, wheel: u32, force: f32, compression: f32 },
    StabilityTorque { vehicle: u32, torque: f32 },
    Despin { vehicle: u32, factor: f32 },
    Drive { vehicle: u32, speed: f32, target: f32 },
    Flip { vehicle: u32, torque: f32 },
    Destroyed { vehicle: u32 },
}

/// Capped per-tick event buffer; cleared at the top of each step.
pub struct Ledger {
    events: Vec<LedgerEvent>,
    cap: usize,
}

impl Ledger {
    pub fn new(cap: usize) -> Self {
        Self { events: Vec::with_capacity(cap), cap }
    }

    pub fn push(&mut self, e: LedgerEvent) {
        if self.events.len() < self.cap {
            self.events.push(e);
        }
    }

    pub fn clear(&mut self) { self.events.clear(); }
    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter()
    }

    /// Dump this tick's events as `<dir>/tick_<n>.jsonl`, one event per line.
    pub fn write_jsonl(&self, dir: &str, tick: u64) -> std::io::Result<()> {
        let dir = Path::new(dir);
        std::fs::create_dir_all(dir)?;
        let mut f = std::fs::File::create(dir.join(format!("tick_{tick}.jsonl")))?;
        for e in &self.events {
            let line = serde_json::to_string(e).map_err(std::io::Error::other)?;
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_caps_and_clears() {
        let mut l = Ledger::new(2);
        for i in 0..5 {
            l.push(LedgerEvent::Drive { vehicle: i, speed: 0.0, target: 0.0 });
        }
        assert_eq!(l.len(), 2);
        l.clear();
        assert!(l.is_empty());
    }

    #[test]
    fn events_serialize_tagged() {
        let e = LedgerEvent::Spring { vehicle: 0, wheel: 1, force: 160.0, compression: 0.7 };
        let s = serde_json::to_string(&e).unwrap();
        assert!(s.contains("\"ev\":\"Spring\""));
        assert!(s.contains("\"wheel\":1"));
    }
}
