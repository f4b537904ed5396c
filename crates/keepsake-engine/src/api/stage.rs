use serde::{Deserialize, Serialize};

use crate::api::types::{CueEvent, StageEvent};
use crate::core::rng::Rng;
use crate::input::queue::InputQueue;

/// Configuration for the runner, provided by the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum number of output floats per frame (default: 256).
    pub max_outputs: usize,
    /// Maximum number of cues per frame (default: 32).
    pub max_cues: usize,
    /// Maximum number of stage events per frame (default: 32).
    pub max_events: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_outputs: 256,
            max_cues: 32,
            max_events: 32,
        }
    }
}

/// The contract every day's scene fulfils.
pub trait Stage {
    /// Return runner configuration. Called once before init.
    fn config(&self) -> StageConfig {
        StageConfig::default()
    }

    /// Enter the initial phase.
    fn init(&mut self, ctx: &mut StageContext);

    /// One fixed step. Consume input, advance engines, write outputs.
    fn update(&mut self, ctx: &mut StageContext, input: &InputQueue);

    /// Current phase as a stable numeric code for the host.
    fn phase_code(&self) -> u32;

    /// Terminal phase reached.
    fn is_finished(&self) -> bool;
}

/// Mutable per-stage state shared with the runner, passed to Stage::init and Stage::update.
pub struct StageContext {
    pub events: Vec<StageEvent>,
    pub cues: Vec<CueEvent>,
    /// Flat per-frame values for the host (timeline tracks, gantry, progress).
    pub outputs: Vec<f32>,
    /// Seconds covered by the current update.
    pub dt: f32,
    pub rng: Rng,
}

impl StageContext {
    pub fn new(seed: u64) -> Self {
        Self {
            events: Vec::new(),
            cues: Vec::new(),
            outputs: Vec::new(),
            dt: 1.0 / 60.0,
            rng: Rng::new(seed),
        }
    }

    /// Emit an audio cue to be forwarded to the host.
    pub fn emit_cue(&mut self, cue: CueEvent) {
        self.cues.push(cue);
    }

    /// Emit a stage event to be forwarded to the host.
    pub fn emit_event(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn emit_phase(&mut self, code: u32) {
        self.emit_event(StageEvent::new(StageEvent::PHASE_CHANGED, code as f32, 0.0, 0.0));
    }

    /// Clear per-frame transient data. Outputs are left alone: every update
    /// rewrites them, and frames without a fixed step republish the last set.
    pub fn clear_frame_data(&mut self) {
        self.cues.clear();
        self.events.clear();
    }

    pub fn has_event(&self, kind: u32) -> bool {
        self.events.iter().any(|e| e.kind() == kind)
    }
}

impl Default for StageContext {
    fn default() -> Self {
        Self::new(42)
    }
}
