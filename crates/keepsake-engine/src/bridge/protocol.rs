/// Shared buffer layout.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 12 floats]
/// [Outputs: max_outputs × 1 float]
/// [Cues: max_cues × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// The host reads them from the header to compute offsets dynamically.

use crate::api::stage::StageConfig;
use crate::api::types::{CueEvent, StageEvent};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PROTOCOL_VERSION: usize = 2;
pub const HEADER_PHASE: usize = 3;
pub const HEADER_FINISHED: usize = 4;
pub const HEADER_MAX_OUTPUTS: usize = 5;
pub const HEADER_OUTPUT_COUNT: usize = 6;
pub const HEADER_MAX_CUES: usize = 7;
pub const HEADER_CUE_COUNT: usize = 8;
pub const HEADER_MAX_EVENTS: usize = 9;
pub const HEADER_EVENT_COUNT: usize = 10;
/// Set when any section overflowed this frame.
pub const HEADER_TRUNCATED: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per stage event: kind, a, b, c (wire format, never changes).
pub const EVENT_FLOATS: usize = StageEvent::FLOATS;

/// Everything one frame publishes to the host.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    pub frame_counter: f32,
    pub phase: u32,
    pub finished: bool,
    pub outputs: &'a [f32],
    pub cues: &'a [CueEvent],
    pub events: &'a [StageEvent],
}

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_outputs: usize,
    pub max_cues: usize,
    pub max_events: usize,

    pub output_data_offset: usize,
    pub cue_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_outputs: usize, max_cues: usize, max_events: usize) -> Self {
        let output_data_offset = HEADER_FLOATS;
        let cue_data_offset = output_data_offset + max_outputs;
        let event_data_offset = cue_data_offset + max_cues;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            max_outputs,
            max_cues,
            max_events,
            output_data_offset,
            cue_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &StageConfig) -> Self {
        Self::new(config.max_outputs, config.max_cues, config.max_events)
    }

    /// Fresh buffer with the header capacities filled in.
    pub fn allocate(&self) -> Vec<f32> {
        let mut buffer = vec![0.0; self.buffer_total_floats];
        buffer[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        buffer[HEADER_MAX_OUTPUTS] = self.max_outputs as f32;
        buffer[HEADER_MAX_CUES] = self.max_cues as f32;
        buffer[HEADER_MAX_EVENTS] = self.max_events as f32;
        buffer
    }

    /// Write one frame under the lock word. Sections longer than their
    /// capacity are cut off and flagged in the header.
    /// Returns true if anything was truncated.
    pub fn write_frame(&self, buf: &mut [f32], frame: &FrameData) -> bool {
        if buf.len() < self.buffer_total_floats {
            log::warn!(
                "protocol buffer too small ({} < {} floats), frame dropped",
                buf.len(),
                self.buffer_total_floats
            );
            return true;
        }
        buf[HEADER_LOCK] = 1.0;

        let outputs = &frame.outputs[..frame.outputs.len().min(self.max_outputs)];
        buf[self.output_data_offset..self.output_data_offset + outputs.len()].copy_from_slice(outputs);

        let cues = &frame.cues[..frame.cues.len().min(self.max_cues)];
        for (slot, cue) in buf[self.cue_data_offset..].iter_mut().zip(cues) {
            *slot = cue.0 as f32;
        }

        let events = &frame.events[..frame.events.len().min(self.max_events)];
        let event_floats: &[f32] = bytemuck::cast_slice(events);
        buf[self.event_data_offset..self.event_data_offset + event_floats.len()].copy_from_slice(event_floats);

        let truncated = outputs.len() < frame.outputs.len()
            || cues.len() < frame.cues.len()
            || events.len() < frame.events.len();

        buf[HEADER_FRAME_COUNTER] = frame.frame_counter;
        buf[HEADER_PHASE] = frame.phase as f32;
        buf[HEADER_FINISHED] = if frame.finished { 1.0 } else { 0.0 };
        buf[HEADER_OUTPUT_COUNT] = outputs.len() as f32;
        buf[HEADER_CUE_COUNT] = cues.len() as f32;
        buf[HEADER_EVENT_COUNT] = events.len() as f32;
        buf[HEADER_TRUNCATED] = if truncated { 1.0 } else { 0.0 };
        buf[HEADER_LOCK] = 0.0;
        truncated
    }
}
