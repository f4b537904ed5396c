use keepsake_engine::{
    FixedTimestep, FrameData, InputEvent, InputQueue, ProtocolLayout, Stage, StageConfig, StageContext,
};

/// Generic stage runner that wires a day's stage to the shared buffer.
///
/// Each day's bundle creates a `thread_local!` StageRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct StageRunner<S: Stage> {
    stage: S,
    ctx: StageContext,
    input: InputQueue,
    /// Handed to every fixed step after the first in a frame.
    no_input: InputQueue,
    timestep: FixedTimestep,
    config: StageConfig,
    layout: ProtocolLayout,
    /// Header + outputs + cues + events, read by the host each frame.
    buffer: Vec<f32>,
    frame_counter: u32,
    initialized: bool,
}

impl<S: Stage> StageRunner<S> {
    pub fn new(stage: S, seed: u64) -> Self {
        let config = stage.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);
        let buffer = layout.allocate();

        Self {
            stage,
            ctx: StageContext::new(seed),
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            timestep,
            config,
            layout,
            buffer,
            frame_counter: 0,
            initialized: false,
        }
    }

    /// Enter the stage's first phase. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.stage.config();
        self.layout = ProtocolLayout::from_config(&self.config);
        self.buffer = self.layout.allocate();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.ctx.dt = self.timestep.dt();

        self.stage.init(&mut self.ctx);
        self.initialized = true;
        self.publish();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one display frame: fixed steps, then publish.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            self.ctx.dt = self.timestep.dt();
            // Input is consumed once, by the first step of the frame
            let input = if step == 0 { &self.input } else { &self.no_input };
            self.stage.update(&mut self.ctx, input);
        }

        // Frames without a step keep their input for the next one
        if steps > 0 {
            self.input.drain();
        }

        self.publish();
    }

    fn publish(&mut self) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        let frame = FrameData {
            frame_counter: self.frame_counter as f32,
            phase: self.stage.phase_code(),
            finished: self.stage.is_finished(),
            outputs: &self.ctx.outputs,
            cues: &self.ctx.cues,
            events: &self.ctx.events,
        };
        if self.layout.write_frame(&mut self.buffer, &frame) {
            log::warn!(
                "frame {} truncated: {} outputs, {} cues, {} events",
                self.frame_counter,
                self.ctx.outputs.len(),
                self.ctx.cues.len(),
                self.ctx.events.len()
            );
        }
        self.ctx.clear_frame_data();
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn phase(&self) -> u32 {
        self.stage.phase_code()
    }

    pub fn is_finished(&self) -> bool {
        self.stage.is_finished()
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_outputs(&self) -> u32 {
        self.layout.max_outputs as u32
    }

    pub fn max_cues(&self) -> u32 {
        self.layout.max_cues as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
