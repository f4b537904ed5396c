// stages/scroll.rs
//
// Scroll-driven scene: page scroll feeds a timeline, optionally the page
// scrolls itself, and individual lines fade as they cross the viewport.
//
// Usage:
//   let mut day = ScrollDay::from_preset(ScenePreset::Kiss)?;
//   day.init(&mut ctx);
//   day.update(&mut ctx, &input);   // InputEvent::Scroll drives progress
//
// Outputs per frame:
//   [phase, raw_progress, smoothed_progress, tracks..., per line: opacity, blur, scale]

use crate::api::stage::{Stage, StageConfig, StageContext};
use crate::api::types::StageEvent;
use crate::error::Result;
use crate::input::queue::{InputEvent, InputQueue};
use crate::timeline::{AutoScrollConfig, AutoScroller, Keyframes, ScenePreset, ScrollMetrics, ScrollRegion, Timeline};

/// Smoothed progress at or above this counts as the end of the scene.
const END_PROGRESS: f32 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Scrolling,
    Finished,
}

impl ScrollPhase {
    pub fn code(self) -> u32 {
        match self {
            ScrollPhase::Scrolling => 0,
            ScrollPhase::Finished => 1,
        }
    }
}

/// Fade-in, hold, fade-out of a single line as it crosses the viewport.
struct LineFade {
    opacity: Keyframes,
    blur: Keyframes,
    scale: Keyframes,
}

impl LineFade {
    const FLOATS: usize = 3;

    fn new() -> Result<Self> {
        let input = [0.0, 0.4, 0.6, 1.0];
        Ok(Self {
            opacity: Keyframes::from_ranges("opacity", &input, &[0.3, 1.0, 1.0, 0.3])?,
            blur: Keyframes::from_ranges("blur", &input, &[10.0, 0.0, 0.0, 10.0])?,
            scale: Keyframes::from_ranges("scale", &input, &[0.95, 1.0, 1.0, 0.95])?,
        })
    }

    fn write_to(&self, p: f32, out: &mut Vec<f32>) {
        out.push(self.opacity.sample(p));
        out.push(self.blur.sample(p));
        out.push(self.scale.sample(p));
    }
}

pub struct ScrollDay {
    phase: ScrollPhase,
    timeline: Timeline,
    /// Section driving the timeline. None means the whole page.
    region: Option<ScrollRegion>,
    auto: Option<AutoScroller>,
    metrics: Option<ScrollMetrics>,
    lines: Vec<ScrollRegion>,
    fade: LineFade,
    visible: bool,
}

impl ScrollDay {
    pub fn new(timeline: Timeline) -> Result<Self> {
        Ok(Self {
            phase: ScrollPhase::Scrolling,
            timeline,
            region: None,
            auto: None,
            metrics: None,
            lines: Vec::new(),
            fade: LineFade::new()?,
            visible: true,
        })
    }

    /// One of the built-in scenes with its smoother and auto-scroll.
    pub fn from_preset(preset: ScenePreset) -> Result<Self> {
        let mut day = Self::new(preset.build()?)?;
        if let Some(config) = preset.auto_scroll() {
            day = day.with_auto_scroll(config);
        }
        Ok(day)
    }

    pub fn with_region(mut self, region: ScrollRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_auto_scroll(mut self, config: AutoScrollConfig) -> Self {
        self.auto = Some(AutoScroller::new(config));
        self
    }

    /// Lines that fade individually while crossing the viewport.
    pub fn with_lines(mut self, lines: Vec<ScrollRegion>) -> Self {
        self.lines = lines
            .into_iter()
            .map(|l| ScrollRegion::crossing(l.top, l.height))
            .collect();
        self
    }

    /// Hidden pages stop smoothing; progress still tracks the raw input.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.timeline.resume();
        } else {
            self.timeline.suspend();
        }
    }

    /// Stop the page from driving itself, e.g. when the user grabs the scrollbar.
    pub fn cancel_auto_scroll(&mut self) {
        if let Some(auto) = &mut self.auto {
            auto.cancel();
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn auto_scroller(&self) -> Option<&AutoScroller> {
        self.auto.as_ref()
    }

    /// Floats written per frame.
    pub fn output_width(&self) -> usize {
        2 + self.timeline.output_width() + self.lines.len() * LineFade::FLOATS
    }

    fn enter(&mut self, phase: ScrollPhase, ctx: &mut StageContext) {
        self.phase = phase;
        log::info!("scroll day: entering {:?}", phase);
        ctx.emit_phase(phase.code());
        if phase == ScrollPhase::Finished {
            ctx.emit_event(StageEvent::signal(StageEvent::STAGE_FINISHED));
        }
    }

    fn region_for(&self, m: &ScrollMetrics) -> ScrollRegion {
        self.region.unwrap_or(ScrollRegion::new(0.0, m.content))
    }

    fn write_outputs(&self, out: &mut Vec<f32>) {
        out.clear();
        out.push(self.phase.code() as f32);
        out.push(self.timeline.raw_progress());
        self.timeline.current().write_to(out);
        for line in &self.lines {
            let p = match &self.metrics {
                Some(m) => line.progress(m.offset, m.viewport),
                None => 0.0,
            };
            self.fade.write_to(p, out);
        }
    }
}

impl Stage for ScrollDay {
    fn config(&self) -> StageConfig {
        let defaults = StageConfig::default();
        StageConfig {
            max_outputs: defaults.max_outputs.max(self.output_width()),
            ..defaults
        }
    }

    fn init(&mut self, ctx: &mut StageContext) {
        self.enter(ScrollPhase::Scrolling, ctx);
    }

    fn update(&mut self, ctx: &mut StageContext, input: &InputQueue) {
        for event in input.iter() {
            if let InputEvent::Scroll { offset, viewport, content } = *event {
                self.metrics = Some(ScrollMetrics { offset, viewport, content });
            }
        }

        if let Some(mut m) = self.metrics {
            if let Some(target) = self.auto.as_mut().and_then(|auto| auto.update(m)) {
                ctx.emit_event(StageEvent::new(StageEvent::SCROLL_TO, target, 0.0, 0.0));
                // Assume the host applies it; the next Scroll event corrects us if not
                m.offset = target;
                self.metrics = Some(m);
            }
            let region = self.region_for(&m);
            self.timeline.set_progress(region.progress(m.offset, m.viewport));
        }

        let progress = self.timeline.frame(ctx.dt).progress;
        if self.phase == ScrollPhase::Scrolling && progress >= END_PROGRESS {
            self.enter(ScrollPhase::Finished, ctx);
        }

        self.write_outputs(&mut ctx.outputs);
    }

    fn phase_code(&self) -> u32 {
        self.phase.code()
    }

    fn is_finished(&self) -> bool {
        self.phase == ScrollPhase::Finished
    }
}
