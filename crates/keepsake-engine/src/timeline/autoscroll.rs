use serde::{Deserialize, Serialize};

/// Page measurements reported by the host, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub viewport: f32,
    pub content: f32,
}

/// How a region's progress maps to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionAnchor {
    /// 0 when the region top meets the viewport top, 1 when the bottoms meet.
    #[default]
    Contain,
    /// 0 when the region top enters at the bottom, 1 when its bottom leaves at the top.
    Cross,
}

/// A scroll-driven section of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub top: f32,
    pub height: f32,
    #[serde(default)]
    pub anchor: RegionAnchor,
}

impl ScrollRegion {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height, anchor: RegionAnchor::Contain }
    }

    pub fn crossing(top: f32, height: f32) -> Self {
        Self { top, height, anchor: RegionAnchor::Cross }
    }

    /// Progress in [0, 1] for a scroll offset and viewport height.
    pub fn progress(&self, offset: f32, viewport: f32) -> f32 {
        let (start, span) = match self.anchor {
            RegionAnchor::Contain => (self.top, self.height - viewport),
            RegionAnchor::Cross => (self.top - viewport, self.height + viewport),
        };
        if span <= 0.0 {
            return if offset >= start { 1.0 } else { 0.0 };
        }
        ((offset - start) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfig {
    /// Offset the user has to scroll past before the page takes over.
    pub threshold: f32,
    /// Pixels advanced per frame once engaged.
    pub step: f32,
    /// Stop this far before the end of the content.
    pub end_margin: f32,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            step: 1.8,
            end_margin: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoScrollState {
    /// User is in control.
    Waiting,
    Scrolling,
    /// Reached the end or was cancelled. Never re-engages.
    Done,
}

/// Slow cinematic scroll that takes over after the user starts scrolling.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    config: AutoScrollConfig,
    state: AutoScrollState,
}

impl AutoScroller {
    pub fn new(config: AutoScrollConfig) -> Self {
        Self { config, state: AutoScrollState::Waiting }
    }

    /// Offset to scroll to this frame, if the scroller is driving.
    pub fn update(&mut self, m: ScrollMetrics) -> Option<f32> {
        match self.state {
            AutoScrollState::Done => None,
            AutoScrollState::Waiting => {
                if m.offset > self.config.threshold {
                    log::debug!("auto-scroll engaged at {}", m.offset);
                    self.state = AutoScrollState::Scrolling;
                    self.scroll(m)
                } else {
                    None
                }
            }
            AutoScrollState::Scrolling => self.scroll(m),
        }
    }

    fn scroll(&mut self, m: ScrollMetrics) -> Option<f32> {
        if m.offset + m.viewport >= m.content - self.config.end_margin {
            log::debug!("auto-scroll finished at {}", m.offset);
            self.state = AutoScrollState::Done;
            return None;
        }
        Some(m.offset + self.config.step)
    }

    pub fn cancel(&mut self) {
        self.state = AutoScrollState::Done;
    }

    pub fn state(&self) -> AutoScrollState {
        self.state
    }
}

impl Default for AutoScroller {
    fn default() -> Self {
        Self::new(AutoScrollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: f32) -> ScrollMetrics {
        ScrollMetrics { offset, viewport: 800.0, content: 5000.0 }
    }

    #[test]
    fn never_overrides_before_threshold() {
        let mut s = AutoScroller::default();
        for offset in [0.0, 50.0, 100.0, 20.0] {
            assert_eq!(s.update(at(offset)), None);
        }
        assert_eq!(s.state(), AutoScrollState::Waiting);
    }

    #[test]
    fn advances_by_fixed_step_once_engaged() {
        let mut s = AutoScroller::default();
        let next = s.update(at(101.0)).unwrap();
        assert!((next - 102.8).abs() < 0.001);
        let next = s.update(at(next)).unwrap();
        assert!((next - 104.6).abs() < 0.001);
    }

    #[test]
    fn stops_near_the_end() {
        let mut s = AutoScroller::default();
        s.update(at(200.0));
        assert_eq!(s.update(at(4100.0)), None);
        assert_eq!(s.state(), AutoScrollState::Done);
        assert_eq!(s.update(at(200.0)), None);
    }

    #[test]
    fn cancel_is_final() {
        let mut s = AutoScroller::default();
        s.cancel();
        assert_eq!(s.update(at(500.0)), None);
    }

    #[test]
    fn contain_region_progress() {
        let r = ScrollRegion::new(0.0, 4800.0);
        assert_eq!(r.progress(0.0, 800.0), 0.0);
        assert!((r.progress(2000.0, 800.0) - 0.5).abs() < 0.001);
        assert_eq!(r.progress(9000.0, 800.0), 1.0);
    }

    #[test]
    fn crossing_region_progress() {
        let r = ScrollRegion::crossing(1000.0, 400.0);
        assert_eq!(r.progress(200.0, 800.0), 0.0);
        assert!((r.progress(800.0, 800.0) - 0.5).abs() < 0.001);
        assert_eq!(r.progress(1400.0, 800.0), 1.0);
    }

    #[test]
    fn short_region_is_a_step() {
        let r = ScrollRegion::new(100.0, 500.0);
        assert_eq!(r.progress(50.0, 800.0), 0.0);
        assert_eq!(r.progress(100.0, 800.0), 1.0);
    }
}
