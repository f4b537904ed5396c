// timeline/track.rs
//
// Named keyframe tracks driven by one smoothed progress value.
//
// Usage:
//   let mut tl = Timeline::new(Some(SpringConfig::new(40.0, 20.0)));
//   tl.add(Keyframes::from_ranges("fade", &[0.0, 0.1], &[1.0, 0.0])?);
//   tl.set_progress(region.progress(offset, viewport));
//   let frame = tl.frame(dt);
//   let fade = frame.value(0);

use glam::Vec4;

use super::keyframes::{ColorKeyframes, Keyframes};
use super::spring::{Spring, SpringConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum Track {
    Scalar(Keyframes),
    Color(ColorKeyframes),
}

impl Track {
    pub fn name(&self) -> &str {
        match self {
            Track::Scalar(k) => &k.name,
            Track::Color(k) => &k.name,
        }
    }

    /// Floats this track occupies in the flat output.
    pub fn width(&self) -> usize {
        match self {
            Track::Scalar(_) => 1,
            Track::Color(_) => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Scalar(f32),
    Color(Vec4),
}

/// Every track evaluated against the same progress value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineFrame {
    /// Smoothed progress all values were sampled at.
    pub progress: f32,
    pub values: Vec<TrackValue>,
}

impl TimelineFrame {
    /// Scalar value by track index. Colour tracks read as their alpha.
    pub fn value(&self, index: usize) -> Option<f32> {
        self.values.get(index).map(|v| match v {
            TrackValue::Scalar(s) => *s,
            TrackValue::Color(c) => c.w,
        })
    }

    pub fn color(&self, index: usize) -> Option<Vec4> {
        match self.values.get(index) {
            Some(TrackValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    /// Append the frame as flat floats: progress first, then each track.
    pub fn write_to(&self, out: &mut Vec<f32>) {
        out.push(self.progress);
        for v in &self.values {
            match v {
                TrackValue::Scalar(s) => out.push(*s),
                TrackValue::Color(c) => out.extend_from_slice(&c.to_array()),
            }
        }
    }
}

pub struct Timeline {
    tracks: Vec<Track>,
    /// None means raw progress is used unsmoothed.
    spring: Option<Spring>,
    raw: f32,
    frame: TimelineFrame,
}

impl Timeline {
    pub fn new(spring: Option<SpringConfig>) -> Self {
        Self {
            tracks: Vec::new(),
            spring: spring.map(|c| Spring::new(c, 0.0)),
            raw: 0.0,
            frame: TimelineFrame::default(),
        }
    }

    pub fn add(&mut self, track: Keyframes) -> usize {
        self.tracks.push(Track::Scalar(track));
        self.tracks.len() - 1
    }

    pub fn add_color(&mut self, track: ColorKeyframes) -> usize {
        self.tracks.push(Track::Color(track));
        self.tracks.len() - 1
    }

    /// Builder form of `add`.
    pub fn with(mut self, track: Keyframes) -> Self {
        self.add(track);
        self
    }

    pub fn with_color(mut self, track: ColorKeyframes) -> Self {
        self.add_color(track);
        self
    }

    /// Feed the latest raw scroll progress. Clamped to [0, 1].
    pub fn set_progress(&mut self, raw: f32) {
        let raw = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
        self.raw = raw;
        if let Some(spring) = &mut self.spring {
            spring.set_target(raw);
        }
    }

    /// Advance the smoother once and sample every track at the result.
    pub fn frame(&mut self, dt: f32) -> &TimelineFrame {
        let progress = match &mut self.spring {
            Some(spring) => spring.step(dt),
            None => self.raw,
        };
        self.frame.progress = progress;
        self.frame.values.clear();
        for track in &self.tracks {
            self.frame.values.push(match track {
                Track::Scalar(k) => TrackValue::Scalar(k.sample(progress)),
                Track::Color(k) => TrackValue::Color(k.sample(progress)),
            });
        }
        &self.frame
    }

    /// Last evaluated frame.
    pub fn current(&self) -> &TimelineFrame {
        &self.frame
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.name() == name)
    }

    /// Last evaluated scalar value of a named track.
    pub fn value(&self, name: &str) -> Option<f32> {
        self.index_of(name).and_then(|i| self.frame.value(i))
    }

    pub fn color(&self, name: &str) -> Option<Vec4> {
        self.index_of(name).and_then(|i| self.frame.color(i))
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Total floats written by `TimelineFrame::write_to`.
    pub fn output_width(&self) -> usize {
        1 + self.tracks.iter().map(Track::width).sum::<usize>()
    }

    pub fn raw_progress(&self) -> f32 {
        self.raw
    }

    pub fn progress(&self) -> f32 {
        self.frame.progress
    }

    /// Smoothed progress has caught up with the raw input.
    pub fn is_settled(&self) -> bool {
        self.spring.as_ref().map(Spring::is_at_rest).unwrap_or(true)
    }

    pub fn suspend(&mut self) {
        if let Some(spring) = &mut self.spring {
            spring.suspend();
        }
    }

    pub fn resume(&mut self) {
        if let Some(spring) = &mut self.spring {
            spring.resume();
        }
    }
}
