use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{GestureEvent, GestureTimer, MAX_PROGRESS};
use crate::core::schedule::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StirConfig {
    /// Angle changes at or below this are jitter (radians).
    pub noise: f32,
    /// Angle changes above this are too fast to count (radians).
    pub fast: f32,
    /// Progress gained per radian of counted stirring.
    pub gain: f32,
    /// Seconds between completion and `Finished`.
    pub completion_delay: f32,
    /// Progress offset between consecutive cubes starting to melt.
    pub melt_stagger: f32,
    /// How much faster a cube melts than overall progress.
    pub melt_rate: f32,
    pub cubes: usize,
}

impl Default for StirConfig {
    fn default() -> Self {
        Self {
            noise: 0.05,
            fast: 0.5,
            gain: 2.0,
            completion_delay: 2.0,
            melt_stagger: 5.0,
            melt_rate: 1.2,
            cubes: 5,
        }
    }
}

impl StirConfig {
    /// Replace thresholds and gains under which no stir could ever count.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;
        if !(config.gain.is_finite() && config.gain > 0.0) {
            log::warn!("stir: gain {} is not positive, using {}", config.gain, defaults.gain);
            config.gain = defaults.gain;
        }
        let window_ok = config.noise.is_finite() && config.fast.is_finite() && config.noise >= 0.0;
        if !window_ok || config.noise >= config.fast {
            log::warn!(
                "stir: empty counting window ({}..{}), using {}..{}",
                config.noise, config.fast, defaults.noise, defaults.fast
            );
            config.noise = defaults.noise;
            config.fast = defaults.fast;
        }
        config
    }
}

/// What a single pointer sample did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StirOutcome {
    /// First sample, jitter, or input after completion.
    Ignored,
    TooFast,
    Counted(f32),
}

/// Wrap an angle difference into (-PI, PI].
fn wrap_delta(mut delta: f32) -> f32 {
    if delta > PI {
        delta -= 2.0 * PI;
    }
    if delta <= -PI {
        delta += 2.0 * PI;
    }
    delta
}

/// Progress from circular pointer motion around a center.
pub struct StirAccumulator {
    config: StirConfig,
    center: Vec2,
    last_angle: Option<f32>,
    progress: f32,
    warning: bool,
    completed: bool,
    timers: Scheduler<GestureTimer>,
    events: Vec<GestureEvent>,
}

impl StirAccumulator {
    pub fn new(config: StirConfig, center: Vec2) -> Self {
        Self {
            config: config.sanitized(),
            center,
            last_angle: None,
            progress: 0.0,
            warning: false,
            completed: false,
            timers: Scheduler::new(),
            events: Vec::new(),
        }
    }

    /// Move the pivot, e.g. after the host re-measured the pot.
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn on_pointer_move(&mut self, pos: Vec2) -> StirOutcome {
        if self.completed {
            return StirOutcome::Ignored;
        }
        let offset = pos - self.center;
        let angle = offset.y.atan2(offset.x);
        let previous = self.last_angle.replace(angle);
        let Some(previous) = previous else {
            return StirOutcome::Ignored;
        };

        let delta = wrap_delta(angle - previous).abs();
        if delta <= self.config.noise {
            return StirOutcome::Ignored;
        }
        if delta > self.config.fast {
            if !self.warning {
                self.warning = true;
                self.events.push(GestureEvent::TooFast);
            }
            return StirOutcome::TooFast;
        }

        if self.warning {
            self.warning = false;
            self.events.push(GestureEvent::WarningCleared);
        }
        let gained = (delta * self.config.gain).min(MAX_PROGRESS - self.progress);
        self.progress += gained;
        if self.progress >= MAX_PROGRESS {
            self.complete();
        }
        StirOutcome::Counted(gained)
    }

    fn complete(&mut self) {
        self.progress = MAX_PROGRESS;
        self.completed = true;
        log::info!("stir complete");
        self.events.push(GestureEvent::Completed);
        self.timers.after(self.config.completion_delay, GestureTimer::Finish);
    }

    pub fn advance(&mut self, dt: f32) -> Vec<GestureEvent> {
        for tag in self.timers.advance(dt) {
            if tag == GestureTimer::Finish {
                self.events.push(GestureEvent::Finished);
            }
        }
        std::mem::take(&mut self.events)
    }

    /// Melt amount in [0, 1] for one cube. Later cubes start later and melt faster.
    pub fn melt_factor(&self, cube: usize) -> f32 {
        let adjusted = (self.progress - cube as f32 * self.config.melt_stagger) * self.config.melt_rate;
        adjusted.clamp(0.0, MAX_PROGRESS) / MAX_PROGRESS
    }

    pub fn melt_factors(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.config.cubes).map(|i| self.melt_factor(i))
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn warning(&self) -> bool {
        self.warning
    }

    pub fn config(&self) -> &StirConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_circle(angle: f32) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin()) * 100.0
    }

    fn stir() -> StirAccumulator {
        StirAccumulator::new(StirConfig::default(), Vec2::ZERO)
    }

    #[test]
    fn counted_stir_adds_twice_the_angle() {
        let mut s = stir();
        assert_eq!(s.on_pointer_move(on_circle(0.0)), StirOutcome::Ignored);
        assert!(matches!(s.on_pointer_move(on_circle(0.3)), StirOutcome::Counted(_)));
        assert!((s.progress() - 0.6).abs() < 0.001);
    }

    #[test]
    fn fast_delta_warns_without_progress() {
        let mut s = stir();
        s.on_pointer_move(on_circle(0.0));
        assert_eq!(s.on_pointer_move(on_circle(0.8)), StirOutcome::TooFast);
        assert_eq!(s.progress(), 0.0);
        assert!(s.warning());
        assert_eq!(s.advance(0.0), vec![GestureEvent::TooFast]);

        s.on_pointer_move(on_circle(1.0));
        assert!(!s.warning());
        assert_eq!(s.advance(0.0), vec![GestureEvent::WarningCleared]);
    }

    #[test]
    fn jitter_is_ignored() {
        let mut s = stir();
        s.on_pointer_move(on_circle(0.0));
        assert_eq!(s.on_pointer_move(on_circle(0.04)), StirOutcome::Ignored);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn wraparound_counts_short_way() {
        let mut s = stir();
        s.on_pointer_move(on_circle(PI - 0.1));
        assert!(matches!(s.on_pointer_move(on_circle(-PI + 0.1)), StirOutcome::Counted(_)));
        assert!((s.progress() - 0.4).abs() < 0.01);
    }

    #[test]
    fn progress_stays_bounded_and_monotone() {
        let mut s = stir();
        let mut angle = 0.0f32;
        let mut last = 0.0;
        // Alternating slow, jittery and fast samples
        for i in 0..2000 {
            angle += match i % 3 {
                0 => 0.3,
                1 => 0.01,
                _ => 0.9,
            };
            s.on_pointer_move(on_circle(angle));
            assert!(s.progress() >= last && s.progress() <= 100.0);
            last = s.progress();
        }
        assert!(s.is_complete());
    }

    #[test]
    fn finished_after_delay_once() {
        let mut s = stir();
        let mut angle = 0.0f32;
        while !s.is_complete() {
            angle += 0.4;
            s.on_pointer_move(on_circle(angle));
        }
        assert!(s.advance(0.0).contains(&GestureEvent::Completed));
        assert!(s.advance(1.9).is_empty());
        assert_eq!(s.advance(0.2), vec![GestureEvent::Finished]);
        assert!(s.advance(5.0).is_empty());
        assert_eq!(s.on_pointer_move(on_circle(angle + 0.3)), StirOutcome::Ignored);
    }

    #[test]
    fn cubes_melt_in_order() {
        let mut s = stir();
        s.progress = 50.0;
        let melts: Vec<f32> = s.melt_factors().collect();
        assert_eq!(melts.len(), 5);
        assert!((melts[0] - 0.6).abs() < 0.001);
        assert!(melts.windows(2).all(|w| w[0] >= w[1]));
        s.progress = 100.0;
        assert!((s.melt_factor(4) - 0.96).abs() < 0.001);
    }

    #[test]
    fn unusable_config_falls_back() {
        let config = StirConfig { gain: -2.0, noise: 0.6, fast: 0.5, ..StirConfig::default() };
        let mut s = StirAccumulator::new(config, Vec2::ZERO);
        assert_eq!(*s.config(), StirConfig::default());

        s.on_pointer_move(on_circle(0.0));
        assert!(matches!(s.on_pointer_move(on_circle(0.2)), StirOutcome::Counted(g) if g > 0.0));
    }
}
