use serde::{Deserialize, Serialize};

use super::{GestureEvent, GestureTimer, MAX_PROGRESS};
use crate::core::schedule::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PourConfig {
    /// Seconds between increments while held.
    pub tick: f32,
    pub increment: f32,
    pub completion_delay: f32,
}

impl Default for PourConfig {
    fn default() -> Self {
        Self {
            tick: 0.03,
            increment: 1.0,
            completion_delay: 2.0,
        }
    }
}

impl PourConfig {
    /// Non-positive rates would never fill the pot; use the defaults instead.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;
        if !(config.tick.is_finite() && config.tick > 0.0) {
            log::warn!("pour: tick {} is not positive, using {}", config.tick, defaults.tick);
            config.tick = defaults.tick;
        }
        if !(config.increment.is_finite() && config.increment > 0.0) {
            log::warn!("pour: increment {} is not positive, using {}", config.increment, defaults.increment);
            config.increment = defaults.increment;
        }
        config
    }
}

/// Press-and-hold progress. Releasing pauses; nothing decays.
pub struct PourAccumulator {
    config: PourConfig,
    progress: f32,
    pouring: Option<TimerHandle>,
    completed: bool,
    timers: Scheduler<GestureTimer>,
    events: Vec<GestureEvent>,
}

impl PourAccumulator {
    pub fn new(config: PourConfig) -> Self {
        Self {
            config: config.sanitized(),
            progress: 0.0,
            pouring: None,
            completed: false,
            timers: Scheduler::new(),
            events: Vec::new(),
        }
    }

    /// Start pouring. No-op when already pouring or complete.
    pub fn press(&mut self) -> bool {
        if self.completed || self.pouring.is_some() {
            return false;
        }
        self.pouring = Some(self.timers.every(self.config.tick, GestureTimer::Tick));
        true
    }

    pub fn release(&mut self) -> bool {
        if self.completed || self.pouring.is_none() {
            return false;
        }
        self.timers.cancel_opt(&mut self.pouring);
        true
    }

    pub fn advance(&mut self, dt: f32) -> Vec<GestureEvent> {
        for tag in self.timers.advance(dt) {
            match tag {
                GestureTimer::Tick => self.tick(),
                GestureTimer::Finish => self.events.push(GestureEvent::Finished),
            }
        }
        std::mem::take(&mut self.events)
    }

    fn tick(&mut self) {
        if self.completed {
            return;
        }
        self.progress = (self.progress + self.config.increment).min(MAX_PROGRESS);
        if self.progress >= MAX_PROGRESS {
            self.completed = true;
            self.timers.cancel_opt(&mut self.pouring);
            log::info!("pour complete");
            self.events.push(GestureEvent::Completed);
            self.timers.after(self.config.completion_delay, GestureTimer::Finish);
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_pouring(&self) -> bool {
        self.pouring.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

impl Default for PourAccumulator {
    fn default() -> Self {
        Self::new(PourConfig::default())
    }
}
