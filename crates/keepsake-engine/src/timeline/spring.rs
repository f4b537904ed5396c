use serde::{Deserialize, Serialize};

/// Spring constants. Mass is fixed at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    /// Distance from the target under which the spring snaps to rest.
    pub rest_delta: f32,
    /// Speed under which the spring may snap to rest.
    pub rest_speed: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness,
            damping,
            ..Self::default()
        }
    }

    pub fn with_rest_delta(mut self, rest_delta: f32) -> Self {
        self.rest_delta = rest_delta;
        self
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            rest_delta: 0.001,
            rest_speed: 0.01,
        }
    }
}

/// Largest integration step. Longer frames are split.
const MAX_SUBSTEP: f32 = 1.0 / 240.0;

/// Smooths a target value with a damped spring.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    suspended: bool,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            suspended: false,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to a value with no motion.
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Integrate `dt` seconds (semi-implicit Euler). Returns the new value.
    pub fn step(&mut self, dt: f32) -> f32 {
        if self.suspended || self.is_at_rest() || dt <= 0.0 {
            return self.value;
        }

        let substeps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            let force = -self.config.stiffness * (self.value - self.target) - self.config.damping * self.velocity;
            self.velocity += force * h;
            self.value += self.velocity * h;
        }

        if (self.value - self.target).abs() < self.config.rest_delta && self.velocity.abs() < self.config.rest_speed {
            self.value = self.target;
            self.velocity = 0.0;
        }
        self.value
    }

    pub fn is_at_rest(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Freeze integration, e.g. while the owning view is off-screen.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_on_target() {
        let mut s = Spring::new(SpringConfig::new(40.0, 20.0), 0.0);
        s.set_target(1.0);
        for _ in 0..600 {
            s.step(1.0 / 60.0);
        }
        assert_eq!(s.value(), 1.0);
        assert!(s.is_at_rest());
    }

    #[test]
    fn moves_towards_target_without_jumping() {
        let mut s = Spring::new(SpringConfig::new(50.0, 20.0), 0.0);
        s.set_target(1.0);
        let v = s.step(1.0 / 60.0);
        assert!(v > 0.0 && v < 0.1);
    }

    #[test]
    fn suspended_spring_holds_still() {
        let mut s = Spring::new(SpringConfig::default(), 0.0);
        s.set_target(1.0);
        s.suspend();
        assert_eq!(s.step(1.0), 0.0);
        s.resume();
        assert!(s.step(1.0 / 60.0) > 0.0);
    }

    #[test]
    fn long_frames_stay_stable() {
        let mut s = Spring::new(SpringConfig::new(40.0, 20.0), 0.0);
        s.set_target(1.0);
        for _ in 0..10 {
            let v = s.step(0.5);
            assert!(v.is_finite() && v < 1.5);
        }
    }
}
