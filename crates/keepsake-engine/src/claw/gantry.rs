use super::toys::ToyId;

/// The three moving parts of the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal rail position.
    Rail,
    /// Arm joint depth (towards the back wall).
    Depth,
    /// Arm extension below the joint.
    Arm,
}

/// Gantry cycle phases. Strictly sequential; only `Idle` accepts a new cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GantryPhase {
    /// Start-up move of the joint and rail to their home positions.
    Calibrating,
    /// Waiting for the horizontal button.
    Idle,
    /// Rail sliding while the horizontal button is held.
    MovingHorizontal,
    /// Rail stopped, waiting for the depth button.
    Aligned,
    /// Joint moving towards the back while the depth button is held.
    MovingDepth,
    /// Arm extending to full length.
    Lowering,
    /// Pause at full extension; the grab test runs at the end of it.
    Grabbing,
    /// Arm retracting, carrying the toy if one was caught.
    Raising,
    /// Rail and joint travelling back to the drop zone.
    Returning,
    /// Claw open over the drop zone.
    Releasing,
}

impl GantryPhase {
    pub fn code(self) -> u32 {
        match self {
            GantryPhase::Calibrating => 0,
            GantryPhase::Idle => 1,
            GantryPhase::MovingHorizontal => 2,
            GantryPhase::Aligned => 3,
            GantryPhase::MovingDepth => 4,
            GantryPhase::Lowering => 5,
            GantryPhase::Grabbing => 6,
            GantryPhase::Raising => 7,
            GantryPhase::Returning => 8,
            GantryPhase::Releasing => 9,
        }
    }
}

/// Result of a single motion tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The axis moved by this signed amount.
    Moved(f32),
    /// The axis already sits on the target.
    Arrived,
}

/// Move `current` towards `target` by at most `max_step`.
pub fn step_toward(current: f32, target: f32, max_step: f32) -> Step {
    let gap = (current - target).abs();
    if gap <= f32::EPSILON {
        return Step::Arrived;
    }
    let distance = gap.min(max_step);
    Step::Moved(if current > target { -distance } else { distance })
}

/// Axis positions of the gantry plus the toy it is holding.
#[derive(Debug, Clone, PartialEq)]
pub struct Gantry {
    pub rail_x: f32,
    pub depth_y: f32,
    pub arm_length: f32,
    pub max_arm_length: f32,
    /// Home positions, fixed after calibration.
    pub home_rail: f32,
    pub home_depth: f32,
    pub rest_arm: f32,
    /// Held toy, by id into the session's ToyBox.
    pub held: Option<ToyId>,
}

impl Gantry {
    pub fn new(rest_arm: f32, max_arm_length: f32) -> Self {
        let rest_arm = rest_arm.clamp(0.0, max_arm_length);
        Self {
            rail_x: 0.0,
            depth_y: 0.0,
            arm_length: rest_arm,
            max_arm_length,
            home_rail: 0.0,
            home_depth: 0.0,
            rest_arm,
            held: None,
        }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Rail => self.rail_x,
            Axis::Depth => self.depth_y,
            Axis::Arm => self.arm_length,
        }
    }

    /// Apply one tick towards `target`. The arm is clamped to [0, max_arm_length].
    pub fn step(&mut self, axis: Axis, target: f32, max_step: f32) -> Step {
        let target = match axis {
            Axis::Arm => target.clamp(0.0, self.max_arm_length),
            _ => target,
        };
        let step = step_toward(self.get(axis), target, max_step);
        if let Step::Moved(delta) = step {
            match axis {
                Axis::Rail => self.rail_x += delta,
                Axis::Depth => self.depth_y += delta,
                Axis::Arm => self.arm_length = (self.arm_length + delta).clamp(0.0, self.max_arm_length),
            }
        }
        step
    }
}
