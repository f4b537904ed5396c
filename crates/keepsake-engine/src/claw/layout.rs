use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in machine space (origin at the machine's top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap; rectangles that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.pos.x < b_max.x && other.pos.x < a_max.x && self.pos.y < b_max.y && other.pos.y < a_max.y
    }
}

/// Claw machine tunables. Durations in seconds, distances in machine pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawConfig {
    /// Largest distance an axis covers in one tick.
    pub step: f32,
    /// Tick period while the player drives the gantry.
    pub move_period: f32,
    /// Tick period for the start-up calibration and falling toys.
    pub fast_period: f32,
    /// Pause between releasing the depth button and the arm dropping.
    pub lower_delay: f32,
    /// Pause at full extension before the claw closes.
    pub grab_hold: f32,
    /// How long the claw stays open after the drop.
    pub release_hold: f32,
    /// Display hold between the final collection and the win signal.
    pub win_hold: f32,
    /// Collections needed to win.
    pub target_collections: u32,
    /// Placement slots on the machine floor (4 per row).
    pub toy_slots: usize,
    /// Slot left empty so the floor does not look packed.
    pub reserved_slot: Option<usize>,
    /// Claw footprint size at full extension.
    pub footprint: [f32; 2],
    /// Offset of the footprint from the arm joint.
    pub footprint_offset: f32,
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            step: 10.0,
            move_period: 0.1,
            fast_period: 0.05,
            lower_delay: 0.5,
            grab_hold: 0.5,
            release_hold: 0.7,
            win_hold: 1.0,
            target_collections: 1,
            toy_slots: 12,
            reserved_slot: Some(8),
            footprint: [40.0, 32.0],
            footprint_offset: 7.0,
        }
    }
}

impl ClawConfig {
    /// Replace timings and distances that would stall or reverse the gantry
    /// with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut fell_back = Vec::new();
        let mut positive = |name: &'static str, value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fell_back.push(name);
                fallback
            }
        };

        let config = Self {
            step: positive("step", self.step, defaults.step),
            move_period: positive("move_period", self.move_period, defaults.move_period),
            fast_period: positive("fast_period", self.fast_period, defaults.fast_period),
            footprint: [
                positive("footprint.w", self.footprint[0], defaults.footprint[0]),
                positive("footprint.h", self.footprint[1], defaults.footprint[1]),
            ],
            target_collections: self.target_collections.max(1),
            ..self
        };

        if !fell_back.is_empty() {
            log::warn!("claw machine: using default tunables for {:?}", fell_back);
        }
        config
    }
}

/// Host measurements of the rendered machine. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineMeasurements {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub top_height: Option<f32>,
    pub bottom_top: Option<f32>,
    pub bottom_height: Option<f32>,
}

/// Resolved machine metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineLayout {
    pub width: f32,
    pub height: f32,
    /// Height of the glass section the gantry lives in.
    pub top_height: f32,
    /// Distance from the machine top to the floor section.
    pub bottom_top: f32,
    pub bottom_height: f32,
    /// Gap kept between the gantry and the machine walls.
    pub buffer: Vec2,
    /// Gap kept between toys and the floor corners.
    pub corner_buffer: f32,
    /// Arm joint footprint.
    pub joint_size: Vec2,
    /// Arm length when retracted.
    pub arm_rest_length: f32,
}

impl MachineLayout {
    pub const FALLBACK_WIDTH: f32 = 320.0;
    pub const FALLBACK_HEIGHT: f32 = 480.0;
    pub const FALLBACK_TOP_HEIGHT: f32 = 140.0;
    pub const FALLBACK_BOTTOM_TOP: f32 = 340.0;
    pub const FALLBACK_BOTTOM_HEIGHT: f32 = 140.0;

    /// Resolve measurements, substituting fallbacks for missing or non-positive values.
    pub fn from_measurements(m: &MachineMeasurements) -> Self {
        let mut fell_back = Vec::new();
        let mut pick = |name: &'static str, value: Option<f32>, fallback: f32| match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => {
                fell_back.push(name);
                fallback
            }
        };

        let width = pick("width", m.width, Self::FALLBACK_WIDTH);
        let height = pick("height", m.height, Self::FALLBACK_HEIGHT);
        let top_height = pick("top_height", m.top_height, Self::FALLBACK_TOP_HEIGHT);
        let bottom_top = pick("bottom_top", m.bottom_top, Self::FALLBACK_BOTTOM_TOP);
        let bottom_height = pick("bottom_height", m.bottom_height, Self::FALLBACK_BOTTOM_HEIGHT);

        if !fell_back.is_empty() {
            log::warn!("claw machine: using fallback metrics for {:?}", fell_back);
        }

        let mut layout = Self {
            width,
            height,
            top_height,
            bottom_top,
            bottom_height,
            ..Self::default()
        };

        // A floor above the glass would give a negative arm reach
        if layout.bottom_top <= layout.top_height || layout.bottom_top >= layout.height {
            log::warn!(
                "claw machine: inconsistent floor at {} (top {}, height {}), using fallback",
                layout.bottom_top, layout.top_height, layout.height
            );
            layout.bottom_top = (layout.height - layout.bottom_height).max(layout.top_height + 1.0);
        }
        layout
    }

    /// Deepest the arm can reach.
    pub fn max_arm_length(&self) -> f32 {
        (self.bottom_top - self.buffer.y).max(0.0)
    }

    /// Arm joint resting depth after calibration.
    pub fn home_depth(&self) -> f32 {
        self.top_height - self.buffer.y
    }

    /// Rail resting position after calibration.
    pub fn home_rail(&self) -> f32 {
        self.buffer.x
    }

    /// Far end of the rail.
    pub fn rail_limit(&self) -> f32 {
        (self.width - self.joint_size.x - self.buffer.x).max(self.home_rail())
    }

    /// Back wall limit for the depth axis.
    pub fn depth_limit(&self) -> f32 {
        self.buffer.y
    }

    /// Resting height of a dropped toy.
    pub fn floor_for(&self, toy_height: f32) -> f32 {
        self.height - toy_height - 30.0
    }
}

impl Default for MachineLayout {
    fn default() -> Self {
        Self {
            width: Self::FALLBACK_WIDTH,
            height: Self::FALLBACK_HEIGHT,
            top_height: Self::FALLBACK_TOP_HEIGHT,
            bottom_top: Self::FALLBACK_BOTTOM_TOP,
            bottom_height: Self::FALLBACK_BOTTOM_HEIGHT,
            buffer: Vec2::new(36.0, 16.0),
            corner_buffer: 16.0,
            joint_size: Vec2::new(10.0, 10.0),
            arm_rest_length: 24.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersection_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(20.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn missing_measurements_fall_back() {
        let layout = MachineLayout::from_measurements(&MachineMeasurements::default());
        assert_eq!(layout, MachineLayout::default());
        assert_eq!(layout.max_arm_length(), 324.0);
    }

    #[test]
    fn zero_and_nan_measurements_fall_back() {
        let m = MachineMeasurements {
            width: Some(0.0),
            height: Some(f32::NAN),
            ..Default::default()
        };
        let layout = MachineLayout::from_measurements(&m);
        assert_eq!(layout.width, MachineLayout::FALLBACK_WIDTH);
        assert_eq!(layout.height, MachineLayout::FALLBACK_HEIGHT);
    }

    #[test]
    fn inconsistent_floor_is_repaired() {
        let m = MachineMeasurements {
            top_height: Some(200.0),
            bottom_top: Some(100.0),
            ..Default::default()
        };
        let layout = MachineLayout::from_measurements(&m);
        assert!(layout.bottom_top > layout.top_height);
        assert!(layout.max_arm_length() > 0.0);
    }

    #[test]
    fn config_parses_partial_json() {
        let cfg: ClawConfig = serde_json::from_str(r#"{ "target_collections": 3 }"#).unwrap();
        assert_eq!(cfg.target_collections, 3);
        assert_eq!(cfg.step, 10.0);
    }

    #[test]
    fn non_positive_tunables_use_defaults() {
        let cfg: ClawConfig =
            serde_json::from_str(r#"{ "step": 0.0, "move_period": -1.0, "target_collections": 0 }"#).unwrap();
        let cfg = cfg.sanitized();
        let defaults = ClawConfig::default();
        assert_eq!(cfg.step, defaults.step);
        assert_eq!(cfg.move_period, defaults.move_period);
        assert_eq!(cfg.target_collections, 1);

        let odd = ClawConfig { step: 4.0, ..defaults.clone() };
        assert_eq!(odd.clone().sanitized(), odd);
    }

    #[test]
    fn rail_limit_stays_past_home_on_narrow_machines() {
        let layout = MachineLayout::from_measurements(&MachineMeasurements {
            width: Some(60.0),
            ..Default::default()
        });
        assert_eq!(layout.rail_limit(), layout.home_rail());
        assert!(MachineLayout::default().rail_limit() > MachineLayout::default().home_rail());
    }
}

