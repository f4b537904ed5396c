// timeline/presets.rs
//
// Built-in scroll scenes. Track order is the output order the host reads.

use serde::{Deserialize, Serialize};

use super::autoscroll::AutoScrollConfig;
use super::keyframes::{ColorKeyframes, Keyframes};
use super::spring::SpringConfig;
use super::track::Timeline;
use crate::error::{KeepsakeError, Result};

type TrackDef = (&'static str, &'static [f32], &'static [f32]);

/// Window that fades in over 0.01, holds, and fades out over 0.01.
macro_rules! caption {
    ($name:literal, $a:literal, $b:literal, $c:literal, $d:literal) => {
        ($name, &[$a, $b, $c, $d], &[0.0, 1.0, 1.0, 0.0])
    };
}

const ROSE: &[TrackDef] = &[
    ("stem_height", &[0.0, 0.5], &[0.0, 100.0]),
    ("petal_scale", &[0.5, 0.8], &[0.0, 1.0]),
    ("petal_opacity", &[0.5, 0.8], &[0.0, 1.0]),
    ("text_opacity", &[0.8, 1.0], &[0.0, 1.0]),
    ("flower_grid_opacity", &[0.9, 1.0], &[0.0, 1.0]),
];

const KISS: &[TrackDef] = &[
    ("red_bg_opacity", &[0.0, 0.10, 0.15], &[1.0, 1.0, 0.0]),
    ("black_bg_opacity", &[0.10, 0.15, 0.48, 0.52], &[0.0, 1.0, 1.0, 0.0]),
    ("room_opacity", &[0.48, 0.52, 0.9], &[0.0, 1.0, 1.0]),
    ("room_scale", &[0.5, 1.0], &[1.0, 1.15]),
    ("room_y", &[0.5, 1.0], &[0.0, 5.0]),
    ("landing_opacity", &[0.0, 0.08], &[1.0, 0.0]),
    ("scroll_hint_opacity", &[0.0, 0.08], &[1.0, 0.0]),
    caption!("t1", 0.12, 0.13, 0.17, 0.18),
    caption!("t2", 0.19, 0.20, 0.24, 0.25),
    caption!("t3a", 0.26, 0.27, 0.31, 0.32),
    caption!("t3b", 0.33, 0.34, 0.38, 0.39),
    caption!("t3c", 0.40, 0.41, 0.45, 0.46),
    caption!("t4", 0.50, 0.51, 0.55, 0.56),
    caption!("t5", 0.57, 0.58, 0.62, 0.63),
    caption!("t6", 0.64, 0.65, 0.69, 0.70),
    caption!("t7a", 0.71, 0.72, 0.76, 0.77),
    caption!("t7b", 0.78, 0.79, 0.83, 0.84),
    caption!("t8a", 0.85, 0.86, 0.89, 0.90),
    caption!("t8b", 0.91, 0.92, 0.94, 0.95),
    caption!("t8c", 0.96, 0.97, 0.98, 0.99),
    ("polaroid_y", &[0.97, 1.0], &[20.0, 0.0]),
    ("polaroid_opacity", &[0.97, 1.0], &[0.0, 1.0]),
    ("final_opacity", &[0.98, 1.0], &[0.0, 1.0]),
];

const HUG: &[TrackDef] = &[
    ("boy_x", &[0.0, 0.15, 0.4, 0.6], &[-200.0, -80.0, -80.0, -20.0]),
    ("boy_y", &[0.0, 0.15, 0.25, 0.4, 0.6], &[0.0, 0.0, -5.0, 5.0, 0.0]),
    ("boy_bend", &[0.25, 0.4, 0.55], &[0.0, 8.0, 3.0]),
    ("boy_arm_x", &[0.5, 0.6], &[15.0, 35.0]),
    ("boy_arm_y", &[0.5, 0.6], &[55.0, 50.0]),
    ("boy_scale", &[0.0, 0.15, 0.6, 0.75], &[0.8, 1.0, 1.0, 1.02]),
    ("boy_head_bob", &[0.2, 0.3, 0.4], &[0.0, -2.0, 0.0]),
    ("boy_lean", &[0.6, 0.7], &[0.0, 2.0]),
    ("girl_x", &[0.0, 0.15, 0.4, 0.6], &[200.0, 80.0, 80.0, 20.0]),
    ("girl_y", &[0.1, 0.15, 0.5, 0.6], &[0.0, 0.0, 0.0, -3.0]),
    ("girl_arm_x", &[0.5, 0.6], &[45.0, 25.0]),
    ("girl_arm_y", &[0.5, 0.6], &[55.0, 50.0]),
    ("girl_scale", &[0.1, 0.15, 0.6, 0.75], &[0.8, 1.0, 1.0, 1.02]),
    ("girl_sway", &[0.15, 0.25, 0.35, 0.45], &[0.0, 2.0, -1.0, 0.0]),
    ("problems_opacity", &[0.25, 0.35, 0.6, 0.7], &[0.0, 1.0, 1.0, 0.1]),
    ("problems_blur", &[0.6, 0.75], &[0.0, 20.0]),
    ("problems_scale", &[0.6, 0.75], &[1.0, 1.5]),
    ("problems_rotate", &[0.3, 0.6], &[0.0, 15.0]),
    ("boy_label_opacity", &[0.0, 0.08, 0.18, 0.28], &[0.0, 1.0, 1.0, 0.0]),
    ("girl_label_opacity", &[0.1, 0.15, 0.22, 0.3], &[0.0, 1.0, 1.0, 0.0]),
    ("problems_text_opacity", &[0.35, 0.4, 0.55, 0.6], &[0.0, 1.0, 1.0, 0.0]),
    ("message_opacity", &[0.75, 0.85], &[0.0, 1.0]),
    ("camera_zoom", &[0.0, 0.3, 0.6, 1.0], &[1.0, 1.1, 1.0, 0.98]),
    ("vignette", &[0.0, 0.3, 0.6, 0.8], &[0.3, 0.6, 0.4, 0.2]),
    ("particles_opacity", &[0.58, 0.62, 0.75, 0.8], &[0.0, 1.0, 1.0, 0.0]),
];

const HUG_BACKGROUND: (&[f32], &[&str]) = (
    &[0.0, 0.3, 0.4, 0.6, 0.85, 1.0],
    &["#0a0a0a", "#12121c", "#1a1a2e", "#2d1b1b", "#1a1410", "#0f0c08"],
);

const PROMISE: &[TrackDef] = &[
    ("candle_opacity", &[0.7, 0.9], &[0.6, 0.2]),
    ("text_y", &[0.0, 1.0], &[0.0, -50.0]),
];

/// The scroll scenes that ship with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenePreset {
    Rose,
    Kiss,
    Hug,
    Promise,
}

impl ScenePreset {
    pub const ALL: [ScenePreset; 4] = [ScenePreset::Rose, ScenePreset::Kiss, ScenePreset::Hug, ScenePreset::Promise];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "rose" => Ok(ScenePreset::Rose),
            "kiss" => Ok(ScenePreset::Kiss),
            "hug" => Ok(ScenePreset::Hug),
            "promise" => Ok(ScenePreset::Promise),
            other => Err(KeepsakeError::UnknownPreset(other.to_string())),
        }
    }

    /// Smoother for the scene, if it has one.
    pub fn spring(self) -> Option<SpringConfig> {
        match self {
            ScenePreset::Kiss => Some(SpringConfig::new(40.0, 20.0).with_rest_delta(0.001)),
            ScenePreset::Hug => Some(SpringConfig::new(50.0, 20.0)),
            ScenePreset::Rose | ScenePreset::Promise => None,
        }
    }

    /// Only the kiss scene scrolls itself.
    pub fn auto_scroll(self) -> Option<AutoScrollConfig> {
        match self {
            ScenePreset::Kiss => Some(AutoScrollConfig::default()),
            _ => None,
        }
    }

    fn tracks(self) -> &'static [TrackDef] {
        match self {
            ScenePreset::Rose => ROSE,
            ScenePreset::Kiss => KISS,
            ScenePreset::Hug => HUG,
            ScenePreset::Promise => PROMISE,
        }
    }

    pub fn build(self) -> Result<Timeline> {
        self.build_with_spring(self.spring())
    }

    /// Preset tracks behind a different smoother (or none).
    pub fn build_with_spring(self, spring: Option<SpringConfig>) -> Result<Timeline> {
        let mut timeline = Timeline::new(spring);
        for (name, input, output) in self.tracks() {
            timeline.add(Keyframes::from_ranges(name, input, output)?);
        }
        if self == ScenePreset::Hug {
            let (input, colors) = HUG_BACKGROUND;
            timeline.add_color(ColorKeyframes::from_hex("background", input, colors)?);
        }
        Ok(timeline)
    }
}
