use serde::{Deserialize, Serialize};

use crate::claw::{ClawConfig, MachineMeasurements};
use crate::error::{KeepsakeError, Result};
use crate::gesture::{PourConfig, StirConfig};
use crate::stages::{ChocolateDay, DecoratingConfig, ScrollDay, TeddyDay};
use crate::timeline::{AutoScrollConfig, ColorKeyframes, Keyframes, ScenePreset, ScrollRegion, SpringConfig, Timeline};

/// Tunables and timelines for every day, loaded from JSON at startup.
/// Every section is optional; missing sections use the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneManifest {
    pub claw: ClawConfig,
    /// Measured machine box. Missing or bad values fall back per field.
    pub machine: MachineMeasurements,
    pub stir: StirConfig,
    pub pour: PourConfig,
    pub decorating: DecoratingConfig,
    pub timelines: Vec<TimelineDef>,
}

/// A scroll timeline: a preset, hand-written tracks, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineDef {
    pub name: String,
    /// Start from a built-in scene's tracks.
    #[serde(default)]
    pub preset: Option<ScenePreset>,
    /// Overrides the preset's smoother.
    #[serde(default)]
    pub spring: Option<SpringConfig>,
    #[serde(default)]
    pub tracks: Vec<Keyframes>,
    #[serde(default)]
    pub colors: Vec<ColorTrackDef>,
    /// Overrides the preset's auto-scroll.
    #[serde(default)]
    pub auto_scroll: Option<AutoScrollConfig>,
    /// Section driving progress. Defaults to the whole page.
    #[serde(default)]
    pub region: Option<ScrollRegion>,
    /// Lines that fade while crossing the viewport.
    #[serde(default)]
    pub lines: Vec<ScrollRegion>,
}

/// Colour track as parallel positions and hex literals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorTrackDef {
    pub name: String,
    pub input: Vec<f32>,
    pub colors: Vec<String>,
}

impl TimelineDef {
    /// Build and validate every track.
    pub fn build(&self) -> Result<Timeline> {
        let spring = self.spring.or_else(|| self.preset.and_then(ScenePreset::spring));
        let mut timeline = match self.preset {
            Some(preset) => preset.build_with_spring(spring)?,
            None => Timeline::new(spring),
        };
        for track in &self.tracks {
            timeline.add(track.clone().validated()?);
        }
        for color in &self.colors {
            let literals: Vec<&str> = color.colors.iter().map(String::as_str).collect();
            timeline.add_color(ColorKeyframes::from_hex(&color.name, &color.input, &literals)?);
        }
        Ok(timeline)
    }

    pub fn scroll_day(&self) -> Result<ScrollDay> {
        let mut day = ScrollDay::new(self.build()?)?.with_lines(self.lines.clone());
        if let Some(config) = self.auto_scroll.or_else(|| self.preset.and_then(ScenePreset::auto_scroll)) {
            day = day.with_auto_scroll(config);
        }
        if let Some(region) = self.region {
            day = day.with_region(region);
        }
        Ok(day)
    }
}

impl SceneManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn timeline_def(&self, name: &str) -> Option<&TimelineDef> {
        self.timelines.iter().find(|t| t.name == name)
    }

    pub fn timeline(&self, name: &str) -> Result<Timeline> {
        self.timeline_def(name)
            .ok_or_else(|| KeepsakeError::UnknownTimeline(name.to_string()))?
            .build()
    }

    /// Scroll scene by timeline name. Falls back to the preset of the same
    /// name when the manifest has no usable definition.
    pub fn scroll_day(&self, name: &str) -> Result<ScrollDay> {
        match self.timeline_def(name).map(TimelineDef::scroll_day) {
            Some(Ok(day)) => Ok(day),
            Some(Err(e)) => {
                log::warn!("timeline `{}` rejected ({}), trying the built-in preset", name, e);
                ScrollDay::from_preset(ScenePreset::from_name(name)?)
            }
            None => ScrollDay::from_preset(ScenePreset::from_name(name)?),
        }
    }

    pub fn teddy_day(&self) -> TeddyDay {
        TeddyDay::new(self.claw.clone(), self.machine)
    }

    pub fn chocolate_day(&self) -> ChocolateDay {
        ChocolateDay::new(self.stir, self.pour, self.decorating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = SceneManifest::from_json("{}").unwrap();
        assert_eq!(manifest.claw, ClawConfig::default());
        assert_eq!(manifest.decorating.required, 3);
        assert!(manifest.timelines.is_empty());
    }

    #[test]
    fn parse_tunables_and_timeline() {
        let json = r##"{
            "claw": { "target_collections": 2 },
            "stir": { "gain": 3.0 },
            "machine": { "width": 500.0, "height": 600.0 },
            "timelines": [
                {
                    "name": "letter",
                    "spring": { "stiffness": 60.0, "damping": 15.0 },
                    "tracks": [
                        { "name": "fade", "stops": [[0.0, 0.0], [0.5, 1.0]], "easing": "quad_out" }
                    ],
                    "colors": [
                        { "name": "sky", "input": [0.0, 1.0], "colors": ["#000000", "#ffffff"] }
                    ]
                }
            ]
        }"##;
        let manifest = SceneManifest::from_json(json).unwrap();
        assert_eq!(manifest.claw.target_collections, 2);
        assert_eq!(manifest.claw.step, ClawConfig::default().step);
        assert_eq!(manifest.stir.gain, 3.0);
        assert_eq!(manifest.machine.width, Some(500.0));

        let timeline = manifest.timeline("letter").unwrap();
        assert_eq!(timeline.tracks().len(), 2);
        assert_eq!(timeline.output_width(), 1 + 1 + 4);
    }

    #[test]
    fn preset_with_extra_tracks() {
        let json = r#"{
            "timelines": [
                { "name": "kiss", "preset": "kiss",
                  "tracks": [ { "name": "extra", "stops": [[0.0, 1.0], [1.0, 0.0]] } ] }
            ]
        }"#;
        let manifest = SceneManifest::from_json(json).unwrap();
        let preset_tracks = ScenePreset::Kiss.build().unwrap().tracks().len();
        let timeline = manifest.timeline("kiss").unwrap();
        assert_eq!(timeline.tracks().len(), preset_tracks + 1);

        let day = manifest.scroll_day("kiss").unwrap();
        assert!(day.auto_scroller().is_some());
    }

    #[test]
    fn unordered_stops_are_rejected() {
        let json = r#"{
            "timelines": [
                { "name": "bad", "tracks": [ { "name": "x", "stops": [[0.5, 0.0], [0.2, 1.0]] } ] }
            ]
        }"#;
        let manifest = SceneManifest::from_json(json).unwrap();
        assert!(matches!(manifest.timeline("bad"), Err(KeepsakeError::InvalidKeyframes { .. })));
        assert!(matches!(manifest.timeline("missing"), Err(KeepsakeError::UnknownTimeline(_))));
    }

    #[test]
    fn rejected_definition_falls_back_to_preset() {
        let json = r#"{
            "timelines": [
                { "name": "hug", "colors": [ { "name": "bg", "input": [0.0], "colors": ["nope"] } ] }
            ]
        }"#;
        let manifest = SceneManifest::from_json(json).unwrap();
        let day = manifest.scroll_day("hug").unwrap();
        assert_eq!(day.timeline().tracks().len(), ScenePreset::Hug.build().unwrap().tracks().len());
        assert!(manifest.scroll_day("nothing").is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(SceneManifest::from_json("{ nope"), Err(KeepsakeError::Manifest(_))));
    }
}
