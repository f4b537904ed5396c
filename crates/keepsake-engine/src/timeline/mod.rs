pub mod autoscroll;
pub mod easing;
pub mod keyframes;
pub mod presets;
pub mod spring;
pub mod track;

pub use autoscroll::{AutoScrollConfig, AutoScrollState, AutoScroller, RegionAnchor, ScrollMetrics, ScrollRegion};
pub use easing::Easing;
pub use keyframes::{parse_hex_color, ColorKeyframes, Keyframes};
pub use presets::ScenePreset;
pub use spring::{Spring, SpringConfig};
pub use track::{Timeline, TimelineFrame, Track, TrackValue};
