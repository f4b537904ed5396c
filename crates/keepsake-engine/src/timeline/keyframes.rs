// timeline/keyframes.rs
//
// Piecewise-linear maps from scroll progress to a display value.
//
// Usage:
//   let fade = Keyframes::new("fade", &[(0.2, 0.0), (0.3, 1.0), (0.6, 1.0), (0.7, 0.0)])?;
//   let opacity = fade.sample(progress);

use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::easing::{lerp, lerp_rgba, Easing};
use crate::error::{KeepsakeError, Result};

/// Find the segment containing `p` and its local fraction.
/// `None` means `p` lies before the first or after the last stop.
fn locate(times: impl Iterator<Item = f32>, p: f32) -> Option<(usize, f32)> {
    let mut prev: Option<f32> = None;
    for (i, t) in times.enumerate() {
        if let Some(t0) = prev {
            if p <= t {
                let span = t - t0;
                let frac = if span > 0.0 { (p - t0) / span } else { 1.0 };
                return Some((i - 1, frac));
            }
        }
        prev = Some(t);
    }
    None
}

fn validate(track: &str, times: &[f32]) -> Result<()> {
    let invalid = |reason: &str| KeepsakeError::InvalidKeyframes {
        track: track.to_string(),
        reason: reason.to_string(),
    };
    if times.is_empty() {
        return Err(invalid("no keyframes"));
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(invalid("non-finite input position"));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(invalid("input positions must be non-decreasing"));
    }
    Ok(())
}

/// Ordered scalar keyframes with an optional per-segment easing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframes {
    pub name: String,
    stops: Vec<(f32, f32)>,
    #[serde(default)]
    easing: Easing,
}

impl Keyframes {
    pub fn new(name: &str, stops: &[(f32, f32)]) -> Result<Self> {
        let times: Vec<f32> = stops.iter().map(|s| s.0).collect();
        validate(name, &times)?;
        if stops.iter().any(|s| !s.1.is_finite()) {
            return Err(KeepsakeError::InvalidKeyframes {
                track: name.to_string(),
                reason: "non-finite output value".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            stops: stops.to_vec(),
            easing: Easing::Linear,
        })
    }

    /// Build from parallel input/output lists, the way scroll animations are usually authored.
    pub fn from_ranges(name: &str, input: &[f32], output: &[f32]) -> Result<Self> {
        if input.len() != output.len() {
            return Err(KeepsakeError::InvalidKeyframes {
                track: name.to_string(),
                reason: format!("{} inputs but {} outputs", input.len(), output.len()),
            });
        }
        let stops: Vec<(f32, f32)> = input.iter().copied().zip(output.iter().copied()).collect();
        Self::new(name, &stops)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Re-check a track that arrived through deserialization.
    pub fn validated(self) -> Result<Self> {
        let stops = self.stops.clone();
        Ok(Self::new(&self.name, &stops)?.with_easing(self.easing))
    }

    /// Value at progress `p`. Clamped to the end values outside the stops.
    pub fn sample(&self, p: f32) -> f32 {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return 0.0,
        };
        if p <= first.0 {
            return first.1;
        }
        match locate(self.stops.iter().map(|s| s.0), p) {
            Some((i, frac)) => {
                let (a, b) = (self.stops[i].1, self.stops[i + 1].1);
                lerp(a, b, self.easing.apply(frac))
            }
            None => last.1,
        }
    }

    pub fn stops(&self) -> &[(f32, f32)] {
        &self.stops
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA in [0, 1].
pub fn parse_hex_color(s: &str) -> Result<Vec4> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(KeepsakeError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| KeepsakeError::InvalidColor(s.to_string()))
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Ok(Vec4::new(channel(0)?, channel(2)?, channel(4)?, alpha))
}

/// Keyframes over RGBA colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorKeyframes {
    pub name: String,
    stops: Vec<(f32, Vec4)>,
}

impl ColorKeyframes {
    pub fn new(name: &str, stops: &[(f32, Vec4)]) -> Result<Self> {
        let times: Vec<f32> = stops.iter().map(|s| s.0).collect();
        validate(name, &times)?;
        Ok(Self {
            name: name.to_string(),
            stops: stops.to_vec(),
        })
    }

    /// Build from parallel positions and hex literals.
    pub fn from_hex(name: &str, input: &[f32], colors: &[&str]) -> Result<Self> {
        if input.len() != colors.len() {
            return Err(KeepsakeError::InvalidKeyframes {
                track: name.to_string(),
                reason: format!("{} inputs but {} colours", input.len(), colors.len()),
            });
        }
        let stops = input
            .iter()
            .zip(colors)
            .map(|(&t, c)| parse_hex_color(c).map(|rgba| (t, rgba)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(name, &stops)
    }

    pub fn sample(&self, p: f32) -> Vec4 {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Vec4::ZERO,
        };
        if p <= first.0 {
            return first.1;
        }
        match locate(self.stops.iter().map(|s| s.0), p) {
            Some((i, frac)) => lerp_rgba(self.stops[i].1, self.stops[i + 1].1, frac),
            None => last.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Keyframes {
        Keyframes::new("fade", &[(0.2, 0.0), (0.3, 1.0), (0.6, 1.0), (0.7, 0.0)]).unwrap()
    }

    #[test]
    fn fade_window_samples() {
        let k = window();
        assert!((k.sample(0.25) - 0.5).abs() < 0.001);
        assert_eq!(k.sample(0.45), 1.0);
        assert_eq!(k.sample(0.9), 0.0);
        assert_eq!(k.sample(0.0), 0.0);
    }

    #[test]
    fn clamps_outside_range() {
        let k = Keyframes::from_ranges("grow", &[0.0, 0.5], &[0.0, 100.0]).unwrap();
        assert_eq!(k.sample(-1.0), 0.0);
        assert_eq!(k.sample(0.75), 100.0);
        assert_eq!(k.sample(2.0), 100.0);
        assert!((k.sample(0.25) - 50.0).abs() < 0.001);
    }

    #[test]
    fn single_stop_is_constant() {
        let k = Keyframes::new("flat", &[(0.5, 3.0)]).unwrap();
        assert_eq!(k.sample(0.0), 3.0);
        assert_eq!(k.sample(1.0), 3.0);
    }

    #[test]
    fn duplicate_times_step() {
        let k = Keyframes::new("step", &[(0.0, 0.0), (0.5, 0.0), (0.5, 1.0), (1.0, 1.0)]).unwrap();
        assert_eq!(k.sample(0.4), 0.0);
        assert_eq!(k.sample(0.6), 1.0);
    }

    #[test]
    fn easing_shapes_segment() {
        let k = Keyframes::new("ease", &[(0.0, 0.0), (1.0, 1.0)]).unwrap().with_easing(Easing::QuadIn);
        assert!((k.sample(0.5) - 0.25).abs() < 0.001);
    }

    #[test]
    fn rejects_bad_tracks() {
        assert!(Keyframes::new("empty", &[]).is_err());
        assert!(Keyframes::new("back", &[(0.5, 0.0), (0.2, 1.0)]).is_err());
        assert!(Keyframes::new("nan", &[(f32::NAN, 0.0)]).is_err());
        assert!(Keyframes::from_ranges("len", &[0.0, 1.0], &[0.0]).is_err());
    }

    #[test]
    fn deserialized_track_is_revalidated() {
        let k: Keyframes = serde_json::from_str(r#"{ "name": "bad", "stops": [[0.9, 0.0], [0.1, 1.0]] }"#).unwrap();
        assert!(k.validated().is_err());
    }

    #[test]
    fn hex_colors() {
        let c = parse_hex_color("#ff0000").unwrap();
        assert_eq!(c, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let c = parse_hex_color("#00000080").unwrap();
        assert!((c.w - 128.0 / 255.0).abs() < 0.001);
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn color_track_interpolates() {
        let k = ColorKeyframes::from_hex("bg", &[0.0, 1.0], &["#000000", "#ffffff"]).unwrap();
        let mid = k.sample(0.5);
        assert!((mid.x - 0.5).abs() < 0.01);
        assert_eq!(k.sample(3.0), Vec4::ONE);
    }
}
