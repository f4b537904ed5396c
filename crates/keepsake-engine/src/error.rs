use thiserror::Error;

/// Errors surfaced by engine constructors and manifest loading.
///
/// Gameplay outcomes (walking into a wall, a missed grab) are not errors and
/// never show up here.
#[derive(Error, Debug)]
pub enum KeepsakeError {
    #[error("maze dimensions must be odd and at least 5, got {width}x{height}")]
    InvalidMazeSize { width: usize, height: usize },

    #[error("keyframe track `{track}` is invalid: {reason}")]
    InvalidKeyframes { track: String, reason: String },

    #[error("invalid colour literal `{0}`")]
    InvalidColor(String),

    #[error("unknown timeline preset `{0}`")]
    UnknownPreset(String),

    #[error("manifest has no timeline named `{0}`")]
    UnknownTimeline(String),

    #[error("manifest parse failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeepsakeError>;
