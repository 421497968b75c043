use thiserror::Error;

/// Error types for animation assets and playback
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A limb animation declared a duration that cannot be sampled
    #[error("Invalid duration for '{animation}': {duration}")]
    InvalidDuration { animation: String, duration: f32 },

    /// An animation carries no limb data at all
    #[error("Animation '{0}' has no limb animations")]
    Empty(String),

    /// Hand animations must come in a pair
    #[error("Animation '{animation}' has {count} hand animations, expected 2")]
    HandCount { animation: String, count: usize },

    /// Lookup of an animation key in a registry failed
    #[error("Unknown animation: {0}")]
    UnknownAnimation(String),
}

/// Result type using AnimationError
pub type Result<T> = std::result::Result<T, AnimationError>;
