use thiserror::Error;

/// Invalid monitor configuration, rejected before any component is built
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A duration option was zero, negative, or not a finite number
    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositiveDuration { name: &'static str, value: f64 },

    /// The sampling rate was zero, negative, or not a finite number
    #[error("frame_rate must be a positive number of ticks per second, got {0}")]
    InvalidFrameRate(f64),
}
