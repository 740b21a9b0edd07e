//! Error types for vitrine
//!
//! Frame data never fails: missing joints, NaN positions and empty frames are
//! ordinary states. Only configuration and the I/O around it can be wrong.

use thiserror::Error;

/// Core vitrine errors
#[derive(Error, Debug)]
pub enum VitrineError {
    #[error("Invalid threshold order for {name}: {lower} must be below {upper}")]
    ThresholdOrder {
        name: &'static str,
        lower: f32,
        upper: f32,
    },

    #[error("Invalid range for {name}: min {min} must be below max {max}")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be finite")]
    NonFinite { name: &'static str },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry init failed: {0}")]
    Telemetry(String),
}

/// Result type for vitrine operations
pub type VitrineResult<T> = Result<T, VitrineError>;

/// Reject non-finite or non-positive values
pub fn ensure_positive(name: &'static str, value: f32) -> VitrineResult<()> {
    if !value.is_finite() {
        return Err(VitrineError::NonFinite { name });
    }
    if value <= 0.0 {
        return Err(VitrineError::NonPositive { name, value });
    }
    Ok(())
}

/// Reject ranges where `min` is not strictly below `max`
pub fn ensure_range(name: &'static str, min: f32, max: f32) -> VitrineResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(VitrineError::NonFinite { name });
    }
    if min >= max {
        return Err(VitrineError::InvalidRange { name, min, max });
    }
    Ok(())
}
