//! Tracing subscriber setup for hosts that have none of their own

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vitrine_core::{VitrineError, VitrineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,

    /// One JSON object per event instead of human-readable lines
    pub json: bool,

    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(config: &TelemetryConfig) -> VitrineResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| VitrineError::Telemetry(e.to_string()))?;

    let result = if config.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(config.with_target))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(config.with_target))
            .with(filter)
            .try_init()
    };

    result.map_err(|e| VitrineError::Telemetry(e.to_string()))
}
