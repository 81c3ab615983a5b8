#![forbid(unsafe_code)]

//! Errors for the fallible surface of the engine: loading configuration.
//!
//! Transitions themselves never fail. Unmeasured input, stale measurements
//! and stale settles are absorbed by the state machine.

/// Errors that can occur when loading a [`BadgeConfig`](crate::BadgeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// One message per rejected field.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Result alias for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
