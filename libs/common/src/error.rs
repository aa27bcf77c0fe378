//! Custom error types for the common library
//!
//! This module defines error types for the preference store and the
//! configuration loader shared by the intake services.

use thiserror::Error;

/// Custom error type for persisted preference operations
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// The backing file could not be read or written
    #[error("Preference store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a JSON object of booleans
    #[error("Preference store format error: {0}")]
    Format(#[from] serde_json::Error),

    /// The stored value under a key is not a boolean
    #[error("Preference {key} is not a boolean")]
    NotABoolean { key: String },
}

/// Custom error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or merged
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Type alias for Result with PreferenceError
pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
