//! Error types for the intake service
//!
//! None of these reach the publish form: the engine downgrades them to safe
//! defaults and logs them.

use thiserror::Error;

/// Failure while reading video metadata
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe executable could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The probe ran and reported failure
    #[error("{program} exited with status {status}")]
    Failed { program: String, status: String },

    /// Bytes of an in-memory file could not be staged for probing
    #[error("Failed to stage file for probing: {0}")]
    Staging(#[source] std::io::Error),

    /// The probe output was not the expected JSON
    #[error("Unreadable probe output: {0}")]
    Parse(#[from] serde_json::Error),

    /// The probe output carried no usable duration
    #[error("Probe output has no duration")]
    MissingDuration,
}

/// Failure while decoding a text post
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file could not be read
    #[error("Failed to read text file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid UTF-8
    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Type alias for Result with ProbeError
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Type alias for Result with DecodeError
pub type DecodeResult<T> = Result<T, DecodeError>;
