//! Error types for PlayFx

use thiserror::Error;

/// Core error type
///
/// Only the edges of the engine can fail: construction, sample-rate
/// negotiation, configuration loading and file I/O in hosts. Processing
/// itself is infallible.
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audio file error: {0}")]
    AudioFile(String),
}

/// Result type alias
pub type FxResult<T> = Result<T, FxError>;
