//! reelsync Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::TimeMs;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Caption Errors
    // =========================================================================
    #[error(
        "Character timestamp length mismatch: {characters} characters, {starts} start times, {ends} end times"
    )]
    TimestampLengthMismatch {
        characters: usize,
        starts: usize,
        ends: usize,
    },

    #[error("Caption line {index} is malformed: {reason}")]
    MalformedCaptionLine { index: usize, reason: String },

    // =========================================================================
    // Timeline Errors
    // =========================================================================
    #[error("Invalid time range: {0}~{1} ms")]
    InvalidTimeRange(TimeMs, TimeMs),

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
