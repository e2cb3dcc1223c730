//! Error types for allocation-engine parsing and configuration.
//!
//! The allocation operations themselves are total and never fail. Errors only
//! surface where raw text enters the engine: clock times, ISO dates and config.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid clock time (expected HH:MM): {0}")]
    InvalidClockTime(String),

    #[error("Invalid ISO date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid window: end {end} must be after start {start}")]
    InvalidWindow { start: i32, end: i32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
