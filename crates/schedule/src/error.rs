//! Error types for the schedule crate.

use thiserror::Error;

/// Errors raised by schedule helpers.
///
/// These indicate a programming or configuration mistake, never a transient
/// condition, so callers should fail fast on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A timestamp style code outside the supported set
    #[error("Unsupported timestamp style '{code}', expected one of F, f, D, d, T, t, R")]
    InvalidFormat { code: String },

    /// A time of day that could not be parsed as HH:MM
    #[error("Invalid time of day '{value}', expected HH:MM")]
    InvalidTimeOfDay { value: String },

    /// A UTC offset outside the range chrono accepts
    #[error("Invalid UTC offset: {minutes} minutes")]
    InvalidOffset { minutes: i32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ScheduleError>;
