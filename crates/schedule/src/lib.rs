//! # Schedule Crate
//!
//! Pure date/time helpers for the weekly movie night.
//!
//! - **occurrence**: next weekly slot after a reference instant
//! - **timestamp**: chat-platform timestamp markers (`<t:UNIX:STYLE>`)
//!
//! No I/O happens here. Callers supply "now" and apply any timezone
//! conversion to the returned instant themselves.
//!
//! ## Example Usage
//!
//! ```ignore
//! use chrono::{NaiveTime, Utc, Weekday};
//! use schedule::{format_for_display, next_occurrence};
//!
//! let next = next_occurrence(
//!     Utc::now().naive_utc(),
//!     Weekday::Wed,
//!     NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
//! );
//! let marker = format_for_display(&next.and_utc(), "R")?;
//! ```

pub mod error;
pub mod occurrence;
pub mod timestamp;

pub use error::{Result, ScheduleError};
pub use occurrence::{
    WeeklySlot, days_until, next_occurrence, next_occurrence_at, offset_from_minutes,
    poll_duration,
};
pub use timestamp::{TimestampStyle, format_for_display};
