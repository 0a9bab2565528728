//! Chat-platform timestamp markers.
//!
//! The chat host renders `<t:UNIX:STYLE>` in each reader's own locale and
//! timezone, so the marker only needs the absolute instant and a style code.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};

use crate::error::{Result, ScheduleError};

/// Supported rendering styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimestampStyle {
    /// `F`: weekday, date and time
    FullDateTime,
    /// `f`: date and time
    #[default]
    ShortDateTime,
    /// `D`
    DateLong,
    /// `d`
    DateShort,
    /// `T`
    TimeLong,
    /// `t`
    TimeShort,
    /// `R`: "in 2 days"
    Relative,
}

impl TimestampStyle {
    pub const ALL: [TimestampStyle; 7] = [
        TimestampStyle::FullDateTime,
        TimestampStyle::ShortDateTime,
        TimestampStyle::DateLong,
        TimestampStyle::DateShort,
        TimestampStyle::TimeLong,
        TimestampStyle::TimeShort,
        TimestampStyle::Relative,
    ];

    pub fn code(self) -> char {
        match self {
            TimestampStyle::FullDateTime => 'F',
            TimestampStyle::ShortDateTime => 'f',
            TimestampStyle::DateLong => 'D',
            TimestampStyle::DateShort => 'd',
            TimestampStyle::TimeLong => 'T',
            TimestampStyle::TimeShort => 't',
            TimestampStyle::Relative => 'R',
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        let mut chars = code.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        single
            .and_then(|c| Self::ALL.into_iter().find(|style| style.code() == c))
            .ok_or_else(|| ScheduleError::InvalidFormat {
                code: code.to_string(),
            })
    }

    /// Render the marker for `instant` in this style.
    pub fn marker<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> String {
        format!("<t:{}:{}>", instant.timestamp(), self.code())
    }
}

impl fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for TimestampStyle {
    type Err = ScheduleError;

    fn from_str(code: &str) -> Result<Self> {
        Self::from_code(code)
    }
}

/// Render `instant` as a timestamp marker using a raw style code.
///
/// Fails with [`ScheduleError::InvalidFormat`] for codes outside the
/// supported set.
pub fn format_for_display<Tz: TimeZone>(instant: &DateTime<Tz>, style_code: &str) -> Result<String> {
    let style = TimestampStyle::from_code(style_code)?;
    Ok(style.marker(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_marker_uses_unix_seconds() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 3, 20, 30, 0).unwrap();
        assert_eq!(
            format_for_display(&instant, "f").unwrap(),
            "<t:1704313800:f>"
        );
        assert_eq!(
            format_for_display(&instant, "R").unwrap(),
            "<t:1704313800:R>"
        );
    }

    #[test]
    fn test_marker_is_independent_of_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 3, 19, 30, 0).unwrap();
        let paris = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(
            format_for_display(&utc, "F").unwrap(),
            format_for_display(&paris, "F").unwrap()
        );
    }

    #[test]
    fn test_every_supported_code_round_trips() {
        for style in TimestampStyle::ALL {
            let parsed: TimestampStyle = style.code().to_string().parse().unwrap();
            assert_eq!(parsed, style);
        }
    }

    #[test]
    fn test_unknown_code_is_invalid_format() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 3, 20, 30, 0).unwrap();
        for code in ["x", "", "ff", "r", "Relative"] {
            assert_eq!(
                format_for_display(&instant, code),
                Err(ScheduleError::InvalidFormat {
                    code: code.to_string()
                })
            );
        }
    }
}
