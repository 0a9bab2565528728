//! Weekly slot arithmetic.
//!
//! The movie night happens on a fixed weekday at a fixed time. Given "now",
//! these helpers find the next such slot. The result is always strictly in
//! the future and never falls on the reference day itself: running the
//! command on the target weekday schedules next week's slot.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Weekday};

use crate::error::{Result, ScheduleError};

/// A recurring weekday and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySlot {
    pub weekday: Weekday,
    pub time_of_day: NaiveTime,
}

impl WeeklySlot {
    pub fn new(weekday: Weekday, time_of_day: NaiveTime) -> Self {
        Self {
            weekday,
            time_of_day,
        }
    }

    /// Build a slot from an `HH:MM` string.
    pub fn parse(weekday: Weekday, time_of_day: &str) -> Result<Self> {
        let time = NaiveTime::parse_from_str(time_of_day.trim(), "%H:%M").map_err(|_| {
            ScheduleError::InvalidTimeOfDay {
                value: time_of_day.to_string(),
            }
        })?;
        Ok(Self::new(weekday, time))
    }

    /// Next occurrence of this slot after `reference`, in naive local time.
    pub fn next_after(&self, reference: NaiveDateTime) -> NaiveDateTime {
        next_occurrence(reference, self.weekday, self.time_of_day)
    }

    /// Next occurrence of this slot, evaluated in the reference's offset.
    pub fn next_after_at(&self, reference: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        next_occurrence_at(reference, self.weekday, self.time_of_day)
    }
}

/// Number of days to add to reach the next `target` weekday.
///
/// Always in `1..=7`: a zero offset becomes a full week.
pub fn days_until(reference: Weekday, target: Weekday) -> i64 {
    let from = i64::from(reference.num_days_from_monday());
    let to = i64::from(target.num_days_from_monday());
    match (to - from).rem_euclid(7) {
        0 => 7,
        days => days,
    }
}

/// Next `target_weekday` at `time_of_day`, strictly after the reference day.
pub fn next_occurrence(
    reference: NaiveDateTime,
    target_weekday: Weekday,
    time_of_day: NaiveTime,
) -> NaiveDateTime {
    let days = days_until(reference.weekday(), target_weekday);
    let date = reference.date() + Duration::days(days);
    date.and_time(time_of_day)
}

/// Same as [`next_occurrence`], with the arithmetic done in the local time of
/// the reference's UTC offset.
pub fn next_occurrence_at(
    reference: &DateTime<FixedOffset>,
    target_weekday: Weekday,
    time_of_day: NaiveTime,
) -> DateTime<FixedOffset> {
    let offset = *reference.offset();
    let local = next_occurrence(reference.naive_local(), target_weekday, time_of_day);
    // Fixed offsets never produce ambiguous or missing local times.
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    offset.from_utc_datetime(&utc)
}

/// Build a fixed offset from a minute count (east of UTC is positive).
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ScheduleError::InvalidOffset { minutes })
}

/// Time left between `now` and `until`, clamped at zero.
pub fn poll_duration<Tz: TimeZone>(now: &DateTime<Tz>, until: &DateTime<Tz>) -> std::time::Duration {
    until
        .clone()
        .signed_duration_since(now.clone())
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}
