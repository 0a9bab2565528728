//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields a working setup:
//!
//! ```toml
//! [catalog]
//! base_url = "https://api.imdbapi.dev"
//! request_timeout_secs = 10
//!
//! [catalog.retry]
//! max_attempts = 3
//! base_delay_secs = 60
//! multiplier = 2
//!
//! [schedule]
//! weekday = "Wed"
//! time_of_day = "20:30"
//! utc_offset_minutes = 0
//! event_duration_minutes = 180
//! ```

use std::path::Path;
use std::time::Duration;

use catalog_client::{CatalogSettings, RetryPolicy};
use chrono::{FixedOffset, Weekday};
use compositor::MAX_DIMENSION;
use schedule::{ScheduleError, WeeklySlot, offset_from_minutes};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest UTC offset accepted, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid weekday '{0}'")]
    InvalidWeekday(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub schedule: ScheduleConfig,
    pub banner: BannerConfig,
    pub announce: AnnounceConfig,
    pub pick: PickConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Day of the movie night, e.g. `Wed` or `wednesday`
    pub weekday: String,
    /// Local start time as `HH:MM`
    pub time_of_day: String,
    pub utc_offset_minutes: i32,
    pub event_duration_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Height every poster is scaled to; the tallest poster when unset
    pub target_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    pub poll_question: String,
    pub event_name: String,
    /// Role mentioned in the reminder
    pub reminder_role_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    pub pause_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: catalog_client::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: catalog_client::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_secs: policy.base_delay.as_secs(),
            multiplier: policy.multiplier,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekday: "Wed".to_string(),
            time_of_day: "20:30".to_string(),
            utc_offset_minutes: 0,
            event_duration_minutes: 180,
        }
    }
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            poll_question: "What are we watching for movie night? :)".to_string(),
            event_name: "Movie night".to_string(),
            reminder_role_id: None,
        }
    }
}

impl Default for PickConfig {
    fn default() -> Self {
        Self { pause_secs: 3 }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Reject values that can only come from a mistake.
    pub fn validate(&self) -> Result<()> {
        self.weekly_slot()?;
        self.utc_offset()?;

        if self.catalog.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "catalog.retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.catalog.retry.multiplier < 2 {
            return Err(ConfigError::Invalid {
                field: "catalog.retry.multiplier",
                reason: "must be at least 2 so delays keep growing".to_string(),
            });
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "catalog.request_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if matches!(self.banner.target_height, Some(height) if height == 0 || height > MAX_DIMENSION) {
            return Err(ConfigError::Invalid {
                field: "banner.target_height",
                reason: format!("must be between 1 and {MAX_DIMENSION}"),
            });
        }
        Ok(())
    }

    pub fn weekday(&self) -> Result<Weekday> {
        self.schedule
            .weekday
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidWeekday(self.schedule.weekday.clone()))
    }

    pub fn weekly_slot(&self) -> Result<WeeklySlot> {
        Ok(WeeklySlot::parse(self.weekday()?, &self.schedule.time_of_day)?)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        let minutes = self.schedule.utc_offset_minutes;
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid {
                field: "schedule.utc_offset_minutes",
                reason: format!("{minutes} is outside ±{MAX_OFFSET_MINUTES}"),
            });
        }
        Ok(offset_from_minutes(minutes)?)
    }

    pub fn event_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.schedule.event_duration_minutes))
    }

    pub fn pick_pause(&self) -> Duration {
        Duration::from_secs(self.pick.pause_secs)
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        let retry = &self.catalog.retry;
        CatalogSettings {
            base_url: self.catalog.base_url.clone(),
            request_timeout: Duration::from_secs(self.catalog.request_timeout_secs),
            retry: RetryPolicy::new(
                retry.max_attempts,
                Duration::from_secs(retry.base_delay_secs),
                retry.multiplier,
            ),
        }
    }
}
