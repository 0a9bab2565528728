//! # Planner Crate
//!
//! Wires the catalog client, the compositor and the publishing layer into
//! the movie-night flows.
//!
//! ## Main Components
//!
//! - **config**: TOML configuration with defaults and validation
//! - **orchestrator**: one enrichment run over a list of titles
//! - **planner**: announce, decide and pick flows
//!
//! ## Example Usage
//!
//! ```ignore
//! use planner::{Config, MovieNightPlanner};
//! use domain::TracingReporter;
//!
//! let planner = MovieNightPlanner::from_config(Config::default(), TracingReporter::shared("planner"))?;
//! let report = planner.announce("Alien | Heat", chrono::Utc::now(), &sink).await?;
//! ```

pub mod config;
pub mod orchestrator;
pub mod planner;

pub use config::{Config, ConfigError};
pub use orchestrator::{EnrichmentOrchestrator, EnrichmentRun};
pub use planner::{
    parse_titles, AnnouncementReport, MovieNightPlanner, PickDraw, PollSnapshot, BANNER_FILE_NAME,
};
