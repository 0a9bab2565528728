//! # Domain Crate
//!
//! Shared vocabulary of the movie-night pipeline.
//!
//! ## Main Components
//!
//! - **types**: titles, catalog matches, enrichment results, batches, the
//!   composite banner, poll tallies and decisions
//! - **report**: the `Reporter` interface components log progress through
//! - **error**: errors raised while building domain values
//!
//! ## Example Usage
//!
//! ```ignore
//! use domain::{Batch, CatalogMatch, EnrichmentResult};
//!
//! let mut batch = Batch::new();
//! batch.push("Alien", EnrichmentResult::Success(CatalogMatch::new("tt0078748")));
//! batch.push("Nope", EnrichmentResult::NotFound);
//!
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.success_count(), 1);
//! ```

pub mod error;
pub mod report;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DomainError, Result};
pub use report::{MemoryReporter, ReportLevel, Reporter, SharedReporter, TracingReporter};
pub use types::{
    Batch, BatchEntry, CatalogMatch, CompositeImage, Decision, EnrichmentResult, PollTally, Title,
};
