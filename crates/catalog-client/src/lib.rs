//! Catalog client for resolving movie titles.
//!
//! This crate talks to the external title catalog over HTTP. It handles:
//! - Bounded retries with exponential backoff on rate limits and timeouts
//! - Lenient decoding of partially-present JSON payloads
//! - The two-stage search → detail lookup for a free-text title
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog_client::{CatalogResolver, CatalogSettings};
//! use domain::TracingReporter;
//!
//! let resolver = CatalogResolver::connect(
//!     CatalogSettings::default(),
//!     TracingReporter::shared("catalog"),
//! )?;
//! let result = resolver.resolve("Alien").await;
//! ```

pub mod error;
pub mod fetcher;
pub mod models;
pub mod resolver;
pub mod retry;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{FetchError, Result};
pub use fetcher::ResilientFetcher;
pub use models::{ImageRef, RatingInfo, SearchHit, SearchResponse, TitleDetail};
pub use resolver::{CatalogResolver, CatalogSettings, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
