//! Title lookup against the catalog service.
//!
//! Resolution is two calls through the resilient fetcher: a text search,
//! then the detail of the top-ranked hit. No disambiguation is attempted
//! beyond taking the service's first hit.

use std::time::Duration;

use domain::{CatalogMatch, EnrichmentResult, SharedReporter};
use tracing::{debug, info};

use crate::error::{FetchError, Result};
use crate::fetcher::ResilientFetcher;
use crate::models::{SearchResponse, TitleDetail};
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, ReqwestTransport};

pub const DEFAULT_BASE_URL: &str = "https://api.imdbapi.dev";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Resolves free-text titles to catalog matches.
pub struct CatalogResolver<T = ReqwestTransport> {
    fetcher: ResilientFetcher<T>,
    base_url: String,
    request_timeout: Duration,
    reporter: SharedReporter,
}

impl CatalogResolver<ReqwestTransport> {
    /// Resolver backed by a fresh reqwest client.
    pub fn connect(settings: CatalogSettings, reporter: SharedReporter) -> Result<Self> {
        Ok(Self::with_transport(
            ReqwestTransport::new()?,
            settings,
            reporter,
        ))
    }
}

impl<T: HttpTransport> CatalogResolver<T> {
    pub fn with_transport(transport: T, settings: CatalogSettings, reporter: SharedReporter) -> Self {
        Self {
            fetcher: ResilientFetcher::new(transport, settings.retry, reporter.clone()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout,
            reporter,
        }
    }

    pub fn fetcher(&self) -> &ResilientFetcher<T> {
        &self.fetcher
    }

    fn search_url(&self) -> String {
        format!("{}/search/titles", self.base_url)
    }

    fn detail_url(&self, id: &str) -> String {
        format!("{}/titles/{}", self.base_url, urlencoding::encode(id))
    }

    /// Search the catalog; hits come back in the service's relevance order.
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let params = [("query".to_string(), query.to_string())];
        let body = self
            .fetcher
            .fetch(&self.search_url(), &params, self.request_timeout)
            .await?;
        Ok(SearchResponse::from_value(body))
    }

    /// Fetch the detail of one title.
    pub async fn detail(&self, id: &str) -> Result<CatalogMatch> {
        let body = self
            .fetcher
            .fetch(&self.detail_url(id), &[], self.request_timeout)
            .await?;
        Ok(TitleDetail::from_value(body).into_match(id))
    }

    /// Search, then fetch the top hit. `Ok(None)` when nothing matched.
    pub async fn lookup(&self, title: &str) -> Result<Option<CatalogMatch>> {
        let search = self.search(title).await?;
        let Some(first_id) = search.hits().first().and_then(|hit| hit.id.as_deref()) else {
            return Ok(None);
        };
        debug!(title, id = first_id, "Using top search hit");
        self.detail(first_id).await.map(Some)
    }

    /// Resolve one title. Never fails: every outcome is an `EnrichmentResult`.
    pub async fn resolve(&self, title: &str) -> EnrichmentResult {
        self.reporter
            .progress(&format!("Getting info for movie: {title}"));

        match self.lookup(title).await {
            Ok(Some(catalog_match)) => {
                info!(
                    title,
                    id = %catalog_match.id,
                    rating = ?catalog_match.rating,
                    "Resolved title"
                );
                EnrichmentResult::Success(catalog_match)
            }
            Ok(None) => {
                self.reporter
                    .warning(&format!("No titles found for query: {title}"));
                EnrichmentResult::NotFound
            }
            Err(error @ FetchError::ExhaustedRetries { .. }) => {
                EnrichmentResult::ExhaustedRetries(error.to_string())
            }
            Err(error) => EnrichmentResult::TransientFailure(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::{TransportError, TransportResponse};
    use domain::{MemoryReporter, ReportLevel};
    use serde_json::json;
    use std::sync::Arc;

    const BASE: &str = "http://catalog.test";

    fn resolver_with(transport: ScriptedTransport) -> (CatalogResolver<ScriptedTransport>, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let settings = CatalogSettings {
            base_url: format!("{BASE}/"),
            ..CatalogSettings::default()
        };
        (
            CatalogResolver::with_transport(transport, settings, reporter.clone()),
            reporter,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_uses_first_search_hit() {
        let transport = ScriptedTransport::new()
            .json(
                format!("{BASE}/search/titles?query=Alien"),
                json!({ "titles": [ { "id": "tt0078748" }, { "id": "tt0090605" } ] }),
            )
            .json(
                format!("{BASE}/titles/tt0078748"),
                json!({ "id": "tt0078748", "primaryTitle": "Alien", "rating": { "aggregateRating": 8.5 } }),
            );
        let (resolver, _) = resolver_with(transport);

        let result = resolver.resolve("Alien").await;

        let catalog_match = result.as_match().expect("expected a match");
        assert_eq!(catalog_match.primary_title.as_deref(), Some("Alien"));
        assert_eq!(catalog_match.rating, Some(8.5));

        let keys: Vec<_> = resolver.fetcher().transport().calls().into_iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                format!("{BASE}/search/titles?query=Alien"),
                format!("{BASE}/titles/tt0078748"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_use_configured_timeout() {
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Heat"), json!({ "titles": [] }));
        let (resolver, _) = resolver_with(transport);

        resolver.resolve("Heat").await;

        let calls = resolver.fetcher().transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_search_is_not_found() {
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Nothing"), json!({ "titles": [] }));
        let (resolver, reporter) = resolver_with(transport);

        assert_eq!(resolver.resolve("Nothing").await, EnrichmentResult::NotFound);
        assert_eq!(resolver.fetcher().transport().calls().len(), 1);
        assert_eq!(reporter.lines_at(ReportLevel::Warning).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_titles_key_is_not_found() {
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Odd"), json!({ "results": [] }));
        let (resolver, _) = resolver_with(transport);

        assert_eq!(resolver.resolve("Odd").await, EnrichmentResult::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_hit_without_id_is_not_found() {
        let transport = ScriptedTransport::new().json(
            format!("{BASE}/search/titles?query=Odd"),
            json!({ "titles": [ { "primaryTitle": "No id" }, { "id": "tt9" } ] }),
        );
        let (resolver, _) = resolver_with(transport);

        assert_eq!(resolver.resolve("Odd").await, EnrichmentResult::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_without_rating_is_still_success() {
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Heat"), json!({ "titles": [ { "id": "tt0113277" } ] }))
            .json(format!("{BASE}/titles/tt0113277"), json!({ "primaryTitle": "Heat", "genres": ["Crime"] }));
        let (resolver, _) = resolver_with(transport);

        let result = resolver.resolve("Heat").await;
        let catalog_match = result.as_match().expect("expected a match");
        assert_eq!(catalog_match.id, "tt0113277");
        assert_eq!(catalog_match.rating, None);
        assert_eq!(catalog_match.genres, vec!["Crime"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_detail_exhausts_retries() {
        let detail = format!("{BASE}/titles/tt1");
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Busy"), json!({ "titles": [ { "id": "tt1" } ] }))
            .route(detail.clone(), Ok(TransportResponse::new(429, "")))
            .route(detail.clone(), Ok(TransportResponse::new(429, "")))
            .route(detail, Err(TransportError::Timeout("deadline".into())));
        let (resolver, _) = resolver_with(transport);

        let result = resolver.resolve("Busy").await;

        assert!(matches!(result, EnrichmentResult::ExhaustedRetries(ref reason) if reason.contains("3 attempts")));
        assert_eq!(resolver.fetcher().transport().calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_transient_failure() {
        let transport = ScriptedTransport::new()
            .route(format!("{BASE}/search/titles?query=Down"), Ok(TransportResponse::new(500, "oops")));
        let (resolver, _) = resolver_with(transport);

        let result = resolver.resolve("Down").await;
        assert!(matches!(result, EnrichmentResult::TransientFailure(ref reason) if reason.contains("500")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_id_is_url_encoded() {
        let transport = ScriptedTransport::new()
            .json(format!("{BASE}/search/titles?query=Weird"), json!({ "titles": [ { "id": "a/b c" } ] }))
            .json(format!("{BASE}/titles/a%2Fb%20c"), json!({ "primaryTitle": "Weird" }));
        let (resolver, _) = resolver_with(transport);

        let result = resolver.resolve("Weird").await;
        assert_eq!(result.as_match().map(|m| m.id.as_str()), Some("a/b c"));
    }
}
