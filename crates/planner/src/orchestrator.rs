//! # Enrichment Orchestrator
//!
//! Drives one enrichment run:
//! 1. Resolve each title against the catalog, one at a time, in input order
//! 2. Record every outcome in the batch, failures included
//! 3. Build the banner from the artwork of the successes
//!
//! Titles are resolved sequentially so published messages and the banner
//! keep the input order. A per-title failure never stops the run, and a
//! banner failure only drops the banner.

use std::time::Instant;

use anyhow::Context;
use catalog_client::{CatalogResolver, HttpTransport, ReqwestTransport};
use compositor::{CompositeError, HttpImageSource, ImageCompositor, ImageSource};
use domain::{Batch, CompositeImage, EnrichmentResult, SharedReporter, Title};
use pipeline::{render_result, Message, MessageSink, Visibility};
use tracing::{info, warn};

/// Output of one run. Dropped once its contents are published.
#[derive(Debug, Clone)]
pub struct EnrichmentRun {
    pub batch: Batch,
    pub banner: Option<CompositeImage>,
}

/// Coordinates the resolver and the compositor for one batch of titles.
pub struct EnrichmentOrchestrator<T = ReqwestTransport, S = HttpImageSource> {
    resolver: CatalogResolver<T>,
    compositor: ImageCompositor<S>,
    banner_height: Option<u32>,
    reporter: SharedReporter,
}

impl<T: HttpTransport, S: ImageSource> EnrichmentOrchestrator<T, S> {
    pub fn new(
        resolver: CatalogResolver<T>,
        compositor: ImageCompositor<S>,
        banner_height: Option<u32>,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            resolver,
            compositor,
            banner_height,
            reporter,
        }
    }

    pub fn resolver(&self) -> &CatalogResolver<T> {
        &self.resolver
    }

    pub fn compositor(&self) -> &ImageCompositor<S> {
        &self.compositor
    }

    /// Resolve every title and build the banner.
    ///
    /// The batch always has one entry per title, in the same order.
    pub async fn run(&self, titles: &[Title]) -> EnrichmentRun {
        let start_time = Instant::now();

        let batch = self.enrich(titles).await;
        info!(
            titles = batch.len(),
            resolved = batch.success_count(),
            "Enriched titles"
        );

        let banner = self.build_banner(&batch).await;

        info!("Enrichment run finished in {:.2?}", start_time.elapsed());
        EnrichmentRun { batch, banner }
    }

    /// Like `run`, but each result is published as soon as its title is
    /// resolved, so messages arrive in input order while the run proceeds.
    /// A failed send is reported and the run moves on to the next title.
    pub async fn run_and_publish(
        &self,
        titles: &[Title],
        sink: &dyn MessageSink,
    ) -> EnrichmentRun {
        let start_time = Instant::now();

        let mut batch = Batch::with_capacity(titles.len());
        for title in titles {
            let result = self.resolve_one(title).await;
            if let Err(error) = sink
                .send_message(result_message(title, &result))
                .await
                .with_context(|| format!("Failed to publish result for '{title}'"))
            {
                warn!(title = %title, error = %error, "Result not published");
                self.reporter.warning(&format!("{error:#}"));
            }
            batch.push(title.clone(), result);
        }
        info!(
            titles = batch.len(),
            resolved = batch.success_count(),
            "Enriched and published titles"
        );

        let banner = self.build_banner(&batch).await;

        info!("Enrichment run finished in {:.2?}", start_time.elapsed());
        EnrichmentRun { batch, banner }
    }

    async fn enrich(&self, titles: &[Title]) -> Batch {
        let mut batch = Batch::with_capacity(titles.len());
        for title in titles {
            let result = self.resolve_one(title).await;
            batch.push(title.clone(), result);
        }
        batch
    }

    async fn resolve_one(&self, title: &str) -> EnrichmentResult {
        let result = self.resolver.resolve(title).await;
        if !result.is_success() {
            warn!(title, outcome = result.kind(), "Title not enriched");
        }
        result
    }

    async fn build_banner(&self, batch: &Batch) -> Option<CompositeImage> {
        let urls = batch.image_urls();
        if urls.is_empty() {
            info!("No artwork to build a banner from");
            return None;
        }

        match self.compositor.compose(&urls, self.banner_height).await {
            Ok(banner) => Some(banner),
            Err(error) => {
                self.report_banner_failure(&error);
                None
            }
        }
    }

    fn report_banner_failure(&self, error: &CompositeError) {
        warn!(error = %error, "Banner skipped");
        self.reporter
            .warning(&format!("Could not build the banner, continuing without it: {error}"));
    }
}

/// Broadcast message for one result, embedding the artwork when known.
fn result_message(title: &str, result: &EnrichmentResult) -> Message {
    let embed = result
        .as_match()
        .and_then(|catalog_match| catalog_match.resolvable_image_url())
        .map(str::to_string);
    Message::new(render_result(title, result), Visibility::Broadcast).with_embed(embed)
}
