//! Core domain types for a movie-night run.
//!
//! Everything the pipeline passes between its stages lives here:
//! - Catalog data resolved for a single title (`CatalogMatch`)
//! - The per-title outcome (`EnrichmentResult`) and the ordered `Batch`
//! - The composite banner produced from the artwork of successful matches
//! - Poll tallies and the decision taken from them

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

// =============================================================================
// Titles and catalog matches
// =============================================================================

/// A candidate title exactly as the user typed it.
pub type Title = String;

/// Catalog data resolved for one title.
///
/// Every descriptive field is optional: the catalog service omits fields
/// freely and a missing rating or plot is a normal state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Identifier assigned by the catalog service
    pub id: String,
    pub primary_title: Option<String>,
    pub plot: Option<String>,
    /// Aggregate rating on the service's scale (0-10 for the reference service)
    pub rating: Option<f64>,
    /// Genre labels in the order the service returned them
    pub genres: Vec<String>,
    /// URL of the primary artwork, when the service knows one
    pub image_url: Option<String>,
}

impl CatalogMatch {
    /// Create a match carrying only its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_title: None,
            plot: None,
            rating: None,
            genres: Vec::new(),
            image_url: None,
        }
    }

    /// Image URL if it is present and not blank.
    pub fn resolvable_image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

// =============================================================================
// Enrichment results
// =============================================================================

/// Outcome of resolving one title against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentResult {
    Success(CatalogMatch),
    /// The search returned no candidate for this title
    NotFound,
    /// A terminal failure on a single call (bad status, unreadable body)
    TransientFailure(String),
    /// The retry budget was spent on rate limits or timeouts
    ExhaustedRetries(String),
}

impl EnrichmentResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EnrichmentResult::Success(_))
    }

    /// The resolved match, for `Success` results only.
    pub fn as_match(&self) -> Option<&CatalogMatch> {
        match self {
            EnrichmentResult::Success(catalog_match) => Some(catalog_match),
            _ => None,
        }
    }

    /// Short variant name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichmentResult::Success(_) => "success",
            EnrichmentResult::NotFound => "not_found",
            EnrichmentResult::TransientFailure(_) => "transient_failure",
            EnrichmentResult::ExhaustedRetries(_) => "exhausted_retries",
        }
    }
}

/// One title together with the result it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub title: Title,
    pub result: EnrichmentResult,
}

/// Ordered results of one enrichment run.
///
/// Entry `i` always belongs to input title `i`; the batch is only ever
/// appended to, one entry per processed title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, title: impl Into<Title>, result: EnrichmentResult) {
        self.entries.push(BatchEntry {
            title: title.into(),
            result,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn results(&self) -> impl Iterator<Item = &EnrichmentResult> {
        self.entries.iter().map(|entry| &entry.result)
    }

    pub fn success_count(&self) -> usize {
        self.results().filter(|result| result.is_success()).count()
    }

    /// Image URLs of successful matches, in batch order.
    pub fn image_urls(&self) -> Vec<String> {
        self.results()
            .filter_map(EnrichmentResult::as_match)
            .filter_map(|catalog_match| catalog_match.resolvable_image_url())
            .map(str::to_string)
            .collect()
    }
}

// =============================================================================
// Composite banner
// =============================================================================

/// Encoded banner image built from several artworks joined side by side.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositeImage {
    /// PNG-encoded pixels
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl fmt::Debug for CompositeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeImage")
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

// =============================================================================
// Polls and decisions
// =============================================================================

/// Vote counts per poll option. Labels are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollTally {
    counts: BTreeMap<String, u32>,
}

impl PollTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tally from `(label, votes)` pairs, rejecting repeated labels.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut tally = Self::new();
        for (label, votes) in pairs {
            tally.insert(label, votes)?;
        }
        Ok(tally)
    }

    /// Build a tally from poll answers, summing the votes of answers that
    /// share a label. Blank labels are still rejected.
    pub fn merged<I, S>(answers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut tally = Self::new();
        for (label, votes) in answers {
            let label = label.into();
            if label.trim().is_empty() {
                return Err(DomainError::EmptyOptionLabel);
            }
            let total = tally.counts.entry(label).or_insert(0);
            *total = total.saturating_add(votes);
        }
        Ok(tally)
    }

    /// Add an option. Fails if the label is blank or already present.
    pub fn insert(&mut self, label: impl Into<String>, votes: u32) -> Result<()> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::EmptyOptionLabel);
        }
        if self.counts.contains_key(&label) {
            return Err(DomainError::DuplicateOption { label });
        }
        self.counts.insert(label, votes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn votes(&self, label: &str) -> Option<u32> {
        self.counts.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(label, votes)| (label.as_str(), *votes))
    }
}

/// The option chosen from a finished poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub option: String,
    /// True when several options shared the top count and one was drawn
    pub was_tie: bool,
}
