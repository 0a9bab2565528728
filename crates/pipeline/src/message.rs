//! Text rendering of enrichment results.

use domain::{CatalogMatch, EnrichmentResult};

const HIGHLIGHTED_GENRE: &str = "Horror";
const MISSING: &str = "N/A";

/// Render one result for the channel.
pub fn render_result(title: &str, result: &EnrichmentResult) -> String {
    match result {
        EnrichmentResult::Success(catalog_match) => render_match(catalog_match),
        EnrichmentResult::NotFound => format!(":grey_question: No match found for *{title}*"),
        EnrichmentResult::TransientFailure(reason) => {
            format!(":x: Could not fetch details for *{title}*: {reason}")
        }
        EnrichmentResult::ExhaustedRetries(reason) => {
            format!(":hourglass: Catalog kept refusing *{title}*, giving up: {reason}")
        }
    }
}

/// Render a resolved title: heading, spoilered plot, rating and genres.
pub fn render_match(catalog_match: &CatalogMatch) -> String {
    let title = catalog_match.primary_title.as_deref().unwrap_or("Unknown");
    let plot = catalog_match.plot.as_deref().unwrap_or(MISSING);
    let rating = catalog_match
        .rating
        .map(|rating| format!("{rating:.1}"))
        .unwrap_or_else(|| MISSING.to_string());
    let genres = if catalog_match.genres.is_empty() {
        MISSING.to_string()
    } else {
        catalog_match
            .genres
            .iter()
            .map(|genre| highlight_genre(genre))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "## {title}\n\
         Plot: ||*{plot}*||\n\
         Rating: **{rating}** (IMDb rating, >7 is usually good)\n\
         Genres: {genres}\n"
    )
}

fn highlight_genre(genre: &str) -> String {
    if genre == HIGHLIGHTED_GENRE {
        format!("**:warning: {genre} :warning:**")
    } else {
        genre.to_string()
    }
}
