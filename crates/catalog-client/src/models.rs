//! Response schemas for the catalog service.
//!
//! The service omits fields freely and has been seen returning a field in
//! more than one shape. Every field is therefore optional and decoded
//! leniently: a field that is missing or has an unexpected type becomes
//! `None` instead of failing the whole response.

use domain::CatalogMatch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a field, turning type mismatches into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// `GET /search/titles?query=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub titles: Option<Vec<SearchHit>>,
}

impl SearchResponse {
    /// Parse a search body; anything that is not an object means no hits.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Hits in the service's relevance order.
    pub fn hits(&self) -> &[SearchHit] {
        self.titles.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_title: Option<String>,
}

/// `GET /titles/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<RatingInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_image: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub aggregate_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub vote_count: Option<u64>,
}

/// Artwork reference: either `{ "url": ... }` or a bare URL string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Object(ImageObject),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageObject {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
}

impl ImageRef {
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::Url(url) => Some(url.as_str()),
            ImageRef::Object(object) => object.url.as_deref(),
        }
    }
}

impl TitleDetail {
    /// Parse a detail body; a body that is not an object yields an empty detail.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Convert into a `CatalogMatch`, falling back to `searched_id` for the id.
    pub fn into_match(self, searched_id: &str) -> CatalogMatch {
        let image_url = self
            .primary_image
            .as_ref()
            .and_then(ImageRef::url)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        CatalogMatch {
            id: self.id.unwrap_or_else(|| searched_id.to_string()),
            primary_title: self.primary_title,
            plot: self.plot,
            rating: self.rating.and_then(|rating| rating.aggregate_rating),
            genres: self.genres.unwrap_or_default(),
            image_url,
        }
    }
}
