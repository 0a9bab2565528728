//! Errors raised while building the composite banner.

use thiserror::Error;

/// Any of these fails the whole composite; partial banners are never built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("No images were provided")]
    NoImagesProvided,

    #[error("Failed to download image {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to decode image {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Composite image of {width}x{height} exceeds the size limit")]
    TooLarge { width: u64, height: u32 },

    #[error("Failed to encode composite image: {0}")]
    Encode(String),

    #[error("Image task failed: {0}")]
    Task(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, CompositeError>;
