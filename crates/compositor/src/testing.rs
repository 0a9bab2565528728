//! In-memory image source for tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::{CompositeError, Result};
use crate::source::ImageSource;

/// Serves fixed payloads by URL. Unknown URLs fail to download.
#[derive(Debug, Default)]
pub struct StaticImageSource {
    images: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StaticImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(url.into(), bytes);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| CompositeError::Download {
                url: url.to_string(),
                reason: "status code 404".to_string(),
            })
    }
}

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut cursor = Cursor::new(Vec::new());
    // Encoding an in-memory RGBA buffer to PNG cannot fail.
    let _ = DynamicImage::ImageRgba8(image).write_to(&mut cursor, ImageFormat::Png);
    cursor.into_inner()
}
