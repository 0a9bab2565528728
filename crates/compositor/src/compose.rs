//! Resize-and-join of downloaded artwork.
//!
//! ## Algorithm
//! 1. Download every URL in order; the first failure aborts
//! 2. Decode each payload
//! 3. Pick the target height (requested, else the tallest image)
//! 4. Scale each image to that height, keeping its aspect ratio; a canvas
//!    over `MAX_DIMENSION` on either edge or over `MAX_PIXELS` is refused
//! 5. Paste them left to right on a transparent canvas and encode as PNG
//!
//! Steps 2 to 5 are CPU-bound and run on the blocking pool.

use std::io::Cursor;

use domain::{CompositeImage, SharedReporter};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::error::{CompositeError, Result};
use crate::source::{HttpImageSource, ImageSource};

/// Longest edge a banner may have, in pixels.
pub const MAX_DIMENSION: u32 = 32_768;

/// Largest pixel count a banner may have.
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Builds composite banners from artwork URLs.
pub struct ImageCompositor<S = HttpImageSource> {
    source: S,
    reporter: SharedReporter,
}

impl ImageCompositor<HttpImageSource> {
    /// Compositor downloading over HTTP.
    pub fn connect(reporter: SharedReporter) -> Result<Self> {
        Ok(Self::new(HttpImageSource::new()?, reporter))
    }
}

impl<S: ImageSource> ImageCompositor<S> {
    pub fn new(source: S, reporter: SharedReporter) -> Self {
        Self { source, reporter }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download, scale and join `urls` into one PNG banner.
    ///
    /// `target_height` defaults to the tallest downloaded image.
    pub async fn compose(
        &self,
        urls: &[String],
        target_height: Option<u32>,
    ) -> Result<CompositeImage> {
        if urls.is_empty() {
            return Err(CompositeError::NoImagesProvided);
        }

        self.reporter
            .progress(&format!("Building banner from {} images", urls.len()));

        let mut payloads = Vec::with_capacity(urls.len());
        for url in urls {
            debug!(url = %url, "Downloading artwork");
            match self.source.download(url).await {
                Ok(bytes) => payloads.push((url.clone(), bytes)),
                Err(error) => {
                    self.reporter.failure(&error.to_string());
                    return Err(error);
                }
            }
        }

        let composite = tokio::task::spawn_blocking(move || {
            let images = payloads
                .iter()
                .map(|(url, bytes)| decode(url, bytes))
                .collect::<Result<Vec<_>>>()?;
            render(&images, target_height)
        })
        .await
        .map_err(|e| CompositeError::Task(e.to_string()))??;

        info!(
            images = urls.len(),
            width = composite.width,
            height = composite.height,
            "Banner built"
        );
        Ok(composite)
    }
}

fn decode(url: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| CompositeError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Width of an image scaled to `target_height`, never below one pixel.
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    if height == 0 {
        return 1;
    }
    let scaled = (f64::from(width) * f64::from(target_height) / f64::from(height)).round();
    (scaled as u32).max(1)
}

/// Scale every image to a common height and paste them side by side.
///
/// Pixels not covered by an image stay fully transparent. Nothing is
/// resized or allocated when the resulting canvas would exceed the limits.
pub fn join_horizontally(images: &[DynamicImage], target_height: Option<u32>) -> Result<RgbaImage> {
    let target_height = target_height
        .or_else(|| images.iter().map(DynamicImage::height).max())
        .unwrap_or(1)
        .max(1);

    let widths: Vec<u32> = images
        .iter()
        .map(|image| scaled_width(image.width(), image.height(), target_height))
        .collect();
    let total_width = checked_canvas_width(&widths, target_height)?;

    let mut canvas = RgbaImage::new(total_width, target_height);
    let mut x_offset = 0i64;
    for (image, &width) in images.iter().zip(&widths) {
        let scaled = if (image.width(), image.height()) == (width, target_height) {
            image.to_rgba8()
        } else {
            image
                .resize_exact(width, target_height, FilterType::Lanczos3)
                .to_rgba8()
        };
        imageops::overlay(&mut canvas, &scaled, x_offset, 0);
        x_offset += i64::from(width);
    }
    Ok(canvas)
}

fn checked_canvas_width(widths: &[u32], height: u32) -> Result<u32> {
    let too_large = || CompositeError::TooLarge {
        width: widths.iter().map(|&w| u64::from(w)).sum(),
        height,
    };

    let width = widths
        .iter()
        .try_fold(0u32, |total, &w| total.checked_add(w))
        .ok_or_else(too_large)?
        .max(1);

    if width > MAX_DIMENSION
        || height > MAX_DIMENSION
        || u64::from(width) * u64::from(height) > MAX_PIXELS
    {
        return Err(too_large());
    }
    Ok(width)
}

fn render(images: &[DynamicImage], target_height: Option<u32>) -> Result<CompositeImage> {
    let canvas = join_horizontally(images, target_height)?;
    let (width, height) = canvas.dimensions();

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| CompositeError::Encode(e.to_string()))?;

    Ok(CompositeImage {
        bytes: cursor.into_inner(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, StaticImageSource};
    use domain::{MemoryReporter, ReportLevel};
    use image::{GenericImageView, Rgba};
    use std::sync::Arc;

    fn compositor(source: StaticImageSource) -> (ImageCompositor<StaticImageSource>, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        (ImageCompositor::new(source, reporter.clone()), reporter)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scaled_width_keeps_aspect_ratio() {
        assert_eq!(scaled_width(100, 100, 150), 150);
        assert_eq!(scaled_width(200, 200, 150), 150);
        assert_eq!(scaled_width(300, 200, 100), 150);
        assert_eq!(scaled_width(1, 1000, 10), 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let (compositor, _) = compositor(StaticImageSource::new());
        let error = compositor.compose(&[], None).await.unwrap_err();
        assert_eq!(error, CompositeError::NoImagesProvided);
    }

    #[tokio::test]
    async fn test_two_images_scaled_to_target_height() {
        let source = StaticImageSource::new()
            .with("a", png_bytes(100, 100, [255, 0, 0, 255]))
            .with("b", png_bytes(200, 200, [0, 0, 255, 255]));
        let (compositor, _) = compositor(source);

        let composite = compositor.compose(&urls(&["a", "b"]), Some(150)).await.unwrap();

        assert_eq!((composite.width, composite.height), (300, 150));
        let decoded = image::load_from_memory(&composite.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (300, 150));
    }

    #[tokio::test]
    async fn test_default_height_is_tallest_image() {
        let source = StaticImageSource::new()
            .with("short", png_bytes(50, 100, [255, 0, 0, 255]))
            .with("tall", png_bytes(100, 200, [0, 255, 0, 255]));
        let (compositor, _) = compositor(source);

        let composite = compositor.compose(&urls(&["short", "tall"]), None).await.unwrap();

        assert_eq!(composite.height, 200);
        assert_eq!(composite.width, 100 + 100);
    }

    #[tokio::test]
    async fn test_images_joined_left_to_right_in_input_order() {
        let source = StaticImageSource::new()
            .with("red", png_bytes(10, 10, [255, 0, 0, 255]))
            .with("blue", png_bytes(10, 10, [0, 0, 255, 255]));
        let (compositor, _) = compositor(source);

        let composite = compositor.compose(&urls(&["blue", "red"]), None).await.unwrap();
        let decoded = image::load_from_memory(&composite.bytes).unwrap().to_rgba8();

        assert_eq!(*decoded.get_pixel(2, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(*decoded.get_pixel(17, 5), Rgba([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_any_download_failure_fails_composite() {
        let source = StaticImageSource::new().with("a", png_bytes(10, 10, [0, 0, 0, 255]));
        let (compositor, reporter) = compositor(source);

        let error = compositor
            .compose(&urls(&["a", "missing", "a"]), None)
            .await
            .unwrap_err();

        assert!(matches!(error, CompositeError::Download { ref url, .. } if url == "missing"));
        assert_eq!(reporter.lines_at(ReportLevel::Failure).len(), 1);
        // Downloads stop at the first failure.
        assert_eq!(compositor.source().requested(), urls(&["a", "missing"]));
    }

    #[tokio::test]
    async fn test_undecodable_payload_fails_composite() {
        let source = StaticImageSource::new().with("junk", b"not an image".to_vec());
        let (compositor, _) = compositor(source);

        let error = compositor.compose(&urls(&["junk"]), None).await.unwrap_err();
        assert!(matches!(error, CompositeError::Decode { .. }));
    }

    #[test]
    fn test_uncovered_area_is_transparent() {
        let canvas = join_horizontally(&[], Some(4)).unwrap();
        assert_eq!(canvas.dimensions(), (1, 4));
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
    }

    #[tokio::test]
    async fn test_extreme_aspect_ratios_are_refused() {
        let source = StaticImageSource::new()
            .with("wide", png_bytes(60_000, 1, [255, 0, 0, 255]))
            .with("tall", png_bytes(1, 60_000, [0, 0, 255, 255]));
        let (compositor, _) = compositor(source);

        let error = compositor.compose(&urls(&["wide", "tall"]), None).await.unwrap_err();
        assert!(matches!(error, CompositeError::TooLarge { height: 60_000, .. }));
    }

    #[test]
    fn test_oversized_target_height_is_refused() {
        let poster = DynamicImage::ImageRgba8(RgbaImage::new(2, 3));
        let error = join_horizontally(&[poster], Some(100_000)).unwrap_err();
        assert_eq!(
            error,
            CompositeError::TooLarge {
                width: 66_667,
                height: 100_000
            }
        );
    }

    #[test]
    fn test_total_width_over_limit_is_refused() {
        let strip = DynamicImage::ImageRgba8(RgbaImage::new(20_000, 10));
        let error = join_horizontally(&[strip.clone(), strip], None).unwrap_err();
        assert_eq!(
            error,
            CompositeError::TooLarge {
                width: 40_000,
                height: 10
            }
        );
    }

    #[test]
    fn test_canvas_width_overflow_is_refused() {
        let error = checked_canvas_width(&[u32::MAX, 2], 1).unwrap_err();
        assert!(matches!(error, CompositeError::TooLarge { height: 1, .. }));
        assert!(checked_canvas_width(&[4096, 4096], 8192).is_ok());
        assert!(checked_canvas_width(&[8192, 8192], 8192).is_err());
    }
}
