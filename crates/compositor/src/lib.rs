//! Composite banner builder.
//!
//! Downloads the artwork of resolved titles, scales every image to one
//! height and joins them left to right into a single PNG.
//!
//! ## Example Usage
//!
//! ```ignore
//! use compositor::ImageCompositor;
//! use domain::TracingReporter;
//!
//! let compositor = ImageCompositor::connect(TracingReporter::shared("compositor"))?;
//! let banner = compositor.compose(&batch.image_urls(), None).await?;
//! std::fs::write("banner.png", &banner.bytes)?;
//! ```

pub mod compose;
pub mod error;
pub mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compose::{join_horizontally, scaled_width, ImageCompositor, MAX_DIMENSION, MAX_PIXELS};
pub use error::{CompositeError, Result};
pub use source::{HttpImageSource, ImageSource};
