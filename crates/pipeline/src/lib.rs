//! Publishing and decision layer of the movie-night pipeline.
//!
//! This crate provides:
//! - The `MessageSink` trait the chat host is reached through
//! - Text rendering of enrichment results
//! - Fair random choices for poll tie-breaks and member picks
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{resolve_tally, render_result, Message};
//!
//! for entry in batch.entries() {
//!     sink.send_message(Message::broadcast(render_result(&entry.title, &entry.result)))
//!         .await?;
//! }
//!
//! let decision = resolve_tally(&tally)?;
//! ```

pub mod decision;
pub mod message;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use decision::{
    anticipation_line, pick_member, pick_member_with_rng, resolve_tally, resolve_tally_with_rng,
    selection_line, DecisionError, ANTICIPATION_LINES, SELECTION_LINES,
};
pub use message::{render_match, render_result};
pub use traits::{Attachment, EventRequest, Message, MessageSink, PollRequest, Visibility};
