//! Core traits for publishing results.
//!
//! This module defines the `MessageSink` trait: the only way the pipeline
//! talks to the chat host. The host's wire protocol stays on the other side
//! of it.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

/// Who sees a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Everyone in the channel
    #[default]
    Broadcast,
    /// Only the member who asked
    Private,
}

impl Visibility {
    pub fn from_broadcast(broadcast: bool) -> Self {
        if broadcast {
            Visibility::Broadcast
        } else {
            Visibility::Private
        }
    }
}

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub visibility: Visibility,
    /// Image the host may embed under the text
    pub embed_image_url: Option<String>,
}

impl Message {
    pub fn new(text: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            text: text.into(),
            visibility,
            embed_image_url: None,
        }
    }

    pub fn broadcast(text: impl Into<String>) -> Self {
        Self::new(text, Visibility::Broadcast)
    }

    pub fn with_embed(mut self, url: Option<String>) -> Self {
        self.embed_image_url = url;
        self
    }
}

/// Poll creation request. Options keep their order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub duration: Duration,
    pub multi_select: bool,
}

/// Scheduled-event creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub name: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Cover image, PNG-encoded
    pub image: Option<Vec<u8>>,
}

/// Image bytes posted with accompanying text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub text: String,
}

/// Destination for everything the pipeline publishes.
///
/// ## Design Note
/// - `Send + Sync` so one sink can be shared by the orchestrator and planner
/// - Errors are `anyhow` because each host reports failures differently
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, message: Message) -> Result<()>;

    async fn create_poll(&self, poll: PollRequest) -> Result<()>;

    async fn create_event(&self, event: EventRequest) -> Result<()>;

    async fn send_attachment(&self, attachment: Attachment) -> Result<()>;
}
