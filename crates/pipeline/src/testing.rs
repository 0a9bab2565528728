//! Recording message sink for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::traits::{Attachment, EventRequest, Message, MessageSink, PollRequest};

/// Everything a sink was asked to publish, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRecord {
    Message(Message),
    Poll(PollRequest),
    Event(EventRequest),
    Attachment(Attachment),
}

/// Keeps every request in memory. Can be told to reject event creation
/// or the first few messages.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<SinkRecord>>,
    reject_events: bool,
    rejected_messages: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_events() -> Self {
        Self {
            reject_events: true,
            ..Self::default()
        }
    }

    /// Sink whose first `count` messages fail and are not recorded.
    pub fn rejecting_first_messages(count: usize) -> Self {
        Self {
            rejected_messages: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn polls(&self) -> Vec<PollRequest> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Poll(poll) => Some(poll),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<EventRequest> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Event(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Attachment(attachment) => Some(attachment),
                _ => None,
            })
            .collect()
    }

    fn record(&self, record: SinkRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_message(&self, message: Message) -> Result<()> {
        let rejected = self
            .rejected_messages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if rejected.is_ok() {
            bail!("message rejected by the channel");
        }
        self.record(SinkRecord::Message(message));
        Ok(())
    }

    async fn create_poll(&self, poll: PollRequest) -> Result<()> {
        self.record(SinkRecord::Poll(poll));
        Ok(())
    }

    async fn create_event(&self, event: EventRequest) -> Result<()> {
        if self.reject_events {
            bail!("event creation is disabled on this server");
        }
        self.record(SinkRecord::Event(event));
        Ok(())
    }

    async fn send_attachment(&self, attachment: Attachment) -> Result<()> {
        self.record(SinkRecord::Attachment(attachment));
        Ok(())
    }
}
