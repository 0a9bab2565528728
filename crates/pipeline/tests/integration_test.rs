//! Integration tests for the pipeline.
//!
//! These tests verify that rendering, the sink interface and the decision
//! helpers work together the way the planner drives them.

use anyhow::Result;
use async_trait::async_trait;
use domain::{Batch, CatalogMatch, EnrichmentResult, PollTally};
use pipeline::{
    render_result, resolve_tally, Attachment, EventRequest, Message, MessageSink, PollRequest,
    Visibility,
};
use std::sync::Mutex;

#[derive(Default)]
struct TranscriptSink {
    lines: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageSink for TranscriptSink {
    async fn send_message(&self, message: Message) -> Result<()> {
        self.lines.lock().unwrap().push(message.text);
        Ok(())
    }

    async fn create_poll(&self, poll: PollRequest) -> Result<()> {
        self.lines.lock().unwrap().push(format!("poll: {}", poll.options.join(" | ")));
        Ok(())
    }

    async fn create_event(&self, event: EventRequest) -> Result<()> {
        self.lines.lock().unwrap().push(format!("event: {}", event.name));
        Ok(())
    }

    async fn send_attachment(&self, attachment: Attachment) -> Result<()> {
        self.lines.lock().unwrap().push(format!("file: {}", attachment.file_name));
        Ok(())
    }
}

fn create_test_batch() -> Batch {
    let mut alien = CatalogMatch::new("tt0078748");
    alien.primary_title = Some("Alien".to_string());
    alien.genres = vec!["Horror".to_string()];

    let mut heat = CatalogMatch::new("tt0113277");
    heat.primary_title = Some("Heat".to_string());
    heat.rating = Some(8.3);

    let mut batch = Batch::new();
    batch.push("alien", EnrichmentResult::Success(alien));
    batch.push("no such film", EnrichmentResult::NotFound);
    batch.push("heat", EnrichmentResult::Success(heat));
    batch
}

#[tokio::test]
async fn test_batch_published_in_input_order() {
    let batch = create_test_batch();
    let sink = TranscriptSink::default();

    for entry in batch.entries() {
        sink.send_message(Message::new(
            render_result(&entry.title, &entry.result),
            Visibility::Broadcast,
        ))
        .await
        .unwrap();
    }

    let lines = sink.lines.lock().unwrap().clone();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("## Alien"));
    assert!(lines[0].contains(":warning: Horror :warning:"));
    assert!(lines[1].contains("no such film"));
    assert!(lines[2].starts_with("## Heat"));
    assert!(lines[2].contains("**8.3**"));
}

#[test]
fn test_poll_round_trip_to_decision() {
    let batch = create_test_batch();
    let options: Vec<String> = batch.entries().iter().map(|e| e.title.clone()).collect();

    let tally = PollTally::from_pairs(options.iter().cloned().zip([4, 1, 2])).unwrap();
    let decision = resolve_tally(&tally).unwrap();

    assert_eq!(decision.option, "alien");
    assert!(!decision.was_tie);
}

#[test]
fn test_visibility_from_flag() {
    assert_eq!(Visibility::from_broadcast(true), Visibility::Broadcast);
    assert_eq!(Visibility::from_broadcast(false), Visibility::Private);
}
