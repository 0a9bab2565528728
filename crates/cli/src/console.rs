//! Message sink that prints to the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use pipeline::{Attachment, EventRequest, Message, MessageSink, PollRequest, Visibility};

/// Prints everything it is asked to publish. Attachments are written to
/// `attachment_dir` when one is set.
pub struct ConsoleSink {
    attachment_dir: Option<PathBuf>,
}

impl ConsoleSink {
    pub fn new(attachment_dir: Option<PathBuf>) -> Self {
        Self { attachment_dir }
    }
}

fn visibility_tag(visibility: Visibility) -> colored::ColoredString {
    match visibility {
        Visibility::Broadcast => "[everyone]".green(),
        Visibility::Private => "[only you]".yellow(),
    }
}

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn send_message(&self, message: Message) -> Result<()> {
        println!("{} {}", visibility_tag(message.visibility), message.text);
        if let Some(url) = message.embed_image_url {
            println!("  {} {}", "image:".dimmed(), url);
        }
        Ok(())
    }

    async fn create_poll(&self, poll: PollRequest) -> Result<()> {
        println!(
            "{} {} (open for {}h{:02}m, {})",
            "Poll:".bold().blue(),
            poll.question,
            poll.duration.as_secs() / 3600,
            poll.duration.as_secs() % 3600 / 60,
            if poll.multi_select { "multiple choice" } else { "single choice" }
        );
        for (index, option) in poll.options.iter().enumerate() {
            println!("  {}. {}", (index + 1).to_string().green(), option);
        }
        Ok(())
    }

    async fn create_event(&self, event: EventRequest) -> Result<()> {
        println!(
            "{} {} from {} to {}",
            "Event:".bold().blue(),
            event.name,
            event.start.format("%a %Y-%m-%d %H:%M %:z"),
            event.end.format("%H:%M")
        );
        println!("  {}", event.description);
        if let Some(image) = &event.image {
            println!("  {} {} bytes", "cover:".dimmed(), image.len());
        }
        Ok(())
    }

    async fn send_attachment(&self, attachment: Attachment) -> Result<()> {
        println!(
            "{} {} ({} bytes) {}",
            "Attachment:".bold().blue(),
            attachment.file_name,
            attachment.bytes.len(),
            attachment.text
        );
        if let Some(dir) = &self.attachment_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = dir.join(&attachment.file_name);
            tokio::fs::write(&path, &attachment.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("  {} {}", "✓".green(), path.display());
        }
        Ok(())
    }
}
