//! # Movie Night Planner
//!
//! The three user-facing flows:
//! - `announce`: poll + per-title details + banner + event + reminder
//! - `decide`: settle a finished poll, breaking ties at random
//! - `pick_member`: draw one member with a short suspense pause
//!
//! Every flow publishes through a `MessageSink` supplied by the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use catalog_client::{CatalogResolver, HttpTransport, ReqwestTransport};
use chrono::{DateTime, FixedOffset, Utc};
use compositor::{HttpImageSource, ImageCompositor, ImageSource};
use domain::{Batch, CompositeImage, Decision, PollTally, SharedReporter, Title};
use pipeline::{
    anticipation_line, pick_member_with_rng, resolve_tally, selection_line, Attachment,
    EventRequest, Message, MessageSink, PollRequest, Visibility,
};
use rand::Rng;
use schedule::{poll_duration, TimestampStyle, WeeklySlot};
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::EnrichmentOrchestrator;

/// Separator between titles in the raw announce input.
pub const TITLE_SEPARATOR: char = '|';
/// File name the banner is attached under.
pub const BANNER_FILE_NAME: &str = "movie-night.png";

const USAGE: &str =
    "Give me at least one movie, separated by `|`. Example: `Alien | Heat | The Thing`";
const POLL_NOT_FINISHED: &str = "This poll isn't finished yet! A little patience 😊";

/// What an announcement produced.
#[derive(Debug, Clone)]
pub struct AnnouncementReport {
    pub occurrence: DateTime<FixedOffset>,
    pub poll_duration: Duration,
    pub batch: Batch,
    pub banner: Option<CompositeImage>,
}

impl AnnouncementReport {
    pub fn has_banner(&self) -> bool {
        self.banner.is_some()
    }
}

/// State of a poll as read back from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    pub question: String,
    pub finalized: bool,
    /// Answer labels with their vote counts, in display order
    pub answers: Vec<(String, u32)>,
}

/// A member draw, decided before anything is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickDraw {
    pub member: String,
    pub anticipation: &'static str,
    pub selection: String,
}

impl PickDraw {
    pub fn draw<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Result<Self> {
        let member = pick_member_with_rng(pool, rng)?;
        let anticipation = anticipation_line(rng);
        let selection = selection_line(&member, rng);
        Ok(Self {
            member,
            anticipation,
            selection,
        })
    }
}

/// Split `A | B | C` into trimmed, non-empty titles.
pub fn parse_titles(raw: &str) -> Vec<Title> {
    raw.split(TITLE_SEPARATOR)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct MovieNightPlanner<T = ReqwestTransport, S = HttpImageSource> {
    orchestrator: EnrichmentOrchestrator<T, S>,
    config: Config,
    slot: WeeklySlot,
    offset: FixedOffset,
    reporter: SharedReporter,
}

impl MovieNightPlanner<ReqwestTransport, HttpImageSource> {
    /// Planner talking to the real catalog and image hosts.
    pub fn from_config(config: Config, reporter: SharedReporter) -> Result<Self> {
        let resolver = CatalogResolver::connect(config.catalog_settings(), reporter.clone())
            .context("Failed to create catalog client")?;
        let compositor =
            ImageCompositor::connect(reporter.clone()).context("Failed to create image client")?;
        let orchestrator = EnrichmentOrchestrator::new(
            resolver,
            compositor,
            config.banner.target_height,
            reporter.clone(),
        );
        Self::new(orchestrator, config, reporter)
    }
}

impl<T: HttpTransport, S: ImageSource> MovieNightPlanner<T, S> {
    pub fn new(
        orchestrator: EnrichmentOrchestrator<T, S>,
        config: Config,
        reporter: SharedReporter,
    ) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let slot = config.weekly_slot()?;
        let offset = config.utc_offset()?;
        Ok(Self {
            orchestrator,
            config,
            slot,
            offset,
            reporter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &EnrichmentOrchestrator<T, S> {
        &self.orchestrator
    }

    /// Next movie night after `now`, in the configured offset.
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        self.slot.next_after_at(&now.with_timezone(&self.offset))
    }

    /// Announce a movie night for the titles in `raw_titles`.
    ///
    /// Returns `None` when the input held no titles; a usage hint is sent
    /// privately in that case.
    pub async fn announce(
        &self,
        raw_titles: &str,
        now: DateTime<Utc>,
        sink: &dyn MessageSink,
    ) -> Result<Option<AnnouncementReport>> {
        let titles = parse_titles(raw_titles);
        if titles.is_empty() {
            sink.send_message(Message::new(USAGE, Visibility::Private))
                .await
                .context("Failed to send usage hint")?;
            return Ok(None);
        }

        let occurrence = self.next_occurrence(now);
        let now = now.with_timezone(&self.offset);
        let duration = poll_duration(&now, &occurrence);
        info!(
            titles = titles.len(),
            occurrence = %occurrence,
            poll_secs = duration.as_secs(),
            "Announcing movie night"
        );

        sink.create_poll(PollRequest {
            question: self.config.announce.poll_question.clone(),
            options: titles.clone(),
            duration,
            multi_select: true,
        })
        .await
        .context("Failed to create poll")?;

        let run = self.orchestrator.run_and_publish(&titles, sink).await;

        if let Some(banner) = &run.banner {
            sink.send_attachment(Attachment {
                file_name: BANNER_FILE_NAME.to_string(),
                bytes: banner.bytes.clone(),
                text: "Tonight's lineup".to_string(),
            })
            .await
            .context("Failed to send banner")?;
        }

        self.schedule_event(&titles, occurrence, run.banner.as_ref(), sink)
            .await;

        sink.send_message(Message::broadcast(self.reminder(&occurrence)))
            .await
            .context("Failed to send reminder")?;

        Ok(Some(AnnouncementReport {
            occurrence,
            poll_duration: duration,
            batch: run.batch,
            banner: run.banner,
        }))
    }

    /// Event creation is best effort: some hosts do not allow it.
    async fn schedule_event(
        &self,
        titles: &[Title],
        start: DateTime<FixedOffset>,
        banner: Option<&CompositeImage>,
        sink: &dyn MessageSink,
    ) {
        let event = EventRequest {
            name: self.config.announce.event_name.clone(),
            description: format!("Candidates: {}", titles.join(", ")),
            start,
            end: start + self.config.event_duration(),
            image: banner.map(|banner| banner.bytes.clone()),
        };

        if let Err(error) = sink.create_event(event).await {
            warn!(error = %error, "Event not created");
            self.reporter
                .warning(&format!("Could not create the scheduled event: {error:#}"));
        }
    }

    fn reminder(&self, occurrence: &DateTime<FixedOffset>) -> String {
        let audience = match &self.config.announce.reminder_role_id {
            Some(role) => format!("<@&{role}>"),
            None => "everyone".to_string(),
        };
        format!(
            "## Hey {audience}! Don't forget to vote for the movie night film! \
             Movie night is on {} ({}).",
            TimestampStyle::ShortDateTime.marker(occurrence),
            TimestampStyle::Relative.marker(occurrence),
        )
    }

    /// Settle a poll. `None` when the poll is still open.
    ///
    /// Answers sharing a label count as one option with their votes summed.
    pub async fn decide(
        &self,
        poll: &PollSnapshot,
        visibility: Visibility,
        sink: &dyn MessageSink,
    ) -> Result<Option<Decision>> {
        if !poll.finalized {
            sink.send_message(Message::new(POLL_NOT_FINISHED, visibility))
                .await
                .context("Failed to send poll status")?;
            return Ok(None);
        }

        let tally = PollTally::merged(poll.answers.iter().cloned())?;
        let decision = resolve_tally(&tally)?;
        info!(option = %decision.option, tie = decision.was_tie, "Poll decided");

        let text = if decision.was_tie {
            format!(
                "# The poll *{}* ended in a tie, so I picked at random: **{}** is your final choice!",
                poll.question, decision.option
            )
        } else {
            format!(
                "# The poll *{}* has a winner: **{}**!",
                poll.question, decision.option
            )
        };
        sink.send_message(Message::new(text, visibility))
            .await
            .context("Failed to send decision")?;

        Ok(Some(decision))
    }

    /// Draw one member from `pool` and reveal them after a pause.
    pub async fn pick_member(
        &self,
        pool: &[String],
        visibility: Visibility,
        sink: &dyn MessageSink,
    ) -> Result<String> {
        let draw = PickDraw::draw(pool, &mut rand::rng())?;
        self.reveal_pick(draw, visibility, sink).await
    }

    /// Publish a draw: anticipation line, pause, then the selection line.
    pub async fn reveal_pick(
        &self,
        draw: PickDraw,
        visibility: Visibility,
        sink: &dyn MessageSink,
    ) -> Result<String> {
        sink.send_message(Message::new(draw.anticipation, visibility))
            .await
            .context("Failed to send anticipation line")?;

        tokio::time::sleep(self.config.pick_pause()).await;

        sink.send_message(Message::new(draw.selection, visibility))
            .await
            .context("Failed to send selection line")?;

        info!(member = %draw.member, "Member picked");
        Ok(draw.member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_titles_trims_and_drops_blanks() {
        assert_eq!(
            parse_titles(" Alien |Heat|  | The Thing "),
            vec!["Alien", "Heat", "The Thing"]
        );
        assert!(parse_titles(" | |").is_empty());
        assert!(parse_titles("").is_empty());
    }

    #[test]
    fn test_parse_titles_keeps_order_and_duplicates() {
        assert_eq!(parse_titles("B|A|B"), vec!["B", "A", "B"]);
    }
}
