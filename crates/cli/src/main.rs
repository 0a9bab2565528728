mod console;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::{EnrichmentResult, TracingReporter};
use pipeline::Visibility;
use planner::{Config, MovieNightPlanner, PollSnapshot};
use schedule::{TimestampStyle, poll_duration};
use std::path::PathBuf;
use std::time::Instant;

use crate::console::ConsoleSink;

/// Movie Night - plan the weekly movie night
#[derive(Parser)]
#[command(name = "movie-night")]
#[command(about = "Polls, catalog details and banners for the weekly movie night", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "MOVIE_NIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the catalog service base URL
    #[arg(long, env = "MOVIE_NIGHT_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Override the movie night start time (HH:MM)
    #[arg(long, env = "MOVIE_NIGHT_TIME")]
    time_of_day: Option<String>,

    /// Override the UTC offset in minutes
    #[arg(long, env = "MOVIE_NIGHT_UTC_OFFSET", allow_negative_numbers = true)]
    utc_offset_minutes: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Announce a movie night: poll, details, banner, event and reminder
    Announce {
        /// Candidate titles separated by '|', e.g. "Alien | Heat"
        #[arg(long)]
        titles: String,

        /// Directory the banner is written to
        #[arg(long)]
        banner_out: Option<PathBuf>,

        /// Pretend the current time is this RFC 3339 instant
        #[arg(long)]
        now: Option<String>,
    },

    /// Decide a poll from its vote counts
    Decide {
        /// Poll question
        #[arg(long, default_value = "What are we watching?")]
        question: String,

        /// Option and vote count as LABEL=VOTES, repeatable
        #[arg(long = "option", value_name = "LABEL=VOTES")]
        options: Vec<String>,

        /// Treat the poll as still open
        #[arg(long)]
        unfinished: bool,

        /// Only show the result to yourself
        #[arg(long)]
        private: bool,
    },

    /// Show the next movie night and its timestamp markers
    Next {
        /// Pretend the current time is this RFC 3339 instant
        #[arg(long)]
        now: Option<String>,
    },

    /// Pick a random member
    Pick {
        /// Member id, repeatable
        #[arg(long = "member", value_name = "ID", required = true)]
        members: Vec<String>,

        /// Only show the result to yourself
        #[arg(long)]
        private: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Announce {
            titles,
            banner_out,
            now,
        } => handle_announce(config, &titles, banner_out, now.as_deref()).await?,
        Commands::Decide {
            question,
            options,
            unfinished,
            private,
        } => handle_decide(config, question, &options, unfinished, private).await?,
        Commands::Next { now } => handle_next(config, now.as_deref())?,
        Commands::Pick { members, private } => handle_pick(config, &members, private).await?,
    }

    Ok(())
}

/// Config file first, then command-line and environment overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = &cli.catalog_url {
        config.catalog.base_url = url.clone();
    }
    if let Some(time) = &cli.time_of_day {
        config.schedule.time_of_day = time.clone();
    }
    if let Some(minutes) = cli.utc_offset_minutes {
        config.schedule.utc_offset_minutes = minutes;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(text) => Ok(DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("Invalid --now value '{text}'"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn build_planner(config: Config) -> Result<MovieNightPlanner> {
    MovieNightPlanner::from_config(config, TracingReporter::shared("planner"))
}

/// Handle the 'announce' command
async fn handle_announce(
    config: Config,
    titles: &str,
    banner_out: Option<PathBuf>,
    now: Option<&str>,
) -> Result<()> {
    let now = parse_now(now)?;
    let planner = build_planner(config)?;
    let sink = ConsoleSink::new(banner_out);

    let start = Instant::now();
    let Some(report) = planner.announce(titles, now, &sink).await? else {
        return Ok(());
    };

    println!();
    println!("{}", "Summary:".bold().blue());
    for entry in report.batch.entries() {
        let mark = match &entry.result {
            EnrichmentResult::Success(_) => "✓".green(),
            EnrichmentResult::NotFound => "?".yellow(),
            _ => "✗".red(),
        };
        println!("  {} {} ({})", mark, entry.title, entry.result.kind());
    }
    println!(
        "  Banner: {}",
        if report.has_banner() { "yes".green() } else { "no".yellow() }
    );
    println!("  Finished in {:.2?}", start.elapsed());
    Ok(())
}

/// Parse `LABEL=VOTES`. The label may itself contain '='.
fn parse_option(raw: &str) -> Result<(String, u32)> {
    let (label, votes) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Option '{raw}' must look like LABEL=VOTES"))?;
    let votes = votes
        .trim()
        .parse()
        .with_context(|| format!("Invalid vote count in '{raw}'"))?;
    Ok((label.trim().to_string(), votes))
}

/// Handle the 'decide' command
async fn handle_decide(
    config: Config,
    question: String,
    options: &[String],
    unfinished: bool,
    private: bool,
) -> Result<()> {
    let answers = options
        .iter()
        .map(|raw| parse_option(raw))
        .collect::<Result<Vec<_>>>()?;
    let snapshot = PollSnapshot {
        question,
        finalized: !unfinished,
        answers,
    };

    let planner = build_planner(config)?;
    let sink = ConsoleSink::new(None);
    planner
        .decide(&snapshot, Visibility::from_broadcast(!private), &sink)
        .await?;
    Ok(())
}

/// Handle the 'next' command
fn handle_next(config: Config, now: Option<&str>) -> Result<()> {
    let planner = build_planner(config)?;
    let now = parse_now(now)?;
    let next = planner.next_occurrence(now);
    let now = now.with_timezone(next.offset());

    println!("{}", "Next movie night:".bold().blue());
    println!("  {}", next.format("%A %Y-%m-%d %H:%M %:z"));
    let left = poll_duration(&now, &next);
    println!(
        "  in {}d {}h {}m",
        left.as_secs() / 86_400,
        left.as_secs() % 86_400 / 3600,
        left.as_secs() % 3600 / 60
    );
    for style in [TimestampStyle::ShortDateTime, TimestampStyle::Relative] {
        println!("  {:<16} {}", format!("{style:?}"), style.marker(&next));
    }
    Ok(())
}

/// Handle the 'pick' command
async fn handle_pick(config: Config, members: &[String], private: bool) -> Result<()> {
    let planner = build_planner(config)?;
    let sink = ConsoleSink::new(None);
    planner
        .pick_member(members, Visibility::from_broadcast(!private), &sink)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(parse_option("Alien=3").unwrap(), ("Alien".to_string(), 3));
        assert_eq!(parse_option("A=B = 2").unwrap(), ("A=B".to_string(), 2));
        assert!(parse_option("Alien").is_err());
        assert!(parse_option("Alien=-1").is_err());
    }

    #[test]
    fn test_parse_now() {
        let now = parse_now(Some("2024-01-03T21:00:00+01:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2024-01-03T20:00:00+00:00");
        assert!(parse_now(Some("yesterday")).is_err());
    }

    #[test]
    fn test_announce_arguments() {
        let cli = Cli::try_parse_from([
            "movie-night",
            "--utc-offset-minutes",
            "-300",
            "announce",
            "--titles",
            "Alien | Heat",
        ])
        .unwrap();
        assert_eq!(cli.utc_offset_minutes, Some(-300));
        assert!(matches!(cli.command, Commands::Announce { ref titles, .. } if titles == "Alien | Heat"));
    }
}
