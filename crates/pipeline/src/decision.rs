//! Fair random choices: poll tie-breaks and member picks.
//!
//! Every function has a `_with_rng` form taking the generator explicitly so
//! tests can seed it; the plain forms use the thread-local generator.

use domain::{Decision, PollTally};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("Poll has no options to decide between")]
    EmptyTally,

    #[error("No members to pick from")]
    EmptyPool,
}

pub type Result<T> = std::result::Result<T, DecisionError>;

/// Lines announcing that a pick is about to be revealed.
pub const ANTICIPATION_LINES: &[&str] = &[
    "## Ladies and gentlemen, get ready to welcome... a big winner! The suspense is unbearable...",
    "## Fate has spoken! But who is the chosen one of this grand ceremony of... pure chance?",
    "## Drum roll... 🥁 And the chosen one is...",
    "## Scanning the list... Thinking... Done, it's decided! Here is today's lucky one!",
    "## Here comes the announcement! Will it be you? Or you? No, it's...",
];

/// Lines revealing the pick. `{member}` is replaced by the mention.
pub const SELECTION_LINES: &[&str] = &[
    "## **Well done {member}, you have been chosen 🎯!** Hope you are ready for the challenge!",
    "## And {member} takes it this time! A round of applause for this display of pure luck! 👏",
    "## **Congratulations {member}!** The wheel turns... 🛞 and it just stopped on you!",
    "## Wow, {member}, you are the lucky one! Buy a lottery ticket 🎰 today, it's your day!",
    "## **Attention please... {member} just won the crown 👑!** Yes, you! 🎉",
];

/// Pick the winning option of a finished poll.
///
/// A single top option wins outright. Options sharing the top count are
/// drawn from uniformly and the decision is flagged as a tie.
pub fn resolve_tally(tally: &PollTally) -> Result<Decision> {
    resolve_tally_with_rng(tally, &mut rand::rng())
}

pub fn resolve_tally_with_rng<R: Rng + ?Sized>(tally: &PollTally, rng: &mut R) -> Result<Decision> {
    let max_votes = tally
        .iter()
        .map(|(_, votes)| votes)
        .max()
        .ok_or(DecisionError::EmptyTally)?;

    let leaders: Vec<&str> = tally
        .iter()
        .filter(|(_, votes)| *votes == max_votes)
        .map(|(label, _)| label)
        .collect();

    let was_tie = leaders.len() > 1;
    let option = leaders
        .choose(rng)
        .copied()
        .ok_or(DecisionError::EmptyTally)?;

    debug!(option, max_votes, tied = leaders.len(), "Poll decided");
    Ok(Decision {
        option: option.to_string(),
        was_tie,
    })
}

/// Pick one member uniformly. Repeated ids count once.
pub fn pick_member(pool: &[String]) -> Result<String> {
    pick_member_with_rng(pool, &mut rand::rng())
}

pub fn pick_member_with_rng<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Result<String> {
    let mut unique: Vec<&String> = Vec::with_capacity(pool.len());
    for member in pool {
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    unique
        .choose(rng)
        .map(|member| member.to_string())
        .ok_or(DecisionError::EmptyPool)
}

pub fn anticipation_line<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ANTICIPATION_LINES.choose(rng).copied().unwrap_or_default()
}

/// A selection line mentioning `member_id` as `<@id>`.
pub fn selection_line<R: Rng + ?Sized>(member_id: &str, rng: &mut R) -> String {
    SELECTION_LINES
        .choose(rng)
        .copied()
        .unwrap_or("{member}")
        .replace("{member}", &format!("<@{member_id}>"))
}
