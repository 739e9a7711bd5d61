use regex::Regex;
use std::sync::OnceLock;

use crate::ledger::DayRecord;

/// Highest score a puzzle result can report
pub const PUZZLE_MAX_SCORE: u32 = 6;

/// A shared result such as `Wordle (ES) #82 5/6`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleResult {
    pub puzzle_index: u32,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleVerdict {
    Credit(PuzzleResult),
    AlreadyPlayedToday(PuzzleResult),
    NoMatch,
}

fn result_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Wordle \(ES\) #(\d+) ([0-6])/6\b").expect("valid puzzle result regex")
    })
}

pub fn parse_puzzle_result(text: &str) -> Option<PuzzleResult> {
    let captures = result_pattern().captures(text)?;
    let puzzle_index = captures[1].parse().ok()?;
    let score: u32 = captures[2].parse().ok()?;
    (score <= PUZZLE_MAX_SCORE).then_some(PuzzleResult {
        puzzle_index,
        score,
    })
}

/// Decides whether `user` may be credited for `text` given today's record.
///
/// Only one result per user per day counts; later ones are rejected.
pub fn classify_puzzle(text: &str, user: &str, today: Option<&DayRecord>) -> PuzzleVerdict {
    let Some(result) = parse_puzzle_result(text) else {
        return PuzzleVerdict::NoMatch;
    };

    if today.is_some_and(|record| record.points_for(user).is_some()) {
        PuzzleVerdict::AlreadyPlayedToday(result)
    } else {
        PuzzleVerdict::Credit(result)
    }
}
