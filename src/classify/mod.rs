//! Stateless decisions turning an inbound event into at most one ledger credit.

pub mod puzzle;
pub mod sticker;

pub use puzzle::{classify_puzzle, parse_puzzle_result, PuzzleResult, PuzzleVerdict};
pub use sticker::{classify_repeat, is_disallowed, RepeatVerdict};
