use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Which calendar days a game is "live" on
#[derive(Debug, Clone, Copy)]
pub enum DayRule {
    AnyDay,
    Weekday(Weekday),
    /// Injected calendar, e.g. holidays or alternating weeks
    Custom(fn(NaiveDate) -> bool),
}

impl DayRule {
    pub fn allows(&self, date: NaiveDate) -> bool {
        match self {
            DayRule::AnyDay => true,
            DayRule::Weekday(weekday) => date.weekday() == *weekday,
            DayRule::Custom(predicate) => predicate(date),
        }
    }
}

/// Static description of a scoring variant: where it is stored and when it is played
#[derive(Debug, Clone, Copy)]
pub struct GameDescriptor {
    pub prefix: &'static str,
    pub rule: DayRule,
}

impl GameDescriptor {
    pub const fn new(prefix: &'static str, rule: DayRule) -> Self {
        Self { prefix, rule }
    }

    pub fn is_valid_day(&self, date: NaiveDate) -> bool {
        self.rule.allows(date)
    }
}

/// The games tracked per chat
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameKind {
    /// Wednesday: stickers from outside the allow-list
    AllowList,
    /// Monday: stickers already sent earlier that day
    Repeat,
    /// Every day: reported word-puzzle score
    Puzzle,
}

const ALLOW_LIST_GAME: GameDescriptor =
    GameDescriptor::new("resultados", DayRule::Weekday(Weekday::Wed));
const REPEAT_GAME: GameDescriptor =
    GameDescriptor::new("repetidos", DayRule::Weekday(Weekday::Mon));
const PUZZLE_GAME: GameDescriptor = GameDescriptor::new("wordle", DayRule::AnyDay);

impl GameKind {
    pub fn descriptor(&self) -> GameDescriptor {
        match self {
            GameKind::AllowList => ALLOW_LIST_GAME,
            GameKind::Repeat => REPEAT_GAME,
            GameKind::Puzzle => PUZZLE_GAME,
        }
    }
}
