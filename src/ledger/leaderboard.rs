use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

use super::{GameKind, ResultLedger};

/// Number of most-recent day records shown in detail
pub const RECENT_DAYS_SHOWN: usize = 5;

pub const NO_RESULTS_MESSAGE: &str = "Aún no hay posiciones";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    pub total_points: u32,
    pub days_lost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub user: String,
    pub points: u32,
}

/// One day's standings, best (i.e. worst) first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStanding {
    pub date: NaiveDate,
    pub label: String,
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub game: GameKind,
    pub entries: Vec<LeaderboardEntry>,
    pub recent_days: Vec<DayStanding>,
}

/// Folds the whole ledger into per-user totals and days lost.
///
/// A day is lost by its sole participant, or by the top scorer when they strictly beat the
/// runner-up; a tie at the top costs nobody the day. Ordered by days lost, then points,
/// then handle.
pub fn aggregate(ledger: &ResultLedger) -> Vec<LeaderboardEntry> {
    let mut entries: HashMap<&str, LeaderboardEntry> = HashMap::new();

    for day in ledger.days() {
        for (user, points) in &day.positions {
            entries
                .entry(user.as_str())
                .or_insert_with(|| LeaderboardEntry {
                    user: user.clone(),
                    total_points: 0,
                    days_lost: 0,
                })
                .total_points += points;
        }

        let ranked = day.ranked();
        let loser = match ranked.as_slice() {
            [] => None,
            [(only, _)] => Some(*only),
            [(top, top_points), (_, second_points), ..] if top_points > second_points => {
                Some(*top)
            }
            _ => None,
        };

        if let Some(entry) = loser.and_then(|user| entries.get_mut(user)) {
            entry.days_lost += 1;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = entries.into_values().collect();
    entries.sort_by(|a, b| {
        b.days_lost
            .cmp(&a.days_lost)
            .then_with(|| b.total_points.cmp(&a.total_points))
            .then_with(|| a.user.cmp(&b.user))
    });
    entries
}

impl Leaderboard {
    pub fn from_ledger(game: GameKind, ledger: &ResultLedger, recent_limit: usize) -> Self {
        let recent_days = ledger
            .days()
            .iter()
            .take(recent_limit)
            .map(|day| DayStanding {
                date: day.date,
                label: day.label(),
                positions: day
                    .ranked()
                    .into_iter()
                    .map(|(user, points)| Position {
                        user: user.to_string(),
                        points,
                    })
                    .collect(),
            })
            .collect();

        Self {
            game,
            entries: aggregate(ledger),
            recent_days,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Markdown rendering: recent days in detail, then the overall standings
    pub fn render(&self) -> String {
        if !self.has_results() {
            return NO_RESULTS_MESSAGE.to_string();
        }

        let mut message = String::new();
        for day in &self.recent_days {
            let _ = write!(message, "*{}*\n\n", day.label);
            for position in &day.positions {
                let _ = writeln!(message, "{} - {}", position.user, position.points);
            }
            message.push('\n');
        }

        message.push_str("*Acumulado*\n\n");
        for entry in &self.entries {
            let _ = writeln!(
                message,
                "{} - {} días ({} pts)",
                entry.user, entry.days_lost, entry.total_points
            );
        }

        message
    }
}
