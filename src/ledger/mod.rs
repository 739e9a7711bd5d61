pub mod backfill;
pub mod game;
pub mod leaderboard;
pub mod models;
pub mod repository;
pub mod service;

mod errors;

pub use backfill::backfill;
pub use errors::LedgerError;
pub use game::{DayRule, GameDescriptor, GameKind};
pub use leaderboard::{aggregate, DayStanding, Leaderboard, LeaderboardEntry, Position};
pub use models::{add_points, DayRecord, ResultLedger};
pub use repository::{
    FileLedgerRepository, InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository,
};
pub use service::LedgerService;
