// Library crate for the loser-of-the-day game ledger
// This file exposes the public API for integration tests

pub mod api;
pub mod classify;
pub mod clock;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod persistence;
pub mod shared;
pub mod stickers;

// Re-export commonly used types for easier access in tests
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, StorageConfig};
pub use engine::{EngineError, EngineReply, GameEngine, Sticker, StickerEvent, TextEvent};
pub use ledger::{GameKind, Leaderboard, LeaderboardEntry, ResultLedger};
pub use shared::{AppError, AppState, ChatId};
