pub mod events;
pub mod service;

mod errors;

pub use errors::EngineError;
pub use events::{EngineReply, Sticker, StickerEvent, TextEvent};
pub use service::{GameEngine, GameEngineBuilder};
