use serde::{Deserialize, Serialize};

use crate::ledger::GameKind;
use crate::shared::ChatId;
use crate::stickers::StickerRecord;

/// Sticker as delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    #[serde(default)]
    pub set_name: Option<String>,
    pub unique_id: String,
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub is_animated: bool,
}

impl Sticker {
    pub fn to_record(&self) -> StickerRecord {
        StickerRecord {
            sticker_unique_id: self.unique_id.clone(),
            sticker_file_id: self.file_id.clone(),
            width: self.width,
            height: self.height,
            is_animated: self.is_animated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerEvent {
    pub chat_id: ChatId,
    pub user_handle: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    pub sticker: Sticker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEvent {
    pub chat_id: ChatId,
    pub user_handle: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    pub text: String,
}

/// Outcome of handling an event, rendered by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineReply {
    /// `user` was credited `awarded` points in today's record of `game`
    Credited {
        game: GameKind,
        user: String,
        awarded: u32,
        total_today: u32,
    },
    /// A second puzzle result from the same user on the same day
    AlreadyPlayedToday { user: String },
    /// Only produced in verbose mode
    Diagnostic { message: String },
}

impl EngineReply {
    /// Text to send back to the chat, if the reply is meant to be visible
    pub fn message(&self) -> Option<String> {
        match self {
            EngineReply::Credited {
                game: GameKind::Puzzle,
                user,
                awarded,
                ..
            } => Some(format!("{user} suma {awarded} puntos hoy")),
            EngineReply::Credited { .. } => None,
            EngineReply::AlreadyPlayedToday { user } => {
                Some(format!("{user}, ya jugaste hoy"))
            }
            EngineReply::Diagnostic { message } => Some(message.clone()),
        }
    }
}
