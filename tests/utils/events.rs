use loser_ledger::{ChatId, Sticker, StickerEvent, TextEvent};

// ============================================================================
// Event Builders
// ============================================================================

pub fn sticker(chat_id: ChatId, user: &str, set_name: &str, unique_id: &str) -> StickerEvent {
    StickerEvent {
        chat_id,
        user_handle: Some(user.to_string()),
        is_bot: false,
        sticker: Sticker {
            set_name: Some(set_name.to_string()),
            unique_id: unique_id.to_string(),
            file_id: format!("file-{unique_id}"),
            width: 512,
            height: 512,
            is_animated: false,
        },
    }
}

pub fn text(chat_id: ChatId, user: &str, text: &str) -> TextEvent {
    TextEvent {
        chat_id,
        user_handle: Some(user.to_string()),
        is_bot: false,
        text: text.to_string(),
    }
}

pub fn puzzle(chat_id: ChatId, user: &str, index: u32, score: u32) -> TextEvent {
    text(
        chat_id,
        user,
        &format!("Wordle (ES) #{index} {score}/6\n\n🟩🟩🟩🟩🟩"),
    )
}
