use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use crate::engine::{EngineReply, StickerEvent, TextEvent};
use crate::ledger::{GameKind, Leaderboard};
use crate::shared::{AppError, AppState, ChatId};

/// POST /events/sticker
#[instrument(name = "sticker_event", skip(state, event), fields(chat_id = event.chat_id))]
pub async fn post_sticker(
    State(state): State<AppState>,
    Json(event): Json<StickerEvent>,
) -> Result<Json<Vec<EngineReply>>, AppError> {
    if event.sticker.unique_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Sticker unique_id cannot be empty".to_string(),
        ));
    }

    let replies = state.engine.handle_sticker(&event).await?;
    info!(replies = replies.len(), "Sticker event handled");
    Ok(Json(replies))
}

/// POST /events/text
#[instrument(name = "text_event", skip(state, event), fields(chat_id = event.chat_id))]
pub async fn post_text(
    State(state): State<AppState>,
    Json(event): Json<TextEvent>,
) -> Result<Json<Vec<EngineReply>>, AppError> {
    let replies = state.engine.handle_text(&event).await?;
    Ok(Json(replies))
}

/// GET /chats/:chat_id/leaderboards/:game
#[instrument(name = "leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path((chat_id, game)): Path<(ChatId, GameKind)>,
) -> Result<Json<Leaderboard>, AppError> {
    let leaderboard = state.engine.leaderboard(chat_id, game).await?;
    Ok(Json(leaderboard))
}

/// GET /chats/:chat_id/leaderboards/:game/text
///
/// Markdown rendering, or the "no results yet" status string
#[instrument(name = "leaderboard_text", skip(state))]
pub async fn get_leaderboard_text(
    State(state): State<AppState>,
    Path((chat_id, game)): Path<(ChatId, GameKind)>,
) -> Result<String, AppError> {
    Ok(state.engine.render_leaderboard(chat_id, game).await?)
}

/// GET /time
pub async fn get_time(State(state): State<AppState>) -> String {
    state.engine.current_time()
}
