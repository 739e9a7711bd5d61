//! HTTP adapter feeding transport events into the engine.

pub use handlers::{get_leaderboard, get_leaderboard_text, get_time, post_sticker, post_text};

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::shared::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events/sticker", post(post_sticker))
        .route("/events/text", post(post_text))
        .route("/chats/:chat_id/leaderboards/:game", get(get_leaderboard))
        .route(
            "/chats/:chat_id/leaderboards/:game/text",
            get(get_leaderboard_text),
        )
        .route("/time", get(get_time))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
