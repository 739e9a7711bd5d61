use thiserror::Error;

#[derive(Debug, Error)]
pub enum StickerError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed sticker memory {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}
