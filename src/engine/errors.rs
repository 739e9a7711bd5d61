use thiserror::Error;

use crate::ledger::LedgerError;
use crate::stickers::StickerError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Sticker memory error: {0}")]
    Stickers(#[from] StickerError),
}
