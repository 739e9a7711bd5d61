use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed ledger {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Day records out of order: {earlier} listed before {later}")]
    OutOfOrder { earlier: NaiveDate, later: NaiveDate },

    #[error("Database error: {0}")]
    Database(String),
}
