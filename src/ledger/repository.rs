use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{LedgerError, ResultLedger};
use crate::persistence;
use crate::shared::ChatId;

/// Durable storage of one ledger per (chat, game prefix).
///
/// `load_ledger` returns an empty ledger for a pair that was never saved; only unreadable
/// or malformed data is an error. `save_ledger` replaces the stored sequence as a whole.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn load_ledger(&self, chat_id: ChatId, prefix: &str)
        -> Result<ResultLedger, LedgerError>;
    async fn save_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
        ledger: &ResultLedger,
    ) -> Result<(), LedgerError>;
}

fn storage_key(chat_id: ChatId, prefix: &str) -> String {
    format!("{prefix}-{chat_id}")
}

/// In-memory implementation for development and testing
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    ledgers: RwLock<HashMap<String, ResultLedger>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored ledger, bypassing the engine
    pub async fn insert(&self, chat_id: ChatId, prefix: &str, ledger: ResultLedger) {
        self.ledgers
            .write()
            .await
            .insert(storage_key(chat_id, prefix), ledger);
    }

    /// Returns what is currently stored, without any backfill
    pub async fn stored(&self, chat_id: ChatId, prefix: &str) -> Option<ResultLedger> {
        self.ledgers
            .read()
            .await
            .get(&storage_key(chat_id, prefix))
            .cloned()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    #[instrument(skip(self))]
    async fn load_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
    ) -> Result<ResultLedger, LedgerError> {
        let ledgers = self.ledgers.read().await;
        let ledger = ledgers
            .get(&storage_key(chat_id, prefix))
            .cloned()
            .unwrap_or_default();
        debug!(days = ledger.len(), "Loaded ledger from memory");
        Ok(ledger)
    }

    #[instrument(skip(self, ledger))]
    async fn save_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
        ledger: &ResultLedger,
    ) -> Result<(), LedgerError> {
        self.ledgers
            .write()
            .await
            .insert(storage_key(chat_id, prefix), ledger.clone());
        debug!(days = ledger.len(), "Saved ledger to memory");
        Ok(())
    }
}

/// One JSON file per ledger: `<data_dir>/<prefix>-<chat_id>.json`
#[derive(Debug, Clone)]
pub struct FileLedgerRepository {
    data_dir: PathBuf,
}

impl FileLedgerRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, chat_id: ChatId, prefix: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", storage_key(chat_id, prefix)))
    }
}

#[async_trait]
impl LedgerRepository for FileLedgerRepository {
    #[instrument(skip(self))]
    async fn load_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
    ) -> Result<ResultLedger, LedgerError> {
        let path = self.path_for(chat_id, prefix);
        let Some(bytes) = persistence::read_if_exists(&path).await? else {
            debug!(path = %path.display(), "No ledger file yet");
            return Ok(ResultLedger::new());
        };

        let ledger: ResultLedger = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, path = %path.display(), "Ledger file is malformed");
            LedgerError::Malformed {
                key: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(days = ledger.len(), path = %path.display(), "Loaded ledger from file");
        Ok(ledger)
    }

    #[instrument(skip(self, ledger))]
    async fn save_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
        ledger: &ResultLedger,
    ) -> Result<(), LedgerError> {
        let path = self.path_for(chat_id, prefix);
        let bytes = serde_json::to_vec(ledger).map_err(|e| LedgerError::Malformed {
            key: path.display().to_string(),
            reason: e.to_string(),
        })?;

        persistence::write_atomic(&path, &bytes).await?;

        debug!(days = ledger.len(), path = %path.display(), "Saved ledger to file");
        Ok(())
    }
}

/// PostgreSQL implementation, one JSONB row per ledger
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS game_ledgers (
                chat_id BIGINT NOT NULL,
                prefix TEXT NOT NULL,
                days JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (chat_id, prefix)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    #[instrument(skip(self))]
    async fn load_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
    ) -> Result<ResultLedger, LedgerError> {
        let row = sqlx::query("SELECT days FROM game_ledgers WHERE chat_id = $1 AND prefix = $2")
            .bind(chat_id)
            .bind(prefix)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch ledger from database");
                LedgerError::Database(e.to_string())
            })?;

        let Some(row) = row else {
            debug!("No ledger row yet");
            return Ok(ResultLedger::new());
        };

        let days: serde_json::Value = row
            .try_get("days")
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let ledger: ResultLedger =
            serde_json::from_value(days).map_err(|e| LedgerError::Malformed {
                key: storage_key(chat_id, prefix),
                reason: e.to_string(),
            })?;

        debug!(days = ledger.len(), "Loaded ledger from database");
        Ok(ledger)
    }

    #[instrument(skip(self, ledger))]
    async fn save_ledger(
        &self,
        chat_id: ChatId,
        prefix: &str,
        ledger: &ResultLedger,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO game_ledgers (chat_id, prefix, days) VALUES ($1, $2, $3)
             ON CONFLICT (chat_id, prefix) DO UPDATE SET days = EXCLUDED.days, updated_at = now()",
        )
        .bind(chat_id)
        .bind(prefix)
        .bind(Json(ledger))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save ledger to database");
            LedgerError::Database(e.to_string())
        })?;

        debug!(days = ledger.len(), "Saved ledger to database");
        Ok(())
    }
}
