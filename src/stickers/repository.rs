use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{types::Json, PgPool, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{StickerError, StickerRecord, StickerSeenSet};
use crate::persistence;
use crate::shared::ChatId;

/// Per (chat, calendar day) memory of stickers already sent.
///
/// Each day is its own storage unit, so memory partitions naturally and old days are
/// simply never read again.
#[async_trait]
pub trait StickerMemoryRepository: Send + Sync {
    async fn load_day(&self, chat_id: ChatId, day: NaiveDate)
        -> Result<StickerSeenSet, StickerError>;

    /// Appends unconditionally; recording the same sticker twice is harmless
    async fn record(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
        sticker: StickerRecord,
    ) -> Result<(), StickerError>;

    async fn has_seen(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
        unique_id: &str,
    ) -> Result<bool, StickerError> {
        Ok(self.load_day(chat_id, day).await?.contains(unique_id))
    }
}

fn storage_key(chat_id: ChatId, day: NaiveDate) -> String {
    format!("stickers-{chat_id}-{}", day.format("%Y-%m-%d"))
}

/// In-memory implementation for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStickerRepository {
    days: RwLock<HashMap<String, StickerSeenSet>>,
}

impl InMemoryStickerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StickerMemoryRepository for InMemoryStickerRepository {
    #[instrument(skip(self))]
    async fn load_day(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
    ) -> Result<StickerSeenSet, StickerError> {
        let days = self.days.read().await;
        Ok(days
            .get(&storage_key(chat_id, day))
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip(self, sticker), fields(unique_id = %sticker.sticker_unique_id))]
    async fn record(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
        sticker: StickerRecord,
    ) -> Result<(), StickerError> {
        let mut days = self.days.write().await;
        let seen = days.entry(storage_key(chat_id, day)).or_default();
        seen.push(sticker);
        debug!(seen = seen.len(), "Recorded sticker in memory");
        Ok(())
    }
}

/// One JSON file per chat-day: `<data_dir>/stickers-<chat_id>-<YYYY-MM-DD>.json`
#[derive(Debug, Clone)]
pub struct FileStickerRepository {
    data_dir: PathBuf,
}

impl FileStickerRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, chat_id: ChatId, day: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", storage_key(chat_id, day)))
    }
}

#[async_trait]
impl StickerMemoryRepository for FileStickerRepository {
    #[instrument(skip(self))]
    async fn load_day(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
    ) -> Result<StickerSeenSet, StickerError> {
        let path = self.path_for(chat_id, day);
        let Some(bytes) = persistence::read_if_exists(&path).await? else {
            return Ok(StickerSeenSet::new());
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, path = %path.display(), "Sticker memory file is malformed");
            StickerError::Malformed {
                key: path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    #[instrument(skip(self, sticker), fields(unique_id = %sticker.sticker_unique_id))]
    async fn record(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
        sticker: StickerRecord,
    ) -> Result<(), StickerError> {
        let mut seen = self.load_day(chat_id, day).await?;
        seen.push(sticker);

        let path = self.path_for(chat_id, day);
        let bytes = serde_json::to_vec(&seen).map_err(|e| StickerError::Malformed {
            key: path.display().to_string(),
            reason: e.to_string(),
        })?;
        persistence::write_atomic(&path, &bytes).await?;

        debug!(seen = seen.len(), path = %path.display(), "Recorded sticker to file");
        Ok(())
    }
}

/// PostgreSQL implementation, one JSONB array per chat-day
pub struct PostgresStickerRepository {
    pool: PgPool,
}

impl PostgresStickerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StickerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sticker_memory (
                chat_id BIGINT NOT NULL,
                day DATE NOT NULL,
                stickers JSONB NOT NULL,
                PRIMARY KEY (chat_id, day)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StickerError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl StickerMemoryRepository for PostgresStickerRepository {
    #[instrument(skip(self))]
    async fn load_day(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
    ) -> Result<StickerSeenSet, StickerError> {
        let row = sqlx::query("SELECT stickers FROM sticker_memory WHERE chat_id = $1 AND day = $2")
            .bind(chat_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch sticker memory from database");
                StickerError::Database(e.to_string())
            })?;

        let Some(row) = row else {
            return Ok(StickerSeenSet::new());
        };

        let stickers: serde_json::Value = row
            .try_get("stickers")
            .map_err(|e| StickerError::Database(e.to_string()))?;
        serde_json::from_value(stickers).map_err(|e| StickerError::Malformed {
            key: storage_key(chat_id, day),
            reason: e.to_string(),
        })
    }

    #[instrument(skip(self, sticker), fields(unique_id = %sticker.sticker_unique_id))]
    async fn record(
        &self,
        chat_id: ChatId,
        day: NaiveDate,
        sticker: StickerRecord,
    ) -> Result<(), StickerError> {
        sqlx::query(
            "INSERT INTO sticker_memory (chat_id, day, stickers) VALUES ($1, $2, $3)
             ON CONFLICT (chat_id, day) DO UPDATE SET stickers = sticker_memory.stickers || EXCLUDED.stickers",
        )
        .bind(chat_id)
        .bind(day)
        .bind(Json(vec![sticker]))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to record sticker in database");
            StickerError::Database(e.to_string())
        })?;

        debug!("Recorded sticker in database");
        Ok(())
    }
}
