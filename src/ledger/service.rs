use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{info, instrument};

use super::{backfill, GameDescriptor, LedgerError, LedgerRepository, ResultLedger};
use crate::shared::ChatId;

/// Owns every read and write of game ledgers.
///
/// Reading is split in two visible steps: `load` returns exactly what is stored, and
/// `reconcile_and_persist` backfills live days up to today and writes them back when any
/// were added. Callers that mutate a ledger should hold `lock` for the whole
/// load-mutate-save sequence.
pub struct LedgerService {
    repository: Arc<dyn LedgerRepository>,
    ledger_mutexes: RwLock<HashMap<(ChatId, &'static str), Arc<AsyncMutex<()>>>>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self {
            repository,
            ledger_mutexes: RwLock::new(HashMap::new()),
        }
    }

    /// Mutex serializing access to one (chat, game) ledger
    pub async fn lock(&self, chat_id: ChatId, game: &GameDescriptor) -> Arc<AsyncMutex<()>> {
        let key = (chat_id, game.prefix);
        {
            let guard = self.ledger_mutexes.read().await;
            if let Some(lock) = guard.get(&key) {
                return lock.clone();
            }
        }

        let mut guard = self.ledger_mutexes.write().await;
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub async fn load(
        &self,
        chat_id: ChatId,
        game: &GameDescriptor,
    ) -> Result<ResultLedger, LedgerError> {
        self.repository.load_ledger(chat_id, game.prefix).await
    }

    /// Backfills `ledger` up to `today`, persisting it if anything was inserted
    #[instrument(skip(self, ledger), fields(prefix = game.prefix))]
    pub async fn reconcile_and_persist(
        &self,
        chat_id: ChatId,
        game: &GameDescriptor,
        ledger: &mut ResultLedger,
        today: NaiveDate,
    ) -> Result<usize, LedgerError> {
        let inserted = backfill(ledger, game, today);
        if inserted > 0 {
            self.repository
                .save_ledger(chat_id, game.prefix, ledger)
                .await?;
            info!(chat_id, inserted, %today, "Materialized missing game days");
        }
        Ok(inserted)
    }

    /// `load` followed by `reconcile_and_persist`
    pub async fn open(
        &self,
        chat_id: ChatId,
        game: &GameDescriptor,
        today: NaiveDate,
    ) -> Result<ResultLedger, LedgerError> {
        let mut ledger = self.load(chat_id, game).await?;
        self.reconcile_and_persist(chat_id, game, &mut ledger, today)
            .await?;
        Ok(ledger)
    }

    pub async fn save(
        &self,
        chat_id: ChatId,
        game: &GameDescriptor,
        ledger: &ResultLedger,
    ) -> Result<(), LedgerError> {
        self.repository
            .save_ledger(chat_id, game.prefix, ledger)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{GameKind, InMemoryLedgerRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn load_does_not_backfill() {
        let repo = Arc::new(InMemoryLedgerRepository::new());
        let service = LedgerService::new(repo.clone());

        let ledger = service
            .load(1, &GameKind::Puzzle.descriptor())
            .await
            .unwrap();

        assert!(ledger.is_empty());
        assert!(repo.stored(1, "wordle").await.is_none());
    }

    #[tokio::test]
    async fn reconcile_persists_inserted_days() {
        let repo = Arc::new(InMemoryLedgerRepository::new());
        let service = LedgerService::new(repo.clone());
        let game = GameKind::Puzzle.descriptor();

        let mut ledger = service.load(1, &game).await.unwrap();
        let inserted = service
            .reconcile_and_persist(1, &game, &mut ledger, date(2026, 10, 18))
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(repo.stored(1, "wordle").await.unwrap(), ledger);
    }

    #[tokio::test]
    async fn read_only_opens_grow_the_store_over_time() {
        let repo = Arc::new(InMemoryLedgerRepository::new());
        let service = LedgerService::new(repo.clone());
        let game = GameKind::AllowList.descriptor();

        service.open(1, &game, date(2026, 10, 7)).await.unwrap();
        service.open(1, &game, date(2026, 10, 7)).await.unwrap();
        assert_eq!(repo.stored(1, "resultados").await.unwrap().len(), 1);

        service.open(1, &game, date(2026, 10, 23)).await.unwrap();
        let stored = repo.stored(1, "resultados").await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.latest_date(), Some(date(2026, 10, 21)));
    }

    #[tokio::test]
    async fn nothing_is_written_when_the_game_is_not_live() {
        let repo = Arc::new(InMemoryLedgerRepository::new());
        let service = LedgerService::new(repo.clone());

        let ledger = service
            .open(1, &GameKind::Repeat.descriptor(), date(2026, 10, 18))
            .await
            .unwrap();

        assert!(ledger.is_empty());
        assert!(repo.stored(1, "repetidos").await.is_none());
    }

    #[tokio::test]
    async fn lock_is_shared_per_chat_and_game() {
        let service = LedgerService::new(Arc::new(InMemoryLedgerRepository::new()));
        let puzzle = GameKind::Puzzle.descriptor();

        let first = service.lock(1, &puzzle).await;
        let second = service.lock(1, &puzzle).await;
        let other_game = service.lock(1, &GameKind::Repeat.descriptor()).await;
        let other_chat = service.lock(2, &puzzle).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other_game));
        assert!(!Arc::ptr_eq(&first, &other_chat));
    }
}
