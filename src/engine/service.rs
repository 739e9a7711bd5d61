use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{EngineError, EngineReply, Sticker, StickerEvent, TextEvent};
use crate::{
    classify::{classify_puzzle, classify_repeat, is_disallowed, PuzzleVerdict, RepeatVerdict},
    clock::{Clock, SystemClock},
    config::EngineConfig,
    ledger::{
        leaderboard::RECENT_DAYS_SHOWN, GameKind, Leaderboard, LedgerRepository, LedgerService,
    },
    shared::ChatId,
    stickers::StickerMemoryRepository,
};

/// Format of the `/time` style status reply
const CURRENT_TIME_FORMAT: &str = "%A %d/%m/%Y %H:%M:%S";

/// Runs each inbound event through classify, reconcile, accrue and persist
pub struct GameEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    ledgers: LedgerService,
    stickers: Arc<dyn StickerMemoryRepository>,
}

impl GameEngine {
    pub fn builder(
        ledger_repository: Arc<dyn LedgerRepository>,
        sticker_repository: Arc<dyn StickerMemoryRepository>,
    ) -> GameEngineBuilder {
        GameEngineBuilder::new(ledger_repository, sticker_repository)
    }

    /// Penalizes stickers from outside the allow-list (Wednesdays) and stickers already
    /// sent earlier the same day (Mondays)
    #[instrument(skip(self, event), fields(chat_id = event.chat_id))]
    pub async fn handle_sticker(
        &self,
        event: &StickerEvent,
    ) -> Result<Vec<EngineReply>, EngineError> {
        let Some(user) = sender(event.user_handle.as_deref(), event.is_bot) else {
            return Ok(Vec::new());
        };
        let today = self.clock.today();
        let mut replies = Vec::new();

        if is_disallowed(
            event.sticker.set_name.as_deref(),
            &self.config.allowed_sticker_sets,
        ) {
            replies.extend(
                self.credit(event.chat_id, GameKind::AllowList, user, 1, today)
                    .await?,
            );
        }

        replies.extend(
            self.check_repeat(event.chat_id, user, &event.sticker, today)
                .await?,
        );

        Ok(self.with_diagnostics(replies))
    }

    /// Credits a shared puzzle result, once per user per day
    #[instrument(skip(self, event), fields(chat_id = event.chat_id))]
    pub async fn handle_text(&self, event: &TextEvent) -> Result<Vec<EngineReply>, EngineError> {
        let Some(user) = sender(event.user_handle.as_deref(), event.is_bot) else {
            return Ok(Vec::new());
        };

        let kind = GameKind::Puzzle;
        let game = kind.descriptor();
        let today = self.clock.today();
        if !game.is_valid_day(today) {
            return Ok(Vec::new());
        }

        let lock = self.ledgers.lock(event.chat_id, &game).await;
        let _guard = lock.lock().await;

        let mut ledger = self.ledgers.load(event.chat_id, &game).await?;
        self.ledgers
            .reconcile_and_persist(event.chat_id, &game, &mut ledger, today)
            .await?;

        let replies = match classify_puzzle(&event.text, user, ledger.day(today)) {
            PuzzleVerdict::NoMatch => {
                if self.config.verbose {
                    vec![EngineReply::Diagnostic {
                        message: format!("No reconozco un resultado en: {}", event.text),
                    }]
                } else {
                    Vec::new()
                }
            }
            PuzzleVerdict::AlreadyPlayedToday(result) => {
                warn!(
                    user,
                    puzzle_index = result.puzzle_index,
                    "Rejected second puzzle result for the day"
                );
                vec![EngineReply::AlreadyPlayedToday {
                    user: user.to_string(),
                }]
            }
            PuzzleVerdict::Credit(result) => {
                let total_today = ledger.credit(today, user, result.score);
                self.ledgers.save(event.chat_id, &game, &ledger).await?;
                info!(
                    user,
                    puzzle_index = result.puzzle_index,
                    score = result.score,
                    "Recorded puzzle result"
                );
                self.with_diagnostics(vec![EngineReply::Credited {
                    game: kind,
                    user: user.to_string(),
                    awarded: result.score,
                    total_today,
                }])
            }
        };

        Ok(replies)
    }

    /// Reconciles the ledger up to today (persisting new days) and aggregates it
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        chat_id: ChatId,
        kind: GameKind,
    ) -> Result<Leaderboard, EngineError> {
        let game = kind.descriptor();
        let lock = self.ledgers.lock(chat_id, &game).await;
        let _guard = lock.lock().await;

        let ledger = self
            .ledgers
            .open(chat_id, &game, self.clock.today())
            .await?;
        debug!(days = ledger.len(), "Aggregating leaderboard");

        Ok(Leaderboard::from_ledger(kind, &ledger, RECENT_DAYS_SHOWN))
    }

    pub async fn render_leaderboard(
        &self,
        chat_id: ChatId,
        kind: GameKind,
    ) -> Result<String, EngineError> {
        Ok(self.leaderboard(chat_id, kind).await?.render())
    }

    pub fn current_time(&self) -> String {
        self.clock.now().format(CURRENT_TIME_FORMAT).to_string()
    }

    async fn check_repeat(
        &self,
        chat_id: ChatId,
        user: &str,
        sticker: &Sticker,
        today: NaiveDate,
    ) -> Result<Option<EngineReply>, EngineError> {
        let kind = GameKind::Repeat;
        let game = kind.descriptor();
        if !game.is_valid_day(today) {
            return Ok(None);
        }

        // The ledger lock also covers the day's sticker memory
        let lock = self.ledgers.lock(chat_id, &game).await;
        let _guard = lock.lock().await;

        let seen_today = self.stickers.load_day(chat_id, today).await?;
        match classify_repeat(sticker.set_name.as_deref(), &sticker.unique_id, &seen_today) {
            RepeatVerdict::Remember => {
                self.stickers
                    .record(chat_id, today, sticker.to_record())
                    .await?;
                Ok(None)
            }
            RepeatVerdict::Repeated => self
                .credit_locked(chat_id, kind, user, 1, today)
                .await
                .map(Some),
        }
    }

    async fn credit(
        &self,
        chat_id: ChatId,
        kind: GameKind,
        user: &str,
        amount: u32,
        today: NaiveDate,
    ) -> Result<Option<EngineReply>, EngineError> {
        let game = kind.descriptor();
        if !game.is_valid_day(today) {
            debug!(%kind, %today, "Game not live today");
            return Ok(None);
        }

        let lock = self.ledgers.lock(chat_id, &game).await;
        let _guard = lock.lock().await;

        self.credit_locked(chat_id, kind, user, amount, today)
            .await
            .map(Some)
    }

    /// Caller must hold the (chat, game) lock
    async fn credit_locked(
        &self,
        chat_id: ChatId,
        kind: GameKind,
        user: &str,
        amount: u32,
        today: NaiveDate,
    ) -> Result<EngineReply, EngineError> {
        let game = kind.descriptor();
        let mut ledger = self.ledgers.load(chat_id, &game).await?;
        self.ledgers
            .reconcile_and_persist(chat_id, &game, &mut ledger, today)
            .await?;

        let total_today = ledger.credit(today, user, amount);
        self.ledgers.save(chat_id, &game, &ledger).await?;

        info!(chat_id, %kind, user, total_today, "Credited point");
        Ok(EngineReply::Credited {
            game: kind,
            user: user.to_string(),
            awarded: amount,
            total_today,
        })
    }

    fn with_diagnostics(&self, mut replies: Vec<EngineReply>) -> Vec<EngineReply> {
        if !self.config.verbose {
            return replies;
        }

        let diagnostics: Vec<EngineReply> = replies
            .iter()
            .filter_map(|reply| match reply {
                EngineReply::Credited {
                    game,
                    user,
                    awarded,
                    total_today,
                } => Some(EngineReply::Diagnostic {
                    message: format!("{user} +{awarded} en {game} (hoy: {total_today})"),
                }),
                _ => None,
            })
            .collect();
        replies.extend(diagnostics);
        replies
    }
}

/// Handle of a human sender; bots and anonymous senders never score
fn sender(user_handle: Option<&str>, is_bot: bool) -> Option<&str> {
    if is_bot {
        return None;
    }
    user_handle.filter(|handle| !handle.is_empty())
}

pub struct GameEngineBuilder {
    config: EngineConfig,
    clock: Option<Arc<dyn Clock>>,
    ledger_repository: Arc<dyn LedgerRepository>,
    sticker_repository: Arc<dyn StickerMemoryRepository>,
}

impl GameEngineBuilder {
    fn new(
        ledger_repository: Arc<dyn LedgerRepository>,
        sticker_repository: Arc<dyn StickerMemoryRepository>,
    ) -> Self {
        Self {
            config: EngineConfig::default(),
            clock: None,
            ledger_repository,
            sticker_repository,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> GameEngine {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new(self.config.time_zone)));
        GameEngine {
            config: self.config,
            clock,
            ledgers: LedgerService::new(self.ledger_repository),
            stickers: self.sticker_repository,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::{add_points, DayRecord, InMemoryLedgerRepository, ResultLedger};
    use crate::stickers::InMemoryStickerRepository;
    use chrono::TimeZone;
    use chrono_tz::America::Argentina::Buenos_Aires;

    const CHAT: ChatId = -100123;

    struct Harness {
        engine: GameEngine,
        clock: Arc<FixedClock>,
        ledgers: Arc<InMemoryLedgerRepository>,
    }

    fn harness_on(y: i32, m: u32, d: u32, verbose: bool) -> Harness {
        let clock = Arc::new(FixedClock::new(
            Buenos_Aires.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap(),
        ));
        let ledgers = Arc::new(InMemoryLedgerRepository::new());
        let engine = GameEngine::builder(ledgers.clone(), Arc::new(InMemoryStickerRepository::new()))
            .with_config(EngineConfig {
                verbose,
                ..EngineConfig::default()
            })
            .with_clock(clock.clone())
            .build();
        Harness {
            engine,
            clock,
            ledgers,
        }
    }

    fn sticker_event(user: &str, set_name: &str, unique_id: &str) -> StickerEvent {
        StickerEvent {
            chat_id: CHAT,
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

    fn text_event(user: &str, text: &str) -> TextEvent {
        TextEvent {
            chat_id: CHAT,
            user_handle: Some(user.to_string()),
            is_bot: false,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn disallowed_sticker_on_wednesday_scores() {
        let h = harness_on(2026, 10, 21, false);

        let replies = h
            .engine
            .handle_sticker(&sticker_event("alice", "catpack", "x"))
            .await
            .unwrap();

        assert!(matches!(
            replies.as_slice(),
            [EngineReply::Credited {
                game: GameKind::AllowList,
                total_today: 1,
                ..
            }]
        ));
        let stored = h.ledgers.stored(CHAT, "resultados").await.unwrap();
        assert_eq!(stored.days()[0].points_for("alice"), Some(1));
    }

    #[tokio::test]
    async fn allowed_sticker_never_scores() {
        let h = harness_on(2026, 10, 21, false);

        let replies = h
            .engine
            .handle_sticker(&sticker_event("alice", "Piggy2019", "x"))
            .await
            .unwrap();

        assert!(replies.is_empty());
        assert!(h.ledgers.stored(CHAT, "resultados").await.is_none());
    }

    #[tokio::test]
    async fn disallowed_sticker_outside_wednesday_is_ignored() {
        let h = harness_on(2026, 10, 22, false);

        let replies = h
            .engine
            .handle_sticker(&sticker_event("alice", "catpack", "x"))
            .await
            .unwrap();

        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn repeated_sticker_on_monday_scores_the_repeater() {
        let h = harness_on(2026, 10, 19, false);

        let first = h
            .engine
            .handle_sticker(&sticker_event("alice", "Piggy2019", "x"))
            .await
            .unwrap();
        assert!(first.is_empty());

        let second = h
            .engine
            .handle_sticker(&sticker_event("bob", "Piggy2019", "x"))
            .await
            .unwrap();
        assert!(matches!(
            second.as_slice(),
            [EngineReply::Credited { game: GameKind::Repeat, user, .. }] if user == "bob"
        ));

        let stored = h.ledgers.stored(CHAT, "repetidos").await.unwrap();
        assert_eq!(stored.days()[0].points_for("alice"), None);
        assert_eq!(stored.days()[0].points_for("bob"), Some(1));
    }

    #[tokio::test]
    async fn sticker_memory_resets_the_next_week() {
        let h = harness_on(2026, 10, 19, false);
        h.engine
            .handle_sticker(&sticker_event("alice", "Piggy2019", "x"))
            .await
            .unwrap();

        h.clock.advance_days(7);
        let replies = h
            .engine
            .handle_sticker(&sticker_event("alice", "Piggy2019", "x"))
            .await
            .unwrap();

        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn bots_and_anonymous_senders_are_ignored() {
        let h = harness_on(2026, 10, 21, false);

        let mut bot = sticker_event("robot", "catpack", "x");
        bot.is_bot = true;
        let mut anonymous = sticker_event("", "catpack", "x");
        anonymous.user_handle = None;

        assert!(h.engine.handle_sticker(&bot).await.unwrap().is_empty());
        assert!(h.engine.handle_sticker(&anonymous).await.unwrap().is_empty());
        assert!(h.ledgers.stored(CHAT, "resultados").await.is_none());
    }

    #[tokio::test]
    async fn puzzle_result_is_credited_once_per_day() {
        let h = harness_on(2026, 10, 18, false);

        let first = h
            .engine
            .handle_text(&text_event("u", "Wordle (ES) #82 5/6"))
            .await
            .unwrap();
        assert!(matches!(
            first.as_slice(),
            [EngineReply::Credited { awarded: 5, total_today: 5, .. }]
        ));

        let second = h
            .engine
            .handle_text(&text_event("u", "Wordle (ES) #82 5/6"))
            .await
            .unwrap();
        assert_eq!(
            second,
            vec![EngineReply::AlreadyPlayedToday {
                user: "u".to_string()
            }]
        );

        let stored = h.ledgers.stored(CHAT, "wordle").await.unwrap();
        assert_eq!(stored.days()[0].points_for("u"), Some(5));
    }

    #[tokio::test]
    async fn unparsable_text_is_silent_unless_verbose() {
        let quiet = harness_on(2026, 10, 18, false);
        let replies = quiet
            .engine
            .handle_text(&text_event("u", "hola"))
            .await
            .unwrap();
        assert!(replies.is_empty());

        let verbose = harness_on(2026, 10, 18, true);
        let replies = verbose
            .engine
            .handle_text(&text_event("u", "hola"))
            .await
            .unwrap();
        assert!(matches!(replies.as_slice(), [EngineReply::Diagnostic { .. }]));
    }

    #[tokio::test]
    async fn verbose_mode_adds_a_diagnostic_per_credit() {
        let h = harness_on(2026, 10, 21, true);

        let replies = h
            .engine
            .handle_sticker(&sticker_event("alice", "catpack", "x"))
            .await
            .unwrap();

        assert_eq!(replies.len(), 2);
        assert!(matches!(replies[1], EngineReply::Diagnostic { .. }));
    }

    #[tokio::test]
    async fn leaderboard_backfills_and_persists() {
        let h = harness_on(2026, 10, 7, false);
        h.engine
            .handle_sticker(&sticker_event("alice", "catpack", "x"))
            .await
            .unwrap();

        h.clock.advance_days(14);
        let board = h
            .engine
            .leaderboard(CHAT, GameKind::AllowList)
            .await
            .unwrap();

        assert_eq!(board.recent_days.len(), 3);
        assert_eq!(board.entries[0].user, "alice");
        assert_eq!(board.entries[0].days_lost, 1);
        assert_eq!(h.ledgers.stored(CHAT, "resultados").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn stored_history_is_extended_not_replaced() {
        // 2026-10-14 and 2026-10-21 are consecutive Wednesdays
        let h = harness_on(2026, 10, 21, false);
        let mut seeded = ResultLedger::new();
        seeded.push_latest(add_points(
            DayRecord::new(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()),
            "bob",
            3,
        ));
        h.ledgers.insert(CHAT, "resultados", seeded).await;

        h.engine
            .handle_sticker(&sticker_event("alice", "catpack", "x"))
            .await
            .unwrap();

        let stored = h.ledgers.stored(CHAT, "resultados").await.unwrap();
        assert_eq!(stored.len(), 2);
        let previous = stored
            .day(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
            .unwrap();
        assert_eq!(previous.points_for("bob"), Some(3));

        let board = h
            .engine
            .leaderboard(CHAT, GameKind::AllowList)
            .await
            .unwrap();
        let summary: Vec<_> = board
            .entries
            .iter()
            .map(|e| (e.user.as_str(), e.days_lost, e.total_points))
            .collect();
        assert_eq!(summary, vec![("bob", 1, 3), ("alice", 1, 1)]);
    }

    #[tokio::test]
    async fn rendering_an_unplayed_game_reports_no_results() {
        let h = harness_on(2026, 10, 18, false);

        let text = h
            .engine
            .render_leaderboard(CHAT, GameKind::Puzzle)
            .await
            .unwrap();

        assert_eq!(text, crate::ledger::leaderboard::NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn current_time_uses_the_fixed_zone() {
        let h = harness_on(2026, 10, 18, false);
        assert_eq!(h.engine.current_time(), "Sunday 18/10/2026 15:00:00");
    }
}
