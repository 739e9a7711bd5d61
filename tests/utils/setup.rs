use chrono::TimeZone;
use chrono_tz::America::Argentina::Buenos_Aires;
use std::path::PathBuf;
use std::sync::Arc;

use loser_ledger::{
    ledger::{FileLedgerRepository, InMemoryLedgerRepository, LedgerRepository},
    stickers::{FileStickerRepository, InMemoryStickerRepository, StickerMemoryRepository},
    EngineConfig, FixedClock, GameEngine,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub engine: Arc<GameEngine>,
    pub clock: Arc<FixedClock>,
    pub ledger_repository: Arc<dyn LedgerRepository>,
}

pub struct TestSetupBuilder {
    start: (i32, u32, u32),
    data_dir: Option<PathBuf>,
    config: EngineConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            start: (2026, 10, 18),
            data_dir: None,
            config: EngineConfig::default(),
        }
    }

    /// Local calendar day the clock starts on (15:00 Buenos Aires time)
    pub fn starting_on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.start = (year, month, day);
        self
    }

    pub fn with_files_in(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn verbose(mut self) -> Self {
        self.config.verbose = true;
        self
    }

    pub fn build(self) -> TestSetup {
        let (year, month, day) = self.start;
        let clock = Arc::new(FixedClock::new(
            Buenos_Aires
                .with_ymd_and_hms(year, month, day, 15, 0, 0)
                .unwrap(),
        ));

        let (ledger_repository, sticker_repository): (
            Arc<dyn LedgerRepository>,
            Arc<dyn StickerMemoryRepository>,
        ) = match &self.data_dir {
            Some(dir) => (
                Arc::new(FileLedgerRepository::new(dir.clone())),
                Arc::new(FileStickerRepository::new(dir.clone())),
            ),
            None => (
                Arc::new(InMemoryLedgerRepository::new()),
                Arc::new(InMemoryStickerRepository::new()),
            ),
        };

        let engine = Arc::new(
            GameEngine::builder(ledger_repository.clone(), sticker_repository)
                .with_config(self.config)
                .with_clock(clock.clone())
                .build(),
        );

        TestSetup {
            engine,
            clock,
            ledger_repository,
        }
    }
}
