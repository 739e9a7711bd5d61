use loser_ledger::{
    api,
    config::{EngineConfig, StorageConfig},
    ledger::{FileLedgerRepository, LedgerRepository, PostgresLedgerRepository},
    stickers::{FileStickerRepository, PostgresStickerRepository, StickerMemoryRepository},
    AppState, GameEngine,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loser_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;
    info!(
        time_zone = %config.time_zone,
        allowed_sets = ?config.allowed_sticker_sets,
        verbose = config.verbose,
        "Starting game ledger"
    );

    let (ledger_repository, sticker_repository): (
        Arc<dyn LedgerRepository>,
        Arc<dyn StickerMemoryRepository>,
    ) = match &config.storage {
        StorageConfig::Files { data_dir } => {
            info!(data_dir = %data_dir.display(), "Using file storage");
            (
                Arc::new(FileLedgerRepository::new(data_dir.clone())),
                Arc::new(FileStickerRepository::new(data_dir.clone())),
            )
        }
        StorageConfig::Postgres { database_url } => {
            info!("Using PostgreSQL storage");
            let pool = sqlx::PgPool::connect(database_url).await?;
            let ledgers = PostgresLedgerRepository::new(pool.clone());
            ledgers.ensure_schema().await?;
            let stickers = PostgresStickerRepository::new(pool);
            stickers.ensure_schema().await?;
            (Arc::new(ledgers), Arc::new(stickers))
        }
    };

    let bind_addr = config.bind_addr.clone();
    let engine = GameEngine::builder(ledger_repository, sticker_repository)
        .with_config(config)
        .build();
    let app = api::router(AppState::new(Arc::new(engine)));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
