pub mod models;
pub mod repository;

mod errors;

pub use errors::StickerError;
pub use models::{StickerRecord, StickerSeenSet};
pub use repository::{
    FileStickerRepository, InMemoryStickerRepository, PostgresStickerRepository,
    StickerMemoryRepository,
};
