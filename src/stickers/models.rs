use serde::{Deserialize, Serialize};

/// A sticker as remembered for the day it was first seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerRecord {
    pub sticker_unique_id: String,
    pub sticker_file_id: String,
    pub width: u32,
    pub height: u32,
    pub is_animated: bool,
}

/// Stickers seen in one chat on one calendar day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerSeenSet {
    stickers: Vec<StickerRecord>,
}

impl StickerSeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.stickers
            .iter()
            .any(|sticker| sticker.sticker_unique_id == unique_id)
    }

    /// Appends without checking for duplicates
    pub fn push(&mut self, sticker: StickerRecord) {
        self.stickers.push(sticker);
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn stickers(&self) -> &[StickerRecord] {
        &self.stickers
    }
}
