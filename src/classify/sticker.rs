use crate::stickers::StickerSeenSet;

/// A sticker only counts against its sender when it comes from a named set
fn has_set(set_name: Option<&str>) -> bool {
    set_name.is_some_and(|name| !name.is_empty())
}

/// True when the sticker's set is named and not on the allow-list
pub fn is_disallowed(set_name: Option<&str>, allowed_sets: &[String]) -> bool {
    has_set(set_name) && !allowed_sets.iter().any(|allowed| Some(allowed.as_str()) == set_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatVerdict {
    /// Already sent earlier today; the sender gets a point
    Repeated,
    /// Not penalized; remember it for the rest of the day
    Remember,
}

pub fn classify_repeat(
    set_name: Option<&str>,
    unique_id: &str,
    seen_today: &StickerSeenSet,
) -> RepeatVerdict {
    if has_set(set_name) && seen_today.contains(unique_id) {
        RepeatVerdict::Repeated
    } else {
        RepeatVerdict::Remember
    }
}
