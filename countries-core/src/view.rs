use crate::model::{CountryRef, ViewMode};

/// Subsets at least this large are not listed.
pub const TOO_MANY_THRESHOLD: usize = 10;

/// Choose the display mode for a filtered subset. Only its length matters.
///
/// An empty subset falls into [`ViewMode::List`] and renders as an empty list.
pub fn select_view(subset: &[CountryRef]) -> ViewMode {
    mode_for_len(subset.len())
}

pub fn mode_for_len(len: usize) -> ViewMode {
    if len >= TOO_MANY_THRESHOLD {
        ViewMode::TooMany
    } else if len == 1 {
        ViewMode::Single
    } else {
        ViewMode::List
    }
}
