//! # Template Selection
//!
//! Navigation over the template strip: prev/next arrows that wrap around,
//! direct jumps from a thumbnail, and the strip itself with the active entry
//! marked. Pure functions over ordinals; the loader owns the actual state.
//!
//! ```text
//!  ◀  [1] [2] [*3*] [4] [5]  ▶
//!       prev wraps 0 → 4, next wraps 4 → 0
//! ```

use serde::Serialize;

use crate::template::{self, TEMPLATES};

/// One entry of the thumbnail strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub ordinal: usize,
    pub path: &'static str,
    pub color: &'static str,
    pub selected: bool,
}

/// Ordinal after `current`, wrapping to the first template.
pub fn next(current: usize) -> usize {
    (current + 1) % template::count()
}

/// Ordinal before `current`, wrapping to the last template.
pub fn previous(current: usize) -> usize {
    let count = template::count();
    (current + count - 1) % count
}

/// Prev/next arrows only make sense with more than one template.
pub fn arrows_visible() -> bool {
    template::count() > 1
}

/// The thumbnail strip with `current` marked as selected.
pub fn thumbnails(current: usize) -> Vec<Thumbnail> {
    TEMPLATES
        .iter()
        .map(|t| Thumbnail {
            ordinal: t.ordinal,
            path: t.path,
            color: t.color,
            selected: t.ordinal == current,
        })
        .collect()
}

/// Render the strip as a single terminal line, e.g. `[1] [*2*] [3]`.
pub fn render_strip(current: usize) -> String {
    thumbnails(current)
        .iter()
        .map(|t| {
            if t.selected {
                format!("[*{}*]", t.ordinal + 1)
            } else {
                format!("[{}]", t.ordinal + 1)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
