//! # Template Registry
//!
//! The fixed, ordered list of card backgrounds. This table is the single
//! source of template metadata: the editor addresses templates by 0-based
//! ordinal, share links by 1-based id, and both views are derived here.
//!
//! ## Templates
//!
//! | Ordinal | Id | Asset | Text color | Forced color |
//! |---------|----|-------|------------|--------------|
//! | 0 | 1 | `templates/template1.svg` | `#3f3b3a` | |
//! | 1 | 2 | `templates/template2.svg` | `#ffb400` | |
//! | 2 | 3 | `templates/template3.svg` | `#ffffff` | |
//! | 3 | 4 | `templates/template4.svg` | `#ffffff` | `#461e4c` |
//! | 4 | 5 | `templates/template5.svg` | `#3f3b3a` | `#ffffff` |
//!
//! ## Usage
//!
//! ```
//! use eid_card::template;
//!
//! let t = template::by_id(4).unwrap();
//! assert_eq!(t.ordinal(), 3);
//! assert_eq!(t.resolve_color("#000000"), "#461e4c");
//! ```

use serde::Serialize;

use crate::error::{CardError, Result};

/// Text color used before any template has loaded.
pub const DEFAULT_TEXT_COLOR: &str = "#333333";

/// A card background with its text color policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Position in [`TEMPLATES`]
    pub ordinal: usize,
    /// Asset path relative to the asset root
    pub path: &'static str,
    /// Default text color
    pub color: &'static str,
    /// Color that replaces any requested color on this template
    pub color_override: Option<&'static str>,
}

/// All templates, in display order.
pub const TEMPLATES: &[Template] = &[
    Template {
        ordinal: 0,
        path: "templates/template1.svg",
        color: "#3f3b3a",
        color_override: None,
    },
    Template {
        ordinal: 1,
        path: "templates/template2.svg",
        color: "#ffb400",
        color_override: None,
    },
    Template {
        ordinal: 2,
        path: "templates/template3.svg",
        color: "#ffffff",
        color_override: None,
    },
    Template {
        ordinal: 3,
        path: "templates/template4.svg",
        color: "#ffffff",
        color_override: Some("#461e4c"),
    },
    Template {
        ordinal: 4,
        path: "templates/template5.svg",
        color: "#3f3b3a",
        color_override: Some("#ffffff"),
    },
];

impl Template {
    /// 0-based position used by the editor.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// 1-based id used in share links.
    #[inline]
    pub fn id(&self) -> u32 {
        self.ordinal as u32 + 1
    }

    /// Last path segment, e.g. `template3.svg`.
    pub fn file_name(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }

    /// Effective text color for a requested color.
    pub fn resolve_color<'a>(&self, requested: &'a str) -> &'a str {
        self.color_override.unwrap_or(requested)
    }

    /// Effective text color when the caller has no preference.
    pub fn text_color(&self) -> &'static str {
        self.color_override.unwrap_or(self.color)
    }
}

/// Number of templates.
#[inline]
pub fn count() -> usize {
    TEMPLATES.len()
}

/// Look up a template by 0-based ordinal.
pub fn by_ordinal(ordinal: usize) -> Result<&'static Template> {
    TEMPLATES.get(ordinal).ok_or(CardError::OutOfRange {
        index: ordinal as i64,
        count: TEMPLATES.len(),
    })
}

/// Look up a template by 1-based share-link id.
pub fn by_id(id: u32) -> Result<&'static Template> {
    match id.checked_sub(1) {
        Some(ordinal) => by_ordinal(ordinal as usize),
        None => Err(CardError::OutOfRange {
            index: -1,
            count: TEMPLATES.len(),
        }),
    }
}
