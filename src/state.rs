//! Card state: the one mutable piece of an editing session.

use crate::error::{CardError, Result};
use crate::template::{self, Template};

/// Prompt shown when a template id names no template.
pub const UNKNOWN_TEMPLATE_ID: &str = "No template with that id. Run `eid-card templates` to list them.";

/// Selected template plus the personalized text.
///
/// Owned by the [`TemplateLoader`](crate::loader::TemplateLoader) session and
/// handed by reference to the link codec and exporters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardState {
    /// 0-based template ordinal, always within the registry
    ordinal: usize,
    pub name: String,
    /// Newline-separated note lines
    pub note: String,
}

impl CardState {
    pub fn new(ordinal: usize, name: impl Into<String>, note: impl Into<String>) -> Result<Self> {
        template::by_ordinal(ordinal)?;
        Ok(Self {
            ordinal,
            name: name.into(),
            note: note.into(),
        })
    }

    /// State for the template with 1-based share-link `id`.
    ///
    /// Unknown ids are [`CardError::MissingInput`] with [`UNKNOWN_TEMPLATE_ID`].
    pub fn for_id(id: u32, name: impl Into<String>, note: impl Into<String>) -> Result<Self> {
        let template =
            template::by_id(id).map_err(|_| CardError::MissingInput(UNKNOWN_TEMPLATE_ID))?;
        Self::new(template.ordinal(), name, note)
    }

    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn template(&self) -> &'static Template {
        // ordinal is validated on every write
        &template::TEMPLATES[self.ordinal]
    }

    /// Change the template; out-of-range ordinals leave the state untouched.
    pub fn select(&mut self, ordinal: usize) -> Result<&'static Template> {
        let t = template::by_ordinal(ordinal)?;
        self.ordinal = ordinal;
        Ok(t)
    }

    /// Name with surrounding whitespace removed, as shared.
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    /// Note with surrounding whitespace removed, as shared.
    pub fn trimmed_note(&self) -> &str {
        self.note.trim()
    }
}
