//! # Error Types
//!
//! This module defines error types used throughout the eid-card library.
//!
//! Every failure is handled at the boundary where it happens: the loader turns
//! fetch and parse failures into an error surface, the exporters turn missing
//! input into a user prompt, and font fetches simply degrade. Nothing is
//! retried.

use thiserror::Error;

/// Main error type for eid-card operations
#[derive(Debug, Error)]
pub enum CardError {
    /// Template ordinal or link id outside the registry
    #[error("Template {index} out of range (0..{count})")]
    OutOfRange { index: i64, count: usize },

    /// Network, status or I/O failure loading an asset
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed SVG or missing root element
    #[error("Parse error: {0}")]
    Parse(String),

    /// Offscreen rasterization failed
    #[error("Export failed: {0}")]
    ExportDecode(String),

    /// A required field was blank
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// Clipboard unavailable or write refused
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CardError>;

impl CardError {
    /// Message suitable for showing to the person editing the card.
    pub fn user_message(&self) -> String {
        match self {
            CardError::MissingInput(what) => (*what).to_string(),
            CardError::ExportDecode(_) => {
                "Sorry, there was an error generating the image.".to_string()
            }
            CardError::Clipboard(_) => {
                "Failed to copy the shareable link. Please try again.".to_string()
            }
            CardError::Parse(_) => "Error parsing SVG.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<quick_xml::Error> for CardError {
    fn from(e: quick_xml::Error) -> Self {
        CardError::Parse(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for CardError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        CardError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message_is_prompt() {
        let err = CardError::MissingInput("Please enter your name before sharing.");
        assert_eq!(err.user_message(), "Please enter your name before sharing.");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = CardError::OutOfRange { index: 7, count: 5 };
        assert_eq!(err.to_string(), "Template 7 out of range (0..5)");
    }
}
