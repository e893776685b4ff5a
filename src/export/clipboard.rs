//! Copy the share link to the clipboard.

use url::Url;

use crate::error::{CardError, Result};
use crate::link;
use crate::state::CardState;

/// Somewhere a share link can be copied to.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard.
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self> {
        let clipboard = arboard::Clipboard::new()
            .map_err(|e| CardError::Clipboard(format!("Clipboard not available: {}", e)))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text.to_string())
            .map_err(|e| CardError::Clipboard(format!("Failed to set clipboard text: {}", e)))
    }
}

/// Encode the share link for `state` and copy it to `sink`.
///
/// A blank name fails with [`CardError::MissingInput`] and nothing is
/// written. Returns the copied link.
pub fn share_to_clipboard(
    base: &Url,
    state: &CardState,
    sink: &mut dyn ClipboardSink,
) -> Result<Url> {
    let url = link::encode(base, state)?;
    sink.set_text(url.as_str())?;
    log::info!("Shareable link copied to clipboard: {}", url);
    Ok(url)
}
