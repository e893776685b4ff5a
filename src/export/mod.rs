//! # Export Pipeline
//!
//! Terminal consumers of a composed card.
//!
//! | Export | Module | Needs a name |
//! |--------|--------|--------------|
//! | QR code of the share link | [`qr`] | yes |
//! | Share link on the clipboard | [`clipboard`] | yes |
//! | Rasterized PNG | [`png`] | no |
//!
//! Exports produce a [`Download`]: the bytes plus the file name a browser
//! would save them under. Writing it somewhere is the caller's business.

pub mod clipboard;
pub mod fonts;
pub mod png;
pub mod qr;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A finished export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write into `dir` under the download's file name.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
