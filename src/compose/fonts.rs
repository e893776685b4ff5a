//! Font declarations for the in-browser preview.
//!
//! The preview references font files by URL, so it is not self-contained;
//! [`crate::export::png`] embeds the binaries when a standalone image is
//! needed.

use super::layout::{NAME_FAMILY, NOTE_FAMILY};

/// A font family the preview declares with `@font-face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewFont {
    pub family: &'static str,
    pub woff2: &'static str,
    pub woff: &'static str,
}

/// Families used by the name and note lines.
pub const PREVIEW_FONTS: &[PreviewFont] = &[
    PreviewFont {
        family: NAME_FAMILY,
        woff2: "assets/HindSiliguri-Light.woff2",
        woff: "assets/HindSiliguri-Light.woff",
    },
    PreviewFont {
        family: NOTE_FAMILY,
        woff2: "assets/NillJannatiMatraUnicode.woff2",
        woff: "assets/NillJannatiMatraUnicode.woff",
    },
];

/// CSS body of the injected `<style>` block.
pub fn preview_font_css() -> String {
    let mut css = String::from("\n");
    for font in PREVIEW_FONTS {
        css.push_str(&format!(
            "@font-face {{\n    font-family: '{}';\n    src: url('{}') format('woff2'),\n         url('{}') format('woff');\n}}\n",
            font.family, font.woff2, font.woff
        ));
    }
    css
}
