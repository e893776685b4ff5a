//! Font binaries for standalone exports.
//!
//! The preview only references fonts by URL. A rasterized or downloaded card
//! has no page to resolve those URLs against, so the binaries are fetched and
//! inlined as `data:` URIs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::assets::AssetSource;

/// A font family inlined into exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFont {
    pub family: &'static str,
    pub path: &'static str,
}

/// Family assigned to text that declares none.
pub const FALLBACK_FAMILY: &str = "suhrid-bornobilas";

/// Fonts embedded into every PNG export.
pub const EXPORT_FONTS: &[ExportFont] = &[
    ExportFont {
        family: FALLBACK_FAMILY,
        path: "assets/FN Suhrid Bornobilas Unicode.woff2",
    },
    ExportFont {
        family: "nill-jannati-matra-unicode",
        path: "assets/NillJannatiMatraUnicode.woff2",
    },
    ExportFont {
        family: "atma-medium",
        path: "assets/Atma-Medium.woff2",
    },
    ExportFont {
        family: "hind-siliguri-light",
        path: "assets/HindSiliguri-Light.woff2",
    },
];

/// A font binary that was fetched successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFont {
    pub family: &'static str,
    pub bytes: Vec<u8>,
}

/// Fetch `fonts` concurrently.
///
/// Failures are logged and skipped; the result keeps the order of `fonts`.
pub async fn fetch_fonts(source: Arc<dyn AssetSource>, fonts: &[ExportFont]) -> Vec<FetchedFont> {
    let mut tasks = JoinSet::new();
    for (index, font) in fonts.iter().copied().enumerate() {
        let source = source.clone();
        tasks.spawn(async move { (index, font, source.fetch(font.path).await) });
    }

    let mut fetched = Vec::with_capacity(fonts.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, font, Ok(bytes))) => fetched.push((
                index,
                FetchedFont {
                    family: font.family,
                    bytes,
                },
            )),
            Ok((_, font, Err(e))) => log::warn!("Error loading font {}: {}", font.family, e),
            Err(e) => log::warn!("Font fetch task failed: {}", e),
        }
    }
    fetched.sort_by_key(|(index, _)| *index);
    fetched.into_iter().map(|(_, font)| font).collect()
}

/// `@font-face` rules with the binaries inlined.
pub fn font_face_rules(fonts: &[FetchedFont]) -> String {
    fonts
        .iter()
        .map(|font| {
            format!(
                "\n@font-face {{\n    font-family: '{}';\n    src: url('data:font/woff2;base64,{}') format('woff2');\n}}\n",
                font.family,
                BASE64_STANDARD.encode(&font.bytes)
            )
        })
        .collect()
}

/// Append inlined font rules to the first `<style>` element of `markup`.
///
/// Markup without a `<style>` element is returned unchanged.
pub fn embed_fonts(markup: &str, fonts: &[FetchedFont]) -> String {
    if fonts.is_empty() {
        return markup.to_string();
    }
    let rules = font_face_rules(fonts);
    markup.replacen("</style>", &format!("{}</style>", rules), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;

    #[tokio::test]
    async fn test_missing_fonts_are_skipped() {
        let assets = MemoryAssets::new()
            .with("assets/Atma-Medium.woff2", vec![1u8, 2, 3])
            .with("assets/HindSiliguri-Light.woff2", vec![4u8]);
        let fonts = fetch_fonts(Arc::new(assets), EXPORT_FONTS).await;

        let families: Vec<_> = fonts.iter().map(|f| f.family).collect();
        assert_eq!(families, vec!["atma-medium", "hind-siliguri-light"]);
    }

    #[test]
    fn test_embed_into_first_style() {
        let fonts = vec![FetchedFont {
            family: "atma-medium",
            bytes: b"abc".to_vec(),
        }];
        let out = embed_fonts("<svg><style>a{}</style><style></style></svg>", &fonts);
        assert!(out.starts_with("<svg><style>a{}\n@font-face {"));
        assert!(out.contains("url('data:font/woff2;base64,YWJj') format('woff2')"));
        assert!(out.ends_with("</style><style></style></svg>"));
    }

    #[test]
    fn test_no_style_no_change() {
        let fonts = vec![FetchedFont {
            family: "atma-medium",
            bytes: vec![0],
        }];
        assert_eq!(embed_fonts("<svg/>", &fonts), "<svg/>");
    }
}
