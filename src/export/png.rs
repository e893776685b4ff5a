//! # PNG Export
//!
//! Rasterizes the composed card.
//!
//! ## Steps
//!
//! ```text
//! composed SVG
//!   │  fetch EXPORT_FONTS concurrently (failures skipped)
//!   ▼
//! @font-face data: URIs appended to the first <style>
//!   │  <text> without a family → suhrid-bornobilas
//!   ▼
//! resvg: font binaries loaded, CSS names mapped to real family names
//!   │  size = viewBox × 1.5, or 2000×3200
//!   ▼
//! eid-card-<name>-<id>-<millis>.png
//! ```

use resvg::tiny_skia;
use resvg::usvg::{self, fontdb};
use std::collections::HashMap;
use std::sync::Arc;

use super::fonts::{self, EXPORT_FONTS, FALLBACK_FAMILY, FetchedFont};
use super::Download;
use crate::assets::AssetSource;
use crate::compose::layout::parse_view_box;
use crate::compose::svg;
use crate::error::{CardError, Result};
use crate::state::CardState;

/// Output pixels per `viewBox` unit.
pub const RASTER_SCALE: f64 = 1.5;
/// Output size when the markup has no usable `viewBox`.
pub const FALLBACK_RASTER_SIZE: (u32, u32) = (2000, 3200);

/// Export the composed card as a PNG download.
///
/// `timestamp_ms` goes into the file name.
pub async fn export_png(
    source: Arc<dyn AssetSource>,
    composed: &str,
    state: &CardState,
    timestamp_ms: i64,
) -> Result<Download> {
    let fonts = fonts::fetch_fonts(source, EXPORT_FONTS).await;
    let standalone = standalone_markup(composed, &fonts)?;
    let size = raster_size(composed);

    let bytes = tokio::task::spawn_blocking(move || rasterize(&standalone, &fonts, size))
        .await
        .map_err(|e| CardError::ExportDecode(format!("Task error: {}", e)))??;

    Ok(Download {
        filename: export_filename(state, timestamp_ms, "png"),
        bytes,
    })
}

/// Export the composed card as a self-contained SVG download.
pub async fn export_svg(
    source: Arc<dyn AssetSource>,
    composed: &str,
    state: &CardState,
    timestamp_ms: i64,
) -> Result<Download> {
    let fonts = fonts::fetch_fonts(source, EXPORT_FONTS).await;
    let standalone = standalone_markup(composed, &fonts)?;
    Ok(Download {
        filename: export_filename(state, timestamp_ms, "svg"),
        bytes: standalone.into_bytes(),
    })
}

/// Inline `fonts` and give unstyled text the fallback family.
pub fn standalone_markup(composed: &str, fonts: &[FetchedFont]) -> Result<String> {
    let embedded = fonts::embed_fonts(composed, fonts);
    assign_fallback_family(&embedded)
}

/// Set `font-family` on `<text>` elements that have none.
///
/// Elements already on the fallback family are rewritten to the same value;
/// any other family is left alone.
pub fn assign_fallback_family(markup: &str) -> Result<String> {
    svg::rewrite_text_fonts(markup, |current| match current {
        None | Some(FALLBACK_FAMILY) => Some(FALLBACK_FAMILY.to_string()),
        Some(_) => None,
    })
    .map_err(|e| CardError::ExportDecode(e.to_string()))
}

/// Pixel size of the export: `viewBox` × 1.5, else 2000×3200.
pub fn raster_size(markup: &str) -> (u32, u32) {
    svg::read_root_attrs(markup)
        .ok()
        .and_then(|attrs| attrs.view_box)
        .and_then(|vb| parse_view_box(&vb))
        .map(|[_, _, w, h]| ((w * RASTER_SCALE) as u32, (h * RASTER_SCALE) as u32))
        .unwrap_or(FALLBACK_RASTER_SIZE)
}

/// File name for an export, e.g. `eid-card-Rahim-4-1712345678901.png`.
pub fn export_filename(state: &CardState, timestamp_ms: i64, extension: &str) -> String {
    let id = state.template().id();
    let name = state.trimmed_name();
    if name.is_empty() {
        format!("eid-card-{}-{}.{}", id, timestamp_ms, extension)
    } else {
        let name: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("eid-card-{}-{}-{}.{}", name, id, timestamp_ms, extension)
    }
}

/// Rasterize `markup` into a `width`×`height` PNG.
///
/// The document is stretched to fill the output, like drawing an image onto
/// a canvas of that size.
pub fn rasterize(markup: &str, fonts: &[FetchedFont], (width, height): (u32, u32)) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    let aliases = load_fonts(opt.fontdb_mut(), fonts);

    let markup = if aliases.is_empty() {
        markup.to_string()
    } else {
        svg::rewrite_text_fonts(markup, |current| {
            let current = current?;
            let real = aliases.get(current)?;
            Some(format!("{}, '{}'", current, real))
        })
        .map_err(|e| CardError::ExportDecode(e.to_string()))?
    };

    let tree = usvg::Tree::from_str(&markup, &opt)
        .map_err(|e| CardError::ExportDecode(format!("Error loading SVG as an image: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        CardError::ExportDecode(format!("cannot allocate a {}x{} canvas", width, height))
    })?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| CardError::Image(format!("PNG encoding failed: {}", e)))
}

/// Load system fonts plus `fonts`; returns CSS family → family name in the file.
fn load_fonts(db: &mut fontdb::Database, fonts: &[FetchedFont]) -> HashMap<&'static str, String> {
    db.load_system_fonts();

    let mut aliases = HashMap::new();
    for font in fonts {
        let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(font.bytes.clone())));
        let family = ids
            .first()
            .and_then(|id| db.face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone());
        match family {
            Some(family) => {
                aliases.insert(font.family, family);
            }
            None => log::debug!("Font {} is not in a format the rasterizer reads", font.family),
        }
    }
    aliases
}
