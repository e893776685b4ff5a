//! Template registry API.

use axum::Json;
use serde::Serialize;

use crate::template::TEMPLATES;

/// One registry entry as served to clients.
#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub ordinal: usize,
    pub id: u32,
    pub path: &'static str,
    /// Color the text is drawn in on this template
    pub color: &'static str,
}

/// GET /api/templates - List templates in display order.
pub async fn list() -> Json<Vec<TemplateInfo>> {
    let templates = TEMPLATES
        .iter()
        .map(|t| TemplateInfo {
            ordinal: t.ordinal(),
            id: t.id(),
            path: t.path,
            color: t.text_color(),
        })
        .collect();
    Json(templates)
}
