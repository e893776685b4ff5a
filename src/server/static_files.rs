//! Static file serving from the embedded `public/` directory.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::assets::PUBLIC_DIR;
use crate::selection;

use super::state::AppState;

/// Serve the landing page with a cache-busted thumbnail strip.
///
/// With an asset directory configured, its `index.html` wins over the
/// embedded one.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let from_dir = match &state.config.asset_dir {
        Some(dir) => tokio::fs::read_to_string(dir.join("index.html")).await.ok(),
        None => None,
    };
    let contents = from_dir.or_else(|| {
        PUBLIC_DIR
            .get_file("index.html")
            .map(|file| String::from_utf8_lossy(file.contents()).into_owned())
    });

    match contents {
        Some(contents) => {
            let cache_bust = format!("?v={}", state.boot_time);

            let strip: String = selection::thumbnails(0)
                .iter()
                .map(|t| {
                    format!(
                        r#"<img class="template-thumbnail" src="/{}{}" alt="Template {}">"#,
                        t.path,
                        cache_bust,
                        t.ordinal + 1
                    )
                })
                .collect();
            let page = contents.replace("<!-- templates -->", &strip);

            Html(page).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Landing page missing").into_response(),
    }
}

/// Serve `/templates/*path`.
pub async fn template_handler(Path(path): Path<String>) -> Response {
    embedded_file("templates", &path)
}

/// Serve `/assets/*path`.
pub async fn asset_handler(Path(path): Path<String>) -> Response {
    embedded_file("assets", &path)
}

fn embedded_file(prefix: &str, path: &str) -> Response {
    // Strip query params if present
    let clean_path = path.split('?').next().unwrap_or(path);
    let file_path = format!("{}/{}", prefix, clean_path);

    match PUBLIC_DIR.get_file(&file_path) {
        Some(file) => {
            let mime = mime_guess::from_path(clean_path)
                .first_or_octet_stream()
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "public, max-age=31536000".to_string()),
                ],
                file.contents().to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}
