//! # Static Asset Host
//!
//! Serves template SVGs, font files and the landing page so that the
//! [`HttpAssets`](crate::assets::HttpAssets) loader and share links have
//! something to point at. Files are handed out unchanged: cards are composed
//! and rendered by whoever fetches them, never here.
//!
//! ## Usage
//!
//! ```bash
//! eid-card serve --listen 0.0.0.0:8080
//! eid-card serve --listen 0.0.0.0:8080 --dir ./public
//! ```
//!
//! ## Routes
//!
//! | Route | Content |
//! |-------|---------|
//! | `/` | landing page |
//! | `/api/templates` | registry as JSON |
//! | `/templates/*`, `/assets/*` | asset files |

mod handlers;
mod state;
mod static_files;

pub use state::ServerConfig;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::error::CardError;
use state::AppState;

/// Build the router for `config`.
pub fn router(config: ServerConfig) -> Router {
    let asset_dir = config.asset_dir.clone();
    let app_state = Arc::new(AppState::new(config));

    let app = Router::new()
        .route("/", get(static_files::index_handler))
        .route("/api/templates", get(handlers::templates::list));

    let app = match asset_dir {
        Some(dir) => app
            .nest_service("/templates", ServeDir::new(dir.join("templates")))
            .nest_service("/assets", ServeDir::new(dir.join("assets"))),
        None => app
            .route("/templates/*path", get(static_files::template_handler))
            .route("/assets/*path", get(static_files::asset_handler)),
    };

    app.with_state(app_state)
}

/// Start the asset host.
///
/// ## Example
///
/// ```no_run
/// use eid_card::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), eid_card::error::CardError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     asset_dir: None,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), CardError> {
    println!("eid-card asset host starting...");
    println!("Listening on: {}", config.listen_addr);
    match &config.asset_dir {
        Some(dir) => println!("Assets: {}", dir.display()),
        None => println!("Assets: embedded"),
    }
    println!();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| CardError::Fetch(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;

    axum::serve(listener, router(config))
        .await
        .map_err(|e| CardError::Fetch(format!("Server error: {}", e)))?;

    Ok(())
}
