//! # eid-card - Greeting Card Composer
//!
//! eid-card overlays a personalized name and note onto SVG greeting-card
//! templates and exports the result. It provides:
//!
//! - **Composition**: deterministic text placement injected into template SVG
//! - **Editing sessions**: template loading with request sequencing
//! - **Share links**: query-string encoding of a card for a read-only view
//! - **Exports**: QR code of the link, clipboard copy, rasterized PNG
//! - **Asset hosting**: a static file server for templates and fonts
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use eid_card::{assets::EmbeddedAssets, link, loader::TemplateLoader};
//!
//! # async fn example() -> Result<(), eid_card::CardError> {
//! let loader = TemplateLoader::new(Arc::new(EmbeddedAssets));
//! loader.set_text("Rahim", "Eid Mubarak\nSee you soon").await;
//! loader.select(3).await;
//!
//! if let Some(svg) = loader.surface().await.markup() {
//!     std::fs::write("card.svg", svg)?;
//! }
//! let base = url::Url::parse("https://cards.example/").unwrap();
//! let share = link::encode(&base, &loader.state().await)?;
//! println!("{}", share);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template registry |
//! | [`compose`] | SVG text compositor |
//! | [`loader`] | Editing session and receiver rendering |
//! | [`selection`] | Prev/next and thumbnail strip |
//! | [`link`] | Share link codec |
//! | [`export`] | QR, clipboard and PNG exports |
//! | [`assets`] | Asset sources (embedded, directory, HTTP) |
//! | [`server`] | Static asset host |
//! | [`error`] | Error types |

pub mod assets;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod link;
pub mod loader;
pub mod logging;
pub mod selection;
pub mod server;
pub mod state;
pub mod template;

// Re-exports for convenience
pub use error::CardError;
pub use state::CardState;
pub use template::Template;
