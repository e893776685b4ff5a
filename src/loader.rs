//! # Template Loader
//!
//! Owns an editing session: the [`CardState`], the pristine markup of the
//! last template that loaded, and the visible [`Surface`].
//!
//! ## Request sequencing
//!
//! Every [`TemplateLoader::select`] takes a token from a monotonically
//! increasing counter before it starts fetching. When the fetch resolves, the
//! result is applied only if its token is still the newest one; anything
//! older is discarded. Rapid template switching therefore always ends on the
//! template that was picked last, whatever order the fetches finish in.
//!
//! ```text
//! select(0) ── token 1 ── fetch ─────────────────────▶ stale, dropped
//! select(1) ── token 2 ── fetch ──────▶ applied
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assets::AssetSource;
use crate::compose::{self, OutputMode, Overlay};
use crate::error::Result;
use crate::link::SharedCard;
use crate::selection;
use crate::state::CardState;
use crate::template::{self, Template, DEFAULT_TEXT_COLOR};

/// What the editor currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Surface {
    /// Nothing loaded yet
    #[default]
    Blank,
    /// Composed card markup
    Card(String),
    /// Inline error message shown in place of the card
    Error(String),
}

impl Surface {
    pub fn markup(&self) -> Option<&str> {
        match self {
            Surface::Card(m) => Some(m),
            _ => None,
        }
    }
}

/// Outcome of a [`TemplateLoader::select`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected {
    /// The template loaded and the surface now shows it
    Applied,
    /// Ordinal out of range; nothing changed
    Rejected,
    /// A newer selection was issued while this one was in flight
    Superseded,
    /// Fetch or parse failed; the surface shows an error
    Failed,
}

struct Loaded {
    template: &'static Template,
    markup: String,
}

#[derive(Default)]
struct Session {
    state: CardState,
    loaded: Option<Loaded>,
    surface: Surface,
}

impl Session {
    /// Rebuild the surface from the pristine template markup.
    fn recompose(&mut self) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        let overlay = Overlay::for_card(loaded.template, &self.state, loaded.template.color);
        self.surface = match compose::compose(&loaded.markup, &overlay, OutputMode::Interactive) {
            Ok(markup) => Surface::Card(markup),
            Err(e) => {
                log::error!("Error processing {}: {}", loaded.template.path, e);
                Surface::Error(e.user_message())
            }
        };
    }
}

/// Loads templates and keeps the editing surface in sync with the card state.
pub struct TemplateLoader {
    source: Arc<dyn AssetSource>,
    session: RwLock<Session>,
    latest: AtomicU64,
}

impl TemplateLoader {
    /// New session on template 0 with empty text. Nothing is fetched until
    /// the first [`select`](Self::select).
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            session: RwLock::new(Session::default()),
            latest: AtomicU64::new(0),
        }
    }

    /// Switch to the template at `ordinal` and recompose.
    pub async fn select(&self, ordinal: usize) -> Selected {
        let template = match template::by_ordinal(ordinal) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Invalid template index {}: {}", ordinal, e);
                return Selected::Rejected;
            }
        };

        // token and ordinal change under one guard so the newest token always
        // belongs to the ordinal in the state
        let token = {
            let mut session = self.session.write().await;
            session.state.select(ordinal).ok();
            self.latest.fetch_add(1, Ordering::SeqCst) + 1
        };

        let fetched = self.source.fetch_text(template.path).await;

        let mut session = self.session.write().await;
        if self.latest.load(Ordering::SeqCst) != token || session.state.ordinal() != ordinal {
            log::debug!("Discarding stale response for {} (token {})", template.path, token);
            return Selected::Superseded;
        }

        match fetched {
            Ok(markup) => {
                session.loaded = Some(Loaded { template, markup });
                session.recompose();
                match session.surface {
                    Surface::Error(_) => Selected::Failed,
                    _ => Selected::Applied,
                }
            }
            Err(e) => {
                log::error!("Error fetching template {}: {}", template.path, e);
                session.surface =
                    Surface::Error(format!("Error loading template: {}.", template.file_name()));
                Selected::Failed
            }
        }
    }

    /// Reload the currently selected template.
    pub async fn reload(&self) -> Selected {
        let ordinal = self.session.read().await.state.ordinal();
        self.select(ordinal).await
    }

    /// Move to the next template, wrapping around.
    pub async fn next(&self) -> Selected {
        let ordinal = self.session.read().await.state.ordinal();
        self.select(selection::next(ordinal)).await
    }

    /// Move to the previous template, wrapping around.
    pub async fn previous(&self) -> Selected {
        let ordinal = self.session.read().await.state.ordinal();
        self.select(selection::previous(ordinal)).await
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        let mut session = self.session.write().await;
        session.state.name = name.into();
        session.recompose();
    }

    pub async fn set_note(&self, note: impl Into<String>) {
        let mut session = self.session.write().await;
        session.state.note = note.into();
        session.recompose();
    }

    /// Replace both name and note with a single recomposition.
    pub async fn set_text(&self, name: impl Into<String>, note: impl Into<String>) {
        let mut session = self.session.write().await;
        session.state.name = name.into();
        session.state.note = note.into();
        session.recompose();
    }

    /// Recompose from the loaded template without fetching.
    pub async fn recompose(&self) {
        self.session.write().await.recompose();
    }

    pub async fn surface(&self) -> Surface {
        self.session.read().await.surface.clone()
    }

    pub async fn state(&self) -> CardState {
        self.session.read().await.state.clone()
    }

    /// Ordinal of the template whose markup is currently loaded.
    pub async fn loaded_ordinal(&self) -> Option<usize> {
        self.session
            .read()
            .await
            .loaded
            .as_ref()
            .map(|l| l.template.ordinal())
    }

    /// Color the overlay is drawn in; the default until a template loads.
    pub async fn text_color(&self) -> &'static str {
        self.session
            .read()
            .await
            .loaded
            .as_ref()
            .map_or(DEFAULT_TEXT_COLOR, |l| l.template.text_color())
    }

    pub fn source(&self) -> &Arc<dyn AssetSource> {
        &self.source
    }
}

/// Render a decoded share link read-only.
///
/// Uses the same placement as the editor, in [`OutputMode::Static`].
pub async fn render_shared(source: &dyn AssetSource, card: &SharedCard) -> Result<String> {
    let markup = source.fetch_text(card.template.path).await?;
    let overlay = Overlay {
        name: &card.name,
        note: &card.note,
        color: card.template.text_color(),
    };
    compose::compose(&markup, &overlay, OutputMode::Static)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn svg(tag: &str) -> String {
        format!(r#"<svg viewBox="0 0 500 800"><desc>{}</desc></svg>"#, tag)
    }

    fn memory() -> MemoryAssets {
        let mut assets = MemoryAssets::new();
        for t in template::TEMPLATES {
            assets.insert(t.path, svg(t.file_name()));
        }
        assets
    }

    #[tokio::test]
    async fn test_select_composes_current_text() {
        let loader = TemplateLoader::new(Arc::new(memory()));
        loader.set_name("Rahim").await;
        assert_eq!(loader.surface().await, Surface::Blank);

        assert_eq!(loader.select(1).await, Selected::Applied);
        let surface = loader.surface().await;
        let markup = surface.markup().unwrap();
        assert!(markup.contains("template2.svg"));
        assert!(markup.contains(r##"fill="#ffb400""##));
        assert!(markup.contains(">Rahim</text>"));
    }

    #[tokio::test]
    async fn test_out_of_range_is_ignored() {
        let loader = TemplateLoader::new(Arc::new(memory()));
        loader.select(2).await;
        let before = loader.surface().await;
        assert_eq!(loader.select(5).await, Selected::Rejected);
        assert_eq!(loader.state().await.ordinal(), 2);
        assert_eq!(loader.surface().await, before);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_error_and_keeps_markup() {
        let assets = MemoryAssets::new().with("templates/template1.svg", svg("one"));
        let loader = TemplateLoader::new(Arc::new(assets));
        loader.select(0).await;

        assert_eq!(loader.select(2).await, Selected::Failed);
        assert_eq!(
            loader.surface().await,
            Surface::Error("Error loading template: template3.svg.".into())
        );

        // typing re-renders the template that did load
        loader.set_name("Rahim").await;
        assert!(loader.surface().await.markup().unwrap().contains("one"));
        assert_eq!(loader.loaded_ordinal().await, Some(0));
    }

    #[tokio::test]
    async fn test_parse_failure_shows_error() {
        let assets = MemoryAssets::new().with("templates/template1.svg", "<svg><g></svg>");
        let loader = TemplateLoader::new(Arc::new(assets));
        assert_eq!(loader.select(0).await, Selected::Failed);
        assert_eq!(loader.surface().await, Surface::Error("Error parsing SVG.".into()));
    }

    #[tokio::test]
    async fn test_repeated_recompose_does_not_accumulate() {
        let loader = TemplateLoader::new(Arc::new(memory()));
        loader.set_text("Rahim", "a\nb").await;
        loader.select(0).await;
        loader.recompose().await;
        loader.recompose().await;
        let surface = loader.surface().await;
        assert_eq!(surface.markup().unwrap().matches("<text").count(), 3);
    }

    #[tokio::test]
    async fn test_text_color_follows_loaded_template() {
        let loader = TemplateLoader::new(Arc::new(memory()));
        assert_eq!(loader.text_color().await, DEFAULT_TEXT_COLOR);
        loader.select(3).await;
        assert_eq!(loader.text_color().await, "#461e4c");
    }

    #[tokio::test]
    async fn test_next_previous_wrap() {
        let loader = TemplateLoader::new(Arc::new(memory()));
        loader.previous().await;
        assert_eq!(loader.state().await.ordinal(), 4);
        loader.next().await;
        assert_eq!(loader.state().await.ordinal(), 0);
    }

    /// Holds back one path until released.
    struct GatedAssets {
        inner: MemoryAssets,
        gated: &'static str,
        gate: Notify,
    }

    #[async_trait]
    impl AssetSource for GatedAssets {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            if path == self.gated {
                self.gate.notified().await;
            }
            self.inner.fetch(path).await
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let assets = Arc::new(GatedAssets {
            inner: memory(),
            gated: "templates/template1.svg",
            gate: Notify::new(),
        });
        let loader = Arc::new(TemplateLoader::new(assets.clone()));
        loader.select(2).await;

        let slow = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.select(0).await })
        };
        while loader.state().await.ordinal() != 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.select(3).await, Selected::Applied);
        assets.gate.notify_one();
        assert_eq!(slow.await.unwrap(), Selected::Superseded);

        let surface = loader.surface().await;
        assert!(surface.markup().unwrap().contains("template4.svg"));
        assert_eq!(loader.loaded_ordinal().await, Some(3));
        assert_eq!(loader.state().await.ordinal(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_selects_keep_state_and_surface_in_step() {
        let loader = Arc::new(TemplateLoader::new(Arc::new(memory())));
        for round in 0..20 {
            let tasks: Vec<_> = (0..template::count())
                .map(|i| {
                    let loader = loader.clone();
                    tokio::spawn(async move { loader.select((i + round) % template::count()).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let state = loader.state().await;
            assert_eq!(loader.loaded_ordinal().await, Some(state.ordinal()));
            let surface = loader.surface().await;
            assert!(surface.markup().unwrap().contains(state.template().file_name()));
        }
    }

    #[tokio::test]
    async fn test_render_shared_is_static() {
        let card = SharedCard {
            template: template::by_id(2).unwrap(),
            name: "Rahim".into(),
            note: String::new(),
        };
        let markup = render_shared(&memory(), &card).await.unwrap();
        assert!(markup.contains(r#"width="500px" height="800px""#));
        assert!(markup.contains(">Rahim</text>"));
    }
}
