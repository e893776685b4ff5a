//! # SVG Text Compositor
//!
//! Overlays a name and a (possibly multi-line) note onto a template's SVG
//! markup.
//!
//! ## Pipeline
//!
//! ```text
//! template markup ──▶ parse root ──▶ CanvasSize::resolve
//!                                        │
//!                     strip old ◀────────┤ layout::place
//!                     overlay nodes      │
//!                                        ▼
//!               <style class="custom-fonts"> + <text class="custom-text">…
//!                                        │
//!                                        ▼
//!                                 composed markup
//! ```
//!
//! Composition is a pure function of its inputs: the same markup, text,
//! color and [`OutputMode`] always produce byte-identical output, and
//! composing already-composed markup replaces the overlay instead of adding a
//! second one.
//!
//! ## Example
//!
//! ```
//! use eid_card::compose::{compose, Overlay, OutputMode};
//!
//! let template = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 800"/>"#;
//! let overlay = Overlay { name: "Rahim", note: "", color: "#3f3b3a" };
//! let card = compose(template, &overlay, OutputMode::Interactive).unwrap();
//! assert!(card.contains(r#"y="760.00""#));
//! ```

pub mod fonts;
pub mod layout;
pub mod svg;

pub use layout::{CanvasSize, OutputMode, TextPlacement};

use crate::error::Result;
use crate::state::CardState;
use crate::template::Template;

use layout::format_number;
use svg::{Injection, RootSize};

/// Text and color to overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay<'a> {
    pub name: &'a str,
    /// Newline-separated lines
    pub note: &'a str,
    /// Already-resolved fill color
    pub color: &'a str,
}

impl<'a> Overlay<'a> {
    /// Overlay for `state` on `template`, applying the template's color policy.
    pub fn for_card(template: &Template, state: &'a CardState, requested_color: &'a str) -> Self {
        Self {
            name: &state.name,
            note: &state.note,
            color: template.resolve_color(requested_color),
        }
    }
}

/// Compose `overlay` onto `markup`.
///
/// Fails with [`CardError::Parse`](crate::error::CardError::Parse) when the
/// markup is not well-formed or has no `<svg>` root.
pub fn compose(markup: &str, overlay: &Overlay<'_>, mode: OutputMode) -> Result<String> {
    svg::rewrite(markup, |attrs| {
        let size = CanvasSize::resolve(attrs, mode);
        let texts = layout::place(size, overlay.name, overlay.note);
        let style = (!texts.is_empty()).then(fonts::preview_font_css);
        let root_size = match mode {
            OutputMode::Interactive => RootSize::Remove,
            OutputMode::Static => RootSize::Pixels {
                width: format!("{}px", format_number(size.width)),
                height: format!("{}px", format_number(size.height)),
            },
        };

        Injection {
            root_size,
            style,
            texts,
            fill: overlay.color.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CardError;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 800" width="500" height="800"><rect width="500" height="800" fill="#fff"/></svg>"##;

    fn overlay<'a>(name: &'a str, note: &'a str) -> Overlay<'a> {
        Overlay {
            name,
            note,
            color: "#3f3b3a",
        }
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose(TEMPLATE, &overlay("Rahim", "Hi"), OutputMode::Interactive).unwrap();
        let b = compose(TEMPLATE, &overlay("Rahim", "Hi"), OutputMode::Interactive).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recompose_replaces_overlay() {
        let once = compose(TEMPLATE, &overlay("Rahim", "a\nb"), OutputMode::Interactive).unwrap();
        let twice = compose(&once, &overlay("Rahim", "a\nb"), OutputMode::Interactive).unwrap();
        assert_eq!(count(&twice, "<text"), 3);
        assert_eq!(count(&twice, "<style"), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_recompose_with_new_text_drops_old_lines() {
        let first = compose(TEMPLATE, &overlay("Old", "x\ny\nz"), OutputMode::Interactive).unwrap();
        let second = compose(&first, &overlay("New", ""), OutputMode::Interactive).unwrap();
        assert_eq!(count(&second, "<text"), 1);
        assert!(second.contains(">New</text>"));
        assert!(!second.contains("Old"));
    }

    #[test]
    fn test_interactive_strips_root_size() {
        let out = compose(TEMPLATE, &overlay("Rahim", ""), OutputMode::Interactive).unwrap();
        assert!(out.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 800"><style class="custom-fonts">"#
        ));
        // the background rect keeps its own width/height
        assert!(out.contains(r##"<rect width="500" height="800" fill="#fff"/>"##));
    }

    #[test]
    fn test_recompose_with_quoted_root_style() {
        let template = r#"<svg viewBox="0 0 500 800" width="500" height="800" style='font-family:"Noto Sans"'></svg>"#;
        let once = compose(template, &overlay("Rahim", ""), OutputMode::Interactive).unwrap();
        let twice = compose(&once, &overlay("Rahim", ""), OutputMode::Interactive).unwrap();
        assert!(once.starts_with(
            r#"<svg viewBox="0 0 500 800" style="font-family:&quot;Noto Sans&quot;">"#
        ));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_static_sets_pixel_size() {
        let template = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1080 1920"></svg>"#;
        let out = compose(template, &overlay("Rahim", ""), OutputMode::Static).unwrap();
        assert!(out.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1080 1920" width="1080px" height="1920px">"#
        ));
        assert!(out.contains(r#"x="540" y="1824.00""#));
    }

    #[test]
    fn test_blank_text_leaves_markup_unchanged() {
        let template = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 800">
  <circle r="4"/>
</svg>"#;
        let out = compose(template, &overlay("  ", ""), OutputMode::Interactive).unwrap();
        assert_eq!(out, template);
    }

    #[test]
    fn test_name_node_attributes() {
        let out = compose(TEMPLATE, &overlay("Rahim", ""), OutputMode::Interactive).unwrap();
        assert!(out.contains(
            r##"<text x="250" y="760.00" text-anchor="middle" font-family="hind-siliguri-light" font-size="28.00" fill="#3f3b3a" font-weight="500" class="custom-text">Rahim</text></svg>"##
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let out = compose(TEMPLATE, &overlay("A & <B>", ""), OutputMode::Interactive).unwrap();
        assert!(out.contains(">A &amp; &lt;B&gt;</text>"));
    }

    #[test]
    fn test_self_closing_root_is_expanded() {
        let out = compose(
            r#"<svg viewBox="0 0 100 200"/>"#,
            &overlay("N", ""),
            OutputMode::Interactive,
        )
        .unwrap();
        assert!(out.starts_with(r#"<svg viewBox="0 0 100 200"><style"#));
        assert!(out.ends_with("</text></svg>"));
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "<svg><g></svg>", "<svg>", "<div></div>"] {
            let result = compose(bad, &overlay("N", ""), OutputMode::Interactive);
            assert!(matches!(result, Err(CardError::Parse(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_for_card_applies_override() {
        let state = CardState::new(3, "Rahim", "").unwrap();
        let o = Overlay::for_card(state.template(), &state, "#000000");
        assert_eq!(o.color, "#461e4c");
    }
}
