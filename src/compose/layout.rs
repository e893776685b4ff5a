//! # Text Placement
//!
//! Deterministic layout of the name and note over a template's coordinate
//! system. Everything is expressed as a fraction of the canvas height so the
//! overlay scales with the template.
//!
//! ## Geometry
//!
//! ```text
//! ┌──────────────────────────┐  y = 0
//! │                          │
//! │        note line 1       │  top = nameY − N·pitch − 0.05·h
//! │        note line N       │  top + (N−1)·pitch
//! │                          │  (0.05·h + one pitch gap)
//! │          Name            │  nameY = h − 0.05·h
//! └──────────────────────────┘  y = h
//!
//! name size  = 0.035·h
//! note size  = 0.0435·h, pitch = 1.2 · note size
//! ```

/// Fallback canvas width when the template declares nothing usable.
pub const DEFAULT_WIDTH: f64 = 500.0;
/// Fallback canvas height when the template declares nothing usable.
pub const DEFAULT_HEIGHT: f64 = 800.0;

const NAME_BOTTOM_MARGIN: f64 = 0.05;
const NAME_FONT_RATIO: f64 = 0.035;
const NOTE_FONT_RATIO: f64 = 0.0435;
const NOTE_LINE_PITCH: f64 = 1.2;
const NOTE_GAP: f64 = 0.05;

/// Font family used for the name line.
pub const NAME_FAMILY: &str = "hind-siliguri-light";
/// Font family used for note lines.
pub const NOTE_FAMILY: &str = "nill-jannati-matra-unicode";

/// How the composed SVG will be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Editable preview: root scales to its container through `viewBox`.
    #[default]
    Interactive,
    /// Read-only receiver render: root carries explicit pixel dimensions.
    Static,
}

/// Root `<svg>` attributes that feed size resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootAttrs {
    pub view_box: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Canvas dimensions in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl CanvasSize {
    /// Resolve the canvas from the root attributes.
    ///
    /// Interactive mode prefers a well-formed `viewBox`, then the
    /// `width`/`height` attributes, then 500×800. Static mode only trusts the
    /// `viewBox` (both dimensions non-zero) and otherwise uses 500×800.
    pub fn resolve(attrs: &RootAttrs, mode: OutputMode) -> Self {
        let view_box = attrs.view_box.as_deref().map(parse_view_box);

        match mode {
            OutputMode::Static => match view_box {
                Some(Some([_, _, w, h])) if w != 0.0 && h != 0.0 => Self::new(w, h),
                _ => Self::default(),
            },
            OutputMode::Interactive => {
                let width = attrs.width.as_deref().and_then(parse_leading_int);
                let height = attrs.height.as_deref().and_then(parse_leading_int);
                match view_box {
                    Some(Some([_, _, w, h])) => Self::new(w, h),
                    Some(None) => {
                        log::warn!("Invalid viewBox attribute: {:?}", attrs.view_box);
                        Self::new(
                            width.filter(|w| *w != 0.0).unwrap_or(DEFAULT_WIDTH),
                            height.filter(|h| *h != 0.0).unwrap_or(DEFAULT_HEIGHT),
                        )
                    }
                    None => match (width, height) {
                        (Some(w), Some(h)) => Self::new(w, h),
                        _ => {
                            log::warn!("Could not determine SVG width or height, using defaults");
                            Self::default()
                        }
                    },
                }
            }
        }
    }

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Parse a `viewBox` into exactly four finite numbers.
///
/// Components are separated by whitespace and/or commas.
pub fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()?;
    parts.try_into().ok()
}

/// Leading-integer parse: `"500px"` → 500, `" 42.9"` → 42, `"px"` → None.
pub fn parse_leading_int(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<f64>().ok().map(|v| sign * v)
}

/// Which overlay a text line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Name,
    Note,
}

/// A single positioned line of overlay text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub role: TextRole,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub content: String,
}

impl TextPlacement {
    pub fn family(&self) -> &'static str {
        match self.role {
            TextRole::Name => NAME_FAMILY,
            TextRole::Note => NOTE_FAMILY,
        }
    }

    /// `x` in shortest decimal form (`250`, `270.5`).
    pub fn x_attr(&self) -> String {
        format_number(self.x)
    }

    /// `y` with two decimals.
    ///
    /// Exact binary ties round half to even (`0.125` → `0.12`), unlike
    /// JavaScript's `toFixed(2)` which gives `0.13`. Ratios of real template
    /// heights do not land on such ties.
    pub fn y_attr(&self) -> String {
        format!("{:.2}", self.y)
    }

    /// Font size with two decimals, rounded like [`y_attr`](Self::y_attr).
    pub fn font_size_attr(&self) -> String {
        format!("{:.2}", self.font_size)
    }
}

/// Baseline of the name line.
#[inline]
pub fn name_y(size: CanvasSize) -> f64 {
    size.height - size.height * NAME_BOTTOM_MARGIN
}

/// Lay out the name and note. Blank inputs produce no lines.
pub fn place(size: CanvasSize, name: &str, note: &str) -> Vec<TextPlacement> {
    let mut lines = Vec::new();
    let x = size.width / 2.0;
    let name_y = name_y(size);

    if !name.trim().is_empty() {
        lines.push(TextPlacement {
            role: TextRole::Name,
            x,
            y: name_y,
            font_size: size.height * NAME_FONT_RATIO,
            content: name.to_string(),
        });
    }

    if !note.trim().is_empty() {
        let font_size = size.height * NOTE_FONT_RATIO;
        let pitch = font_size * NOTE_LINE_PITCH;
        let note_lines: Vec<&str> = note.split('\n').collect();
        let top = name_y - note_lines.len() as f64 * pitch - size.height * NOTE_GAP;

        for (i, line) in note_lines.iter().enumerate() {
            lines.push(TextPlacement {
                role: TextRole::Note,
                x,
                y: top + i as f64 * pitch,
                font_size,
                content: line.trim_end_matches('\r').to_string(),
            });
        }
    }

    lines
}

/// Shortest decimal rendering of a number, without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(view_box: Option<&str>, width: Option<&str>, height: Option<&str>) -> RootAttrs {
        RootAttrs {
            view_box: view_box.map(String::from),
            width: width.map(String::from),
            height: height.map(String::from),
        }
    }

    #[test]
    fn test_view_box_preferred() {
        let a = attrs(Some("0 0 1080 1920"), Some("10"), Some("20"));
        let size = CanvasSize::resolve(&a, OutputMode::Interactive);
        assert_eq!(size, CanvasSize::new(1080.0, 1920.0));
    }

    #[test]
    fn test_view_box_commas() {
        assert_eq!(parse_view_box("0,0,100,200"), Some([0.0, 0.0, 100.0, 200.0]));
        assert_eq!(parse_view_box("0, 0 100 , 200"), Some([0.0, 0.0, 100.0, 200.0]));
    }

    #[test]
    fn test_malformed_view_box_falls_back_to_attributes() {
        let a = attrs(Some("0 0 600"), Some("600px"), Some("900"));
        let size = CanvasSize::resolve(&a, OutputMode::Interactive);
        assert_eq!(size, CanvasSize::new(600.0, 900.0));
    }

    #[test]
    fn test_malformed_view_box_without_attributes_uses_defaults() {
        let a = attrs(Some("0 0 abc 10"), None, Some("wide"));
        let size = CanvasSize::resolve(&a, OutputMode::Interactive);
        assert_eq!(size, CanvasSize::default());
    }

    #[test]
    fn test_no_view_box_needs_both_attributes() {
        let a = attrs(None, Some("300"), None);
        assert_eq!(
            CanvasSize::resolve(&a, OutputMode::Interactive),
            CanvasSize::default()
        );
        let a = attrs(None, Some("300"), Some("400"));
        assert_eq!(
            CanvasSize::resolve(&a, OutputMode::Interactive),
            CanvasSize::new(300.0, 400.0)
        );
    }

    #[test]
    fn test_static_ignores_width_height_attributes() {
        let a = attrs(None, Some("300"), Some("400"));
        assert_eq!(
            CanvasSize::resolve(&a, OutputMode::Static),
            CanvasSize::default()
        );
        let a = attrs(Some("0 0 0 400"), None, None);
        assert_eq!(
            CanvasSize::resolve(&a, OutputMode::Static),
            CanvasSize::default()
        );
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("500px"), Some(500.0));
        assert_eq!(parse_leading_int(" 42.9"), Some(42.0));
        assert_eq!(parse_leading_int("-3"), Some(-3.0));
        assert_eq!(parse_leading_int("px"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_name_only() {
        let lines = place(CanvasSize::new(500.0, 800.0), "Rahim", "");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].y_attr(), "760.00");
        assert_eq!(lines[0].font_size_attr(), "28.00");
        assert_eq!(lines[0].x_attr(), "250");
        assert_eq!(lines[0].family(), NAME_FAMILY);
    }

    #[test]
    fn test_note_block_sits_above_name() {
        let lines = place(CanvasSize::new(500.0, 800.0), "Rahim", "Eid Mubarak\nSee you soon");
        assert_eq!(lines.len(), 3);
        // font 34.8, pitch 41.76, top = 760 - 83.52 - 40
        assert_eq!(lines[1].y_attr(), "636.48");
        assert_eq!(lines[2].y_attr(), "678.24");
        assert_eq!(lines[1].font_size_attr(), "34.80");
        assert_eq!(lines[2].content, "See you soon");
    }

    #[test]
    fn test_blank_inputs_place_nothing() {
        assert!(place(CanvasSize::default(), "  ", "\n").is_empty());
    }

    #[test]
    fn test_two_decimal_ties_round_to_even() {
        let line = TextPlacement {
            role: TextRole::Name,
            x: 0.0,
            y: 0.125,
            font_size: 0.375,
            content: String::new(),
        };
        assert_eq!(line.y_attr(), "0.12");
        assert_eq!(line.font_size_attr(), "0.38");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(250.0), "250");
        assert_eq!(format_number(270.5), "270.5");
    }
}
