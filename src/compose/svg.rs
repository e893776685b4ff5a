//! Streaming SVG rewriting on top of `quick-xml`.
//!
//! Templates are rewritten event by event: everything that is not touched is
//! written back exactly as it was read, so an unmodified template survives
//! byte-for-byte.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::layout::{RootAttrs, TextPlacement};
use crate::error::{CardError, Result};

/// Class carried by every injected text node.
pub const TEXT_MARKER: &str = "custom-text";
/// Class carried by the injected font style block.
pub const FONTS_MARKER: &str = "custom-fonts";

/// What to do with the root element's `width`/`height`.
#[derive(Debug, Clone, PartialEq)]
pub enum RootSize {
    /// Drop both so the document scales through its `viewBox`.
    Remove,
    /// Replace both with explicit pixel values.
    Pixels { width: String, height: String },
}

/// Injection plan, decided once the root attributes are known.
pub struct Injection {
    pub root_size: RootSize,
    /// CSS for a `<style>` block placed first inside the root
    pub style: Option<String>,
    /// Text nodes appended last inside the root
    pub texts: Vec<TextPlacement>,
    pub fill: String,
}

/// Collect the root element's size-related attributes.
pub fn root_attrs(start: &BytesStart<'_>) -> Result<RootAttrs> {
    let mut attrs = RootAttrs::default();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CardError::Parse(e.to_string()))?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"viewBox" => attrs.view_box = Some(value),
            b"width" => attrs.width = Some(value),
            b"height" => attrs.height = Some(value),
            _ => {}
        }
    }
    Ok(attrs)
}

/// Read the root `<svg>` attributes without rewriting anything.
pub fn read_root_attrs(markup: &str) -> Result<RootAttrs> {
    let mut reader = Reader::from_str(markup);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                ensure_svg_root(&e)?;
                return root_attrs(&e);
            }
            Event::Eof => return Err(CardError::Parse("no root <svg> element".into())),
            _ => {}
        }
    }
}

/// Rewrite `markup`: strip previously injected nodes, adjust the root and
/// inject whatever `plan` decides from the root attributes.
pub fn rewrite(markup: &str, plan: impl FnOnce(&RootAttrs) -> Injection) -> Result<String> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len() + 1024));

    let mut plan = Some(plan);
    let mut injection: Option<Injection> = None;
    let mut depth = 0usize;
    let mut root_done = false;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(e) if depth == 0 && !root_done => {
                let inj = start_root(&mut writer, &e, &mut plan)?;
                depth = 1;
                injection = Some(inj);
            }
            Event::Empty(e) if depth == 0 && !root_done => {
                // `<svg/>`: expand so there is somewhere to put children
                let inj = start_root(&mut writer, &e, &mut plan)?;
                finish_root(&mut writer, &e, &inj)?;
                root_done = true;
            }
            Event::Start(e) if is_injected(&e)? => {
                skip_subtree(&mut reader)?;
            }
            Event::Empty(e) if is_injected(&e)? => {}
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !root_done {
                    if let Some(inj) = injection.as_ref() {
                        write_texts(&mut writer, inj)?;
                    }
                    root_done = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !root_done {
        return Err(CardError::Parse(if injection.is_none() {
            "no root <svg> element".into()
        } else {
            "unexpected end of document".into()
        }));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| CardError::Parse(e.to_string()))
}

fn start_root<F>(
    writer: &mut Writer<Vec<u8>>,
    start: &BytesStart<'_>,
    plan: &mut Option<F>,
) -> Result<Injection>
where
    F: FnOnce(&RootAttrs) -> Injection,
{
    ensure_svg_root(start)?;
    let attrs = root_attrs(start)?;
    let plan = plan
        .take()
        .ok_or_else(|| CardError::Parse("more than one root element".into()))?;
    let inj = plan(&attrs);

    let unchanged = inj.root_size == RootSize::Remove
        && attrs.width.is_none()
        && attrs.height.is_none();
    if unchanged {
        writer.write_event(Event::Start(start.borrow()))?;
    } else {
        writer.write_event(Event::Start(resize_root(start, &inj.root_size)?))?;
    }

    if let Some(css) = &inj.style {
        let mut style = BytesStart::new("style");
        style.push_attribute(("class", FONTS_MARKER));
        writer.write_event(Event::Start(style))?;
        writer.write_event(Event::Text(BytesText::from_escaped(css.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("style")))?;
    }

    Ok(inj)
}

fn finish_root(
    writer: &mut Writer<Vec<u8>>,
    start: &BytesStart<'_>,
    inj: &Injection,
) -> Result<()> {
    write_texts(writer, inj)?;
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn ensure_svg_root(start: &BytesStart<'_>) -> Result<()> {
    if start.local_name().as_ref() == b"svg" {
        Ok(())
    } else {
        Err(CardError::Parse(format!(
            "root element is <{}>, expected <svg>",
            String::from_utf8_lossy(start.name().as_ref())
        )))
    }
}

fn resize_root(start: &BytesStart<'_>, size: &RootSize) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut root = BytesStart::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CardError::Parse(e.to_string()))?;
        if matches!(attr.key.as_ref(), b"width" | b"height") {
            continue;
        }
        copy_attribute(&mut root, &attr)?;
    }
    if let RootSize::Pixels { width, height } = size {
        root.push_attribute(("width", width.as_str()));
        root.push_attribute(("height", height.as_str()));
    }
    Ok(root.into_owned())
}

/// Copy `attr` onto `element`, re-escaped for the double quotes the writer
/// always uses.
fn copy_attribute(element: &mut BytesStart<'_>, attr: &Attribute<'_>) -> Result<()> {
    let key = String::from_utf8_lossy(attr.key.as_ref());
    let value = attr.unescape_value()?;
    element.push_attribute((key.as_ref(), value.as_ref()));
    Ok(())
}

fn write_texts(writer: &mut Writer<Vec<u8>>, inj: &Injection) -> Result<()> {
    for line in &inj.texts {
        let x = line.x_attr();
        let y = line.y_attr();
        let size = line.font_size_attr();

        let mut text = BytesStart::new("text");
        text.push_attribute(("x", x.as_str()));
        text.push_attribute(("y", y.as_str()));
        text.push_attribute(("text-anchor", "middle"));
        text.push_attribute(("font-family", line.family()));
        text.push_attribute(("font-size", size.as_str()));
        text.push_attribute(("fill", inj.fill.as_str()));
        text.push_attribute(("font-weight", "500"));
        text.push_attribute(("class", TEXT_MARKER));

        writer.write_event(Event::Start(text))?;
        writer.write_event(Event::Text(BytesText::new(&line.content)))?;
        writer.write_event(Event::End(BytesEnd::new("text")))?;
    }
    Ok(())
}

/// Whether an element was injected by a previous composition.
fn is_injected(start: &BytesStart<'_>) -> Result<bool> {
    match start.try_get_attribute("class")? {
        Some(class) => {
            let class = class.unescape_value()?;
            Ok(class
                .split_whitespace()
                .any(|c| c == TEXT_MARKER || c == FONTS_MARKER))
        }
        None => Ok(false),
    }
}

/// Consume events up to and including the end of the current element.
fn skip_subtree(reader: &mut Reader<&[u8]>) -> Result<()> {
    let mut depth = 1usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(CardError::Parse("unexpected end of document".into())),
            _ => {}
        }
    }
}

/// Rewrite the `font-family` of every `<text>` element.
///
/// `choose` receives the current value (if any) and returns the replacement,
/// or `None` to keep the element as it is.
pub fn rewrite_text_fonts(
    markup: &str,
    mut choose: impl FnMut(Option<&str>) -> Option<String>,
) -> Result<String> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len()));

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"text" => {
                let e = retarget_font(e, &mut choose)?;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"text" => {
                let e = retarget_font(e, &mut choose)?;
                writer.write_event(Event::Empty(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| CardError::Parse(e.to_string()))
}

fn retarget_font<'a>(
    start: BytesStart<'a>,
    choose: &mut impl FnMut(Option<&str>) -> Option<String>,
) -> Result<BytesStart<'a>> {
    let current = match start.try_get_attribute("font-family")? {
        Some(attr) => Some(attr.unescape_value()?.into_owned()),
        None => None,
    };
    let Some(family) = choose(current.as_deref()) else {
        return Ok(start);
    };

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CardError::Parse(e.to_string()))?;
        if attr.key.as_ref() == b"font-family" {
            continue;
        }
        copy_attribute(&mut out, &attr)?;
    }
    out.push_attribute(("font-family", family.as_str()));
    Ok(out.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_root_attrs() {
        let attrs =
            read_root_attrs(r#"<?xml version="1.0"?><svg viewBox="0 0 10 20" width="5"/>"#)
                .unwrap();
        assert_eq!(attrs.view_box.as_deref(), Some("0 0 10 20"));
        assert_eq!(attrs.width.as_deref(), Some("5"));
        assert_eq!(attrs.height, None);
    }

    #[test]
    fn test_non_svg_root_rejected() {
        assert!(matches!(
            read_root_attrs("<html><body/></html>"),
            Err(CardError::Parse(_))
        ));
    }

    fn no_change(_: &RootAttrs) -> Injection {
        Injection {
            root_size: RootSize::Remove,
            style: None,
            texts: Vec::new(),
            fill: String::new(),
        }
    }

    #[test]
    fn test_single_quoted_attribute_with_double_quote_survives_resize() {
        let svg = r#"<svg viewBox="0 0 10 20" width="10" style='font-family:"Noto Sans"'></svg>"#;
        let out = rewrite(svg, no_change).unwrap();
        assert_eq!(
            out,
            r#"<svg viewBox="0 0 10 20" style="font-family:&quot;Noto Sans&quot;"></svg>"#
        );
        // output is well-formed and rewrites to itself
        assert_eq!(rewrite(&out, no_change).unwrap(), out);
    }

    #[test]
    fn test_escaped_values_are_not_double_escaped() {
        let svg = r#"<svg width="1" data-x="a &amp; b &lt; c"></svg>"#;
        let out = rewrite(svg, no_change).unwrap();
        assert_eq!(out, r#"<svg data-x="a &amp; b &lt; c"></svg>"#);
    }

    #[test]
    fn test_fallback_font_keeps_quoted_style_well_formed() {
        let svg = r#"<svg><text style='fill:"red"'>a</text></svg>"#;
        let out = rewrite_text_fonts(svg, |_| Some("fallback".to_string())).unwrap();
        assert_eq!(
            out,
            r#"<svg><text style="fill:&quot;red&quot;" font-family="fallback">a</text></svg>"#
        );
        assert!(read_root_attrs(&out).is_ok());
        assert_eq!(rewrite_text_fonts(&out, |_| None).unwrap(), out);
    }

    #[test]
    fn test_rewrite_text_fonts_only_touches_text() {
        let svg = r#"<svg><g font-family="a"/><text x="1">hi</text><text font-family="b">yo</text></svg>"#;
        let out = rewrite_text_fonts(svg, |cur| match cur {
            None => Some("fallback".to_string()),
            Some(_) => None,
        })
        .unwrap();
        assert!(out.contains(r#"<g font-family="a"/>"#));
        assert!(out.contains(r#"<text x="1" font-family="fallback">hi</text>"#));
        assert!(out.contains(r#"<text font-family="b">yo</text>"#));
    }
}
