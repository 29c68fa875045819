//! Body-markup rendering: anchor-annotated markup, the derived outline, and
//! the plain text handed to the speech facility.
//!
//! Everything here is a pure function of the body string so malformed store
//! content can never take a page down.

use std::io::Cursor;
use std::sync::OnceLock;

use quick_xml::{
    Reader, Writer,
    events::{BytesStart, Event},
};
use regex::Regex;
use serde::Serialize;

/// One entry of the in-page navigation outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Anchor id injected into the heading element.
    pub anchor: String,
    /// Visible heading text.
    pub text: String,
    /// Heading level, 1–6.
    pub level: u8,
}

/// A post body prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Render-safe markup with heading anchors injected.
    pub body: String,
    /// Outline entries in document order.
    pub outline: Vec<OutlineEntry>,
}

/// Annotate heading elements with generated anchors and extract the outline.
///
/// Anchors are `heading-0`, `heading-1`, … in document order, unique within
/// one render pass. Markup that cannot be walked is returned untouched with
/// an empty outline, so the anchors in the outline always exist in the
/// returned body.
#[must_use]
pub fn render(html: &str) -> Rendered {
    if html.trim().is_empty() {
        return Rendered {
            body: html.to_owned(),
            outline: Vec::new(),
        };
    }

    annotate(html).unwrap_or_else(|| Rendered {
        body: html.to_owned(),
        outline: Vec::new(),
    })
}

/// The outline alone, for callers that render the body elsewhere.
#[must_use]
pub fn outline(html: &str) -> Vec<OutlineEntry> {
    render(html).outline
}

/// Strip markup down to the plain text handed to the speech facility.
#[must_use]
pub fn plain_text(html: &str) -> String {
    // Static patterns, compilation cannot fail.
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static pattern"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));

    let stripped = tags.replace_all(html, " ");
    spaces.replace_all(&stripped, " ").trim().to_string()
}

struct OpenHeading {
    level: u8,
    anchor: String,
    /// Inner markup of the heading, re-serialized; stripped to text on close.
    capture: Writer<Cursor<Vec<u8>>>,
}

fn annotate(html: &str) -> Option<Rendered> {
    let mut reader = Reader::from_reader(html.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);

    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len())));
    let mut entries: Vec<OutlineEntry> = Vec::new();
    let mut open: Option<OpenHeading> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => return None,
        };
        match event {
            // Only the outermost heading is tracked; a heading nested inside
            // another is passed through like any other element.
            Event::Start(elem)
                if heading_level(elem.name().as_ref()).is_some() && open.is_none() =>
            {
                let level = heading_level(elem.name().as_ref())?;
                let anchor = format!("heading-{}", entries.len());
                writer
                    .write_event(Event::Start(with_anchor(&elem, &anchor)))
                    .ok()?;
                open = Some(OpenHeading {
                    level,
                    anchor,
                    capture: Writer::new(Cursor::new(Vec::new())),
                });
            }
            Event::End(elem)
                if heading_level(elem.name().as_ref()).is_some() && open.is_some() =>
            {
                let heading = open.take()?;
                let captured =
                    String::from_utf8(heading.capture.into_inner().into_inner()).ok()?;
                entries.push(OutlineEntry {
                    anchor: heading.anchor,
                    text: decode_entities(&plain_text(&captured)),
                    level: heading.level,
                });
                writer.write_event(Event::End(elem)).ok()?;
            }
            Event::Eof => break,
            other => {
                if let Some(heading) = open.as_mut() {
                    heading.capture.write_event(other.clone()).ok()?;
                }
                writer.write_event(other).ok()?;
            }
        }
    }

    let body = String::from_utf8(writer.into_inner().into_inner()).ok()?;
    Some(Rendered {
        body,
        outline: entries,
    })
}

const fn heading_level(name: &[u8]) -> Option<u8> {
    match name {
        b"h1" => Some(1),
        b"h2" => Some(2),
        b"h3" => Some(3),
        b"h4" => Some(4),
        b"h5" => Some(5),
        b"h6" => Some(6),
        _ => None,
    }
}

/// Rebuild a heading start tag with the generated anchor, replacing any id
/// the store content carried.
fn with_anchor(elem: &BytesStart<'_>, anchor: &str) -> BytesStart<'static> {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(tag);
    for attr in elem.attributes().flatten() {
        if attr.key.as_ref() != b"id" {
            rebuilt.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    rebuilt.push_attribute(("id", anchor));
    rebuilt
}

/// Minimal entity decoding for outline text; `&amp;` last so already-decoded
/// sequences are not decoded twice.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
