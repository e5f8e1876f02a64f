// Tag dispatch — one construction rule per tag in the codelab vocabulary.
//
// Each rule builds an Element and recursively walks the tag's children,
// attaching every non-ignored result in order. Attribute reads are
// defensive: a missing or invalid attribute falls back to a documented
// default instead of failing the page. Unknown tags are dropped with a
// diagnostic; their siblings are unaffected.

use std::sync::LazyLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::State;
use crate::element::{
    Aside, Bold, Code, Element, Fragment, Header, Image, Italic, Link, List, ListItem, Monospace,
    Paragraph, Reference, Strikethrough, Text, Underline,
};

/// Pixel width from an inline style attribute, e.g. `width: 624.5px`.
static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"width: ((?:[0-9]*\.)?[0-9]+)px").expect("width pattern"));

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Convert a single markup node to zero or one `Element`. Comments and
/// other non-content nodes yield nothing.
pub(crate) fn one(state: &State<'_>, handle: &Handle) -> Option<Element> {
    match &handle.data {
        NodeData::Text { contents } => Some(Element::Text(Text {
            value: contents.borrow().to_string(),
        })),
        NodeData::Element { name, .. } => dispatch_element(state, handle, name.local.as_ref()),
        _ => None,
    }
}

/// Walk `handle`'s children, attaching each converted child to `parent`.
pub(crate) fn propagate(state: &State<'_>, handle: &Handle, mut parent: Element) -> Element {
    for child in handle.children.borrow().iter() {
        if let Some(node) = one(state, child) {
            parent.add_child(node);
        }
    }
    parent
}

/// Route an element to its construction rule based on tag name.
fn dispatch_element(state: &State<'_>, handle: &Handle, tag: &str) -> Option<Element> {
    let parent = match tag {
        "p" => paragraph(handle),
        "a" => anchor(state, handle),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Element::Header(Header {
            level: tag[1..].parse().unwrap_or(1),
            children: Vec::new(),
        }),
        "ol" => Element::List(List {
            start: Some(ordered_start(handle)),
            children: Vec::new(),
        }),
        "ul" => Element::List(List { start: None, children: Vec::new() }),
        "li" => Element::ListItem(ListItem::default()),
        "aside" => Element::Aside(Aside {
            class: get_attr(handle, "class").unwrap_or_default(),
            children: Vec::new(),
        }),
        "b" | "strong" => Element::Bold(Bold::default()),
        "i" | "em" => Element::Italic(Italic::default()),
        "u" | "ins" => Element::Underline(Underline::default()),
        "strike" | "del" => Element::Strikethrough(Strikethrough::default()),
        "tt" | "code" | "kbd" | "var" | "samp" => Element::Monospace(Monospace::default()),
        "paper-button" => Element::Fragment(Fragment::default()),

        // Leaves — no recursion into children.
        "img" => return Some(image(state, handle)),
        "pre" => {
            return Some(Element::Code(Code {
                value: text_content(handle),
                default_language: state.default_language.to_string(),
            }))
        }
        "br" => return Some(Element::Text(Text { value: "\n".to_string() })),

        _ => {
            tracing::warn!(tag, "unknown element, dropping");
            return None;
        }
    };
    Some(propagate(state, handle, parent))
}

// ---------------------------------------------------------------------------
// Construction rules
// ---------------------------------------------------------------------------

/// Paragraphs whose class contains the image-container marker render
/// centered.
fn paragraph(handle: &Handle) -> Element {
    let centered =
        get_attr(handle, "class").is_some_and(|class| class.contains("image-container"));
    Element::Paragraph(Paragraph { centered, children: Vec::new() })
}

/// Anchors become links, except when the href contains one of the course's
/// page identifiers: those resolve to a cross-page reference addressed by
/// crawl-order index. During the metadata pass the identifier set is empty,
/// so every anchor is a plain link.
fn anchor(state: &State<'_>, handle: &Handle) -> Element {
    let href = get_attr(handle, "href").unwrap_or_else(|| {
        tracing::warn!("anchor without href attribute");
        String::new()
    });
    let known = state
        .known_ids
        .iter()
        .position(|id| !id.is_empty() && href.contains(id.as_str()));
    match known {
        Some(page_index) => Element::Reference(Reference { page_index, children: Vec::new() }),
        None => Element::Link(Link { url: href, children: Vec::new() }),
    }
}

/// `start` attribute of an ordered list; non-numeric or absent falls back
/// to 1.
fn ordered_start(handle: &Handle) -> u32 {
    match get_attr(handle, "start").map(|raw| raw.trim().parse::<u32>()) {
        Some(Ok(start)) => start,
        Some(Err(_)) => {
            tracing::warn!("ordered list start attribute is not numeric, defaulting to 1");
            1
        }
        None => 1,
    }
}

fn image(state: &State<'_>, handle: &Handle) -> Element {
    let src = get_attr(handle, "src").unwrap_or_else(|| {
        tracing::warn!("image without src attribute");
        String::new()
    });
    let width = get_attr(handle, "style")
        .and_then(|style| WIDTH_RE.captures(&style).and_then(|caps| caps[1].parse::<f64>().ok()));
    Element::Image(Image {
        url: state.resolve_asset(&src),
        width,
        alt: get_attr(handle, "alt"),
    })
}

// ---------------------------------------------------------------------------
// Markup helpers
// ---------------------------------------------------------------------------

/// Get the value of an attribute on an element node.
pub(crate) fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Get the tag name of an element node.
pub(crate) fn tag_name(handle: &Handle) -> Option<String> {
    if let NodeData::Element { ref name, .. } = handle.data {
        Some(name.local.as_ref().to_string())
    } else {
        None
    }
}

/// Concatenated text of every text descendant, in document order.
pub(crate) fn text_content(handle: &Handle) -> String {
    fn collect(handle: &Handle, out: &mut String) {
        if let NodeData::Text { ref contents } = handle.data {
            out.push_str(&contents.borrow());
        }
        for child in handle.children.borrow().iter() {
            collect(child, out);
        }
    }
    let mut out = String::new();
    collect(handle, &mut out);
    out
}
