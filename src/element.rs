// Element node types — the parsed content model for one codelab page.
//
// ~20 node types representing page content independent of output format.
// Each node is a variant of the `Element` enum. Parent nodes own their
// children; insertion order is rendering order. Every variant renders
// itself in each supported output format.

use crate::lang;

/// An output format a node tree can render to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Textual debug dump of the tree structure.
    Repr,
    /// Markdown document.
    Markdown,
    /// HTML fragment.
    Html,
    /// Pandoc-flavored Markdown chapter.
    Pandoc,
}

/// Marker assigned to a list item by its parent list at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMarker {
    /// Unordered bullet.
    Bullet,
    /// 1-based ordinal within an ordered list.
    Number(u32),
}

// ---------------------------------------------------------------------------
// Node structs
// ---------------------------------------------------------------------------

/// Raw text, including embedded newlines produced by `<br>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
}

/// A titled section of a page; `ordinal` is its 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub ordinal: usize,
    pub children: Vec<Element>,
}

/// Paragraph; `centered` when the source paragraph is an image container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub centered: bool,
    pub children: Vec<Element>,
}

/// Heading, depth 1–6.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub level: u8,
    pub children: Vec<Element>,
}

/// Hyperlink to an absolute URL. Renders its children as link text,
/// falling back to the URL when the content is blank.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: String,
    pub children: Vec<Element>,
}

/// Link to another crawled page, addressed by its crawl-order index rather
/// than by URL. Each output format maps the index to its own file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub page_index: usize,
    pub children: Vec<Element>,
}

/// Ordered (`start` = first ordinal) or unordered (`start` = None) list.
/// Only accepts `ListItem` children; see [`List::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub start: Option<u32>,
    pub children: Vec<Element>,
}

/// Item inside a list. `marker` is unset at construction and assigned
/// exactly once by the parent list when the item is inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub marker: Option<ItemMarker>,
    pub children: Vec<Element>,
}

/// Callout box; `class` carries the source styling class (warning, special, …).
#[derive(Debug, Clone, PartialEq)]
pub struct Aside {
    pub class: String,
    pub children: Vec<Element>,
}

/// Strong emphasis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bold {
    pub children: Vec<Element>,
}

/// Emphasis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Italic {
    pub children: Vec<Element>,
}

/// Underline (`<u>`/`<ins>`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Underline {
    pub children: Vec<Element>,
}

/// Strikethrough (`<strike>`/`<del>`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Strikethrough {
    pub children: Vec<Element>,
}

/// Inline code span.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Monospace {
    pub children: Vec<Element>,
}

/// Image, already resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub width: Option<f64>,
    pub alt: Option<String>,
}

/// Fenced code block. The fence language is detected at render time from
/// the raw text, never cached, so re-rendering after changing the default
/// language is well-defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub value: String,
    pub default_language: String,
}

/// Table wrapper.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub children: Vec<Element>,
}

/// Row in a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub children: Vec<Element>,
}

/// Cell in a table row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub children: Vec<Element>,
}

/// Transparent container for pass-through tags (e.g. `<paper-button>`):
/// renders as the plain concatenation of its children in every format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub children: Vec<Element>,
}

// ---------------------------------------------------------------------------
// Element enum
// ---------------------------------------------------------------------------

/// A node in a page's content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(Text),
    Step(Step),
    Paragraph(Paragraph),
    Header(Header),
    Link(Link),
    Reference(Reference),
    List(List),
    ListItem(ListItem),
    Aside(Aside),
    Bold(Bold),
    Italic(Italic),
    Underline(Underline),
    Strikethrough(Strikethrough),
    Monospace(Monospace),
    Image(Image),
    Code(Code),
    Table(Table),
    TableRow(TableRow),
    TableCell(TableCell),
    Fragment(Fragment),
}

impl Element {
    /// Returns a reference to this node's children, if it can have any.
    pub fn children(&self) -> Option<&[Element]> {
        match self {
            Element::Step(n) => Some(&n.children),
            Element::Paragraph(n) => Some(&n.children),
            Element::Header(n) => Some(&n.children),
            Element::Link(n) => Some(&n.children),
            Element::Reference(n) => Some(&n.children),
            Element::List(n) => Some(&n.children),
            Element::ListItem(n) => Some(&n.children),
            Element::Aside(n) => Some(&n.children),
            Element::Bold(n) => Some(&n.children),
            Element::Italic(n) => Some(&n.children),
            Element::Underline(n) => Some(&n.children),
            Element::Strikethrough(n) => Some(&n.children),
            Element::Monospace(n) => Some(&n.children),
            Element::Table(n) => Some(&n.children),
            Element::TableRow(n) => Some(&n.children),
            Element::TableCell(n) => Some(&n.children),
            Element::Fragment(n) => Some(&n.children),
            Element::Text(_) | Element::Image(_) | Element::Code(_) => None,
        }
    }

    /// Returns a mutable reference to this node's children, if it can have any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Step(n) => Some(&mut n.children),
            Element::Paragraph(n) => Some(&mut n.children),
            Element::Header(n) => Some(&mut n.children),
            Element::Link(n) => Some(&mut n.children),
            Element::Reference(n) => Some(&mut n.children),
            Element::List(n) => Some(&mut n.children),
            Element::ListItem(n) => Some(&mut n.children),
            Element::Aside(n) => Some(&mut n.children),
            Element::Bold(n) => Some(&mut n.children),
            Element::Italic(n) => Some(&mut n.children),
            Element::Underline(n) => Some(&mut n.children),
            Element::Strikethrough(n) => Some(&mut n.children),
            Element::Monospace(n) => Some(&mut n.children),
            Element::Table(n) => Some(&mut n.children),
            Element::TableRow(n) => Some(&mut n.children),
            Element::TableCell(n) => Some(&mut n.children),
            Element::Fragment(n) => Some(&mut n.children),
            Element::Text(_) | Element::Image(_) | Element::Code(_) => None,
        }
    }

    /// Attach a child node in insertion order.
    ///
    /// Lists route through [`List::push`], which enforces the
    /// items-only invariant and assigns the item's marker. A child handed
    /// to a leaf node is dropped with a diagnostic.
    pub fn add_child(&mut self, child: Element) {
        if let Element::List(list) = self {
            list.push(child);
            return;
        }
        match self.children_mut() {
            Some(children) => children.push(child),
            None => tracing::warn!(?child, "dropping child attached to a leaf element"),
        }
    }

    /// Render this node (and its subtree) in the given output format.
    pub fn render(&self, format: Format) -> String {
        match self {
            Element::Text(n) => n.render(format),
            Element::Step(n) => n.render(format),
            Element::Paragraph(n) => n.render(format),
            Element::Header(n) => n.render(format),
            Element::Link(n) => n.render(format),
            Element::Reference(n) => n.render(format),
            Element::List(n) => n.render(format),
            Element::ListItem(n) => n.render(format),
            Element::Aside(n) => n.render(format),
            Element::Bold(n) => wrapped(format, "Bold", "strong", &n.children),
            Element::Italic(n) => wrapped(format, "Italic", "em", &n.children),
            Element::Underline(n) => wrapped(format, "Underline", "ins", &n.children),
            Element::Strikethrough(n) => wrapped(format, "Strikethrough", "del", &n.children),
            Element::Monospace(n) => wrapped(format, "Monospace", "code", &n.children),
            Element::Image(n) => n.render(format),
            Element::Code(n) => n.render(format),
            Element::Table(n) => table_tag(format, "Table", "table", &n.children),
            Element::TableRow(n) => table_tag(format, "TableRow", "tr", &n.children),
            Element::TableCell(n) => table_tag(format, "TableCell", "td", &n.children),
            Element::Fragment(n) => match format {
                Format::Repr => repr_children(&n.children),
                _ => render_children(&n.children, format),
            },
        }
    }
}

impl List {
    /// Attach a child, enforcing the items-only invariant: anything that is
    /// not a `ListItem` (or ignorable whitespace-only text) is dropped with
    /// a diagnostic. The accepted item's marker is assigned here, exactly
    /// once, from the insertion position.
    pub fn push(&mut self, child: Element) {
        match child {
            Element::ListItem(mut item) => {
                item.marker = Some(match self.start {
                    Some(start) => ItemMarker::Number(start + self.children.len() as u32),
                    None => ItemMarker::Bullet,
                });
                self.children.push(Element::ListItem(item));
            }
            Element::Text(ref text) if text.value.trim().is_empty() => {}
            other => tracing::warn!(?other, "element inside list is not a list item"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_children(children: &[Element], format: Format) -> String {
    children.iter().map(|c| c.render(format)).collect()
}

fn repr_children(children: &[Element]) -> String {
    let parts: Vec<String> = children.iter().map(|c| c.render(Format::Repr)).collect();
    format!("[{}]", parts.join(", "))
}

/// Inline wrappers share one shape: an HTML tag around the children in
/// every non-debug format.
fn wrapped(format: Format, kind: &str, tag: &str, children: &[Element]) -> String {
    match format {
        Format::Repr => format!("{{{kind}, {}}}", repr_children(children)),
        _ => {
            let content = render_children(children, format);
            format!("<{tag}>{content}</{tag}>")
        }
    }
}

/// Table nodes render as HTML in every format; Markdown and pandoc add a
/// trailing newline so consecutive rows stay on separate source lines.
fn table_tag(format: Format, kind: &str, tag: &str, children: &[Element]) -> String {
    match format {
        Format::Repr => format!("{{{kind}, {}}}", repr_children(children)),
        Format::Html => {
            let content = render_children(children, format);
            format!("<{tag}>{content}</{tag}>")
        }
        Format::Markdown | Format::Pandoc => {
            let content = render_children(children, format);
            format!("<{tag}>{content}</{tag}>\n")
        }
    }
}

impl Text {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!("{{Text, \"{}\"}}", self.value),
            _ => self.value.clone(),
        }
    }
}

impl Step {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!(
                "{{Step {}, \"{}\", {}}}",
                self.ordinal,
                self.label,
                repr_children(&self.children)
            ),
            Format::Markdown => format!(
                "# {}. {}\n{}",
                self.ordinal,
                self.label,
                render_children(&self.children, format)
            ),
            Format::Html | Format::Pandoc => format!(
                "<h1>{}. {}</h1>{}",
                self.ordinal,
                self.label,
                render_children(&self.children, format)
            ),
        }
    }
}

impl Paragraph {
    fn render(&self, format: Format) -> String {
        let content = match format {
            Format::Repr => {
                let align = if self.centered { "center" } else { "none" };
                return format!("{{Paragraph, {align}, {}}}", repr_children(&self.children));
            }
            _ => render_children(&self.children, format),
        };
        match (format, self.centered) {
            (Format::Html, false) => format!("<p>{content}</p>"),
            (_, false) => format!("\n{content}\n"),
            (_, true) => format!("<p align=\"center\">{content}</p>\n"),
        }
    }
}

impl Header {
    fn render(&self, format: Format) -> String {
        let level = self.level.clamp(1, 6) as usize;
        match format {
            Format::Repr => format!(
                "{{Header, level={}, {}}}",
                self.level,
                repr_children(&self.children)
            ),
            Format::Markdown => format!(
                "{} {}\n",
                "#".repeat(level),
                render_children(&self.children, format)
            ),
            Format::Html => format!(
                "<h{level}>{}</h{level}>",
                render_children(&self.children, format)
            ),
            // Pandoc chapters reserve h1 for the step title, so headings
            // shift down one level.
            Format::Pandoc => format!(
                "{} {}\n",
                "#".repeat(level + 1),
                render_children(&self.children, format)
            ),
        }
    }
}

impl Link {
    fn render(&self, format: Format) -> String {
        if format == Format::Repr {
            return format!("{{Link, \"{}\", {}}}", self.url, repr_children(&self.children));
        }
        let mut content = render_children(&self.children, format);
        if content.trim().is_empty() {
            content = self.url.clone();
        }
        match format {
            Format::Markdown | Format::Pandoc => format!("[{content}]({})", self.url),
            _ => format!("<a href=\"{}\">{content}</a>", self.url),
        }
    }
}

impl Reference {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!(
                "{{Reference, page_index={}, {}}}",
                self.page_index,
                repr_children(&self.children)
            ),
            Format::Markdown => {
                let target = format!("./{}.md", self.page_index);
                let mut content = render_children(&self.children, format);
                if content.trim().is_empty() {
                    content = target.clone();
                }
                format!("[{content}]({target})")
            }
            Format::Html => {
                let target = format!("./{}.html", self.page_index);
                let mut content = render_children(&self.children, format);
                if content.trim().is_empty() {
                    content = target[2..].to_string();
                }
                format!("<a href=\"{target}\">{content}</a>")
            }
            Format::Pandoc => {
                let target = format!("./ch{:03}.xhtml", self.page_index);
                let mut content = render_children(&self.children, format);
                if content.trim().is_empty() {
                    content = target[2..].to_string();
                }
                format!("[{content}]({target})")
            }
        }
    }
}

impl List {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!(
                "{{List, start={:?}, {}}}",
                self.start,
                repr_children(&self.children)
            ),
            Format::Markdown | Format::Pandoc => {
                format!("{}\n", render_children(&self.children, format))
            }
            Format::Html => {
                let content = render_children(&self.children, format);
                match self.start {
                    Some(start) => format!("<ol start=\"{start}\">{content}</ol>"),
                    None => format!("<ul>{content}</ul>"),
                }
            }
        }
    }
}

impl ListItem {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!(
                "{{ListItem, marker={:?}, {}}}",
                self.marker,
                repr_children(&self.children)
            ),
            Format::Html => format!("<li>{}</li>", render_children(&self.children, format)),
            Format::Markdown | Format::Pandoc => {
                // Embedded newlines (from <br>) become explicit line breaks
                // so they cannot terminate the list item.
                let content = render_children(&self.children, format).replace('\n', "<br>");
                match self.marker {
                    Some(ItemMarker::Number(n)) => format!("{n}. {content}\n"),
                    _ => format!("- {content}\n"),
                }
            }
        }
    }
}

impl Aside {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!("{{Aside, {}, {}}}", self.class, repr_children(&self.children)),
            Format::Markdown => {
                // Embedded newlines continue the block quote.
                let content = render_children(&self.children, format).replace('\n', "\n> ");
                format!("{content}\n\n")
            }
            Format::Html => format!("<aside>{}</aside>", render_children(&self.children, format)),
            Format::Pandoc => {
                format!("<aside>{}</aside>\n", render_children(&self.children, format))
            }
        }
    }
}

impl Image {
    fn render(&self, format: Format) -> String {
        if format == Format::Repr {
            return format!(
                "{{Image, {}, width={}, \"{}\"}}",
                self.url,
                self.width.map_or_else(|| "none".to_string(), |w| w.to_string()),
                self.alt.as_deref().unwrap_or("")
            );
        }
        let mut out = format!("<img src=\"{}\"", self.url);
        if let Some(width) = self.width {
            out.push_str(&format!(" width=\"{width}px\""));
        }
        if let Some(alt) = &self.alt {
            out.push_str(&format!(" alt=\"{alt}\""));
        }
        out.push('>');
        out
    }
}

impl Code {
    fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => format!("{{Code, \"{}\"}}", self.value),
            Format::Markdown | Format::Pandoc => {
                let language = lang::detect(&self.value, &self.default_language);
                format!("```{language}\n{}\n```\n", self.value)
            }
            Format::Html => format!("<pre><code>{}</code></pre>", escape_xml(&self.value)),
        }
    }
}

/// Escape the five XML special characters.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
