// Page extraction — two passes over one parsed codelab page.
//
// Pass 1 (`Codelab::from_document`) reads page metadata only: identifier,
// title, chapter number, base URL, and the forward-navigation link. Pass 2
// (`Codelab::extract_steps`) builds the step content trees; it runs only
// after the whole course has been collected, because anchors resolve
// against the complete identifier set.

pub(crate) mod handlers;

use std::sync::LazyLock;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, RcDom};
use regex::Regex;
use url::Url;

use crate::element::{self, Element, Format};
use crate::error::ExtractError;

/// `1.2`-style chapter numbering inside a page title.
static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)").expect("chapter pattern"));

/// Parse an HTML string into a traversable markup tree.
pub fn parse_page(html: &str) -> Handle {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes());
    dom.document
}

/// Extraction state threaded through the tag dispatch of one body pass.
pub(crate) struct State<'a> {
    /// Base URL for identifier-relative asset paths.
    pub base_url: String,
    /// Crawl-ordered identifiers of every page in the course.
    pub known_ids: &'a [String],
    /// Fallback language for code blocks.
    pub default_language: &'a str,
}

impl State<'_> {
    /// Resolve an image `src`: absolute URLs pass through verbatim,
    /// anything else resolves against the page base URL.
    pub fn resolve_asset(&self, src: &str) -> String {
        if Url::parse(src).is_ok() {
            return src.to_string();
        }
        Url::parse(&self.base_url)
            .ok()
            .and_then(|base| base.join(src).ok())
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|| format!("{}{}", self.base_url, src))
    }
}

/// One crawled codelab page: metadata from pass 1, step trees from pass 2.
pub struct Codelab {
    /// URL the page was fetched from.
    pub url: String,
    /// URL directory for the page's relative assets.
    pub base_url: String,
    /// Page identifier, from the container's `id` attribute.
    pub id: String,
    /// Full page title, from the container's `title` attribute.
    pub title: String,
    /// `1.2`-style chapter number parsed from the title, if any.
    pub chapter: Option<String>,
    /// Title with the leading course prefix stripped.
    pub short_title: String,
    /// URL of the next page in the course; absent on the final page.
    pub next_url: Option<String>,
    /// Label of the next-page control.
    pub next_label: Option<String>,
    /// A second, distinct navigation link (e.g. course home), when present.
    pub alt_url: Option<String>,
    /// Label of the second navigation link.
    pub alt_label: Option<String>,
    /// Ordered step trees; empty until the body pass runs.
    pub steps: Vec<Element>,
    /// Parsed page container, retained between the two passes.
    root: Handle,
    /// Document root, kept alive so rcdom's destructor does not detach
    /// the retained container's children before the body pass runs.
    _document: Handle,
}

impl Codelab {
    /// Pass 1: locate the codelab container and extract page metadata. The
    /// container is retained so the body pass can reuse the parsed tree.
    pub fn from_document(document: Handle, url: &str) -> Result<Self, ExtractError> {
        let root = find_first(&document, "google-codelab")
            .ok_or_else(|| ExtractError::MissingRoot(url.to_string()))?;

        let id = handlers::get_attr(&root, "id").unwrap_or_else(|| {
            tracing::warn!(url, "codelab container has no id attribute");
            String::new()
        });
        let title = handlers::get_attr(&root, "title").unwrap_or_else(|| {
            tracing::warn!(url, "codelab container has no title attribute");
            String::new()
        });
        let (next, alt) = navigation(&root);
        if next.is_none() {
            tracing::debug!(url, "no next link found, treating as final page");
        }
        let (next_url, next_label) = next.unzip();
        let (alt_url, alt_label) = alt.unzip();

        Ok(Codelab {
            url: url.to_string(),
            base_url: base_url_for(url, &id),
            chapter: chapter_number(&title),
            short_title: short_title(&title),
            id,
            title,
            next_url,
            next_label,
            alt_url,
            alt_label,
            steps: Vec::new(),
            root,
            _document: document,
        })
    }

    /// Pass 2: build the ordered step trees. `known_ids` is the complete
    /// crawl-ordered identifier list; anchors whose href contains one of
    /// them become cross-page references.
    pub fn extract_steps(&mut self, known_ids: &[String], default_language: &str) {
        let state = State {
            base_url: self.base_url.clone(),
            known_ids,
            default_language,
        };
        self.steps = find_all(&self.root, "google-codelab-step")
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let label = handlers::get_attr(step, "label").unwrap_or_else(|| {
                    tracing::warn!(url = %self.url, "step without label attribute");
                    String::new()
                });
                handlers::propagate(
                    &state,
                    step,
                    Element::Step(element::Step {
                        label,
                        ordinal: index + 1,
                        children: Vec::new(),
                    }),
                )
            })
            .collect();
    }

    /// Render the whole page: every step's subtree in order. The debug
    /// format prefixes the page title.
    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Repr => {
                let steps: Vec<String> = self.steps.iter().map(|s| s.render(format)).collect();
                format!("Codelab \"{}\":\n{}", self.title, steps.join("\n"))
            }
            _ => self.steps.iter().map(|s| s.render(format)).collect(),
        }
    }

    /// Logical sub-pages of the rendered output: a title page carrying the
    /// navigation links, then one sub-page per step. When a next link
    /// exists the final step is omitted — it holds only the navigation
    /// controls.
    pub fn pages(&self, format: Format) -> Vec<String> {
        let mut title_page = format!("# {}\n", self.title);
        if let (Some(url), Some(label)) = (&self.next_url, &self.next_label) {
            title_page.push_str(&format!("\nNext: [{label}]({url})\n"));
        }
        if let (Some(url), Some(label)) = (&self.alt_url, &self.alt_label) {
            title_page.push_str(&format!("\n[{label}]({url})\n"));
        }
        let kept = if self.next_url.is_some() {
            self.steps.len().saturating_sub(1)
        } else {
            self.steps.len()
        };
        let mut out = vec![title_page];
        out.extend(self.steps[..kept].iter().map(|s| s.render(format)));
        out
    }
}

// ---------------------------------------------------------------------------
// Metadata helpers
// ---------------------------------------------------------------------------

/// The directory of the page URL, with the page identifier appended as a
/// segment when it does not already occur in it. Identifier-relative asset
/// paths resolve against this.
fn base_url_for(url: &str, id: &str) -> String {
    let mut base = match url.rfind('/') {
        Some(pos) => url[..=pos].to_string(),
        None => format!("{url}/"),
    };
    if !id.is_empty() && !base.contains(id) {
        base.push_str(id);
        base.push('/');
    }
    base
}

/// First `digits.digits` match in the title, with leading zeros of the
/// integer part stripped (`01.1` → `1.1`).
fn chapter_number(title: &str) -> Option<String> {
    let caps = CHAPTER_RE.captures(title)?;
    let whole = caps[1].trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    Some(format!("{whole}.{}", &caps[2]))
}

/// Title with the leading `"Course: "`-style prefix stripped; a title
/// without a colon is its own short title.
fn short_title(title: &str) -> String {
    match title.split_once(':') {
        Some((_, rest)) => rest.trim_start().to_string(),
        None => title.to_string(),
    }
}

/// The navigation links of the final step: the first paragraph's anchor is
/// the forward link, the second paragraph's anchor (when distinct) is the
/// alternate link. Any missing piece means this is the final page — never
/// an error.
fn navigation(root: &Handle) -> (Option<(String, String)>, Option<(String, String)>) {
    let steps = find_all(root, "google-codelab-step");
    let Some(last) = steps.last() else {
        return (None, None);
    };
    let paragraphs = find_all(last, "p");
    let Some(next) = next_link(&paragraphs) else {
        return (None, None);
    };
    let alt = alt_link(&paragraphs, &next.0);
    (Some(next), alt)
}

fn next_link(paragraphs: &[Handle]) -> Option<(String, String)> {
    let anchor = find_first(paragraphs.first()?, "a")?;
    let href = handlers::get_attr(&anchor, "href")?;
    let button = find_first(&anchor, "paper-button")?;
    Some((href, handlers::text_content(&button).trim().to_string()))
}

fn alt_link(paragraphs: &[Handle], next_url: &str) -> Option<(String, String)> {
    let anchor = find_first(paragraphs.get(1)?, "a")?;
    let href = handlers::get_attr(&anchor, "href")?;
    if href == next_url {
        return None;
    }
    let label = handlers::text_content(&anchor).trim().to_string();
    Some((href, label))
}

// ---------------------------------------------------------------------------
// Tree search helpers
// ---------------------------------------------------------------------------

/// All descendant elements with the given tag, in document order.
pub(crate) fn find_all(handle: &Handle, tag: &str) -> Vec<Handle> {
    fn collect(handle: &Handle, tag: &str, out: &mut Vec<Handle>) {
        for child in handle.children.borrow().iter() {
            if handlers::tag_name(child).as_deref() == Some(tag) {
                out.push(child.clone());
            }
            collect(child, tag, out);
        }
    }
    let mut out = Vec::new();
    collect(handle, tag, &mut out);
    out
}

/// First descendant element with the given tag, in document order.
pub(crate) fn find_first(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if handlers::tag_name(child).as_deref() == Some(tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, tag) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE_URL: &str = "https://host/course/lab-install/index.html";

    fn page(id: &str, title: &str, steps: &str) -> String {
        format!(
            "<html><body><google-codelab id=\"{id}\" title=\"{title}\">{steps}</google-codelab></body></html>"
        )
    }

    fn nav_step(next_href: &str, next_label: &str) -> String {
        format!(
            "<google-codelab-step label=\"Next steps\"><p><a href=\"{next_href}\"><paper-button>{next_label}</paper-button></a></p></google-codelab-step>"
        )
    }

    fn metadata_of(html: &str) -> Codelab {
        Codelab::from_document(parse_page(html), PAGE_URL).expect("valid page")
    }

    #[test]
    fn test_metadata_pass() {
        let html = page(
            "lab-install",
            "Android Basics: 01.2 Install the tools",
            &format!(
                "<google-codelab-step label=\"Intro\"><p>hi</p></google-codelab-step>{}",
                nav_step("https://host/course/lab-next/index.html", "Next codelab")
            ),
        );
        let codelab = metadata_of(&html);
        assert_eq!(codelab.id, "lab-install");
        assert_eq!(codelab.title, "Android Basics: 01.2 Install the tools");
        assert_eq!(codelab.chapter.as_deref(), Some("1.2"));
        assert_eq!(codelab.short_title, "01.2 Install the tools");
        assert_eq!(codelab.base_url, "https://host/course/lab-install/");
        assert_eq!(
            codelab.next_url.as_deref(),
            Some("https://host/course/lab-next/index.html")
        );
        assert_eq!(codelab.next_label.as_deref(), Some("Next codelab"));
        assert!(codelab.alt_url.is_none());
        assert!(codelab.steps.is_empty());
    }

    #[test]
    fn test_base_url_appends_identifier_when_missing() {
        let html = page("other-lab", "t", "");
        let codelab = metadata_of(&html);
        assert_eq!(codelab.base_url, "https://host/course/lab-install/other-lab/");
    }

    #[test]
    fn test_missing_navigation_is_final_page() {
        // A last step whose paragraph holds a plain anchor without the
        // nested button label: the whole control is treated as absent.
        let html = page(
            "lab-end",
            "Course: 1.9 Wrap up",
            "<google-codelab-step label=\"Done\"><p><a href=\"https://x\">no button</a></p></google-codelab-step>",
        );
        let codelab = metadata_of(&html);
        assert!(codelab.next_url.is_none());
        assert!(codelab.next_label.is_none());
    }

    #[test]
    fn test_page_without_steps_has_no_navigation() {
        let codelab = metadata_of(&page("lab-empty", "Empty", ""));
        assert!(codelab.next_url.is_none());
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let document = parse_page("<html><body><p>not a codelab</p></body></html>");
        let result = Codelab::from_document(document, PAGE_URL);
        assert!(matches!(result, Err(ExtractError::MissingRoot(_))));
    }

    #[test]
    fn test_alternate_link_when_distinct() {
        let steps = "<google-codelab-step label=\"Done\">\
            <p><a href=\"https://host/next\"><paper-button>Next</paper-button></a></p>\
            <p><a href=\"https://host/home\">Course home</a></p>\
            </google-codelab-step>";
        let codelab = metadata_of(&page("lab", "t", steps));
        assert_eq!(codelab.next_url.as_deref(), Some("https://host/next"));
        assert_eq!(codelab.alt_url.as_deref(), Some("https://host/home"));
        assert_eq!(codelab.alt_label.as_deref(), Some("Course home"));
    }

    #[test]
    fn test_alternate_link_ignored_when_same_as_next() {
        let steps = "<google-codelab-step label=\"Done\">\
            <p><a href=\"https://host/next\"><paper-button>Next</paper-button></a></p>\
            <p><a href=\"https://host/next\">Next again</a></p>\
            </google-codelab-step>";
        let codelab = metadata_of(&page("lab", "t", steps));
        assert!(codelab.alt_url.is_none());
    }

    #[test]
    fn test_chapter_number_edge_cases() {
        assert_eq!(chapter_number("Course: 01.1 Intro").as_deref(), Some("1.1"));
        assert_eq!(chapter_number("Course: 10.2 More").as_deref(), Some("10.2"));
        assert_eq!(chapter_number("Course: 0.1 Zero").as_deref(), Some("0.1"));
        assert_eq!(chapter_number("No numbering here"), None);
    }

    #[test]
    fn test_short_title_strips_course_prefix() {
        assert_eq!(short_title("Android Basics: 1.1 Intro"), "1.1 Intro");
        assert_eq!(short_title("Standalone title"), "Standalone title");
    }

    #[test]
    fn test_body_pass_builds_step_trees() {
        let html = page(
            "lab-install",
            "Course: 1.1 Install",
            "<google-codelab-step label=\"Get started\">\
                <h2>Setup</h2>\
                <p>See <a href=\"https://host/course/lab-next/index.html\">the next codelab</a>.</p>\
             </google-codelab-step>",
        );
        let mut codelab = metadata_of(&html);
        let ids = vec!["lab-install".to_string(), "lab-next".to_string()];
        codelab.extract_steps(&ids, "kotlin");

        assert_eq!(codelab.steps.len(), 1);
        assert_eq!(
            codelab.steps[0].render(Format::Markdown),
            "# 1. Get started\n## Setup\n\nSee [the next codelab](./1.md).\n"
        );
    }

    #[test]
    fn test_sub_pages_omit_navigation_step() {
        let html = page(
            "lab-install",
            "Course: 1.1 Install",
            &format!(
                "<google-codelab-step label=\"Intro\"><p>content</p></google-codelab-step>{}",
                nav_step("https://host/next", "Next")
            ),
        );
        let mut codelab = metadata_of(&html);
        codelab.extract_steps(&[], "");

        let pages = codelab.pages(Format::Markdown);
        assert_eq!(pages.len(), 2); // title page + one content step
        assert_eq!(
            pages[0],
            "# Course: 1.1 Install\n\nNext: [Next](https://host/next)\n"
        );
        assert_eq!(pages[1], "# 1. Intro\n\ncontent\n");
    }

    #[test]
    fn test_sub_pages_keep_all_steps_on_final_page() {
        let html = page(
            "lab-end",
            "Course: 1.9 Wrap up",
            "<google-codelab-step label=\"Summary\"><p>done</p></google-codelab-step>",
        );
        let mut codelab = metadata_of(&html);
        codelab.extract_steps(&[], "");
        assert_eq!(codelab.pages(Format::Markdown).len(), 2);
    }

    #[test]
    fn test_resolve_asset() {
        let state = State {
            base_url: "https://host/course/lab/".to_string(),
            known_ids: &[],
            default_language: "",
        };
        assert_eq!(state.resolve_asset("img/a.png"), "https://host/course/lab/img/a.png");
        assert_eq!(state.resolve_asset("https://cdn/b.png"), "https://cdn/b.png");
    }
}
