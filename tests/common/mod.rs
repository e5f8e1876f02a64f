// Shared test helpers: an in-memory page source and codelab page builders.

use std::collections::HashMap;

use codelab2md::{parse_page, ExtractError, PageSource};
use markup5ever_rcdom::Handle;

/// In-memory page set standing in for the network.
pub struct StaticSource {
    pages: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self { pages: HashMap::new() }
    }

    pub fn insert(&mut self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(url.into(), html.into());
    }
}

impl PageSource for StaticSource {
    fn fetch(&self, url: &str) -> Result<Handle, ExtractError> {
        let html = self
            .pages
            .get(url)
            .unwrap_or_else(|| panic!("unexpected fetch: {url}"));
        Ok(parse_page(html))
    }
}

/// URL scheme used by all fixture pages.
pub fn course_url(id: &str) -> String {
    format!("https://host/course/{id}/index.html")
}

/// A full codelab page document.
pub fn codelab_page(id: &str, title: &str, steps_html: &str) -> String {
    format!(
        "<html><body><google-codelab id=\"{id}\" title=\"{title}\">{steps_html}</google-codelab></body></html>"
    )
}

/// The navigation step every non-final page ends with.
pub fn nav_step(next_url: &str, next_label: &str, alt: Option<(&str, &str)>) -> String {
    let alt_paragraph = match alt {
        Some((url, label)) => format!("<p><a href=\"{url}\">{label}</a></p>"),
        None => String::new(),
    };
    format!(
        "<google-codelab-step label=\"Next steps\"><p><a href=\"{next_url}\"><paper-button>{next_label}</paper-button></a></p>{alt_paragraph}</google-codelab-step>"
    )
}
