// codelab2md — Google Codelabs course extractor.
//
// Architecture:
//   first page URL → crawl stage 1 (follow next links, metadata only)
//     → crawl-ordered identifier list
//     → crawl stage 2 (tag dispatch builds each page's step trees,
//       cross-page anchors resolve against the identifier list)
//     → per-page render(format): Markdown / HTML fragment / pandoc chapter

mod course;
pub mod element;
mod error;
mod extract;
mod fetch;
pub mod lang;

use std::path::PathBuf;

pub use course::Course;
pub use element::{Element, Format};
pub use error::ExtractError;
pub use extract::{parse_page, Codelab};
pub use fetch::{HttpSource, PageSource};

/// Separator between logical sub-pages in one page's Markdown output.
/// Renders as a page break both in browsers and through pandoc.
pub const PAGE_BREAK: &str =
    "\n<div style=\"page-break-after: always; visibility: hidden\">\n\\pagebreak\n</div>\n\n";

/// Crawl options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Fallback language for code blocks whose language cannot be
    /// detected. Default: empty (no syntax highlighting).
    pub default_language: String,
    /// Upper bound on the number of pages to crawl. Default: unbounded.
    pub max_pages: Option<usize>,
    /// Directory for the on-disk page cache. Default: no cache.
    pub cache_dir: Option<PathBuf>,
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback language for code blocks.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Bound the crawl to at most `max` pages.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Cache fetched pages under `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}

/// Crawl a whole course over HTTP, starting from its first page URL.
pub fn extract_course(first_url: &str, options: &Options) -> Result<Course, ExtractError> {
    let source = HttpSource::new(options.cache_dir.clone());
    Course::crawl(&source, first_url, options)
}

/// Crawl a course using a caller-provided page source (tests, pre-fetched
/// page sets).
pub fn extract_course_with(
    source: &dyn PageSource,
    first_url: &str,
    options: &Options,
) -> Result<Course, ExtractError> {
    Course::crawl(source, first_url, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = Options::new()
            .with_default_language("kotlin")
            .with_max_pages(10)
            .with_cache_dir("/tmp/pages");
        assert_eq!(options.default_language, "kotlin");
        assert_eq!(options.max_pages, Some(10));
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/pages")));
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.default_language, "");
        assert!(options.max_pages.is_none());
        assert!(options.cache_dir.is_none());
    }
}
