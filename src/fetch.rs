// Page fetching — the network collaborator behind the crawl.
//
// The crawler is written against the `PageSource` trait so tests (and
// callers with pre-fetched markup) can substitute an in-memory page set.
// The HTTP implementation is blocking: page k+1's URL is only reachable
// through page k's extracted next link, so the chain is inherently
// sequential and there is nothing to fetch concurrently.

use std::fs;
use std::path::PathBuf;

use markup5ever_rcdom::Handle;

use crate::error::ExtractError;
use crate::extract::parse_page;

/// Source of parsed pages, keyed by URL.
pub trait PageSource {
    /// Fetch and parse one page. Network and IO failures are fatal to the
    /// crawl; no retries are performed.
    fn fetch(&self, url: &str) -> Result<Handle, ExtractError>;
}

/// Fetches pages over HTTP, with an optional on-disk page cache. The cache
/// is checked before the network and written after a live fetch; it is the
/// only resilience mechanism (a subsequent run after a partial failure
/// skips the pages already fetched).
pub struct HttpSource {
    client: reqwest::blocking::Client,
    cache_dir: Option<PathBuf>,
}

impl HttpSource {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            cache_dir,
        }
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(cache_file_name(url)))
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Handle, ExtractError> {
        if let Some(path) = self.cache_path(url) {
            if path.exists() {
                tracing::debug!(%url, path = %path.display(), "page cache hit");
                return Ok(parse_page(&fs::read_to_string(&path)?));
            }
        }

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|source| ExtractError::Fetch { url: url.to_string(), source })?;

        if let Some(path) = self.cache_path(url) {
            fs::create_dir_all(path.parent().unwrap_or_else(|| std::path::Path::new(".")))?;
            fs::write(&path, &body)?;
        }
        Ok(parse_page(&body))
    }
}

/// Cache file name for a URL: every non-alphanumeric character collapses
/// to `_`, keeping the name safe on any filesystem.
fn cache_file_name(url: &str) -> String {
    let mut name: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    name.push_str(".html");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::find_first;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_file_name_is_sanitized() {
        assert_eq!(
            cache_file_name("https://host/course/lab-1/index.html?x=1"),
            "https___host_course_lab_1_index_html_x_1.html"
        );
    }

    #[test]
    fn test_cache_hit_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://unreachable.invalid/lab/index.html";
        fs::write(
            dir.path().join(cache_file_name(url)),
            "<html><body><google-codelab id=\"lab\" title=\"t\"></google-codelab></body></html>",
        )
        .unwrap();

        let source = HttpSource::new(Some(dir.path().to_path_buf()));
        let document = source.fetch(url).expect("served from cache");
        assert!(find_first(&document, "google-codelab").is_some());
    }

    #[test]
    fn test_cache_miss_without_network_is_a_fetch_error() {
        let source = HttpSource::new(None);
        let result = source.fetch("https://unreachable.invalid/lab/index.html");
        assert!(matches!(result, Err(ExtractError::Fetch { .. })));
    }
}
