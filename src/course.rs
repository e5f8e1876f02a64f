// Course crawling — the two-stage pass over a chain of codelab pages.
//
// Stage 1 follows each page's forward-navigation link, collecting page
// metadata and the crawl-ordered identifier list. It must finish before
// any body is parsed: cross-page anchors resolve against the complete
// identifier set, including forward references to pages not yet visited.
// Stage 2 then builds every page's step trees from the finished list.

use url::Url;

use crate::error::ExtractError;
use crate::extract::Codelab;
use crate::fetch::PageSource;
use crate::Options;

/// A fully crawled course. Immutable once built.
pub struct Course {
    /// `scheme://host/` of the first page URL.
    pub host_base_url: String,
    /// Inferred shared course identifier.
    pub id: String,
    /// Inferred shared course title.
    pub title: String,
    /// Pages in crawl order, with their step trees built.
    pub pages: Vec<Codelab>,
}

/// Output of the collection stage: pages with metadata only, plus the
/// parallel identifier list the resolution stage reads.
struct Collected {
    pages: Vec<Codelab>,
    ids: Vec<String>,
}

impl Course {
    /// Crawl a whole course starting from its first page URL.
    pub fn crawl(
        source: &dyn PageSource,
        first_url: &str,
        options: &Options,
    ) -> Result<Course, ExtractError> {
        let mut collected = collect(source, first_url, options)?;
        resolve(&mut collected, options);

        let (id, title) = infer_course_metadata(&collected.pages);
        Ok(Course {
            host_base_url: host_base_url(first_url),
            id,
            title,
            pages: collected.pages,
        })
    }
}

/// Stage 1: follow the next-link chain, metadata only. Stops when a page
/// has no next link or the configured page limit is reached.
fn collect(
    source: &dyn PageSource,
    first_url: &str,
    options: &Options,
) -> Result<Collected, ExtractError> {
    let mut pages = Vec::new();
    let mut ids = Vec::new();
    let mut next = Some(first_url.to_string());

    while let Some(url) = next {
        if options.max_pages.is_some_and(|max| pages.len() >= max) {
            tracing::info!(max = ?options.max_pages, "page limit reached, stopping crawl");
            break;
        }
        tracing::info!(%url, "fetching page");
        let page = Codelab::from_document(source.fetch(&url)?, &url)?;
        next = page.next_url.clone();
        ids.push(page.id.clone());
        pages.push(page);
    }

    Ok(Collected { pages, ids })
}

/// Stage 2: build every page's body against the complete identifier list.
fn resolve(collected: &mut Collected, options: &Options) {
    for page in &mut collected.pages {
        tracing::info!(title = %page.title, "extracting steps");
        page.extract_steps(&collected.ids, &options.default_language);
    }
}

/// Infer the shared course identifier and title from the page set.
///
/// Codelab titles in one course share a fixed prefix ("Course: 1.1 Intro",
/// "Course: 1.2 Setup"), so the longest common leading substring of two
/// reference pages recovers it: the 2nd and 3rd pages when at least three
/// exist (the first page's title is often an outlier), the two pages when
/// exactly two exist, the single page's own values otherwise. An empty
/// trimmed result falls back to the first page's trimmed values.
fn infer_course_metadata(pages: &[Codelab]) -> (String, String) {
    let (id, title) = match pages {
        [] => (String::new(), String::new()),
        [only] => (only.id.clone(), only.title.clone()),
        [a, b] => (common_prefix(&a.id, &b.id), common_prefix(&a.title, &b.title)),
        [_, a, b, ..] => (common_prefix(&a.id, &b.id), common_prefix(&a.title, &b.title)),
    };

    let or_first = |inferred: &str, first: &str| {
        let inferred = inferred.trim();
        if inferred.is_empty() {
            first.trim().to_string()
        } else {
            inferred.to_string()
        }
    };
    match pages.first() {
        Some(first) => (or_first(&id, &first.id), or_first(&title, &first.title)),
        None => (id, title),
    }
}

fn common_prefix(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

/// `scheme://host/` (with port, if any) of a page URL.
fn host_base_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            match parsed.port() {
                Some(port) => format!("{}://{host}:{port}/", parsed.scheme()),
                None => format!("{}://{host}/", parsed.scheme()),
            }
        }
        Err(_) => String::new(),
    }
}
