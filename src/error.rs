/// Errors that abort a crawl. Recoverable conditions (unknown tags,
/// malformed list content, missing navigation links, missing attributes)
/// never surface here; they are logged at their site and extraction of the
/// current page continues.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Network or HTTP failure fetching a page. Fatal: no output past this
    /// point would be reliable.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading or writing the on-disk page cache failed.
    #[error("page cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// The page markup has no `<google-codelab>` container to extract from.
    #[error("page at {0} has no <google-codelab> container")]
    MissingRoot(String),
}
