use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("access forbidden: {url}")]
    Forbidden { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("render session error: {0}")]
    Render(String),

    #[error("site '{site}' needs a rendering session but no browser is available")]
    RenderingUnavailable { site: String },

    #[error("failed to access seeds file {path}: {source}")]
    SeedsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seeds file {path}: {source}")]
    SeedsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    OutputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScraperError {
    /// Whether the server refused the request outright.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ScraperError::Forbidden { .. })
    }
}
