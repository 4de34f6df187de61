//! HTTP client for listing, detail and menu pages.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

pub use origin::{path_segments, resolve_url, site_origin, url_path};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetches HTML pages with a browser-like request profile.
///
/// Every request carries the configured `User-Agent`, `Accept`,
/// `Accept-Language` and a `Referer` pointing at the page's own origin.
/// A 403 is reported as [`ScraperError::Forbidden`] so callers can log it
/// distinctly; any other non-2xx status is [`ScraperError::UnexpectedStatus`].
/// Nothing is retried here: a failed fetch is terminal for its page.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute URL.
    /// - [`ScraperError::Forbidden`]: HTTP 403.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, timeout or body decoding failure.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = site_origin(url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, format!("{referer}/"))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScraperError::Forbidden {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
