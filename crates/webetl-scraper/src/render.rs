//! Scriptable browser sessions for progressive and tab-based listings.
//!
//! A session is an owned handle: the strategy that launches one closes it
//! on every exit path, success or failure.

use std::time::Duration;

use crate::error::ScraperError;

/// Outcome of a DOM interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
    /// The element exists but another element intercepted the click.
    Blocked,
}

/// One live page in a rendering engine.
#[allow(async_fn_in_trait)]
pub trait RenderSession {
    /// Loads `url` and waits for the document to be ready.
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, ScraperError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError>;

    /// Clicks the `index`-th element matching `selector`.
    async fn click(&mut self, selector: &str, index: usize) -> Result<Lookup, ScraperError>;

    /// Number of elements matching `selector`.
    async fn count(&mut self, selector: &str) -> Result<usize, ScraperError>;

    /// Waits up to `timeout` for `selector` to match. Returns
    /// [`Lookup::NotFound`] on timeout.
    async fn wait_for(&mut self, selector: &str, timeout: Duration)
        -> Result<Lookup, ScraperError>;

    /// Releases the page and its engine.
    async fn close(self);
}

/// Creates sessions on demand.
#[allow(async_fn_in_trait)]
pub trait SessionLauncher {
    type Session: RenderSession;

    /// # Errors
    ///
    /// Returns [`ScraperError::RenderingUnavailable`] or
    /// [`ScraperError::Render`] when no session can be started.
    async fn launch(&self, site: &str, user_agent: &str) -> Result<Self::Session, ScraperError>;
}

/// Launcher used when the crate is built without a browser backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowser;

/// Session type of [`NoBrowser`]; it can never be constructed.
#[derive(Debug)]
pub enum Unrendered {}

impl RenderSession for Unrendered {
    async fn navigate(&mut self, _url: &str) -> Result<(), ScraperError> {
        match *self {}
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        match *self {}
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError> {
        match *self {}
    }

    async fn click(&mut self, _selector: &str, _index: usize) -> Result<Lookup, ScraperError> {
        match *self {}
    }

    async fn count(&mut self, _selector: &str) -> Result<usize, ScraperError> {
        match *self {}
    }

    async fn wait_for(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<Lookup, ScraperError> {
        match *self {}
    }

    async fn close(self) {
        match self {}
    }
}

impl SessionLauncher for NoBrowser {
    type Session = Unrendered;

    async fn launch(&self, site: &str, _user_agent: &str) -> Result<Unrendered, ScraperError> {
        Err(ScraperError::RenderingUnavailable {
            site: site.to_owned(),
        })
    }
}

/// Sleeps for `delay_ms` milliseconds; zero returns immediately.
pub(crate) async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Clicks `selector[index]`, retrying while the click is intercepted, up to
/// `max_retries` extra attempts `delay_ms` apart. Returns the last outcome.
///
/// # Errors
///
/// Propagates the first session error.
pub(crate) async fn click_with_retry<S: RenderSession>(
    session: &mut S,
    selector: &str,
    index: usize,
    max_retries: u32,
    delay_ms: u64,
) -> Result<Lookup, ScraperError> {
    let mut retries = 0u32;
    loop {
        let outcome = session.click(selector, index).await?;
        if outcome != Lookup::Blocked || retries >= max_retries {
            return Ok(outcome);
        }
        retries += 1;
        tracing::warn!(selector, index, retries, max_retries, "click intercepted, retrying");
        pause(delay_ms).await;
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::testing::ScriptedSession;
    use super::*;

    #[tokio::test]
    async fn no_browser_refuses_to_launch() {
        let err = NoBrowser.launch("abby", "ua").await.unwrap_err();
        assert!(matches!(err, ScraperError::RenderingUnavailable { ref site } if site == "abby"));
    }

    #[tokio::test]
    async fn click_retry_stops_on_found() {
        let mut session = ScriptedSession::new(vec![String::new()])
            .with_clicks([Lookup::Blocked, Lookup::Blocked, Lookup::Found]);
        let outcome = click_with_retry(&mut session, "button", 0, 5, 0).await.unwrap();
        assert_eq!(outcome, Lookup::Found);
        assert_eq!(session.click_count(), 3);
    }

    #[tokio::test]
    async fn click_retry_gives_up_after_max_retries() {
        let mut session = ScriptedSession::new(vec![String::new()])
            .with_clicks([Lookup::Blocked, Lookup::Blocked, Lookup::Blocked]);
        let outcome = click_with_retry(&mut session, "button", 0, 1, 0).await.unwrap();
        assert_eq!(outcome, Lookup::Blocked);
        assert_eq!(session.click_count(), 2);
    }

    #[tokio::test]
    async fn click_retry_does_not_retry_not_found() {
        let mut session = ScriptedSession::new(vec![String::new()]);
        let outcome = click_with_retry(&mut session, "button", 0, 3, 0).await.unwrap();
        assert_eq!(outcome, Lookup::NotFound);
        assert_eq!(session.click_count(), 1);
    }
}
