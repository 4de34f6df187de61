//! Chromium-backed render sessions over the DevTools protocol.
//!
//! DOM interactions run as small scripts so that an intercepted click comes
//! back as [`Lookup::Blocked`] instead of a protocol error.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScraperError;
use crate::render::{Lookup, RenderSession, SessionLauncher};

const WAIT_FOR_READY_SCRIPT: &str = r"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight); true";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn render_err(e: impl std::fmt::Display) -> ScraperError {
    ScraperError::Render(e.to_string())
}

fn js_string(value: &str) -> Result<String, ScraperError> {
    serde_json::to_string(value).map_err(render_err)
}

fn click_script(selector: &str, index: usize) -> Result<String, ScraperError> {
    let selector = js_string(selector)?;
    Ok(format!(
        r"(() => {{
            const el = document.querySelectorAll({selector})[{index}];
            if (!el) return 'missing';
            el.scrollIntoView({{ block: 'center' }});
            const r = el.getBoundingClientRect();
            if (r.width === 0 && r.height === 0) return 'missing';
            const top = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
            if (top && top !== el && !el.contains(top)) return 'blocked';
            el.click();
            return 'clicked';
        }})()"
    ))
}

/// Launches a fresh Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
    navigation_timeout: Duration,
}

impl ChromeLauncher {
    #[must_use]
    pub fn new(headless: bool, navigation_timeout_secs: u64) -> Self {
        Self {
            headless,
            navigation_timeout: Duration::from_secs(navigation_timeout_secs),
        }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, site: &str, user_agent: &str) -> Result<ChromeSession, ScraperError> {
        tracing::info!(site, headless = self.headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-sandbox")
            .arg("--disable-gpu");
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScraperError::Render)?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(render_err)?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(render_err(e));
            }
        };
        if let Err(e) = page
            .execute(SetUserAgentOverrideParams::new(user_agent.to_string()))
            .await
        {
            tracing::warn!(site, error = %e, "could not override browser user agent");
        }

        Ok(ChromeSession {
            browser,
            page,
            handler_task,
            navigation_timeout: self.navigation_timeout,
        })
    }
}

/// A single page in a dedicated browser process.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromeSession {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, ScraperError> {
        self.page
            .evaluate(script)
            .await
            .map_err(render_err)?
            .into_value::<T>()
            .map_err(render_err)
    }
}

impl RenderSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                ScraperError::Render(format!(
                    "navigation timed out after {}s for {url}",
                    self.navigation_timeout.as_secs()
                ))
            })?
            .map_err(render_err)?;

        match tokio::time::timeout(
            self.navigation_timeout,
            self.eval::<String>(WAIT_FOR_READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(state)) => tracing::debug!(url, state, "page ready"),
            Ok(Err(e)) => tracing::debug!(url, error = %e, "could not read ready state"),
            Err(_) => tracing::warn!(url, "timeout waiting for page ready state"),
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        self.page.content().await.map_err(render_err)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ScraperError> {
        self.eval::<bool>(SCROLL_SCRIPT.to_string()).await.map(|_| ())
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<Lookup, ScraperError> {
        let outcome: String = self.eval(click_script(selector, index)?).await?;
        Ok(match outcome.as_str() {
            "clicked" => Lookup::Found,
            "blocked" => Lookup::Blocked,
            _ => Lookup::NotFound,
        })
    }

    async fn count(&mut self, selector: &str) -> Result<usize, ScraperError> {
        let script = format!("document.querySelectorAll({}).length", js_string(selector)?);
        self.eval(script).await
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Lookup, ScraperError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.count(selector).await? > 0 {
                return Ok(Lookup::Found);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(Lookup::NotFound);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(mut self) {
        if let Err(e) = self.page.close().await {
            tracing::debug!(error = %e, "page close failed");
        }
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
