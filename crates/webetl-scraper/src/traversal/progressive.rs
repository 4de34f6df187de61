//! "Load more" listings rendered in a browser session.

use webetl_core::ProductRecord;

use crate::error::ScraperError;
use crate::render::{pause, Lookup, RenderSession, SessionLauncher};

use super::{cards_from_html, collect_details, SeenUrls, SiteContext};

pub(super) async fn enumerate<L: SessionLauncher>(
    ctx: &SiteContext<'_>,
    launcher: &L,
    category_url: &str,
    seen: &mut SeenUrls,
) -> Vec<ProductRecord> {
    let mut session = match launcher.launch(ctx.name, ctx.user_agent).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(site = ctx.name, category_url, error = %e, "could not start render session");
            return Vec::new();
        }
    };
    let loaded = load_everything(&mut session, ctx, category_url).await;
    session.close().await;

    let html = match loaded {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(site = ctx.name, category_url, error = %e, "progressive loading failed");
            return Vec::new();
        }
    };

    let cards = match cards_from_html(&html, ctx.site) {
        Ok(cards) => cards,
        Err(e) => {
            tracing::error!(site = ctx.name, category_url, error = %e, "failed to parse loaded listing");
            return Vec::new();
        }
    };

    let mut products = Vec::new();
    collect_details(ctx, cards.urls, seen, &mut products).await;
    products
}

/// Clicks the load-more control until it disappears, the load limit is hit,
/// or too many consecutive clicks are intercepted. Returns the final DOM.
///
/// A session error while loading ends the loop like a vanished control; the
/// DOM loaded so far is still returned.
pub(super) async fn load_everything<S: RenderSession>(
    session: &mut S,
    ctx: &SiteContext<'_>,
    category_url: &str,
) -> Result<String, ScraperError> {
    session.navigate(category_url).await?;

    let Some(button) = ctx.site.button_selector.as_deref() else {
        return session.content().await;
    };
    let config = &ctx.site.progressive;
    let mut loads = 0u32;
    let mut blocked = 0u32;

    loop {
        if loads >= config.max_loads {
            tracing::warn!(site = ctx.name, category_url, loads, "load limit reached");
            break;
        }
        let clicked = match session.scroll_to_bottom().await {
            Ok(()) => session.click(button, 0).await,
            Err(e) => Err(e),
        };
        let outcome = match clicked {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(site = ctx.name, category_url, loads, error = %e, "load-more interaction failed, keeping loaded items");
                break;
            }
        };
        match outcome {
            Lookup::Found => {
                loads += 1;
                blocked = 0;
                pause(config.settle_ms).await;
            }
            Lookup::NotFound => {
                tracing::debug!(site = ctx.name, category_url, loads, "load-more control gone");
                break;
            }
            Lookup::Blocked => {
                blocked += 1;
                if blocked > config.max_click_retries {
                    tracing::warn!(
                        site = ctx.name,
                        category_url,
                        blocked,
                        "load-more click keeps being intercepted, stopping"
                    );
                    break;
                }
                tracing::warn!(site = ctx.name, category_url, blocked, "load-more click intercepted");
                pause(config.retry_delay_ms).await;
            }
        }
    }

    tracing::info!(site = ctx.name, category_url, loads, "progressive loading finished");
    session.content().await
}
