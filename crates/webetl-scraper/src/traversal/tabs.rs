//! Tab-switched listings rendered in a browser session.

use std::collections::HashSet;
use std::time::Duration;

use webetl_core::ProductRecord;

use crate::error::ScraperError;
use crate::render::{click_with_retry, Lookup, RenderSession, SessionLauncher};

use super::{cards_from_html, collect_details, SeenUrls, SiteContext};

/// Extra attempts for an intercepted tab click.
const TAB_CLICK_RETRIES: u32 = 1;

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
    let snapshots = tab_snapshots(&mut session, ctx, category_url).await;
    session.close().await;

    let snapshots = match snapshots {
        Ok(snapshots) => snapshots,
        Err(e) => {
            tracing::error!(site = ctx.name, category_url, error = %e, "tab traversal failed");
            return Vec::new();
        }
    };

    let mut urls = Vec::new();
    let mut merged = HashSet::new();
    for (tab, html) in snapshots.iter().enumerate() {
        match cards_from_html(html, ctx.site) {
            Ok(cards) => {
                for url in cards.urls {
                    if merged.insert(url.clone()) {
                        urls.push(url);
                    }
                }
            }
            Err(e) => {
                tracing::error!(site = ctx.name, category_url, tab, error = %e, "failed to parse tab");
            }
        }
    }

    let mut products = Vec::new();
    collect_details(ctx, urls, seen, &mut products).await;
    products
}

/// DOM snapshots of the initial tab followed by every tab that could be
/// opened.
///
/// Only a failure before the initial snapshot is an error. A session error on
/// a later tab is logged and that tab skipped, so earlier snapshots survive.
pub(super) async fn tab_snapshots<S: RenderSession>(
    session: &mut S,
    ctx: &SiteContext<'_>,
    category_url: &str,
) -> Result<Vec<String>, ScraperError> {
    session.navigate(category_url).await?;
    dismiss_popups(session, &ctx.site.tabs.popup_selectors).await;

    let mut snapshots = vec![session.content().await?];
    let Some(tab_selector) = ctx.site.subcategory_selector.as_deref() else {
        return Ok(snapshots);
    };
    let tab_count = match session.count(tab_selector).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(site = ctx.name, category_url, error = %e, "could not count tabs");
            return Ok(snapshots);
        }
    };
    tracing::debug!(site = ctx.name, category_url, tab_count, "tabs located");

    for index in 1..tab_count {
        match open_tab(session, ctx, category_url, tab_selector, index).await {
            Ok(Some(html)) => snapshots.push(html),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(site = ctx.name, category_url, index, error = %e, "tab failed, skipping tab");
            }
        }
    }

    Ok(snapshots)
}

/// Clicks tab `index` and snapshots it. `None` means the tab was skipped.
async fn open_tab<S: RenderSession>(
    session: &mut S,
    ctx: &SiteContext<'_>,
    category_url: &str,
    tab_selector: &str,
    index: usize,
) -> Result<Option<String>, ScraperError> {
    let config = &ctx.site.tabs;
    match click_with_retry(session, tab_selector, index, TAB_CLICK_RETRIES, config.retry_delay_ms)
        .await?
    {
        Lookup::Found => {}
        Lookup::Blocked => {
            tracing::warn!(site = ctx.name, category_url, index, "tab click intercepted, skipping tab");
            return Ok(None);
        }
        Lookup::NotFound => {
            tracing::warn!(site = ctx.name, category_url, index, "tab control vanished, skipping tab");
            return Ok(None);
        }
    }

    if let Some(panel) = config.panel_selector.as_deref() {
        let timeout = Duration::from_secs(config.wait_timeout_secs);
        if session.wait_for(panel, timeout).await? == Lookup::NotFound {
            tracing::warn!(site = ctx.name, category_url, index, "tab panel did not appear, skipping tab");
            return Ok(None);
        }
    }

    session.content().await.map(Some)
}

/// Clicks away interstitials. Missing popups are the normal case.
async fn dismiss_popups<S: RenderSession>(session: &mut S, selectors: &[String]) {
    for selector in selectors {
        match session.click(selector, 0).await {
            Ok(Lookup::Found) => tracing::debug!(selector = %selector, "popup dismissed"),
            Ok(_) => tracing::debug!(selector = %selector, "popup not present"),
            Err(e) => tracing::debug!(selector = %selector, error = %e, "popup dismissal failed"),
        }
    }
}
