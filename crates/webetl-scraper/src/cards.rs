//! Product card extraction from listing pages.

use scraper::Html;
use webetl_core::SiteConfig;

use crate::client::resolve_url;
use crate::error::ScraperError;
use crate::html::{class_regex, find_by_tag_and_class, parse_selector};

/// Detail URLs found on one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardExtraction {
    /// Resolved detail URLs in DOM order.
    pub urls: Vec<String>,
    /// Cards dropped for a missing URL or a skip pattern.
    pub skipped: usize,
}

/// Locates product cards by `product_tag` + `product_selector` and resolves
/// each card's detail URL.
///
/// The URL comes from the card's own `href`, else the first descendant
/// anchor. Cards without a URL, or whose URL contains a skip pattern, are
/// counted in [`CardExtraction::skipped`].
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if the card tag or class regex is invalid.
pub fn extract_cards(
    document: &Html,
    base_url: &str,
    site: &SiteConfig,
) -> Result<CardExtraction, ScraperError> {
    let class_re = class_regex(&site.product_selector)?;
    let anchors = parse_selector("a[href]")?;
    let cards = find_by_tag_and_class(document, &site.product_tag, &class_re)?;

    let mut extraction = CardExtraction::default();
    for card in cards {
        let href = card
            .value()
            .attr("href")
            .or_else(|| card.select(&anchors).next().and_then(|a| a.value().attr("href")));

        let Some(url) = href.and_then(|h| resolve_url(base_url, h)) else {
            tracing::debug!(base_url, "product card has no resolvable URL, skipping");
            extraction.skipped += 1;
            continue;
        };

        if site.is_skipped_url(&url) {
            tracing::debug!(url = %url, "product card matches a skip pattern");
            extraction.skipped += 1;
            continue;
        }

        extraction.urls.push(url);
    }

    if extraction.skipped > 0 {
        tracing::info!(
            base_url,
            found = extraction.urls.len(),
            skipped = extraction.skipped,
            "skipped product cards"
        );
    }
    Ok(extraction)
}
