//! Next-link pagination, and single-page listings as the one-page case.

use std::collections::HashSet;

use scraper::Html;
use webetl_core::{LoadingType, ProductRecord, SiteConfig};

use crate::cards::{extract_cards, CardExtraction};
use crate::client::resolve_url;
use crate::error::ScraperError;
use crate::html::parse_selector;

use super::{collect_details, SeenUrls, SiteContext};

/// Cards and the next-page link found on one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub cards: CardExtraction,
    pub next_page: Option<String>,
}

/// Parses one listing page. Card URLs resolve against the site base; the
/// next link resolves against `page_url`.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] for invalid card or next-link selectors.
pub fn parse_listing(html: &str, page_url: &str, site: &SiteConfig) -> Result<ListingPage, ScraperError> {
    let document = Html::parse_document(html);
    let cards = extract_cards(&document, &site.website_path, site)?;

    let next_page = match (&site.loading_type, &site.pagination.next_selector) {
        (LoadingType::Pagination, Some(next_selector)) => {
            let selector = parse_selector(next_selector)?;
            document
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| resolve_url(page_url, href))
        }
        _ => None,
    };

    Ok(ListingPage { cards, next_page })
}

pub(super) async fn enumerate(
    ctx: &SiteContext<'_>,
    category_url: &str,
    seen: &mut SeenUrls,
) -> Vec<ProductRecord> {
    let page_cap = ctx.site.page_cap();
    let mut products = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next = Some(category_url.to_owned());

    while let Some(page_url) = next.take() {
        if visited.len() >= page_cap {
            tracing::info!(site = ctx.name, category_url, page_cap, "page cap reached");
            break;
        }
        if !visited.insert(page_url.clone()) {
            tracing::warn!(site = ctx.name, url = %page_url, "next link points to a visited page");
            break;
        }

        let html = match ctx.fetcher.fetch_html(&page_url).await {
            Ok(html) => html,
            Err(e) => {
                if e.is_forbidden() {
                    tracing::warn!(site = ctx.name, url = %page_url, "access forbidden");
                }
                tracing::error!(
                    site = ctx.name,
                    url = %page_url,
                    error = %e,
                    "failed to fetch listing page, keeping products found so far"
                );
                break;
            }
        };

        let listing = match parse_listing(&html, &page_url, ctx.site) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(site = ctx.name, url = %page_url, error = %e, "failed to parse listing page");
                break;
            }
        };

        tracing::debug!(
            site = ctx.name,
            url = %page_url,
            cards = listing.cards.urls.len(),
            "listing page parsed"
        );
        collect_details(ctx, listing.cards.urls, seen, &mut products).await;
        next = listing.next_page;
    }

    products
}
