//! Listing traversal strategies, selected by the site's `loading_type`.
//!
//! Every strategy turns one category URL into product records, in page
//! order. Detail URLs already in the caller's [`SeenUrls`] are not fetched
//! again, which removes cross-page and cross-tab duplicates.

mod pagination;
mod progressive;
mod tabs;

use std::collections::HashSet;

use scraper::Html;
use webetl_core::{LoadingType, ProductRecord, SiteConfig};

use crate::cards::{extract_cards, CardExtraction};
use crate::client::PageFetcher;
use crate::detail::extract_detail;
use crate::error::ScraperError;
use crate::render::SessionLauncher;

pub use pagination::{parse_listing, ListingPage};

/// Everything a strategy needs to know about the site it is crawling.
#[derive(Clone, Copy)]
pub struct SiteContext<'a> {
    pub name: &'a str,
    pub site: &'a SiteConfig,
    pub fetcher: &'a PageFetcher,
    pub user_agent: &'a str,
}

/// Detail URLs already processed in this run.
#[derive(Debug, Default)]
pub struct SeenUrls(HashSet<String>);

impl SeenUrls {
    /// Records `url`; returns `false` if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        self.0.insert(url.to_owned())
    }
}

/// Runs the strategy for the site's loading type over one category.
///
/// Never fails: fetch, render and parse errors are logged and the products
/// gathered so far are returned.
pub async fn enumerate_products<L: SessionLauncher>(
    ctx: &SiteContext<'_>,
    launcher: &L,
    category_url: &str,
    seen: &mut SeenUrls,
) -> Vec<ProductRecord> {
    match ctx.site.loading_type {
        LoadingType::Pagination | LoadingType::SinglePage => {
            pagination::enumerate(ctx, category_url, seen).await
        }
        LoadingType::Progressive => progressive::enumerate(ctx, launcher, category_url, seen).await,
        LoadingType::TabBased => tabs::enumerate(ctx, launcher, category_url, seen).await,
    }
}

/// Extracts detail pages for `urls` in order, skipping ones already seen.
pub(crate) async fn collect_details(
    ctx: &SiteContext<'_>,
    urls: Vec<String>,
    seen: &mut SeenUrls,
    out: &mut Vec<ProductRecord>,
) {
    for url in urls {
        if !seen.insert(&url) {
            tracing::debug!(site = ctx.name, url = %url, "product already processed");
            continue;
        }
        if let Some(record) = extract_detail(ctx.fetcher, ctx.name, ctx.site, &url).await {
            out.push(record);
        }
    }
}

/// Card URLs from a rendered DOM snapshot, resolved against the site base.
pub(crate) fn cards_from_html(html: &str, site: &SiteConfig) -> Result<CardExtraction, ScraperError> {
    let document = Html::parse_document(html);
    extract_cards(&document, &site.website_path, site)
}
