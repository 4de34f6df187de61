//! Per-site extraction: every seeded category through the site's traversal
//! strategy, then a final duplicate sweep.

use std::collections::HashSet;

use webetl_core::ProductRecord;

use crate::render::SessionLauncher;
use crate::traversal::{enumerate_products, SeenUrls, SiteContext};

/// Extracts products for every category URL of one site, in seed order.
///
/// Detail URLs are fetched at most once per category, or once per site run
/// when the site sets `dedup_by_url_only`. Failures inside a category are
/// logged by the strategy and never abort the remaining categories.
pub async fn extract_site<L: SessionLauncher>(
    ctx: &SiteContext<'_>,
    launcher: &L,
    category_urls: &[String],
) -> Vec<ProductRecord> {
    let url_only = ctx.site.dedup_by_url_only;
    let mut shared_seen = SeenUrls::default();
    let mut products = Vec::new();

    for (position, category_url) in category_urls.iter().enumerate() {
        tracing::info!(
            site = ctx.name,
            category_url = %category_url,
            category = position + 1,
            of = category_urls.len(),
            "extracting category"
        );

        let mut category_seen = SeenUrls::default();
        let seen = if url_only { &mut shared_seen } else { &mut category_seen };
        let found = enumerate_products(ctx, launcher, category_url, seen).await;
        if found.is_empty() {
            tracing::warn!(site = ctx.name, category_url = %category_url, "no products extracted");
        }
        products.extend(found);
    }

    let before = products.len();
    let products = dedup_records(products, url_only);
    tracing::info!(
        site = ctx.name,
        products = products.len(),
        duplicates = before - products.len(),
        "site extraction finished"
    );
    products
}

/// Keeps the first record per `(product_name, product_url)`, or per URL when
/// `url_only` is set. Order is preserved.
#[must_use]
pub fn dedup_records(records: Vec<ProductRecord>, url_only: bool) -> Vec<ProductRecord> {
    let mut keys: HashSet<(String, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let (name, url) = record.identity();
            let name = if url_only { "" } else { name };
            keys.insert((name.to_owned(), url.to_owned()))
        })
        .collect()
}
