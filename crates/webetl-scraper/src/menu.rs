//! Category discovery from a site's navigation menu.

use std::collections::HashSet;

use scraper::Html;
use webetl_core::{MenuConfig, SiteConfig};

use crate::client::{resolve_url, url_path, PageFetcher};
use crate::error::ScraperError;
use crate::html::{class_regex, find_by_tag_and_class, parse_selector};

/// Fetches the site's entry page and returns its leaf category URLs.
///
/// Sites without a `menu` block yield an empty list. A fetch failure is
/// logged (403 as access forbidden) and yields whatever was collected, which
/// for a single entry page is nothing.
pub async fn discover_category_urls(
    fetcher: &PageFetcher,
    site_name: &str,
    site: &SiteConfig,
) -> Vec<String> {
    let Some(menu) = &site.menu else {
        tracing::warn!(site = site_name, "no menu configured, skipping category discovery");
        return Vec::new();
    };

    let html = match fetcher.fetch_html(&site.website_path).await {
        Ok(html) => html,
        Err(e) => {
            if e.is_forbidden() {
                tracing::warn!(site = site_name, url = %site.website_path, "access forbidden");
            }
            tracing::error!(
                site = site_name,
                url = %site.website_path,
                error = %e,
                "failed to fetch menu page"
            );
            return Vec::new();
        }
    };

    match collect_menu_urls(&html, &site.website_path, menu) {
        Ok(urls) => {
            let leaves = retain_leaf_categories(urls);
            tracing::info!(site = site_name, count = leaves.len(), "discovered category URLs");
            leaves
        }
        Err(e) => {
            tracing::error!(site = site_name, error = %e, "failed to parse menu page");
            Vec::new()
        }
    }
}

/// Collects menu anchor URLs from `html` in document order, deduplicated.
///
/// A same-page `#` href falls back to the anchor's `data-url` attribute.
/// Relative URLs are resolved against `entry_url`.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if the menu tag or class regex is invalid.
pub fn collect_menu_urls(
    html: &str,
    entry_url: &str,
    menu: &MenuConfig,
) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(html);
    let class_re = class_regex(&menu.menu_selector)?;
    let anchors = parse_selector("a[href]")?;
    let keyword = menu.keyword();

    let containers = find_by_tag_and_class(&document, &menu.tag_name, &class_re)?;
    tracing::debug!(containers = containers.len(), "menu containers located");

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for container in containers {
        for anchor in container.select(&anchors) {
            let Some(mut href) = anchor.value().attr("href").map(str::trim) else {
                continue;
            };
            if href.starts_with('#') {
                match anchor.value().attr("data-url") {
                    Some(data_url) => href = data_url.trim(),
                    None => continue,
                }
            }
            if let Some(keyword) = keyword {
                if !href.contains(keyword) {
                    continue;
                }
            }
            let Some(url) = resolve_url(entry_url, href) else {
                continue;
            };
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }
    Ok(urls)
}

/// Drops every URL whose path is a strict string prefix of another URL's
/// path, keeping only leaf categories. Comparison ignores scheme and host,
/// so `/cake` is dropped next to `/cakes` and `/a` next to `/a/`.
#[must_use]
pub fn retain_leaf_categories(urls: Vec<String>) -> Vec<String> {
    let paths: Vec<String> = urls
        .iter()
        .map(|u| url_path(u).unwrap_or_else(|| u.clone()))
        .collect();

    urls.into_iter()
        .zip(paths.iter())
        .filter(|(_, path)| !paths.iter().any(|other| is_path_parent(path, other)))
        .map(|(url, _)| url)
        .collect()
}

fn is_path_parent(parent: &str, child: &str) -> bool {
    child != parent && child.starts_with(parent)
}
