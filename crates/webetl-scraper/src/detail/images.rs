//! Product gallery extraction.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::client::resolve_url;
use crate::error::ScraperError;
use crate::html::parse_selector;

/// Attributes holding an image URL, best first.
const IMAGE_ATTRS: [&str; 5] = [
    "data-large_image",
    "data-large-image",
    "data-zoom-image",
    "data-src",
    "src",
];

const NAME_ATTRS: [&str; 3] = ["alt", "title", "data-caption"];

static BACKGROUND_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*url\(\s*['"]?([^'")]+)['"]?\s*\)"#)
        .expect("valid regex")
});
static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|webp|gif|avif|svg)$").expect("valid regex")
});
static NAME_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[-_](?:scaled|min|thumb|thumbnail|large|medium|small|\d+x\d+))+$")
        .expect("valid regex")
});
static BARE_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9-]+(?:\.[a-z0-9-]+)+/").expect("valid regex")
});

/// Image URLs and their display names, parallel and in gallery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    pub urls: Vec<String>,
    pub names: Vec<String>,
}

impl Gallery {
    fn push(&mut self, url: String, name: String) {
        if !self.urls.contains(&url) {
            self.urls.push(url);
            self.names.push(name);
        }
    }
}

/// Reads images from the first `container` match. Items are located by
/// `item` (default `img`) inside it. When the container yields no image
/// items, its inline `background-image` is used instead.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] for invalid selectors.
pub fn extract_gallery(
    document: &Html,
    page_url: &str,
    container: &str,
    item: Option<&str>,
) -> Result<Gallery, ScraperError> {
    let container_sel = parse_selector(container)?;
    let item_sel = parse_selector(item.unwrap_or("img"))?;
    let img_sel = parse_selector("img")?;

    let mut gallery = Gallery::default();
    let Some(container) = document.select(&container_sel).next() else {
        tracing::debug!(page_url, selector = container, "image container not found");
        return Ok(gallery);
    };

    for element in container.select(&item_sel) {
        let source = image_source(&element)
            .or_else(|| element.select(&img_sel).next().and_then(|img| image_source(&img)));
        let Some((raw, holder)) = source else {
            continue;
        };
        let Some(url) = normalize_image_url(&raw, page_url) else {
            continue;
        };
        let name = display_name(&holder)
            .or_else(|| display_name(&element))
            .unwrap_or_else(|| filename_slug(&url));
        gallery.push(url, name);
    }

    if gallery.urls.is_empty() {
        if let Some(url) = container
            .value()
            .attr("style")
            .and_then(background_image_url)
            .and_then(|raw| normalize_image_url(&raw, page_url))
        {
            let name = filename_slug(&url);
            gallery.push(url, name);
        }
    }

    Ok(gallery)
}

fn image_source<'a>(element: &ElementRef<'a>) -> Option<(String, ElementRef<'a>)> {
    IMAGE_ATTRS.iter().find_map(|attr| {
        element
            .value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.starts_with("data:"))
            .map(|v| (v.to_string(), *element))
    })
}

/// Cleaned `alt`, `title` or `data-caption` text.
fn display_name(element: &ElementRef<'_>) -> Option<String> {
    NAME_ATTRS.iter().find_map(|attr| {
        element
            .value()
            .attr(attr)
            .map(clean_image_name)
            .filter(|n| !n.is_empty())
    })
}

/// Strips a file extension and size/variant suffixes from an image label.
#[must_use]
pub fn clean_image_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_ext = EXTENSION_RE.replace(trimmed, "");
    let without_suffix = NAME_SUFFIX_RE.replace(&without_ext, "");
    without_suffix.trim().to_string()
}

/// Slug of the URL's file name, used when an image has no label.
#[must_use]
pub fn filename_slug(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = clean_image_name(file);
    let mut slug = String::with_capacity(stem.len());
    let mut last_dash = true;
    for c in stem.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Makes an image source absolute: `//host/x` and `host.tld/x` get `https`,
/// relative paths are joined to the page URL.
#[must_use]
pub fn normalize_image_url(raw: &str, page_url: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with("https://") || raw.starts_with("http://") {
        return Some(raw.to_string());
    }
    if BARE_DOMAIN_RE.is_match(raw) {
        return Some(format!("https://{raw}"));
    }
    resolve_url(page_url, raw)
}

fn background_image_url(style: &str) -> Option<String> {
    BACKGROUND_URL_RE
        .captures(style)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}
