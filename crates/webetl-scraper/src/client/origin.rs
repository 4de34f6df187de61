//! URL origin, path and resolution helpers.

use reqwest::Url;

/// Extracts the scheme+host origin from a page URL.
///
/// Given `"https://bakery.test/cakes/page/2"`, returns `"https://bakery.test"`.
/// Used as the `Referer` for every request to the site.
#[must_use]
pub fn site_origin(page_url: &str) -> String {
    Url::parse(page_url).map_or_else(
        |e| {
            tracing::warn!(
                page_url,
                error = %e,
                "could not parse URL, falling back to string split for origin extraction"
            );
            page_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Resolves `href` against `base`. Absolute hrefs are returned unchanged
/// (after parsing); fragments-only and `javascript:` links yield `None`.
#[must_use]
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// The path component of `url`, or `None` if it does not parse.
#[must_use]
pub fn url_path(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.path().to_string())
}

/// Path segments of `url`, with empty segments removed.
#[must_use]
pub fn path_segments(url: &str) -> Vec<String> {
    url_path(url)
        .map(|p| {
            p.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
