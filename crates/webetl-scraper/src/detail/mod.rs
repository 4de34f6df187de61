//! Product detail page extraction.
//!
//! Every field is independently optional: a selector that matches nothing
//! leaves the field at its default and is only logged at debug level.

mod images;
mod metadata;
mod price;

use scraper::Html;
use webetl_core::{CategorySource, ProductRecord, SiteConfig, UnitPrice};

use crate::client::{path_segments, PageFetcher};
use crate::error::ScraperError;
use crate::html::{element_text, first_text, parse_selector};

pub use images::{clean_image_name, extract_gallery, filename_slug, normalize_image_url, Gallery};
pub use metadata::{embedded_array, read_metadata, MetadataFields};
pub use price::{parse_amount, parse_price};

/// Promotional tag some sites list alongside real categories.
const PROMO_CATEGORY: &str = "featured product";

/// Fetches and parses one detail page.
///
/// Returns `None` when the page cannot be fetched or parsed; the error is
/// logged with the URL and the caller moves on to the next product.
pub async fn extract_detail(
    fetcher: &PageFetcher,
    site_name: &str,
    site: &SiteConfig,
    url: &str,
) -> Option<ProductRecord> {
    let html = match fetcher.fetch_html(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(site = site_name, url, error = %e, "failed to fetch product page");
            return None;
        }
    };

    match parse_detail(&html, url, site_name, site) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!(site = site_name, url, error = %e, "failed to extract product");
            None
        }
    }
}

/// Builds a [`ProductRecord`] from detail-page HTML.
///
/// When both name and price come back empty, Open Graph tags and the
/// configured embedded-data variable are consulted instead.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if a configured selector is invalid.
pub fn parse_detail(
    html: &str,
    url: &str,
    site_name: &str,
    site: &SiteConfig,
) -> Result<ProductRecord, ScraperError> {
    let document = Html::parse_document(html);
    let selectors = &site.product_detail_selectors;
    let mut record = ProductRecord::new(url, site_name, &site.currency);

    if let Some(name_sel) = &selectors.name {
        record.product_name = first_text(&document, name_sel)?.unwrap_or_default();
    }

    if let Some(description) = &selectors.description {
        for candidate in description.candidates() {
            if let Some(text) = first_text(&document, candidate)? {
                record.product_description = text;
                break;
            }
        }
    }

    let mut price = 0;
    if let Some(price_sel) = &selectors.unit_price {
        price = first_text(&document, price_sel)?
            .map(|t| parse_price(&t))
            .unwrap_or_default();
    }

    if let Some(container) = &selectors.image_selector {
        let gallery = extract_gallery(&document, url, container, selectors.detail_image.as_deref())?;
        record.product_image = gallery.urls;
        record.product_image_name = gallery.names;
    }

    if let Some(code_sel) = &selectors.code {
        record.product_code = first_text(&document, code_sel)?.unwrap_or_default();
    }

    if record.product_name.is_empty() && price == 0 {
        tracing::debug!(url, "primary selectors missed, reading page metadata");
        let meta = read_metadata(&document, selectors.embedded_data_variable.as_deref());
        if let Some(name) = meta.name {
            record.product_name = name;
        }
        if let Some(amount) = meta.price {
            price = amount;
        }
        if record.product_image.is_empty() {
            if let Some(image) = meta.image.and_then(|i| normalize_image_url(&i, url)) {
                record.product_image_name = vec![filename_slug(&image)];
                record.product_image = vec![image];
            }
        }
        if record.product_description.is_empty() {
            if let Some(description) = meta.description {
                record.product_description = description;
            }
        }
    }

    record.product_unit_price = UnitPrice::Flat(price);
    record.original_category = categories(&document, url, site)?;
    Ok(record)
}

fn categories(
    document: &Html,
    url: &str,
    site: &SiteConfig,
) -> Result<Vec<String>, ScraperError> {
    let selectors = &site.product_detail_selectors;
    let mut labels: Vec<String> = Vec::new();

    match &selectors.original_category {
        Some(CategorySource::Literal(label)) => {
            if !label.is_empty() {
                labels.push(label.clone());
            }
        }
        Some(CategorySource::Selector(container)) => {
            let container_sel = parse_selector(container)?;
            let tag_sel = parse_selector(selectors.category_tag.as_deref().unwrap_or("a"))?;
            if let Some(container) = document.select(&container_sel).next() {
                for tag in container.select(&tag_sel) {
                    let text = element_text(&tag);
                    if text.is_empty()
                        || text.eq_ignore_ascii_case(PROMO_CATEGORY)
                        || labels.contains(&text)
                    {
                        continue;
                    }
                    labels.push(text);
                }
            } else {
                tracing::debug!(url, selector = %container, "category container not found");
            }
        }
        None => {}
    }

    if labels.is_empty() {
        let segments = path_segments(url);
        if segments.len() >= 2 {
            labels.push(segments[segments.len() - 2].clone());
        }
    }
    Ok(labels)
}

#[cfg(test)]
#[path = "../detail_test.rs"]
mod tests;
