//! Raw per-site product CSVs.

use std::path::{Path, PathBuf};

use webetl_core::ProductRecord;

use crate::error::ScraperError;

/// Header of a raw product CSV, in [`ProductRecord`] field order.
pub const RAW_COLUMNS: [&str; 15] = [
    "product_name",
    "product_url",
    "website_name",
    "original_category",
    "product_image",
    "product_image_name",
    "product_code",
    "product_description",
    "product_unit_price",
    "product_currency",
    "product_discount_percentage",
    "product_total_orders",
    "product_stock_quantity",
    "product_total_ratings",
    "product_overall_stars",
];

/// `{raw_dir}/{site}_products.csv`
#[must_use]
pub fn raw_csv_path(raw_dir: &Path, site: &str) -> PathBuf {
    raw_dir.join(format!("{site}_products.csv"))
}

/// Writes `products` to `path`, replacing any previous file. An empty slice
/// still produces the header row.
///
/// # Errors
///
/// Returns [`ScraperError::OutputIo`] if the directory cannot be created and
/// [`ScraperError::Csv`] on write failures.
pub fn write_products_csv(path: &Path, products: &[ProductRecord]) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ScraperError::OutputIo {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(!products.is_empty())
        .from_path(path)?;
    if products.is_empty() {
        writer.write_record(RAW_COLUMNS)?;
    }
    for product in products {
        writer.serialize(product)?;
    }
    writer.flush().map_err(|source| ScraperError::OutputIo {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = products.len(), "raw products written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use webetl_core::{SizePrice, UnitPrice};

    use super::*;

    #[test]
    fn raw_path_follows_site_name() {
        let path = raw_csv_path(Path::new("data/raw"), "breadtalk");
        assert_eq!(path, PathBuf::from("data/raw/breadtalk_products.csv"));
    }

    #[test]
    fn written_rows_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = raw_csv_path(&dir.path().join("raw"), "tousles");
        let mut record = ProductRecord::new("https://t.test/p/opera", "tousles", "VND");
        record.product_name = "Opera".to_string();
        record.original_category = vec!["Cakes".to_string(), "Gifts".to_string()];
        record.product_image = vec!["https://t.test/a.jpg".to_string()];
        record.product_image_name = vec!["a".to_string()];
        record.product_unit_price = UnitPrice::Sized(SizePrice {
            sizes: vec!["S".to_string(), "M".to_string()],
            prices: vec![100_000, 150_000],
        });

        write_products_csv(&path, std::slice::from_ref(&record)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with(&RAW_COLUMNS.join(",")));
        assert!(raw.contains("Cakes|Gifts"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ProductRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec![record]);
    }

    #[test]
    fn empty_site_still_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("givral_products.csv");
        write_products_csv(&path, &[]).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim_end(), RAW_COLUMNS.join(","));
    }
}
