//! Splits staged products into the normalized category, product and image
//! tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use webetl_core::{UnitPrice, OTHERS_CATEGORY};

use crate::csv_io::write_table;
use crate::error::TransformError;
use crate::rows::StagedProduct;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zero prices reaching the tables are replaced with `[80, 220) x 1000`.
const PLACEHOLDER_PRICE_THOUSANDS: std::ops::Range<i64> = 80..220;

const IMAGE_TYPE_PRODUCT: u8 = 1;

pub const CATEGORY_COLUMNS: [&str; 7] = [
    "category_id",
    "category_name",
    "category_background_url",
    "category_type",
    "category_description",
    "created_at",
    "updated_at",
];

pub const PRODUCT_COLUMNS: [&str; 14] = [
    "product_id",
    "category_id",
    "product_code",
    "product_name",
    "product_description",
    "product_brand",
    "product_discount_percentage",
    "product_unit_price",
    "product_total_orders",
    "product_total_ratings",
    "product_overall_stars",
    "product_stock_quantity",
    "created_at",
    "updated_at",
];

pub const IMAGE_COLUMNS: [&str; 7] = [
    "product_image_id",
    "product_id",
    "product_image",
    "product_image_name",
    "product_image_type",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category_id: usize,
    pub category_name: String,
    pub category_background_url: String,
    /// 1 for beverages, 0 for food.
    pub category_type: u8,
    pub category_description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub product_id: usize,
    pub category_id: usize,
    pub product_code: String,
    pub product_name: String,
    pub product_description: String,
    pub product_brand: String,
    pub product_discount_percentage: f64,
    /// Size/price JSON object.
    pub product_unit_price: String,
    pub product_total_orders: u32,
    pub product_total_ratings: u32,
    pub product_overall_stars: f64,
    pub product_stock_quantity: u32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRow {
    pub product_image_id: usize,
    pub product_id: usize,
    pub product_image: String,
    pub product_image_name: String,
    pub product_image_type: u8,
    pub created_at: String,
    pub updated_at: String,
}

/// Paths of the three written tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    pub categories: PathBuf,
    pub products: PathBuf,
    pub product_images: PathBuf,
}

/// Tables built up over one pipeline run. Ids are sequential from 1 in
/// first-seen order.
#[derive(Debug)]
pub struct TableAccumulator {
    beverage_categories: Vec<String>,
    stamped_at: String,
    category_ids: HashMap<String, usize>,
    categories: Vec<CategoryRow>,
    products: Vec<ProductRow>,
    images: Vec<ImageRow>,
}

impl TableAccumulator {
    /// `stamped_at` fills every `created_at` and `updated_at` cell.
    #[must_use]
    pub fn new(beverage_categories: Vec<String>, stamped_at: String) -> Self {
        Self {
            beverage_categories,
            stamped_at,
            category_ids: HashMap::new(),
            categories: Vec::new(),
            products: Vec::new(),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryRow] {
        &self.categories
    }

    #[must_use]
    pub fn products(&self) -> &[ProductRow] {
        &self.products
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRow] {
        &self.images
    }

    /// Appends one staged file's rows.
    pub fn add<R: Rng + ?Sized>(&mut self, rows: &[StagedProduct], rng: &mut R) {
        for row in rows {
            let category = if row.category_name.trim().is_empty() {
                OTHERS_CATEGORY
            } else {
                row.category_name.as_str()
            };
            let category_id = self.category_id(category);

            let price = match &row.product_unit_price {
                UnitPrice::Flat(0) => {
                    UnitPrice::Flat(rng.random_range(PLACEHOLDER_PRICE_THOUSANDS) * 1000)
                }
                other => other.clone(),
            };

            let product_id = self.products.len() + 1;
            self.products.push(ProductRow {
                product_id,
                category_id,
                product_code: row.product_code.clone(),
                product_name: row.product_name.clone(),
                product_description: row.product_description.clone(),
                product_brand: row.website_name.clone(),
                product_discount_percentage: row.product_discount_percentage,
                product_unit_price: price.to_json(),
                product_total_orders: row.product_total_orders,
                product_total_ratings: row.product_total_ratings,
                product_overall_stars: row.product_overall_stars,
                product_stock_quantity: row.product_stock_quantity,
                created_at: self.stamped_at.clone(),
                updated_at: self.stamped_at.clone(),
            });

            for (position, url) in row.product_image.iter().enumerate() {
                if url.trim().is_empty() {
                    continue;
                }
                let name = row
                    .product_image_name
                    .get(position)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(&row.product_name);
                self.images.push(ImageRow {
                    product_image_id: self.images.len() + 1,
                    product_id,
                    product_image: url.clone(),
                    product_image_name: name.clone(),
                    product_image_type: IMAGE_TYPE_PRODUCT,
                    created_at: self.stamped_at.clone(),
                    updated_at: self.stamped_at.clone(),
                });
            }
        }
    }

    fn category_id(&mut self, name: &str) -> usize {
        if let Some(id) = self.category_ids.get(name) {
            return *id;
        }
        let id = self.categories.len() + 1;
        let beverage = self.beverage_categories.iter().any(|c| c == name);
        self.categories.push(CategoryRow {
            category_id: id,
            category_name: name.to_string(),
            category_background_url: String::new(),
            category_type: u8::from(beverage),
            category_description: String::new(),
            created_at: self.stamped_at.clone(),
            updated_at: self.stamped_at.clone(),
        });
        self.category_ids.insert(name.to_string(), id);
        id
    }

    /// Writes `categories.csv`, `products.csv` and `product_images.csv`
    /// into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if any table cannot be written.
    pub fn write(&self, dir: &Path) -> Result<TableFiles, TransformError> {
        let files = TableFiles {
            categories: dir.join("categories.csv"),
            products: dir.join("products.csv"),
            product_images: dir.join("product_images.csv"),
        };
        write_table(&files.categories, &CATEGORY_COLUMNS, &self.categories)?;
        write_table(&files.products, &PRODUCT_COLUMNS, &self.products)?;
        write_table(&files.product_images, &IMAGE_COLUMNS, &self.images)?;

        tracing::info!(
            categories = self.categories.len(),
            products = self.products.len(),
            images = self.images.len(),
            dir = %dir.display(),
            "tables separated"
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use webetl_core::{default_beverage_categories, SizePrice};

    use super::*;

    const STAMP: &str = "2026-10-19 08:30:00";

    fn staged(name: &str, category: &str, images: &[&str], names: &[&str]) -> StagedProduct {
        StagedProduct {
            product_name: name.to_string(),
            product_url: format!("https://shop.test/{name}"),
            website_name: "abby".to_string(),
            category_name: category.to_string(),
            product_image: images.iter().map(|s| (*s).to_string()).collect(),
            product_image_name: names.iter().map(|s| (*s).to_string()).collect(),
            product_unit_price: UnitPrice::Flat(45_000),
            ..StagedProduct::default()
        }
    }

    fn accumulator() -> TableAccumulator {
        TableAccumulator::new(default_beverage_categories(), STAMP.to_string())
    }

    #[test]
    fn categories_get_sequential_ids_and_type() {
        let mut tables = accumulator();
        let rows = vec![
            staged("Latte", "Coffee", &[], &[]),
            staged("Opera", "Cakes", &[], &[]),
            staged("Mocha", "Coffee", &[], &[]),
            staged("Mystery", "", &[], &[]),
        ];
        tables.add(&rows, &mut StdRng::seed_from_u64(1));

        let categories: Vec<(usize, &str, u8)> = tables
            .categories()
            .iter()
            .map(|c| (c.category_id, c.category_name.as_str(), c.category_type))
            .collect();
        assert_eq!(categories, vec![(1, "Coffee", 1), (2, "Cakes", 0), (3, "Others", 0)]);

        let fks: Vec<usize> = tables.products().iter().map(|p| p.category_id).collect();
        assert_eq!(fks, vec![1, 2, 1, 3]);
        assert_eq!(tables.products()[0].created_at, STAMP);
    }

    #[test]
    fn every_product_row_references_a_category() {
        let mut tables = accumulator();
        let rows: Vec<StagedProduct> = (0..20)
            .map(|i| staged(&format!("p{i}"), ["Cakes", "Tea", "Sets"][i % 3], &[], &[]))
            .collect();
        tables.add(&rows, &mut StdRng::seed_from_u64(2));

        let ids: HashSet<usize> = tables.categories().iter().map(|c| c.category_id).collect();
        assert_eq!(ids, HashSet::from([1, 2, 3]));
        assert_eq!(tables.products().len(), 20);
        assert!(tables.products().iter().all(|p| ids.contains(&p.category_id)));
    }

    #[test]
    fn images_explode_and_pair_by_position() {
        let mut tables = accumulator();
        let rows = vec![
            staged("Opera", "Cakes", &["https://i.test/1.jpg", "https://i.test/2.jpg"], &["front"]),
            staged("Flan", "Chilled & Cold", &["https://i.test/3.jpg"], &["flan"]),
            staged("Bare", "Cakes", &[], &[]),
        ];
        tables.add(&rows, &mut StdRng::seed_from_u64(3));

        let images: Vec<(usize, usize, &str)> = tables
            .images()
            .iter()
            .map(|i| (i.product_image_id, i.product_id, i.product_image_name.as_str()))
            .collect();
        assert_eq!(images, vec![(1, 1, "front"), (2, 1, "Opera"), (3, 2, "flan")]);
        assert!(tables.images().iter().all(|i| i.product_image_type == 1));
    }

    #[test]
    fn prices_serialize_as_json() {
        let mut tables = accumulator();
        let mut sized = staged("Latte", "Coffee", &[], &[]);
        sized.product_unit_price = UnitPrice::Sized(SizePrice {
            sizes: vec!["S".into(), "M".into()],
            prices: vec![45_000, 50_000],
        });
        let mut zero = staged("Free", "Cakes", &[], &[]);
        zero.product_unit_price = UnitPrice::Flat(0);
        let rows = vec![staged("Opera", "Cakes", &[], &[]), sized, zero];
        tables.add(&rows, &mut StdRng::seed_from_u64(4));

        let products = tables.products();
        assert_eq!(
            products[0].product_unit_price,
            r#"{"product_sizes":"Standard","product_prices":45000}"#
        );
        assert_eq!(
            products[1].product_unit_price,
            r#"{"product_sizes":"S|M","product_prices":"45000|50000"}"#
        );
        let UnitPrice::Flat(placeholder) = UnitPrice::parse_cell(&products[2].product_unit_price).unwrap() else {
            panic!("expected flat placeholder price");
        };
        assert!((80_000..220_000).contains(&placeholder));
        assert_eq!(placeholder % 1000, 0);
    }

    #[test]
    fn writes_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut tables = accumulator();
        tables.add(
            &[staged("Opera", "Cakes", &["https://i.test/1.jpg"], &["front"])],
            &mut StdRng::seed_from_u64(5),
        );
        let files = tables.write(&dir.path().join("processed")).unwrap();

        let categories = std::fs::read_to_string(&files.categories).unwrap();
        assert!(categories.starts_with(&CATEGORY_COLUMNS.join(",")));
        assert_eq!(categories.lines().count(), 2);

        let products = std::fs::read_to_string(&files.products).unwrap();
        assert!(products.starts_with(&PRODUCT_COLUMNS.join(",")));

        let images = std::fs::read_to_string(&files.product_images).unwrap();
        assert!(images.contains("https://i.test/1.jpg,front,1"));
    }
}
