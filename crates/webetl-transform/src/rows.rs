use std::fmt::Display;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use webetl_core::products::{pipe_list, DEFAULT_STOCK_QUANTITY, DEFAULT_TOTAL_ORDERS};
use webetl_core::{ProductRecord, UnitPrice};

/// One product row as it moves from the raw file to the staging file.
///
/// Reads both shapes: raw files carry `original_category`, staged files carry
/// `category_name` instead. `original_category` is never written back out.
/// Blank numeric cells read as the record defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedProduct {
    pub product_name: String,
    pub product_url: String,
    #[serde(alias = "product_brand")]
    pub website_name: String,
    #[serde(skip_serializing, deserialize_with = "pipe_list::deserialize")]
    pub original_category: Vec<String>,
    pub category_name: String,
    #[serde(with = "pipe_list")]
    pub product_image: Vec<String>,
    #[serde(with = "pipe_list")]
    pub product_image_name: Vec<String>,
    pub product_code: String,
    pub product_description: String,
    pub product_unit_price: UnitPrice,
    pub product_currency: String,
    #[serde(deserialize_with = "zero_if_blank")]
    pub product_discount_percentage: f64,
    #[serde(deserialize_with = "orders_if_blank")]
    pub product_total_orders: u32,
    #[serde(deserialize_with = "stock_if_blank")]
    pub product_stock_quantity: u32,
    #[serde(deserialize_with = "zero_if_blank")]
    pub product_total_ratings: u32,
    #[serde(deserialize_with = "zero_if_blank")]
    pub product_overall_stars: f64,
}

/// Header of a staging file, in field order.
pub const STAGED_COLUMNS: [&str; 15] = [
    "product_name",
    "product_url",
    "website_name",
    "category_name",
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

impl Default for StagedProduct {
    fn default() -> Self {
        ProductRecord::default().into()
    }
}

impl From<ProductRecord> for StagedProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            product_name: record.product_name,
            product_url: record.product_url,
            website_name: record.website_name,
            original_category: record.original_category,
            category_name: String::new(),
            product_image: record.product_image,
            product_image_name: record.product_image_name,
            product_code: record.product_code,
            product_description: record.product_description,
            product_unit_price: record.product_unit_price,
            product_currency: record.product_currency,
            product_discount_percentage: record.product_discount_percentage,
            product_total_orders: record.product_total_orders,
            product_stock_quantity: record.product_stock_quantity,
            product_total_ratings: record.product_total_ratings,
            product_overall_stars: record.product_overall_stars,
        }
    }
}

fn number_or<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let cell = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(fallback);
    }
    cell.parse()
        .map_err(|e| D::Error::custom(format!("number \"{cell}\": {e}")))
}

fn zero_if_blank<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    number_or(deserializer, T::default())
}

fn orders_if_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    number_or(deserializer, DEFAULT_TOTAL_ORDERS)
}

fn stock_if_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    number_or(deserializer, DEFAULT_STOCK_QUANTITY)
}
