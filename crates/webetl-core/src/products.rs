use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Delimiter joining list-valued fields inside a single CSV cell.
pub const LIST_DELIMITER: char = '|';

/// Size label used when a flat price is written in the normalized JSON form.
pub const STANDARD_SIZE: &str = "Standard";

/// `product_total_orders` when the page or file gives none.
pub const DEFAULT_TOTAL_ORDERS: u32 = 10;

/// `product_stock_quantity` when the page or file gives none.
pub const DEFAULT_STOCK_QUANTITY: u32 = 50;

/// A product extracted from a detail page.
///
/// Identity is the `(product_name, product_url)` pair. List fields are
/// written to CSV as `|`-joined cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub product_name: String,
    pub product_url: String,
    pub website_name: String,
    #[serde(with = "pipe_list")]
    pub original_category: Vec<String>,
    #[serde(with = "pipe_list")]
    pub product_image: Vec<String>,
    /// Parallel to `product_image`, or empty.
    #[serde(with = "pipe_list")]
    pub product_image_name: Vec<String>,
    pub product_code: String,
    pub product_description: String,
    pub product_unit_price: UnitPrice,
    pub product_currency: String,
    pub product_discount_percentage: f64,
    pub product_total_orders: u32,
    pub product_stock_quantity: u32,
    pub product_total_ratings: u32,
    pub product_overall_stars: f64,
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            product_url: String::new(),
            website_name: String::new(),
            original_category: Vec::new(),
            product_image: Vec::new(),
            product_image_name: Vec::new(),
            product_code: String::new(),
            product_description: String::new(),
            product_unit_price: UnitPrice::default(),
            product_currency: "VND".to_string(),
            product_discount_percentage: 0.0,
            product_total_orders: DEFAULT_TOTAL_ORDERS,
            product_stock_quantity: DEFAULT_STOCK_QUANTITY,
            product_total_ratings: 0,
            product_overall_stars: 0.0,
        }
    }
}

impl ProductRecord {
    /// Empty record for `url` scraped from `website_name`.
    #[must_use]
    pub fn new(product_url: &str, website_name: &str, currency: &str) -> Self {
        Self {
            product_url: product_url.to_string(),
            website_name: website_name.to_string(),
            product_currency: currency.to_string(),
            ..Self::default()
        }
    }

    /// The deduplication key: `(product_name, product_url)`.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.product_name, &self.product_url)
    }
}

/// Variant pricing: parallel size labels and prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizePrice {
    pub sizes: Vec<String>,
    pub prices: Vec<i64>,
}

/// A product's price in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitPrice {
    Flat(i64),
    Sized(SizePrice),
}

impl Default for UnitPrice {
    fn default() -> Self {
        UnitPrice::Flat(0)
    }
}

#[derive(Serialize, Deserialize)]
struct SizePriceJson {
    product_sizes: String,
    product_prices: serde_json::Value,
}

impl UnitPrice {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, UnitPrice::Flat(0))
    }

    /// CSV cell form: the bare integer for flat prices, a JSON object for
    /// sized ones.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            UnitPrice::Flat(price) => price.to_string(),
            UnitPrice::Sized(_) => self.to_json(),
        }
    }

    /// Normalized JSON form consumed downstream. Flat prices become a single
    /// `Standard` size.
    #[must_use]
    pub fn to_json(&self) -> String {
        let body = match self {
            UnitPrice::Flat(price) => SizePriceJson {
                product_sizes: STANDARD_SIZE.to_string(),
                product_prices: serde_json::Value::from(*price),
            },
            UnitPrice::Sized(sized) => SizePriceJson {
                product_sizes: join_list(&sized.sizes),
                product_prices: serde_json::Value::from(
                    sized
                        .prices
                        .iter()
                        .map(i64::to_string)
                        .collect::<Vec<_>>()
                        .join("|"),
                ),
            },
        };
        serde_json::to_string(&body).unwrap_or_default()
    }

    /// Parse a CSV cell. Empty cells are a zero flat price. JSON written with
    /// single quotes is accepted.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the cell is neither a number
    /// nor a size/price object.
    pub fn parse_cell(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(UnitPrice::Flat(0));
        }
        if let Ok(price) = raw.parse::<i64>() {
            return Ok(UnitPrice::Flat(price));
        }
        if let Ok(price) = raw.parse::<f64>() {
            if price.is_finite() {
                #[allow(clippy::cast_possible_truncation)]
                let whole = price.trunc() as i64;
                return Ok(UnitPrice::Flat(whole));
            }
        }
        if raw.starts_with('{') {
            let json: SizePriceJson = serde_json::from_str(&raw.replace('\'', "\""))
                .map_err(|e| format!("invalid size/price object: {e}"))?;
            return Self::from_json(json);
        }
        Err(format!("unrecognized price \"{raw}\""))
    }

    fn from_json(json: SizePriceJson) -> Result<Self, String> {
        let sizes = split_list(&json.product_sizes);
        let prices: Vec<i64> = match &json.product_prices {
            serde_json::Value::Number(n) => vec![n
                .as_i64()
                .ok_or_else(|| format!("price {n} is not an integer"))?],
            serde_json::Value::String(s) => split_list(s)
                .iter()
                .map(|p| p.trim().parse::<i64>().map_err(|e| format!("price \"{p}\": {e}")))
                .collect::<Result<_, _>>()?,
            other => return Err(format!("unsupported product_prices value {other}")),
        };
        if sizes.len() != prices.len() {
            return Err(format!(
                "{} sizes but {} prices",
                sizes.len(),
                prices.len()
            ));
        }
        if sizes.len() == 1 && sizes[0] == STANDARD_SIZE {
            return Ok(UnitPrice::Flat(prices[0]));
        }
        Ok(UnitPrice::Sized(SizePrice { sizes, prices }))
    }
}

impl Serialize for UnitPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cell())
    }
}

impl<'de> Deserialize<'de> for UnitPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        UnitPrice::parse_cell(&raw).map_err(D::Error::custom)
    }
}

/// Join list items into one cell.
#[must_use]
pub fn join_list(items: &[String]) -> String {
    items.join("|")
}

/// Split a `|`-joined cell. An empty cell is an empty list.
#[must_use]
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split(LIST_DELIMITER).map(str::to_string).collect()
}

/// Serde adapter storing `Vec<String>` as a `|`-joined string.
pub mod pipe_list {
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::join_list(items))
    }

    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let cell = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(super::split_list(&cell))
    }
}
