//! Synthesized commerce fields the storefronts do not publish.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use rand_distr::{Beta, Distribution, Exp1};
use webetl_core::{MockDataConfig, SizePrice, UnitPrice};

use crate::rows::StagedProduct;

const VARIANT_SIZES: [&str; 3] = ["S", "M", "L"];
const RATINGS_SCALE: f64 = 50.0;
const MAX_ORDERS: u32 = 500;
const DISCOUNT_PROBABILITY: f64 = 0.3;
const DISCOUNT_MIN: u32 = 5;
const DISCOUNT_MAX: u32 = 50;

/// Skewed toward high ratings; scaled onto 1.0-5.0.
static STARS: LazyLock<Beta<f64>> =
    LazyLock::new(|| Beta::new(4.0, 1.5).expect("valid beta parameters"));

/// Fills SKU, ratings, stars, orders and discount on every row, and prices
/// variant categories by size.
///
/// SKUs are numbered per `(website_name, category_name)` in row order.
/// A zero price is first replaced with a random base price from the
/// configured range.
pub fn generate_mock_data<R: Rng + ?Sized>(
    rows: &mut [StagedProduct],
    config: &MockDataConfig,
    rng: &mut R,
) {
    let mut sequences: HashMap<(String, String), u32> = HashMap::new();
    let mut repriced = 0usize;

    for row in rows.iter_mut() {
        let sequence = sequences
            .entry((row.website_name.clone(), row.category_name.clone()))
            .or_insert(0);
        *sequence += 1;
        row.product_code = product_code(&row.website_name, &row.category_name, *sequence);

        row.product_total_ratings = total_ratings(rng);
        row.product_overall_stars = overall_stars(rng);
        row.product_total_orders = rng.random_range(0..MAX_ORDERS);
        row.product_discount_percentage = if rng.random_bool(DISCOUNT_PROBABILITY) {
            f64::from(rng.random_range(DISCOUNT_MIN..DISCOUNT_MAX))
        } else {
            0.0
        };

        if row.product_unit_price.is_zero() {
            repriced += 1;
            row.product_unit_price =
                UnitPrice::Flat(rng.random_range(config.zero_price_min..config.zero_price_max));
        }
        if config.has_variants(&row.category_name) {
            if let UnitPrice::Flat(base) = row.product_unit_price {
                row.product_unit_price = sized_price(base, config.price_step(&row.category_name));
            }
        }
    }

    tracing::info!(rows = rows.len(), repriced, "mock data generated");
}

/// `{brand[..2]}-{category[..2]}-{sequence:03}`, uppercased.
#[must_use]
pub fn product_code(brand: &str, category: &str, sequence: u32) -> String {
    let prefix = |s: &str| s.chars().take(2).collect::<String>().to_uppercase();
    format!("{}-{}-{sequence:03}", prefix(brand), prefix(category))
}

/// S/M/L prices rising by `step` from `base`.
#[must_use]
pub fn sized_price(base: i64, step: i64) -> UnitPrice {
    let mut prices = Vec::with_capacity(VARIANT_SIZES.len());
    let mut price = base;
    for _ in VARIANT_SIZES {
        prices.push(price);
        price = price.saturating_add(step);
    }
    UnitPrice::Sized(SizePrice {
        sizes: VARIANT_SIZES.iter().map(|s| (*s).to_string()).collect(),
        prices,
    })
}

fn total_ratings<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let draw: f64 = Exp1.sample(rng);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ratings = (draw * RATINGS_SCALE).floor().min(f64::from(u32::MAX - 1)) as u32;
    ratings + 1
}

fn overall_stars<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let stars = STARS.sample(rng) * 4.0 + 1.0;
    (stars * 10.0).round() / 10.0
}
