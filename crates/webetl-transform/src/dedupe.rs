use std::collections::HashSet;

use crate::rows::StagedProduct;

/// Drops rows repeating an earlier `(product_name, product_url)` pair and
/// returns how many were removed. Order of the kept rows is unchanged.
pub fn remove_duplicates(rows: &mut Vec<StagedProduct>) -> usize {
    let before = rows.len();
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(before);
    rows.retain(|row| seen.insert((row.product_name.clone(), row.product_url.clone())));
    let removed = before - rows.len();
    tracing::info!(removed, kept = rows.len(), "duplicate rows removed");
    removed
}
