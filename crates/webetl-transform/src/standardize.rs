//! Maps raw category labels onto the standard taxonomy.

use regex::{Regex, RegexBuilder};
use webetl_core::{join_list, StandardCategory, OTHERS_CATEGORY};

use crate::error::TransformError;
use crate::rows::StagedProduct;

/// Compound raw label that always means a seasonal product when it appears
/// inside a multi-valued category field.
const SEASONAL_COMPOUND_LABEL: &str = "bánh tiệc - bánh sinh nhật";
const SEASONAL_CATEGORY: &str = "Season & Specialist";

/// Raw label meaning "other"; never trusted, the product name decides.
const OTHER_LABEL: &str = "khác";

struct Rule {
    name: String,
    synonyms: Vec<String>,
    name_pattern: Option<Regex>,
}

/// Compiled category table.
pub struct Standardizer {
    rules: Vec<Rule>,
}

impl Standardizer {
    /// Compiles one case-insensitive name pattern per category from its
    /// escaped synonyms plus its keyword fragments.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CategoryRule`] if a keyword is not a valid regex.
    pub fn new(table: &[StandardCategory]) -> Result<Self, TransformError> {
        let rules = table
            .iter()
            .map(|category| {
                let alternatives: Vec<String> = category
                    .synonyms
                    .iter()
                    .map(|s| regex::escape(s))
                    .chain(category.keywords.iter().cloned())
                    .collect();
                let name_pattern = if alternatives.is_empty() {
                    None
                } else {
                    let pattern = RegexBuilder::new(&alternatives.join("|"))
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| TransformError::CategoryRule {
                            category: category.name.clone(),
                            reason: e.to_string(),
                        })?;
                    Some(pattern)
                };
                Ok(Rule {
                    name: category.name.clone(),
                    synonyms: category.synonyms.iter().map(|s| s.to_lowercase()).collect(),
                    name_pattern,
                })
            })
            .collect::<Result<_, TransformError>>()?;
        Ok(Self { rules })
    }

    /// Standard category for one product. Total: falls back to
    /// [`OTHERS_CATEGORY`].
    #[must_use]
    pub fn categorize(&self, original_category: &[String], product_name: &str) -> &str {
        let raw = join_list(original_category).trim().to_lowercase();

        if original_category.len() > 1 && raw.contains(SEASONAL_COMPOUND_LABEL) {
            return SEASONAL_CATEGORY;
        }

        if raw != OTHER_LABEL {
            if let Some(rule) = self.rules.iter().find(|r| r.synonyms.contains(&raw)) {
                return &rule.name;
            }
        }

        let name = product_name.trim();
        self.rules
            .iter()
            .find(|r| r.name_pattern.as_ref().is_some_and(|p| p.is_match(name)))
            .map_or(OTHERS_CATEGORY, |r| r.name.as_str())
    }

    /// Sets `category_name` on every row.
    pub fn apply(&self, rows: &mut [StagedProduct]) {
        let mut unmatched = 0usize;
        for row in rows.iter_mut() {
            let category = self.categorize(&row.original_category, &row.product_name);
            if category == OTHERS_CATEGORY {
                unmatched += 1;
                tracing::debug!(product = %row.product_name, raw = ?row.original_category, "no standard category");
            }
            row.category_name = category.to_string();
        }
        tracing::info!(rows = rows.len(), unmatched, "categories standardized");
    }
}
