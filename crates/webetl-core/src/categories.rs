//! Standard category taxonomy shared by the transform steps.

use serde::{Deserialize, Serialize};

/// Label given to products no rule could place.
pub const OTHERS_CATEGORY: &str = "Others";

/// One standard category with the raw labels and name patterns that map to it.
///
/// `synonyms` are compared against the lowercased raw category field, first
/// verbatim and then as escaped alternatives searched in the product name.
/// `keywords` are extra regex fragments searched only in the product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardCategory {
    pub name: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl StandardCategory {
    fn new(name: &str, synonyms: &[&str], keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| (*s).to_string()).collect(),
            keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Built-in bakery taxonomy, in priority order.
#[must_use]
pub fn default_categories() -> Vec<StandardCategory> {
    vec![
        StandardCategory::new(
            "Cakes",
            &[
                "cakes",
                "dry cakes",
                "cake slices",
                "bánh kem bơ",
                "bánh flan gato",
                "gato cắt miếng/cupcake",
                "bánh ngọt",
                "gato box - cake box",
                "bánh bông lan",
                "bông lan",
            ],
            &[r"\bcake", "gato", "tiramisu"],
        ),
        StandardCategory::new(
            "Breads & Buns",
            &[
                "sandwiches",
                "buns|savory",
                "buns|sweet",
                "sweet|buns",
                "bánh mì",
                "daily storing",
                "bánh tươi",
                "breads",
                "bánh nướng - bánh mì",
            ],
            &[r"\bbread", r"\bbuns?\b", "sandwich", "baguette"],
        ),
        StandardCategory::new(
            "Pastries & Pies",
            &[
                "pastries-and-pies",
                "donuts",
                "bánh nướng",
                "toasts",
                "chocolate",
            ],
            &["croissant", r"\bpies?\b", r"\btarts?\b", "danish", "pain au", "donut", "pastr"],
        ),
        StandardCategory::new(
            "Season & Specialist",
            &[
                "xoài sấy",
                "tết",
                "bánh sinh nhật",
                "trung thu",
                "bánh tiệc - bánh sinh nhật",
            ],
            &["mooncake", "gift box"],
        ),
        StandardCategory::new(
            "Cookies & Biscuits",
            &["cookies", "cookie special", "bánh healthy"],
            &["cookie", "biscuit", "cracker"],
        ),
        StandardCategory::new(
            "Chilled & Cold",
            &[
                "pudding",
                "bánh lạnh",
                "sữa chua",
                "bánh entremet",
                "bánh kem bắp",
                "bánh mousse",
            ],
            &["yogurt", "mousse", r"\bflan\b"],
        ),
        StandardCategory::new(
            "Sets",
            &[
                "set bánh tổng hợp",
                "sets",
                "set bánh",
                "sweetbox",
                "sweetin - bánh hộp thiếc cao cấp",
            ],
            &[r"\bset\b", "combo"],
        ),
    ]
}

/// Categories whose products are drinks rather than baked goods.
#[must_use]
pub fn default_beverage_categories() -> Vec<String> {
    ["Coffee", "Tea", "Chocolate & Cacao", "Frosty"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
