//! Open Graph and embedded-data fallbacks for pages whose selectors miss.

use scraper::Html;
use serde_json::Value;

use crate::html::{meta_content, parse_selector};

use super::price::parse_amount;

const DESCRIPTION_KEYS: [&str; 4] = ["description", "product_description", "short_description", "desc"];

/// Fields recovered from page metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFields {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Reads `og:title`, `og:price:amount` (or `product:price:amount`),
/// `og:image` and a description. The description comes from the array
/// literal assigned to `embedded_variable` when configured, else from
/// `og:description`.
#[must_use]
pub fn read_metadata(document: &Html, embedded_variable: Option<&str>) -> MetadataFields {
    let price = meta_content(document, "og:price:amount")
        .or_else(|| meta_content(document, "product:price:amount"))
        .map(|amount| parse_amount(&amount))
        .filter(|p| *p > 0);

    let description = embedded_variable
        .and_then(|var| embedded_description(document, var))
        .or_else(|| meta_content(document, "og:description"));

    MetadataFields {
        name: meta_content(document, "og:title"),
        price,
        image: meta_content(document, "og:image"),
        description,
    }
}

/// Finds `<variable> = [ ... ]` in an inline script and returns the first
/// description-like string field of the array's objects.
#[must_use]
pub fn embedded_description(document: &Html, variable: &str) -> Option<String> {
    let scripts = parse_selector("script").ok()?;
    document.select(&scripts).find_map(|script| {
        let source: String = script.text().collect();
        let array = embedded_array(&source, variable)?;
        first_description(&array)
    })
}

/// Parses the JSON array literal assigned to `variable` in `source`.
/// Single-quoted literals are retried with double quotes. An empty
/// `variable` matches nothing.
#[must_use]
pub fn embedded_array(source: &str, variable: &str) -> Option<Value> {
    if variable.is_empty() {
        return None;
    }
    let mut offset = 0;
    while let Some(found) = source[offset..].find(variable) {
        let after = offset + found + variable.len();
        offset = after;

        let rest = source[after..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if !rest.starts_with('[') {
            continue;
        }
        if let Some(value) = first_json_value(rest) {
            return Some(value);
        }
        if let Some(value) = first_json_value(&rest.replace('\'', "\"")) {
            return Some(value);
        }
    }
    None
}

fn first_json_value(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()
        .and_then(Result::ok)
}

fn first_description(array: &Value) -> Option<String> {
    array.as_array()?.iter().find_map(|item| {
        DESCRIPTION_KEYS.iter().find_map(|key| {
            item.get(key)
                .and_then(Value::as_str)
                .map(strip_markup)
                .filter(|d| !d.is_empty())
        })
    })
}

fn strip_markup(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
