//! DOM query helpers over `scraper`.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Parses a CSS selector, keeping the selector text in the error.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if `selector` is not valid CSS.
pub fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Compiles a class regex from site config.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if `pattern` is not a valid regex.
pub fn class_regex(pattern: &str) -> Result<Regex, ScraperError> {
    Regex::new(pattern).map_err(|e| ScraperError::Selector {
        selector: pattern.to_owned(),
        reason: e.to_string(),
    })
}

/// An element matches when any of its class tokens, or the whole class
/// attribute, matches `class_re`.
#[must_use]
pub fn class_matches(element: &ElementRef<'_>, class_re: &Regex) -> bool {
    let Some(class_attr) = element.value().attr("class") else {
        return false;
    };
    class_attr.split_whitespace().any(|c| class_re.is_match(c)) || class_re.is_match(class_attr)
}

/// All elements named `tag` whose class matches `class_re`, in document order.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if `tag` is not a valid element name.
pub fn find_by_tag_and_class<'a>(
    root: &'a Html,
    tag: &str,
    class_re: &Regex,
) -> Result<Vec<ElementRef<'a>>, ScraperError> {
    let selector = parse_selector(tag)?;
    Ok(root
        .select(&selector)
        .filter(|el| class_matches(el, class_re))
        .collect())
}

/// Text content with runs of whitespace collapsed and the ends trimmed.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed text of the first match of `selector`, or `None` when nothing
/// matches or the text is empty.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] for an invalid selector.
pub fn first_text(document: &Html, selector: &str) -> Result<Option<String>, ScraperError> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty()))
}

/// Value of the `content` attribute of `<meta property=…>` (or `name=…`).
#[must_use]
pub fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse("meta").ok()?;
    document
        .select(&selector)
        .find(|el| {
            let v = el.value();
            v.attr("property") == Some(property) || v.attr("name") == Some(property)
        })
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_regex_matches_any_token() {
        let doc = Html::parse_document(
            r#"<ul class="nav main-menu"><li class="product type-product">a</li><li class="item">b</li></ul>"#,
        );
        let re = class_regex("^product$").unwrap();
        let found = find_by_tag_and_class(&doc, "li", &re).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(element_text(&found[0]), "a");
    }

    #[test]
    fn class_regex_matches_whole_attribute() {
        let doc = Html::parse_document(r#"<div class="col product-card big">x</div>"#);
        let re = class_regex("product-card big").unwrap();
        assert_eq!(find_by_tag_and_class(&doc, "div", &re).unwrap().len(), 1);
    }

    #[test]
    fn element_without_class_never_matches() {
        let doc = Html::parse_document("<div>x</div>");
        let re = class_regex(".*").unwrap();
        assert!(find_by_tag_and_class(&doc, "div", &re).unwrap().is_empty());
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let doc = Html::parse_document("<h1>\n  Bánh   mì\n <span>que</span> </h1>");
        assert_eq!(first_text(&doc, "h1").unwrap().as_deref(), Some("Bánh mì que"));
    }

    #[test]
    fn first_text_empty_is_none() {
        let doc = Html::parse_document("<h1>   </h1>");
        assert_eq!(first_text(&doc, "h1").unwrap(), None);
        assert_eq!(first_text(&doc, "h2").unwrap(), None);
    }

    #[test]
    fn invalid_selector_reports_text() {
        let err = parse_selector("div[").unwrap_err();
        assert!(err.to_string().contains("div["), "got: {err}");
    }

    #[test]
    fn meta_content_reads_property_or_name() {
        let doc = Html::parse_document(
            r#"<head><meta property="og:title" content=" Tiramisu "><meta name="description" content="Soft"></head>"#,
        );
        assert_eq!(meta_content(&doc, "og:title").as_deref(), Some("Tiramisu"));
        assert_eq!(meta_content(&doc, "description").as_deref(), Some("Soft"));
        assert_eq!(meta_content(&doc, "og:image"), None);
    }
}
