//! Per-site scraping descriptors loaded from `config/sites.yaml`.
//!
//! One [`SiteConfig`] drives every behavioral difference between target
//! sites: which traversal strategy to run, where product cards live, how
//! detail fields are located. Sites never get their own code paths.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Prefix marking a category "selector" as a literal label instead.
pub const LITERAL_CATEGORY_PREFIX: &str = "literal:";

const DEFAULT_CURRENCY: &str = "VND";
const DEFAULT_MAX_PAGES: usize = 20;

/// Client-side technique a listing page uses to reveal its products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingType {
    Pagination,
    #[serde(alias = "single_page")]
    SinglePage,
    Progressive,
    #[serde(alias = "tab_based")]
    TabBased,
}

impl LoadingType {
    /// Whether this strategy needs a scriptable browser session.
    #[must_use]
    pub fn requires_rendering(self) -> bool {
        matches!(self, LoadingType::Progressive | LoadingType::TabBased)
    }
}

impl std::fmt::Display for LoadingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadingType::Pagination => write!(f, "pagination"),
            LoadingType::SinglePage => write!(f, "single-page"),
            LoadingType::Progressive => write!(f, "progressive"),
            LoadingType::TabBased => write!(f, "tab-based"),
        }
    }
}

/// Navigation menu location used by the category crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    pub tag_name: String,
    /// Class regex matched against the menu container's classes.
    pub menu_selector: String,
    /// Substring a category URL must contain. The literal `"None"` disables
    /// filtering, matching how existing config files spell "no filter".
    #[serde(default, alias = "filter-keyword")]
    pub filter_keyword: Option<String>,
}

impl MenuConfig {
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.filter_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != "None")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default)]
    pub next_selector: Option<String>,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            next_selector: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// Tuning for the "load more" loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveConfig {
    /// Fixed wait after each successful click.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Intercepted clicks tolerated before giving up on loading more.
    #[serde(default = "default_max_click_retries")]
    pub max_click_retries: u32,
    /// Upper bound on successful clicks, guarding against endless feeds.
    #[serde(default = "default_max_loads")]
    pub max_loads: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ProgressiveConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            max_click_retries: default_max_click_retries(),
            max_loads: default_max_loads(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_max_click_retries() -> u32 {
    5
}

fn default_max_loads() -> u32 {
    50
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabsConfig {
    /// Product container awaited after switching tabs.
    #[serde(default)]
    pub panel_selector: Option<String>,
    /// Cookie banners and promotional overlays, clicked away once per session.
    #[serde(default)]
    pub popup_selectors: Vec<String>,
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            panel_selector: None,
            popup_selectors: Vec::new(),
            wait_timeout_secs: default_wait_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_wait_timeout_secs() -> u64 {
    10
}

/// Either one description selector or an ordered list of fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionSelector {
    Single(String),
    Fallbacks(Vec<String>),
}

impl DescriptionSelector {
    /// Selectors in the order they should be tried.
    #[must_use]
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            DescriptionSelector::Single(s) => vec![s.as_str()],
            DescriptionSelector::Fallbacks(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// Where a product's raw category labels come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategorySource {
    /// Fixed label written in the config (`literal:<label>`).
    Literal(String),
    /// CSS selector of the container holding category tags.
    Selector(String),
}

impl From<String> for CategorySource {
    fn from(raw: String) -> Self {
        match raw.strip_prefix(LITERAL_CATEGORY_PREFIX) {
            Some(label) => CategorySource::Literal(label.trim().to_string()),
            None => CategorySource::Selector(raw),
        }
    }
}

impl From<CategorySource> for String {
    fn from(source: CategorySource) -> Self {
        match source {
            CategorySource::Literal(label) => format!("{LITERAL_CATEGORY_PREFIX}{label}"),
            CategorySource::Selector(selector) => selector,
        }
    }
}

/// Detail-page selectors. Every field is optional; a missing selector means
/// the field keeps its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub name: Option<String>,
    pub description: Option<DescriptionSelector>,
    pub unit_price: Option<String>,
    /// Container holding the product gallery.
    pub image_selector: Option<String>,
    /// Repeated image element inside [`Self::image_selector`].
    pub detail_image: Option<String>,
    pub original_category: Option<CategorySource>,
    /// Tag elements inside the category container.
    pub category_tag: Option<String>,
    pub code: Option<String>,
    /// JS variable assigned an array literal that carries a description.
    pub embedded_data_variable: Option<String>,
}

/// Immutable per-site descriptor. Loaded once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub website_path: String,
    pub loading_type: LoadingType,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub menu: Option<MenuConfig>,
    pub product_tag: String,
    /// Class regex matched against product card classes.
    pub product_selector: String,
    #[serde(default)]
    pub skip_url_patterns: Vec<String>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// "Load more" control for progressive sites.
    #[serde(default)]
    pub button_selector: Option<String>,
    #[serde(default)]
    pub progressive: ProgressiveConfig,
    /// Tab controls for tab-based sites.
    #[serde(default)]
    pub subcategory_selector: Option<String>,
    #[serde(default)]
    pub tabs: TabsConfig,
    #[serde(default)]
    pub product_detail_selectors: DetailSelectors,
    /// Treat a repeated detail URL as a duplicate even when the product
    /// name differs.
    #[serde(default)]
    pub dedup_by_url_only: bool,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl SiteConfig {
    /// Maximum number of listing pages to visit for one category.
    #[must_use]
    pub fn page_cap(&self) -> usize {
        match self.loading_type {
            LoadingType::SinglePage => 1,
            _ => self.pagination.max_pages.max(1),
        }
    }

    /// Returns `true` when `url` contains any configured skip pattern.
    #[must_use]
    pub fn is_skipped_url(&self, url: &str) -> bool {
        self.skip_url_patterns
            .iter()
            .any(|p| !p.is_empty() && url.contains(p.as_str()))
    }
}

/// Top-level shape of `config/sites.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SitesFile {
    /// Default User-Agent for sites without their own override.
    #[serde(default)]
    pub user_agent: Option<String>,
    pub websites: BTreeMap<String, SiteConfig>,
}

impl SitesFile {
    /// User-Agent for `site`: the site override, then the file default, then
    /// `fallback`.
    #[must_use]
    pub fn user_agent_for<'a>(&'a self, site: &'a SiteConfig, fallback: &'a str) -> &'a str {
        site.user_agent
            .as_deref()
            .or(self.user_agent.as_deref())
            .unwrap_or(fallback)
    }
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sites(&content)
}

/// Parse and validate a sites configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SitesFileParse)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    for (name, site) in &sites_file.websites {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }
        validate_site(name, site)?;
    }
    Ok(())
}

fn validate_site(name: &str, site: &SiteConfig) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Validation(format!("site '{name}': {reason}"));

    if !(site.website_path.starts_with("https://") || site.website_path.starts_with("http://")) {
        return Err(invalid(format!(
            "website_path \"{}\" must be an absolute http(s) URL",
            site.website_path
        )));
    }

    if site.product_tag.trim().is_empty() {
        return Err(invalid("product_tag must be non-empty".to_string()));
    }
    check_regex(&site.product_selector).map_err(|e| invalid(format!("product_selector: {e}")))?;

    if let Some(menu) = &site.menu {
        check_regex(&menu.menu_selector).map_err(|e| invalid(format!("menu_selector: {e}")))?;
    }

    if site
        .product_detail_selectors
        .embedded_data_variable
        .as_deref()
        .is_some_and(|v| v.trim().is_empty())
    {
        return Err(invalid(
            "product_detail_selectors.embedded_data_variable must be non-empty".to_string(),
        ));
    }

    match site.loading_type {
        LoadingType::Pagination => {
            if site.pagination.next_selector.is_none() {
                return Err(invalid(
                    "pagination sites need pagination.next_selector".to_string(),
                ));
            }
            if site.pagination.max_pages == 0 {
                return Err(invalid("pagination.max_pages must be at least 1".to_string()));
            }
        }
        LoadingType::Progressive => {
            if site.button_selector.is_none() {
                return Err(invalid(
                    "progressive sites need a button_selector".to_string(),
                ));
            }
        }
        LoadingType::TabBased => {
            if site.subcategory_selector.is_none() {
                return Err(invalid(
                    "tab-based sites need a subcategory_selector".to_string(),
                ));
            }
        }
        LoadingType::SinglePage => {}
    }

    Ok(())
}

fn check_regex(pattern: &str) -> Result<(), String> {
    if pattern.is_empty() {
        return Err("pattern must be non-empty".to_string());
    }
    Regex::new(pattern).map(|_| ()).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
