//! `crawl-menus`: discover leaf category URLs and write the seeds file.

use std::path::Path;

use webetl_core::{SiteConfig, SitesFile};
use webetl_scraper::{discover_category_urls, load_seeds, save_seeds, CategorySeeds, PageFetcher};

/// Selects the sites to process. An unknown `site_filter` is an error.
pub(crate) fn select_sites<'a>(
    sites: &'a SitesFile,
    site_filter: Option<&str>,
) -> anyhow::Result<Vec<(&'a str, &'a SiteConfig)>> {
    match site_filter {
        Some(name) => {
            let (name, site) = sites
                .websites
                .get_key_value(name)
                .ok_or_else(|| anyhow::anyhow!("site '{name}' not found in sites file"))?;
            Ok(vec![(name.as_str(), site)])
        }
        None => Ok(sites
            .websites
            .iter()
            .map(|(name, site)| (name.as_str(), site))
            .collect()),
    }
}

/// Crawls each selected site's menu and writes the category seeds.
///
/// With a site filter the existing seeds file is updated in place so the
/// other sites keep their entries. A site whose menu yields nothing is still
/// written, with an empty list.
///
/// # Errors
///
/// Returns an error if the sites file cannot be loaded, the filter names an
/// unknown site, or the seeds file cannot be read or written.
pub(crate) async fn run_crawl_menus(
    config: &webetl_core::AppConfig,
    sites_path: &Path,
    out_path: &Path,
    site_filter: Option<&str>,
) -> anyhow::Result<CategorySeeds> {
    let sites = webetl_core::load_sites(sites_path)?;
    let selected = select_sites(&sites, site_filter)?;

    let mut seeds = if site_filter.is_some() && out_path.exists() {
        load_seeds(out_path)?
    } else {
        CategorySeeds::new()
    };

    for (name, site) in selected {
        let user_agent = sites.user_agent_for(site, &config.user_agent);
        let fetcher = PageFetcher::new(config.request_timeout_secs, user_agent)
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client for {name}: {e}"))?;

        tracing::info!(site = name, url = %site.website_path, "crawling menu");
        let urls = discover_category_urls(&fetcher, name, site).await;
        seeds.insert(name.to_string(), urls);
    }

    save_seeds(out_path, &seeds)?;
    tracing::info!(path = %out_path.display(), sites = seeds.len(), "category seeds written");
    Ok(seeds)
}
