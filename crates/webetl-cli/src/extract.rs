//! `extract`: run every seeded site through its traversal strategy and write
//! one raw CSV per site.

use std::path::{Path, PathBuf};

use webetl_scraper::{
    extract_site, load_seeds, raw_csv_path, write_products_csv, PageFetcher, SessionLauncher,
    SiteContext,
};

use crate::crawl::select_sites;

/// Paths an extract run reads from and writes to.
pub(crate) struct ExtractPaths<'a> {
    pub sites: &'a Path,
    pub seeds: &'a Path,
    pub out_dir: &'a Path,
}

/// Extracts products for each seeded site and writes `{site}_products.csv`.
///
/// Sites in the seeds file without a configuration are skipped with a
/// warning. A site that fails to produce its CSV is logged and the run moves
/// on; the written paths are returned.
///
/// # Errors
///
/// Returns an error if the sites or seeds file cannot be loaded, or the
/// filter names an unknown site.
pub(crate) async fn run_extract<L: SessionLauncher>(
    config: &webetl_core::AppConfig,
    launcher: &L,
    paths: &ExtractPaths<'_>,
    site_filter: Option<&str>,
) -> anyhow::Result<Vec<PathBuf>> {
    let sites = webetl_core::load_sites(paths.sites)?;
    let seeds = load_seeds(paths.seeds)?;
    // validates the filter against the sites file
    select_sites(&sites, site_filter)?;

    let mut written = Vec::new();
    for (name, category_urls) in &seeds {
        if site_filter.is_some_and(|filter| filter != name) {
            continue;
        }
        let Some(site) = sites.websites.get(name) else {
            tracing::warn!(site = %name, "site in seeds file has no configuration, skipping");
            continue;
        };
        if site.loading_type.requires_rendering() && !cfg!(feature = "browser") {
            tracing::warn!(
                site = %name,
                loading_type = ?site.loading_type,
                "site needs a browser but this build has none, no products will be found"
            );
        }

        let user_agent = sites.user_agent_for(site, &config.user_agent);
        let fetcher = match PageFetcher::new(config.request_timeout_secs, user_agent) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                tracing::error!(site = %name, error = %e, "failed to build HTTP client");
                continue;
            }
        };
        let ctx = SiteContext {
            name,
            site,
            fetcher: &fetcher,
            user_agent,
        };

        tracing::info!(site = %name, categories = category_urls.len(), "starting extraction");
        let products = extract_site(&ctx, launcher, category_urls).await;

        let out = raw_csv_path(paths.out_dir, name);
        match write_products_csv(&out, &products) {
            Ok(()) => {
                tracing::info!(site = %name, path = %out.display(), rows = products.len(), "raw products written");
                written.push(out);
            }
            Err(e) => tracing::error!(site = %name, error = %e, "failed to write raw products"),
        }
    }

    Ok(written)
}
