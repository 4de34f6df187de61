mod crawl;
mod extract;
mod logging;
mod transform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "webetl")]
#[command(about = "Storefront product extraction and transform pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover leaf category URLs from each site's navigation menu
    CrawlMenus {
        /// Sites file (defaults to `WEBETL_SITES_PATH`)
        #[arg(long)]
        sites: Option<PathBuf>,
        /// Seeds file to write (defaults to `WEBETL_SEEDS_PATH`)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Crawl a single site by name
        #[arg(long)]
        site: Option<String>,
    },
    /// Extract products for every seeded category into raw CSVs
    Extract {
        #[arg(long)]
        sites: Option<PathBuf>,
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Raw CSV directory (defaults to `WEBETL_RAW_DIR`)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        site: Option<String>,
    },
    /// Run the transform pipeline over raw CSVs
    Transform {
        /// Pipeline config (defaults to `WEBETL_PIPELINE_CONFIG`)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Process only this file; exits 1 if it fails
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "browser")]
fn launcher(config: &webetl_core::AppConfig) -> webetl_scraper::ChromeLauncher {
    webetl_scraper::ChromeLauncher::new(true, config.request_timeout_secs)
}

#[cfg(not(feature = "browser"))]
fn launcher(_config: &webetl_core::AppConfig) -> webetl_scraper::NoBrowser {
    webetl_scraper::NoBrowser
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = webetl_core::load_app_config_from_env()?;
    let alerts = logging::init(&config.log_level, config.discord_webhook_url.as_deref())?;

    let code = match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "command failed");
            ExitCode::FAILURE
        }
    };
    alerts.flush().await;
    Ok(code)
}

async fn run(
    command: Option<Commands>,
    config: &webetl_core::AppConfig,
) -> anyhow::Result<ExitCode> {
    match command {
        Some(Commands::CrawlMenus { sites, out, site }) => {
            let sites = sites.unwrap_or_else(|| config.sites_path.clone());
            let out = out.unwrap_or_else(|| config.seeds_path.clone());
            crawl::run_crawl_menus(config, &sites, &out, site.as_deref()).await?;
        }
        Some(Commands::Extract {
            sites,
            seeds,
            out_dir,
            site,
        }) => {
            let sites = sites.unwrap_or_else(|| config.sites_path.clone());
            let seeds = seeds.unwrap_or_else(|| config.seeds_path.clone());
            let out_dir = out_dir.unwrap_or_else(|| config.raw_dir.clone());
            let paths = extract::ExtractPaths {
                sites: &sites,
                seeds: &seeds,
                out_dir: &out_dir,
            };
            extract::run_extract(config, &launcher(config), &paths, site.as_deref()).await?;
        }
        Some(Commands::Transform { config: path, file }) => {
            let path = path.unwrap_or_else(|| config.pipeline_config_path.clone());
            return transform::run_transform(&path, file.as_deref());
        }
        None => println!("webetl: no command given, see --help"),
    }

    Ok(ExitCode::SUCCESS)
}
