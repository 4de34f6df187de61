use crate::app_config::AppConfig;
use crate::ConfigError;

/// Browser-like default so storefronts serve the same markup they serve to
/// shoppers.
pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("WEBETL_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("WEBETL_SITES_PATH", "config/sites.yaml"));
    let seeds_path = PathBuf::from(or_default(
        "WEBETL_SEEDS_PATH",
        "data/seeds/category_urls.json",
    ));
    let raw_dir = PathBuf::from(or_default("WEBETL_RAW_DIR", "data/raw"));
    let pipeline_config_path = PathBuf::from(or_default(
        "WEBETL_PIPELINE_CONFIG",
        "config/etl_config.yml",
    ));

    let request_timeout_secs = parse_u64("WEBETL_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WEBETL_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("WEBETL_USER_AGENT", DEFAULT_USER_AGENT);

    // An empty webhook variable is treated the same as an unset one.
    let discord_webhook_url = lookup("DISCORD_WEBHOOK_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        log_level,
        sites_path,
        seeds_path,
        raw_dir,
        pipeline_config_path,
        request_timeout_secs,
        user_agent,
        discord_webhook_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
