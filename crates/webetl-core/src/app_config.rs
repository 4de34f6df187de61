use std::path::PathBuf;

/// Process-level settings read from the environment.
///
/// Per-site scraping behavior lives in the sites YAML file and transform
/// behavior in the pipeline YAML file; this only carries paths, HTTP
/// defaults, and alerting.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sites_path: PathBuf,
    pub seeds_path: PathBuf,
    pub raw_dir: PathBuf,
    pub pipeline_config_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub discord_webhook_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field("seeds_path", &self.seeds_path)
            .field("raw_dir", &self.raw_dir)
            .field("pipeline_config_path", &self.pipeline_config_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "discord_webhook_url",
                &self.discord_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
