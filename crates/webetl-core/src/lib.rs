mod app_config;
pub mod categories;
mod config;
pub mod pipeline_config;
pub mod products;
pub mod sites;

pub use app_config::AppConfig;
pub use categories::{
    default_beverage_categories, default_categories, StandardCategory, OTHERS_CATEGORY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use pipeline_config::{load_pipeline_config, MockDataConfig, PipelineConfig, TransformStep};
pub use products::{join_list, split_list, ProductRecord, SizePrice, UnitPrice};
pub use sites::{
    load_sites, parse_sites, CategorySource, DescriptionSelector, DetailSelectors, LoadingType, MenuConfig,
    PaginationConfig, ProgressiveConfig, SiteConfig, SitesFile, TabsConfig,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[source] serde_yaml::Error),

    #[error("failed to read pipeline config {path}: {source}")]
    PipelineFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    PipelineFileParse(#[source] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
