//! Transform pipeline settings loaded from `config/etl_config.yml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::categories::{default_beverage_categories, default_categories, StandardCategory};
use crate::ConfigError;

/// One named transform, applied in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStep {
    StandardizeCategories,
    RemoveDuplicates,
    GenerateMockData,
    #[serde(alias = "separate_tables")]
    SeperateTables,
}

impl std::fmt::Display for TransformStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransformStep::StandardizeCategories => "standardize_categories",
            TransformStep::RemoveDuplicates => "remove_duplicates",
            TransformStep::GenerateMockData => "generate_mock_data",
            TransformStep::SeperateTables => "seperate_tables",
        };
        f.write_str(name)
    }
}

/// Settings for synthesized placeholder fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockDataConfig {
    /// Categories whose products are sold in S/M/L sizes.
    pub variant_categories: Vec<String>,
    /// Price difference between consecutive sizes.
    pub default_price_step: i64,
    /// Per-category overrides of `default_price_step`.
    pub price_steps: BTreeMap<String, i64>,
    /// Zero prices are replaced with a value drawn from `[min, max)`.
    pub zero_price_min: i64,
    pub zero_price_max: i64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for MockDataConfig {
    fn default() -> Self {
        Self {
            variant_categories: [
                "Bingsu",
                "Frosty",
                "Tea",
                "Chocolate & Cacao",
                "Coffee",
                "Chilled & Cold",
                "Cakes",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            default_price_step: 5000,
            price_steps: BTreeMap::from([("Cakes".to_string(), 12000)]),
            zero_price_min: 55_000,
            zero_price_max: 200_000,
            seed: None,
        }
    }
}

impl MockDataConfig {
    #[must_use]
    pub fn price_step(&self, category: &str) -> i64 {
        self.price_steps
            .get(category)
            .copied()
            .unwrap_or(self.default_price_step)
    }

    #[must_use]
    pub fn has_variants(&self, category: &str) -> bool {
        self.variant_categories.iter().any(|c| c == category)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for raw product CSVs.
    pub input_directory: PathBuf,
    /// Staging directory, one output per input file.
    pub output_directory: PathBuf,
    /// Destination of the normalized tables.
    pub final_output_directory: PathBuf,
    pub transforms: Vec<TransformStep>,
    /// Glob matched inside `input_directory`.
    pub file_pattern: String,
    pub category_mapping: Vec<StandardCategory>,
    pub beverage_categories: Vec<String>,
    pub mock_data: MockDataConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_directory: PathBuf::from("data/raw"),
            output_directory: PathBuf::from("data/staging"),
            final_output_directory: PathBuf::from("data/processed"),
            transforms: vec![
                TransformStep::StandardizeCategories,
                TransformStep::RemoveDuplicates,
                TransformStep::GenerateMockData,
            ],
            file_pattern: "*.csv".to_string(),
            category_mapping: default_categories(),
            beverage_categories: default_beverage_categories(),
            mock_data: MockDataConfig::default(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn runs(&self, step: TransformStep) -> bool {
        self.transforms.contains(&step)
    }
}

/// Load the pipeline config. Returns `Ok(None)` when the file does not exist
/// so callers can fall back to [`PipelineConfig::default`].
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<Option<PipelineConfig>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::PipelineFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };
    let config: PipelineConfig =
        serde_yaml::from_str(&content).map_err(ConfigError::PipelineFileParse)?;
    validate_pipeline(&config)?;
    Ok(Some(config))
}

fn validate_pipeline(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.file_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(
            "file_pattern must be non-empty".to_string(),
        ));
    }
    let mock = &config.mock_data;
    if mock.zero_price_min >= mock.zero_price_max {
        return Err(ConfigError::Validation(format!(
            "mock_data zero price range [{}, {}) is empty",
            mock.zero_price_min, mock.zero_price_max
        )));
    }
    for category in &config.category_mapping {
        for keyword in &category.keywords {
            regex::Regex::new(keyword).map_err(|e| {
                ConfigError::Validation(format!(
                    "category '{}' keyword \"{keyword}\": {e}",
                    category.name
                ))
            })?;
        }
    }
    Ok(())
}
