//! Runs the configured transform steps over raw product files.
//!
//! Each input file is processed independently into the staging directory.
//! A failing file is recorded in the run report and the batch moves on.
//! When `seperate_tables` is configured, the staged rows of every successful
//! file are accumulated and written as normalized tables once at the end.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use webetl_core::{load_pipeline_config, PipelineConfig, TransformStep};

use crate::csv_io::{read_products, write_table};
use crate::dedupe::remove_duplicates;
use crate::error::TransformError;
use crate::mock::generate_mock_data;
use crate::rows::STAGED_COLUMNS;
use crate::standardize::Standardizer;
use crate::tables::{TableAccumulator, TableFiles, TIMESTAMP_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Success,
    Error,
}

/// Result of processing one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub message: Option<String>,
}

/// Per-file outcomes of a batch run plus the table files, if written.
#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    pub tables: Option<TableFiles>,
}

impl RunReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Success)
            .count()
    }
}

pub struct TransformPipeline {
    config: PipelineConfig,
    standardizer: Standardizer,
    rng: StdRng,
}

impl TransformPipeline {
    /// Builds a pipeline from `config`. The RNG is seeded from
    /// `mock_data.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CategoryRule`] if the category table does
    /// not compile.
    pub fn new(config: PipelineConfig) -> Result<Self, TransformError> {
        let standardizer = Standardizer::new(&config.category_mapping)?;
        let rng = match config.mock_data.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            standardizer,
            rng,
        })
    }

    /// Loads the config at `path`. A missing file falls back to defaults
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Config`] if the file exists but is invalid.
    pub fn from_config_path(path: &Path) -> Result<Self, TransformError> {
        let config = if let Some(config) = load_pipeline_config(path)? {
            config
        } else {
            tracing::warn!(path = %path.display(), "pipeline config not found, using defaults");
            PipelineConfig::default()
        };
        Self::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Input files matching `file_pattern` inside `input_directory`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Pattern`] if the glob is malformed.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, TransformError> {
        let pattern = self
            .config
            .input_directory
            .join(&self.config.file_pattern)
            .display()
            .to_string();
        let entries = glob::glob(&pattern).map_err(|e| TransformError::Pattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "unreadable input path skipped"),
            }
        }
        files.sort();
        tracing::info!(pattern = %pattern, count = files.len(), "input files found");
        Ok(files)
    }

    /// Processes every input file, then writes the normalized tables if
    /// configured. Never fails as a whole: problems are in the report.
    pub fn run(&mut self) -> RunReport {
        let mut report = RunReport::default();
        let files = match self.input_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(error = %e, "could not list input files");
                return report;
            }
        };

        let mut tables = self.new_tables();
        for input in files {
            let outcome = match self.process_file(&input, tables.as_mut()) {
                Ok(output) => FileOutcome {
                    input,
                    output: Some(output),
                    status: FileStatus::Success,
                    message: None,
                },
                Err(e) => {
                    tracing::error!(input = %input.display(), error = %e, "failed to process file");
                    FileOutcome {
                        input,
                        output: None,
                        status: FileStatus::Error,
                        message: Some(e.to_string()),
                    }
                }
            };
            report.files.push(outcome);
        }

        if let Some(tables) = tables {
            match tables.write(&self.config.final_output_directory) {
                Ok(files) => report.tables = Some(files),
                Err(e) => tracing::error!(error = %e, "failed to write separated tables"),
            }
        }

        tracing::info!(
            "pipeline completed: {}/{} files processed successfully",
            report.succeeded(),
            report.files.len()
        );
        report
    }

    /// Processes a single file, writing the normalized tables for it alone
    /// when configured.
    ///
    /// # Errors
    ///
    /// Returns the first error from reading, transforming or writing.
    pub fn run_file(&mut self, input: &Path) -> Result<PathBuf, TransformError> {
        let mut tables = self.new_tables();
        let output = self.process_file(input, tables.as_mut())?;
        if let Some(tables) = tables {
            tables.write(&self.config.final_output_directory)?;
        }
        Ok(output)
    }

    /// Applies the configured steps to one file and writes its staging copy
    /// under the same file name. Staged rows are added to `tables` when
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the file cannot be read or the staging
    /// file cannot be written.
    pub fn process_file(
        &mut self,
        input: &Path,
        tables: Option<&mut TableAccumulator>,
    ) -> Result<PathBuf, TransformError> {
        tracing::info!(input = %input.display(), "processing file");
        let mut rows = read_products(input)?;

        for step in &self.config.transforms {
            tracing::info!(step = %step, "applying transform");
            match step {
                TransformStep::StandardizeCategories => self.standardizer.apply(&mut rows),
                TransformStep::RemoveDuplicates => {
                    remove_duplicates(&mut rows);
                }
                TransformStep::GenerateMockData => {
                    generate_mock_data(&mut rows, &self.config.mock_data, &mut self.rng);
                }
                // tables are written after all files are staged
                TransformStep::SeperateTables => {}
            }
        }

        let file_name = input.file_name().ok_or_else(|| TransformError::NoFileName {
            path: input.display().to_string(),
        })?;
        let output = self.config.output_directory.join(file_name);
        write_table(&output, &STAGED_COLUMNS, &rows)?;
        tracing::info!(output = %output.display(), rows = rows.len(), "staged file written");

        if let Some(tables) = tables {
            tables.add(&rows, &mut self.rng);
        }
        Ok(output)
    }

    fn new_tables(&self) -> Option<TableAccumulator> {
        self.config.runs(TransformStep::SeperateTables).then(|| {
            TableAccumulator::new(
                self.config.beverage_categories.clone(),
                chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            )
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
