//! `transform`: stage raw product files and build the normalized tables.

use std::path::Path;
use std::process::ExitCode;

use webetl_transform::{FileStatus, TransformPipeline};

/// Runs the pipeline over one file, or over every matching input file.
///
/// A single-file run that fails exits with status 1. A batch run always
/// exits 0; per-file failures are logged and listed in the summary.
///
/// # Errors
///
/// Returns an error if the pipeline config exists but cannot be loaded.
pub(crate) fn run_transform(config_path: &Path, file: Option<&Path>) -> anyhow::Result<ExitCode> {
    let mut pipeline = TransformPipeline::from_config_path(config_path)?;

    if let Some(file) = file {
        return Ok(match pipeline.run_file(file) {
            Ok(output) => {
                tracing::info!(input = %file.display(), output = %output.display(), "file transformed");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(input = %file.display(), error = %e, "transform failed");
                ExitCode::from(1)
            }
        });
    }

    let report = pipeline.run();
    for outcome in report.files.iter().filter(|f| f.status == FileStatus::Error) {
        tracing::warn!(
            input = %outcome.input.display(),
            message = outcome.message.as_deref().unwrap_or_default(),
            "file not transformed"
        );
    }
    if let Some(tables) = &report.tables {
        tracing::info!(
            categories = %tables.categories.display(),
            products = %tables.products.display(),
            product_images = %tables.product_images.display(),
            "normalized tables written"
        );
    }
    Ok(ExitCode::SUCCESS)
}
