//! CSV reading and writing for pipeline files.

use std::path::Path;

use serde::Serialize;

use crate::error::TransformError;
use crate::rows::StagedProduct;

/// Reads every row of a raw or staged product file.
///
/// # Errors
///
/// Returns [`TransformError::Csv`] if the file cannot be opened and
/// [`TransformError::InvalidRow`] for the first row that does not parse.
pub fn read_products(path: &Path) -> Result<Vec<StagedProduct>, TransformError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| TransformError::csv(path, e))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| TransformError::InvalidRow {
                path: path.display().to_string(),
                row: index + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Writes `rows` under `header`, creating parent directories. An empty table
/// still gets its header row.
///
/// # Errors
///
/// Returns [`TransformError::Io`] or [`TransformError::Csv`] on write failures.
pub fn write_table<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: &[T],
) -> Result<(), TransformError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| TransformError::io(parent, e))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!rows.is_empty())
        .from_path(path)
        .map_err(|e| TransformError::csv(path, e))?;
    if rows.is_empty() {
        writer
            .write_record(header)
            .map_err(|e| TransformError::csv(path, e))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| TransformError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TransformError::io(path, e))
}
