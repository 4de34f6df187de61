//! Category seed file: site name to category URLs, written by menu crawling
//! and read by extraction.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ScraperError;

pub type CategorySeeds = BTreeMap<String, Vec<String>>;

/// Reads a seed file.
///
/// # Errors
///
/// Returns [`ScraperError::SeedsIo`] if the file cannot be read and
/// [`ScraperError::SeedsParse`] if it is not a JSON object of URL lists.
pub fn load_seeds(path: &Path) -> Result<CategorySeeds, ScraperError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ScraperError::SeedsIo {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScraperError::SeedsParse {
        path: path.display().to_string(),
        source,
    })
}

/// Writes `seeds` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`ScraperError::SeedsIo`] on filesystem failures.
pub fn save_seeds(path: &Path, seeds: &CategorySeeds) -> Result<(), ScraperError> {
    let io_err = |source| ScraperError::SeedsIo {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(seeds).map_err(|source| ScraperError::SeedsParse {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_seeds_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/category_urls.json");
        let mut seeds = CategorySeeds::new();
        seeds.insert(
            "breadtalk".to_string(),
            vec!["https://breadtalk.test/c/cakes/".to_string()],
        );

        save_seeds(&path, &seeds).unwrap();
        assert_eq!(load_seeds(&path).unwrap(), seeds);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seeds(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScraperError::SeedsIo { .. }));
    }

    #[test]
    fn non_object_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.json");
        std::fs::write(&path, r#"["https://a.test/"]"#).unwrap();
        let err = load_seeds(&path).unwrap_err();
        assert!(matches!(err, ScraperError::SeedsParse { .. }));
    }
}
