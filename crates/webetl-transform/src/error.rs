use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Config(#[from] webetl_core::ConfigError),

    #[error("invalid input pattern \"{pattern}\": {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid category rule for '{category}': {reason}")]
    CategoryRule { category: String, reason: String },

    #[error("input path {path} has no file name")]
    NoFileName { path: String },

    #[error("{path} row {row}: {reason}")]
    InvalidRow {
        path: String,
        row: usize,
        reason: String,
    },
}

impl TransformError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        TransformError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        TransformError::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}
