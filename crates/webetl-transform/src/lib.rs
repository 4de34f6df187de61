pub mod csv_io;
pub mod dedupe;
pub mod error;
pub mod mock;
pub mod pipeline;
pub mod rows;
pub mod standardize;
pub mod tables;

pub use dedupe::remove_duplicates;
pub use error::TransformError;
pub use mock::generate_mock_data;
pub use pipeline::{FileOutcome, FileStatus, RunReport, TransformPipeline};
pub use rows::StagedProduct;
pub use standardize::Standardizer;
pub use tables::{TableAccumulator, TableFiles};
