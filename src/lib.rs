pub mod backend;
pub mod comparator;
pub mod config;
pub mod error;
pub mod metadata;
pub mod processor;
pub mod report;
pub mod shutter;
pub mod tags;
pub mod walker;

pub use backend::{ExifTool, MetadataBackend};
pub use comparator::{compare, compare_files};
pub use config::AppConfig;
pub use error::AppError;
pub use metadata::{ComparisonResult, FileAnalysis, RawMetadata, Verdict};
pub use processor::Analyzer;
