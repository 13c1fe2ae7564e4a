use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::ConversionReport;

/// The main error type for yolo2gt operations.
///
/// Every variant is fatal for the run. Recoverable per-line problems are
/// [`LabelLineError`](crate::ir::io_yolo::LabelLineError) values and end up
/// in the [`ConversionReport`] instead.
#[derive(Debug, Error)]
pub enum Yolo2GtError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("No class definition found at {path} (expected data.yaml or classes.txt)")]
    ClassMapMissing { path: PathBuf },

    #[error("Failed to parse class definition {path}: {source}")]
    ClassMapParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid classes file {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Invalid dataset layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("No image found for label file {label_path} (looked for {expected_stem}.*)")]
    ImageNotFound {
        label_path: PathBuf,
        expected_stem: PathBuf,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to write manifest to {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[source] serde_json::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Strict check failed with {warning_count} warning(s); manifest not written")]
    StrictCheckFailed {
        warning_count: usize,
        report: Box<ConversionReport>,
    },
}
