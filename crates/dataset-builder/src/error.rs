//! Dataset Builder Error Types

use crate::corpus::Label;
use curvelet_features::FeatureError;
use std::path::PathBuf;
use thiserror::Error;
use transform_engine::{AdapterError, EngineError};

/// Failure of a single image. Logged and skipped unless fatal.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Decoding or decomposition failed
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Feature extraction failed
    #[error("feature extraction failed: {0}")]
    Features(#[from] FeatureError),

    /// Feature count differs from the table's column count
    #[error("feature length mismatch: expected {expected} columns, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl SampleError {
    /// Whether the error ends the run
    pub fn is_fatal(&self) -> bool {
        match self {
            SampleError::Adapter(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Errors that abort a dataset build
#[derive(Debug, Error)]
pub enum BuildError {
    /// A label directory does not exist
    #[error("{label} directory {} does not exist", path.display())]
    MissingLabelDir { label: Label, path: PathBuf },

    /// A label directory has no images
    #[error("{label} directory {} contains no images", path.display())]
    EmptyCorpus { label: Label, path: PathBuf },

    /// Directory enumeration failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transform engine session could not be opened
    #[error("failed to start transform engine: {0}")]
    EngineStart(EngineError),

    /// The engine session went away mid-run
    #[error("transform engine unavailable while processing {file}: {source}")]
    EngineUnavailable {
        file: String,
        #[source]
        source: AdapterError,
    },

    /// A row's feature count differs from the first row's
    #[error("feature length mismatch for {frame}: expected {expected} columns, got {actual}")]
    LengthMismatch {
        frame: String,
        expected: usize,
        actual: usize,
    },

    /// No image produced a row
    #[error("none of the {attempted} images could be processed")]
    NoRows { attempted: usize },

    /// Writing the table failed
    #[error("failed to write dataset to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Writing the summary failed
    #[error("failed to write summary to {}: {source}", path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was cancelled
    #[error("worker task failed: {0}")]
    Worker(String),
}
