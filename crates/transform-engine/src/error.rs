//! Engine and Adapter Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a transform engine
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine session is gone; no further image can be decomposed
    #[error("transform engine unavailable: {0}")]
    Unavailable(String),

    /// The engine refused this particular input
    #[error("transform rejected input: {0}")]
    Rejected(String),
}

impl EngineError {
    /// Whether the error invalidates the session rather than a single image
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Unavailable(_))
    }
}

/// Errors raised while turning an image file into a decomposition
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The source image could not be loaded
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The engine call failed
    #[error(transparent)]
    Transform(#[from] EngineError),
}

impl AdapterError {
    /// Whether the error invalidates the engine session
    pub fn is_fatal(&self) -> bool {
        match self {
            AdapterError::Decode { .. } => false,
            AdapterError::Transform(e) => e.is_fatal(),
        }
    }
}
