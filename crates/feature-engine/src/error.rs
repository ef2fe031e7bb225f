//! Feature Extraction Error Types

use thiserror::Error;

/// Errors during feature extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// The decomposition has no scales
    #[error("decomposition has no scales")]
    EmptyDecomposition,

    /// A scale has no wedges
    #[error("scale {scale} has no wedges")]
    EmptyScale { scale: usize },

    /// A wedge has no coefficients
    #[error("wedge {wedge} of scale {scale} has no coefficients")]
    EmptyWedge { scale: usize, wedge: usize },
}
