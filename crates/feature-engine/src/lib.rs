//! Curvelet Feature Engine
//!
//! Cross-scale statistical features of a multiscale, multi-orientation
//! decomposition: per-wedge energy, entropy and sharpness, folded into
//! per-scale dispersion, decay and inter-scale correlation, then closed off
//! with decomposition-wide sharpness, symmetry and energy terms.

mod aggregator;
mod error;
mod features;
mod statistics;
mod wedge;

pub use aggregator::{
    decay, truncated_correlation, AggregatedScales, ScaleAggregator, ScaleFeatures, DECAY_EPSILON,
};
pub use error::FeatureError;
pub use features::{
    symmetry_term, top_energy_mean, ExtractorConfig, FeatureAssembler, FeatureExtractor,
    FeatureVector, TOP_ENERGY_COUNT,
};
pub use statistics::StatisticalFeatures;
pub use wedge::{histogram_entropy, laplacian_sharpness, LaplacianBoundary, WedgeStat, HISTOGRAM_BINS};
