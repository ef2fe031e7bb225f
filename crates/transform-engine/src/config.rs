//! Decomposition and adapter configuration

use serde::{Deserialize, Serialize};

/// Treatment of the finest scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinestLevel {
    /// Directional wedges at the finest scale too
    Curvelets,
    /// A single isotropic wedge at the finest scale
    #[default]
    Wavelets,
}

/// Engine parameters. The adapter passes these through without inspecting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Number of scales (engine default when `None`)
    pub scales: Option<usize>,
    /// Orientation count at the coarsest directional scale
    pub coarse_angles: usize,
    /// Finest scale mode
    pub finest: FinestLevel,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            scales: None,
            coarse_angles: 16,
            finest: FinestLevel::Wavelets,
        }
    }
}

impl DecompositionConfig {
    /// Fixed scale count
    pub fn with_scales(scales: usize) -> Self {
        Self {
            scales: Some(scales),
            ..Default::default()
        }
    }
}

/// Decomposition adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Side of the square grid every image is resized to
    pub canonical_size: u32,
    /// Forwarded to the engine
    pub decomposition: DecompositionConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            canonical_size: 256,
            decomposition: DecompositionConfig::default(),
        }
    }
}
