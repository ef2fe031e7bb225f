//! Scale Aggregation
//!
//! Folds per-wedge statistics into scale-level features in scale order,
//! carrying the previous scale's energies forward for the cross-scale
//! correlation.

use crate::statistics::{self, StatisticalFeatures};
use crate::wedge::WedgeStat;
use serde::{Deserialize, Serialize};

/// Guard added to the maximum energy in the decay ratio
pub const DECAY_EPSILON: f64 = 1e-5;

/// Features contributed by one scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleFeatures {
    /// Scale index
    pub index: usize,
    /// Correlation with the previous scale's energies (absent for scale 0)
    pub correlation: Option<f64>,
    /// Standard deviation of the wedge entropies
    pub dispersion: f64,
    /// Mean energy over (max energy + ε)
    pub decay: f64,
}

impl ScaleFeatures {
    /// Append this scale's terms in feature order
    pub fn append_to(&self, values: &mut Vec<f64>) {
        if let Some(corr) = self.correlation {
            values.push(corr);
        }
        values.push(self.dispersion);
        values.push(self.decay);
    }
}

/// Everything the assembler needs once all scales are folded in
#[derive(Debug, Clone, Default)]
pub struct AggregatedScales {
    /// Per-scale features in scale order
    pub scales: Vec<ScaleFeatures>,
    /// Energy of every wedge, in decomposition order
    pub energies: Vec<f64>,
    /// Sharpness of every wedge, in decomposition order
    pub sharpness: Vec<f64>,
}

impl AggregatedScales {
    /// Flattened per-scale terms
    pub fn scale_terms(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.scales.len() * 3);
        for scale in &self.scales {
            scale.append_to(&mut values);
        }
        values
    }
}

/// Pearson correlation over the common prefix of two energy lists.
///
/// Fewer than two shared elements yields exactly 0. A constant list also
/// yields 0 where legacy feature tables hold NaN.
pub fn truncated_correlation(prev: &[f64], curr: &[f64]) -> f64 {
    let n = prev.len().min(curr.len());
    if n < 2 {
        return 0.0;
    }
    statistics::pearson(&prev[..n], &curr[..n])
}

/// Mean energy over (max energy + ε); 0 for an empty list
pub fn decay(energies: &[f64]) -> f64 {
    if energies.is_empty() {
        return 0.0;
    }
    let summary = StatisticalFeatures::compute(energies);
    summary.mean / (summary.max + DECAY_EPSILON)
}

/// Running fold over the scales of one decomposition
#[derive(Debug, Default)]
pub struct ScaleAggregator {
    prev_energies: Vec<f64>,
    result: AggregatedScales,
}

impl ScaleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scales folded in so far
    pub fn scale_count(&self) -> usize {
        self.result.scales.len()
    }

    /// Fold in the next scale. `stats` must not be empty.
    pub fn push_scale(&mut self, stats: &[WedgeStat]) -> &ScaleFeatures {
        let index = self.result.scales.len();
        let energies: Vec<f64> = stats.iter().map(|s| s.energy).collect();
        let entropies: Vec<f64> = stats.iter().map(|s| s.entropy).collect();

        let correlation = (index > 0).then(|| truncated_correlation(&self.prev_energies, &energies));

        let features = ScaleFeatures {
            index,
            correlation,
            dispersion: statistics::std_dev(&entropies),
            decay: decay(&energies),
        };

        self.result.energies.extend_from_slice(&energies);
        self.result
            .sharpness
            .extend(stats.iter().map(|s| s.sharpness));
        self.prev_energies = energies;
        self.result.scales.push(features);

        &self.result.scales[index]
    }

    /// Finish aggregation
    pub fn finish(self) -> AggregatedScales {
        self.result
    }
}
