//! Feature Vector Assembly

use crate::aggregator::{AggregatedScales, ScaleAggregator};
use crate::error::FeatureError;
use crate::statistics;
use crate::wedge::{LaplacianBoundary, WedgeStat};
use serde::{Deserialize, Serialize};
use tracing::debug;
use transform_engine::Decomposition;

/// Number of largest wedge energies averaged into the top-energy term
pub const TOP_ENERGY_COUNT: usize = 10;

/// Number of decomposition-wide terms when the symmetry term is present
pub const GLOBAL_TERMS_MAX: usize = 4;

/// Feature vector for one decomposition.
///
/// The length depends on the scale count and on the parity of the wedge
/// count, so vectors from different decompositions may differ in length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw feature values in column order
    pub values: Vec<f64>,
    /// Number of scales in the source decomposition
    pub scale_count: usize,
    /// Number of wedges in the source decomposition
    pub wedge_count: usize,
    /// Whether the symmetry term is present
    pub has_symmetry: bool,
}

impl FeatureVector {
    /// Vector length for a decomposition of the given shape
    pub fn expected_len(scale_count: usize, wedge_count: usize) -> usize {
        if scale_count == 0 {
            return 0;
        }
        let symmetry = usize::from(wedge_count % 2 == 0);
        3 * scale_count - 1 + (GLOBAL_TERMS_MAX - 1) + symmetry
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Mean absolute difference between mirrored energies.
///
/// Present only for an even number of energies.
pub fn symmetry_term(energies: &[f64]) -> Option<f64> {
    let n = energies.len();
    if n == 0 || n % 2 != 0 {
        return None;
    }
    let diffs: Vec<f64> = (0..n / 2)
        .map(|k| (energies[k] - energies[n - 1 - k]).abs())
        .collect();
    Some(statistics::mean(&diffs))
}

/// Mean of the `k` largest energies (all of them when fewer than `k`)
pub fn top_energy_mean(energies: &[f64], k: usize) -> f64 {
    let mut sorted = energies.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.truncate(k);
    statistics::mean(&sorted)
}

/// Appends the decomposition-wide terms after the per-scale terms
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Build the final vector
    pub fn assemble(aggregated: &AggregatedScales) -> FeatureVector {
        let mut values = aggregated.scale_terms();

        values.push(statistics::mean(&aggregated.sharpness));

        let symmetry = symmetry_term(&aggregated.energies);
        if let Some(term) = symmetry {
            values.push(term);
        }

        values.push(top_energy_mean(&aggregated.energies, TOP_ENERGY_COUNT));
        values.push(statistics::std_dev(&aggregated.energies));

        FeatureVector {
            values,
            scale_count: aggregated.scales.len(),
            wedge_count: aggregated.energies.len(),
            has_symmetry: symmetry.is_some(),
        }
    }
}

/// Extractor settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Boundary handling of the sharpness Laplacian
    pub laplacian_boundary: LaplacianBoundary,
}

/// Feature extractor that processes decompositions
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Per-wedge statistics of one scale
    pub fn scale_stats(
        &self,
        decomposition: &Decomposition,
        scale: usize,
    ) -> Result<Vec<WedgeStat>, FeatureError> {
        let wedges = decomposition.scales()[scale].wedges();
        if wedges.is_empty() {
            return Err(FeatureError::EmptyScale { scale });
        }
        wedges
            .iter()
            .enumerate()
            .map(|(wedge, w)| {
                if w.is_empty() {
                    Err(FeatureError::EmptyWedge { scale, wedge })
                } else {
                    Ok(WedgeStat::compute(w, self.config.laplacian_boundary))
                }
            })
            .collect()
    }

    /// Extract the feature vector of a decomposition
    pub fn extract(&self, decomposition: &Decomposition) -> Result<FeatureVector, FeatureError> {
        if decomposition.scales().is_empty() {
            return Err(FeatureError::EmptyDecomposition);
        }

        let mut aggregator = ScaleAggregator::new();
        for scale in 0..decomposition.scale_count() {
            let stats = self.scale_stats(decomposition, scale)?;
            aggregator.push_scale(&stats);
        }

        let features = FeatureAssembler::assemble(&aggregator.finish());

        debug!(
            "Extracted {} features: {} scales, {} wedges, symmetry={}",
            features.len(),
            features.scale_count,
            features.wedge_count,
            features.has_symmetry
        );

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use transform_engine::{Scale, Wedge};

    fn wedge(rows: usize, cols: usize, value: f64) -> Wedge {
        Wedge::from_real(Array2::from_elem((rows, cols), value))
    }

    #[test]
    fn test_single_scale_single_wedge() {
        let decomposition = Decomposition::new(vec![Scale::new(vec![wedge(2, 2, 1.0)])]);
        let features = FeatureExtractor::default().extract(&decomposition).unwrap();

        // dispersion + decay, sharpness, top energy, energy std; odd count so no symmetry
        assert_eq!(features.len(), 2 + 3);
        assert!(!features.has_symmetry);
        assert_eq!(features.len(), FeatureVector::expected_len(1, 1));
        assert_eq!(features.values[0], 0.0);
        assert_relative_eq!(features.values[1], 4.0 / (4.0 + 1e-5));
        assert_relative_eq!(features.values[3], 4.0);
        assert_eq!(features.values[4], 0.0);
    }

    #[test]
    fn test_layout_with_symmetry() {
        let decomposition = Decomposition::new(vec![
            Scale::new(vec![wedge(1, 1, 1.0)]),
            Scale::new(vec![wedge(2, 2, 1.0), wedge(2, 2, 2.0), wedge(3, 1, 0.5)]),
        ]);
        let features = FeatureExtractor::default().extract(&decomposition).unwrap();

        assert_eq!(features.scale_count, 2);
        assert_eq!(features.wedge_count, 4);
        assert!(features.has_symmetry);
        assert_eq!(features.len(), 3 * 2 - 1 + 4);
        assert_eq!(features.len(), FeatureVector::expected_len(2, 4));

        // energies: [1, 4, 16, 0.75]; symmetry = (|1 - 0.75| + |4 - 16|) / 2
        let symmetry = features.values[6];
        assert_relative_eq!(symmetry, (0.25 + 12.0) / 2.0);
    }

    #[test]
    fn test_symmetry_parity() {
        assert!(symmetry_term(&[1.0, 2.0, 3.0, 4.0]).is_some());
        assert!(symmetry_term(&[1.0, 2.0, 3.0]).is_none());
        assert_relative_eq!(symmetry_term(&[1.0, 5.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_top_energy_mean() {
        let few = [3.0, 1.0, 2.0];
        assert_relative_eq!(top_energy_mean(&few, TOP_ENERGY_COUNT), 2.0);

        let many: Vec<f64> = (1..=12).map(f64::from).collect();
        // ten largest are 3..=12
        assert_relative_eq!(top_energy_mean(&many, TOP_ENERGY_COUNT), 7.5);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let extractor = FeatureExtractor::default();
        assert_eq!(
            extractor.extract(&Decomposition::default()),
            Err(FeatureError::EmptyDecomposition)
        );

        let empty_scale = Decomposition::new(vec![
            Scale::new(vec![wedge(1, 1, 1.0)]),
            Scale::new(vec![]),
        ]);
        assert_eq!(
            extractor.extract(&empty_scale),
            Err(FeatureError::EmptyScale { scale: 1 })
        );

        let empty_wedge = Decomposition::new(vec![Scale::new(vec![wedge(0, 3, 1.0)])]);
        assert_eq!(
            extractor.extract(&empty_wedge),
            Err(FeatureError::EmptyWedge { scale: 0, wedge: 0 })
        );
    }
}
