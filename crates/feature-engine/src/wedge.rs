//! Per-wedge Descriptors

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use transform_engine::Wedge;

/// Histogram resolution for the entropy estimate
pub const HISTOGRAM_BINS: usize = 256;

/// Out-of-grid samples seen by the Laplacian stencil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaplacianBoundary {
    /// Zero padding
    #[default]
    Zero,
    /// Nearest edge sample repeated (`d c b a | a b c d | d c b a`)
    Reflect,
}

/// Scalar descriptors of one wedge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WedgeStat {
    /// Sum of squared magnitudes
    pub energy: f64,
    /// Histogram entropy of the magnitudes
    pub entropy: f64,
    /// Mean absolute Laplacian of the magnitudes
    pub sharpness: f64,
}

impl WedgeStat {
    /// Compute descriptors for a wedge
    pub fn compute(wedge: &Wedge, boundary: LaplacianBoundary) -> Self {
        Self::from_magnitudes(&wedge.magnitudes(), boundary)
    }

    /// Compute descriptors from a magnitude grid
    pub fn from_magnitudes(magnitudes: &Array2<f64>, boundary: LaplacianBoundary) -> Self {
        let energy = magnitudes.iter().map(|&m| m * m).sum();
        let values: Vec<f64> = magnitudes.iter().cloned().collect();

        Self {
            energy,
            entropy: histogram_entropy(&values),
            sharpness: laplacian_sharpness(magnitudes, boundary),
        }
    }
}

/// Entropy of the density-normalized histogram of `values`.
///
/// Heights are `count / (total * bin_width)` and are used directly as
/// weights in `-Σ h·log2(h)`; they are not rescaled to sum to 1. Returns 0
/// when the value range is empty.
pub fn histogram_entropy(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        return 0.0;
    }

    let step = (hi - lo) / HISTOGRAM_BINS as f64;
    let edge = |i: usize| {
        if i == HISTOGRAM_BINS {
            hi
        } else {
            i as f64 * step + lo
        }
    };
    let norm = HISTOGRAM_BINS as f64 / (hi - lo);

    let mut counts = [0usize; HISTOGRAM_BINS];
    for &v in values {
        let mut idx = (((v - lo) * norm) as usize).min(HISTOGRAM_BINS - 1);
        // floating point corrections against the bin edges
        if v < edge(idx) && idx > 0 {
            idx -= 1;
        } else if idx != HISTOGRAM_BINS - 1 && v >= edge(idx + 1) {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(i, &count)| {
            let width = edge(i + 1) - edge(i);
            let h = count as f64 / width / total;
            -h * h.log2()
        })
        .sum()
}

/// Mean absolute 4-neighbour Laplacian of a grid
pub fn laplacian_sharpness(grid: &Array2<f64>, boundary: LaplacianBoundary) -> f64 {
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }

    let sample = |r: isize, c: isize| -> f64 {
        let inside = r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols;
        if inside {
            return grid[[r as usize, c as usize]];
        }
        match boundary {
            LaplacianBoundary::Zero => 0.0,
            LaplacianBoundary::Reflect => {
                let r = r.clamp(0, rows as isize - 1) as usize;
                let c = c.clamp(0, cols as isize - 1) as usize;
                grid[[r, c]]
            }
        }
    };

    let mut total = 0.0;
    for r in 0..rows as isize {
        for c in 0..cols as isize {
            let lap = sample(r - 1, c) + sample(r + 1, c) + sample(r, c - 1) + sample(r, c + 1)
                - 4.0 * sample(r, c);
            total += lap.abs();
        }
    }
    total / (rows * cols) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use transform_engine::Complex64;

    #[test]
    fn test_zero_wedge() {
        let wedge = Wedge::from_real(Array2::zeros((4, 5)));
        let stat = WedgeStat::compute(&wedge, LaplacianBoundary::Zero);
        assert_eq!(stat.energy, 0.0);
        assert_eq!(stat.entropy, 0.0);
        assert_eq!(stat.sharpness, 0.0);
    }

    #[test]
    fn test_uniform_and_single_cell() {
        let uniform = Array2::from_elem((3, 3), 2.0);
        assert_eq!(histogram_entropy(uniform.as_slice().unwrap()), 0.0);

        let single = Wedge::new(Array2::from_elem((1, 1), Complex64::new(0.0, 3.0)));
        let stat = WedgeStat::compute(&single, LaplacianBoundary::Zero);
        assert_relative_eq!(stat.energy, 9.0);
        assert_eq!(stat.entropy, 0.0);
        // single cell, zero padded: |0 - 4*3| = 12
        assert_relative_eq!(stat.sharpness, 12.0);
    }

    #[test]
    fn test_two_level_entropy() {
        // half at 0, half at 1: bin width 1/256, heights 128 each
        let values = [0.0, 0.0, 1.0, 1.0];
        let expected = -2.0 * 128.0 * 128f64.log2();
        assert_relative_eq!(histogram_entropy(&values), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_max_lands_in_last_bin() {
        // 0.5 sits exactly on edge 128, 1.0 on the closed right edge
        let values = [0.0, 0.5, 1.0, 1.0];
        let width: f64 = 1.0 / 256.0;
        let h_single = 1.0 / width / 4.0;
        let h_double = 2.0 / width / 4.0;
        let expected = -2.0 * h_single * h_single.log2() - h_double * h_double.log2();
        assert_relative_eq!(histogram_entropy(&values), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_energy_sums_squared_magnitudes() {
        let grid = array![[Complex64::new(3.0, 4.0), Complex64::new(1.0, 0.0)]];
        let stat = WedgeStat::compute(&Wedge::new(grid), LaplacianBoundary::Zero);
        assert_relative_eq!(stat.energy, 26.0, max_relative = 1e-12);
    }

    #[test]
    fn test_laplacian_boundaries() {
        let grid = Array2::from_elem((3, 3), 1.0);
        // reflected edges see a flat field
        assert_eq!(laplacian_sharpness(&grid, LaplacianBoundary::Reflect), 0.0);
        // corners 2, edges 1, centre 0 under zero padding
        let expected = (4.0 * 2.0 + 4.0 * 1.0) / 9.0;
        assert_relative_eq!(laplacian_sharpness(&grid, LaplacianBoundary::Zero), expected);
    }

    #[test]
    fn test_linear_ramp_curvature_only_at_border() {
        let grid = Array2::from_shape_fn((5, 5), |(r, c)| (r + c) as f64);
        // 12 non-corner border cells contribute 1, two corners contribute 2
        assert_relative_eq!(
            laplacian_sharpness(&grid, LaplacianBoundary::Reflect),
            16.0 / 25.0,
            max_relative = 1e-12
        );
    }
}
