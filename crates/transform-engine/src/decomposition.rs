//! Decomposition data model

use ndarray::Array2;
use rustfft::num_complex::Complex64;

/// One orientation-selective subband: a complex-valued 2-D grid.
///
/// Shapes vary between scales and may vary between wedges of the same scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    coefficients: Array2<Complex64>,
}

impl Wedge {
    /// Wrap a coefficient grid
    pub fn new(coefficients: Array2<Complex64>) -> Self {
        Self { coefficients }
    }

    /// Build a wedge from real values (imaginary parts zero)
    pub fn from_real(values: Array2<f64>) -> Self {
        Self::new(values.mapv(|v| Complex64::new(v, 0.0)))
    }

    /// Coefficient grid
    pub fn coefficients(&self) -> &Array2<Complex64> {
        &self.coefficients
    }

    /// Grid shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.coefficients.dim()
    }

    /// Number of grid cells
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Elementwise magnitude `|z|`
    pub fn magnitudes(&self) -> Array2<f64> {
        self.coefficients.mapv(|z| (z.re * z.re + z.im * z.im).sqrt())
    }
}

/// Ordered wedges of one scale
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scale {
    wedges: Vec<Wedge>,
}

impl Scale {
    pub fn new(wedges: Vec<Wedge>) -> Self {
        Self { wedges }
    }

    pub fn wedges(&self) -> &[Wedge] {
        &self.wedges
    }

    pub fn len(&self) -> usize {
        self.wedges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wedges.is_empty()
    }
}

/// Ordered scales produced by a transform engine.
///
/// Index order follows the engine's convention and is preserved as-is:
/// the cross-scale features are order-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decomposition {
    scales: Vec<Scale>,
}

impl Decomposition {
    pub fn new(scales: Vec<Scale>) -> Self {
        Self { scales }
    }

    pub fn scales(&self) -> &[Scale] {
        &self.scales
    }

    /// Number of scales
    pub fn scale_count(&self) -> usize {
        self.scales.len()
    }

    /// Total number of wedges across all scales
    pub fn wedge_count(&self) -> usize {
        self.scales.iter().map(Scale::len).sum()
    }

    /// Wedge count per scale, in scale order
    pub fn layout(&self) -> Vec<usize> {
        self.scales.iter().map(Scale::len).collect()
    }

    /// Sum of squared magnitudes over every coefficient
    pub fn total_energy(&self) -> f64 {
        self.scales
            .iter()
            .flat_map(|s| s.wedges())
            .map(|w| w.coefficients().iter().map(|z| z.norm_sqr()).sum::<f64>())
            .sum()
    }
}

impl FromIterator<Scale> for Decomposition {
    fn from_iter<I: IntoIterator<Item = Scale>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
