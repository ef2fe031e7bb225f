//! FFT-based Frequency Tiling Engine
//!
//! The unitary 2-D spectrum of the image is split into dyadic bands by
//! sup-norm radius, and every band into angular sectors. Each wedge is the
//! unitary inverse transform of its sector, restricted to the smallest centred
//! block that holds the band. The sectors partition the frequency plane, so
//! the wedge energies sum to the image energy.

use crate::config::{DecompositionConfig, FinestLevel};
use crate::decomposition::{Decomposition, Scale, Wedge};
use crate::error::EngineError;
use crate::TransformEngine;
use ndarray::Array2;
use rustfft::num_complex::Complex64;
use rustfft::{FftDirection, FftPlanner};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Frequency-tiling decomposition engine
pub struct FftWedgeEngine {
    /// FFT planner; `None` once the session is shut down
    planner: Option<FftPlanner<f64>>,
}

impl FftWedgeEngine {
    /// Open a new engine session
    pub fn start() -> Self {
        info!("Starting FFT wedge engine session");
        Self {
            planner: Some(FftPlanner::new()),
        }
    }

    /// Scale count used when the configuration leaves it open
    pub fn default_scales(rows: usize, cols: usize) -> usize {
        let n = rows.min(cols).max(1) as f64;
        (n.log2() - 3.0).ceil().max(1.0) as usize
    }

    /// Number of orientation wedges per scale
    pub fn angles_per_scale(scales: usize, coarse_angles: usize, finest: FinestLevel) -> Vec<usize> {
        (0..scales)
            .map(|j| {
                if j == 0 || (j == scales - 1 && finest == FinestLevel::Wavelets) {
                    1
                } else {
                    // doubles every second scale
                    coarse_angles << (j / 2)
                }
            })
            .collect()
    }

    fn validate(rows: usize, cols: usize, scales: usize, coarse_angles: usize) -> Result<(), EngineError> {
        if scales == 0 {
            return Err(EngineError::Rejected("scale count must be at least 1".into()));
        }
        if coarse_angles == 0 {
            return Err(EngineError::Rejected("coarse angle count must be at least 1".into()));
        }
        let min_side = 1usize.checked_shl(scales as u32).unwrap_or(usize::MAX);
        if rows < min_side || cols < min_side {
            return Err(EngineError::Rejected(format!(
                "{}x{} grid too small for {} scales (need {}x{})",
                rows, cols, scales, min_side, min_side
            )));
        }
        Ok(())
    }
}

impl Default for FftWedgeEngine {
    fn default() -> Self {
        Self::start()
    }
}

/// Frequency index in FFT order to signed frequency
fn signed_frequency(index: usize, n: usize) -> isize {
    if index <= (n - 1) / 2 {
        index as isize
    } else {
        index as isize - n as isize
    }
}

/// In-place 2-D transform (rows, then columns). Unnormalized.
fn fft2(planner: &mut FftPlanner<f64>, data: &mut Array2<Complex64>, direction: FftDirection) {
    let (rows, cols) = data.dim();

    let row_fft = planner.plan_fft(cols, direction);
    let mut buffer = vec![Complex64::default(); cols];
    for mut row in data.rows_mut() {
        for (b, v) in buffer.iter_mut().zip(row.iter()) {
            *b = *v;
        }
        row_fft.process(&mut buffer);
        for (v, b) in row.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }

    let col_fft = planner.plan_fft(rows, direction);
    let mut buffer = vec![Complex64::default(); rows];
    for mut col in data.columns_mut() {
        for (b, v) in buffer.iter_mut().zip(col.iter()) {
            *b = *v;
        }
        col_fft.process(&mut buffer);
        for (v, b) in col.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }
}

/// Block side for a band reaching `threshold` of the half-size `half`
fn block_side(threshold: f64, half: f64, n: usize) -> usize {
    (2 * (threshold * half).floor() as usize + 2).min(n)
}

impl TransformEngine for FftWedgeEngine {
    fn name(&self) -> &str {
        "fft-wedge"
    }

    fn decompose(
        &mut self,
        image: &Array2<f64>,
        config: &DecompositionConfig,
    ) -> Result<Decomposition, EngineError> {
        let planner = self
            .planner
            .as_mut()
            .ok_or_else(|| EngineError::Unavailable("FFT wedge engine session shut down".into()))?;

        let (rows, cols) = image.dim();
        let scales = config.scales.unwrap_or_else(|| Self::default_scales(rows, cols));
        Self::validate(rows, cols, scales, config.coarse_angles)?;

        let angles = Self::angles_per_scale(scales, config.coarse_angles, config.finest);
        let thresholds: Vec<f64> = (0..scales)
            .map(|j| 0.5f64.powi((scales - 1 - j) as i32))
            .collect();

        // Unitary forward transform
        let mut spectrum = image.mapv(|v| Complex64::new(v, 0.0));
        fft2(planner, &mut spectrum, FftDirection::Forward);
        let norm = 1.0 / ((rows * cols) as f64).sqrt();
        spectrum.mapv_inplace(|z| z * norm);

        let half_rows = rows as f64 / 2.0;
        let half_cols = cols as f64 / 2.0;

        let block_shapes: Vec<(usize, usize)> = thresholds
            .iter()
            .map(|&t| (block_side(t, half_rows, rows), block_side(t, half_cols, cols)))
            .collect();

        let mut blocks: Vec<Vec<Array2<Complex64>>> = angles
            .iter()
            .zip(&block_shapes)
            .map(|(&n, &shape)| (0..n).map(|_| Array2::zeros(shape)).collect())
            .collect();

        for ((r, c), &value) in spectrum.indexed_iter() {
            let kr = signed_frequency(r, rows);
            let kc = signed_frequency(c, cols);
            let radius = (kr.unsigned_abs() as f64 / half_rows).max(kc.unsigned_abs() as f64 / half_cols);

            let j = thresholds
                .iter()
                .position(|&t| radius <= t)
                .unwrap_or(scales - 1);

            let n = angles[j];
            let sector = if n == 1 {
                0
            } else {
                let theta = (kr as f64).atan2(kc as f64).rem_euclid(2.0 * PI);
                ((theta / (2.0 * PI / n as f64)) as usize).min(n - 1)
            };

            let (br, bc) = block_shapes[j];
            let br_idx = kr.rem_euclid(br as isize) as usize;
            let bc_idx = kc.rem_euclid(bc as isize) as usize;
            blocks[j][sector][[br_idx, bc_idx]] = value;
        }

        let mut decomposition = Vec::with_capacity(scales);
        for scale_blocks in blocks {
            let mut wedges = Vec::with_capacity(scale_blocks.len());
            for mut block in scale_blocks {
                let (br, bc) = block.dim();
                fft2(planner, &mut block, FftDirection::Inverse);
                let norm = 1.0 / ((br * bc) as f64).sqrt();
                block.mapv_inplace(|z| z * norm);
                wedges.push(Wedge::new(block));
            }
            decomposition.push(Scale::new(wedges));
        }

        debug!(
            "FFT wedge decomposition of {}x{}: {} scales, angles={:?}",
            rows, cols, scales, angles
        );

        Ok(Decomposition::new(decomposition))
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.planner.take().is_some() {
            info!("FFT wedge engine session shut down");
        }
        Ok(())
    }
}
