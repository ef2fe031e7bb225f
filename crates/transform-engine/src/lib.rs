//! Transform Engine
//!
//! Multiscale, multi-orientation decomposition behind a single `decompose`
//! capability, plus the adapter that prepares images for it:
//! - Decomposition data model (scales of complex wedges)
//! - Image loading and normalization to a canonical square grid
//! - `FftWedgeEngine`, a frequency-tiling engine built on rustfft
//! - `FixedEngine`, a deterministic engine for tests

pub mod adapter;
pub mod config;
pub mod decomposition;
mod error;
pub mod fft;
pub mod grayscale;
pub mod mock;

pub use adapter::DecompositionAdapter;
pub use config::{AdapterConfig, DecompositionConfig, FinestLevel};
pub use decomposition::{Decomposition, Scale, Wedge};
pub use error::{AdapterError, EngineError};
pub use fft::FftWedgeEngine;
pub use mock::FixedEngine;

pub use rustfft::num_complex::Complex64;

use ndarray::Array2;

/// A live session of a decomposition engine.
///
/// Sessions are created explicitly by the caller and handed to the adapter;
/// calls are synchronous and may block for a long time. A session is not
/// shared between threads: concurrent callers each hold their own.
pub trait TransformEngine {
    /// Engine name for logging
    fn name(&self) -> &str;

    /// Decompose a real-valued image grid
    fn decompose(
        &mut self,
        image: &Array2<f64>,
        config: &DecompositionConfig,
    ) -> Result<Decomposition, EngineError>;

    /// Tear the session down. Later calls to `decompose` fail with
    /// `EngineError::Unavailable`.
    fn shutdown(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

impl<E: TransformEngine + ?Sized> TransformEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decompose(
        &mut self,
        image: &Array2<f64>,
        config: &DecompositionConfig,
    ) -> Result<Decomposition, EngineError> {
        (**self).decompose(image, config)
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        (**self).shutdown()
    }
}
