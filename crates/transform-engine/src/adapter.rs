//! Decomposition Adapter

use crate::config::AdapterConfig;
use crate::decomposition::Decomposition;
use crate::error::AdapterError;
use crate::grayscale;
use crate::TransformEngine;
use std::path::Path;
use tracing::debug;

/// Prepares images and forwards them to a transform engine session
#[derive(Debug, Clone, Default)]
pub struct DecompositionAdapter {
    config: AdapterConfig,
}

impl DecompositionAdapter {
    /// Create a new adapter
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Decode `path`, normalize it to the canonical square grid and decompose it
    pub fn decompose_file<E>(&self, engine: &mut E, path: &Path) -> Result<Decomposition, AdapterError>
    where
        E: TransformEngine + ?Sized,
    {
        let grid = grayscale::prepare(path, self.config.canonical_size).map_err(|source| {
            AdapterError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let decomposition = engine.decompose(&grid, &self.config.decomposition)?;

        debug!(
            "Decomposed {} with {}: layout={:?}",
            path.display(),
            engine.name(),
            decomposition.layout()
        );

        Ok(decomposition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::{Scale, Wedge};
    use crate::error::EngineError;
    use crate::mock::FixedEngine;
    use image::{GrayImage, Luma};
    use ndarray::Array2;

    fn fixed() -> FixedEngine {
        let wedge = Wedge::from_real(Array2::from_elem((2, 2), 1.0));
        FixedEngine::new(Decomposition::new(vec![Scale::new(vec![wedge])]))
    }

    #[test]
    fn test_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let adapter = DecompositionAdapter::default();
        let mut engine = fixed();
        let err = adapter.decompose_file(&mut engine, &path).unwrap_err();

        assert!(matches!(err, AdapterError::Decode { .. }));
        assert!(!err.is_fatal());
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_forwards_canonical_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        GrayImage::from_pixel(31, 17, Luma([9])).save(&path).unwrap();

        let adapter = DecompositionAdapter::new(AdapterConfig {
            canonical_size: 32,
            ..Default::default()
        });
        let mut engine = fixed();
        adapter.decompose_file(&mut engine, &path).unwrap();

        assert_eq!(engine.calls(), 1);
        assert_eq!(engine.last_input_shape(), Some((32, 32)));
    }

    #[test]
    fn test_engine_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        GrayImage::from_pixel(8, 8, Luma([0])).save(&path).unwrap();

        let adapter = DecompositionAdapter::default();
        let mut engine = FixedEngine::failing(EngineError::Unavailable("session closed".into()));
        let err = adapter.decompose_file(&mut engine, &path).unwrap_err();

        assert!(err.is_fatal());
    }
}
