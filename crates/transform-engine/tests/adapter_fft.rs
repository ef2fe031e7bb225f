use image::{GrayImage, Luma};
use transform_engine::{
    AdapterConfig, DecompositionAdapter, DecompositionConfig, FftWedgeEngine, TransformEngine,
};

#[test]
fn decomposes_image_file_at_canonical_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame_0001.png");
    GrayImage::from_fn(100, 60, |x, y| Luma([((x * 3 + y * 5) % 256) as u8]))
        .save(&path)
        .unwrap();

    let adapter = DecompositionAdapter::new(AdapterConfig {
        canonical_size: 64,
        decomposition: DecompositionConfig::default(),
    });
    let mut engine = FftWedgeEngine::start();

    let decomposition = adapter.decompose_file(&mut engine, &path).unwrap();
    engine.shutdown().unwrap();

    // 64x64 → 3 scales: coarse, one directional, isotropic finest
    assert_eq!(decomposition.layout(), vec![1, 16, 1]);
    assert_eq!(decomposition.scales()[2].wedges()[0].shape(), (64, 64));
}

#[test]
fn repeated_decomposition_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    GrayImage::from_fn(32, 32, |x, y| Luma([(x ^ y) as u8 * 7]))
        .save(&path)
        .unwrap();

    let adapter = DecompositionAdapter::new(AdapterConfig {
        canonical_size: 32,
        ..Default::default()
    });
    let mut first = FftWedgeEngine::start();
    let mut second = FftWedgeEngine::start();

    let a = adapter.decompose_file(&mut first, &path).unwrap();
    let b = adapter.decompose_file(&mut second, &path).unwrap();
    assert_eq!(a, b);
}
