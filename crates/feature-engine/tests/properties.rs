use curvelet_features::{
    decay, symmetry_term, top_energy_mean, truncated_correlation, FeatureExtractor,
    FeatureVector, TOP_ENERGY_COUNT,
};
use ndarray::Array2;
use proptest::prelude::*;
use transform_engine::{Complex64, Decomposition, Scale, Wedge};

fn energies() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1e6, 1..40)
}

/// Decomposition with the given wedge counts per scale and varying shapes
fn decomposition(layout: &[usize], seed: u64) -> Decomposition {
    layout
        .iter()
        .enumerate()
        .map(|(s, &n)| {
            let wedges = (0..n)
                .map(|w| {
                    let rows = 1 + (s + w) % 4;
                    let cols = 2 + (w * 3 + s) % 5;
                    Wedge::new(Array2::from_shape_fn((rows, cols), |(r, c)| {
                        let x = (seed as f64 + (r * 31 + c * 17 + w * 7 + s) as f64).sin();
                        Complex64::new(x, x * 0.5)
                    }))
                })
                .collect();
            Scale::new(wedges)
        })
        .collect()
}

proptest! {
    #[test]
    fn decay_is_bounded(values in energies()) {
        let d = decay(&values);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= 1.0);
    }

    #[test]
    fn symmetry_presence_follows_parity(values in energies()) {
        prop_assert_eq!(symmetry_term(&values).is_some(), values.len() % 2 == 0);
    }

    #[test]
    fn top_energy_mean_matches_definition(values in energies()) {
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let k = sorted.len().min(TOP_ENERGY_COUNT);
        let expected = sorted[..k].iter().sum::<f64>() / k as f64;
        let actual = top_energy_mean(&values, TOP_ENERGY_COUNT);
        prop_assert!((actual - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn correlation_is_bounded(prev in energies(), curr in energies()) {
        let c = truncated_correlation(&prev, &curr);
        prop_assert!((-1.0..=1.0).contains(&c));
        if prev.len().min(curr.len()) < 2 {
            prop_assert_eq!(c, 0.0);
        }
    }

    #[test]
    fn vector_length_follows_layout(
        layout in prop::collection::vec(1usize..6, 1..6),
        seed in 0u64..1000,
    ) {
        let d = decomposition(&layout, seed);
        let features = FeatureExtractor::default().extract(&d).unwrap();
        let wedges: usize = layout.iter().sum();

        prop_assert_eq!(features.len(), FeatureVector::expected_len(layout.len(), wedges));
        prop_assert_eq!(features.has_symmetry, wedges % 2 == 0);
        prop_assert!(features.values.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn extraction_is_deterministic() {
    let d = decomposition(&[1, 4, 8, 8, 1], 42);
    let extractor = FeatureExtractor::default();
    let a = extractor.extract(&d).unwrap();
    let b = extractor.extract(&d).unwrap();
    assert_eq!(a.values, b.values);
    assert_eq!(a.len(), 3 * 5 - 1 + 4);
}
