//! Curvelet Dataset CLI
//!
//! Settings, logging setup and the two commands of the `curvelet-dataset`
//! binary: building a dataset from a corpus and inspecting one image.

use anyhow::{Context, Result};
use curvelet_features::{FeatureExtractor, FeatureVector};
use dataset_builder::{BuildReport, DatasetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use transform_engine::{DecompositionAdapter, FftWedgeEngine, TransformEngine};

pub mod settings;

pub use settings::Settings;

/// Initialize logging on stderr
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level '{}'", level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to set tracing subscriber")
}

/// Build the dataset of the corpus at `root` and write it to `output`
pub async fn build_dataset(settings: &Settings, root: &Path, output: &Path) -> Result<BuildReport> {
    let builder = DatasetBuilder::new(settings.builder_config(root));

    let report = if settings.run.workers > 1 {
        let mut report = builder
            .build_concurrent(settings.run.workers, || Ok(FftWedgeEngine::start()))
            .await?;
        report.table.write_csv(output)?;
        report.summary.output = Some(output.to_path_buf());
        report
    } else {
        let mut engine = FftWedgeEngine::start();
        let result = builder.run(&mut engine, output);
        if let Err(e) = engine.shutdown() {
            warn!("Engine shutdown failed: {}", e);
        }
        result?
    };

    if let Some(path) = &settings.run.summary {
        report.summary.write_json(path)?;
        info!("Summary written to {}", path.display());
    }
    Ok(report)
}

/// Feature vector of a single image
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub image: PathBuf,
    /// Wedges per scale
    pub layout: Vec<usize>,
    pub features: FeatureVector,
}

/// Decompose one image and extract its features
pub fn inspect_image(settings: &Settings, image: &Path) -> Result<Inspection> {
    let adapter = DecompositionAdapter::new(settings.transform.clone());
    let extractor = FeatureExtractor::new(settings.features.clone());
    let mut engine = FftWedgeEngine::start();

    let decomposition = adapter
        .decompose_file(&mut engine, image)
        .with_context(|| format!("failed to decompose {}", image.display()))?;
    engine.shutdown()?;

    let features = extractor
        .extract(&decomposition)
        .with_context(|| format!("failed to extract features of {}", image.display()))?;

    Ok(Inspection {
        image: image.to_path_buf(),
        layout: decomposition.layout(),
        features,
    })
}
