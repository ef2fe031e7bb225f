//! Layered settings: defaults, optional file, `CURVELET__` environment

use config::{Config, ConfigError, Environment, File};
use curvelet_features::ExtractorConfig;
use dataset_builder::{BuilderConfig, CorpusLayout, EntryOrder, MismatchPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use transform_engine::AdapterConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CURVELET";

/// Corpus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub authentic_dir: String,
    pub synthetic_dir: String,
    pub order: EntryOrder,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        let layout = CorpusLayout::default();
        Self {
            authentic_dir: layout.authentic_dir,
            synthetic_dir: layout.synthetic_dir,
            order: layout.order,
        }
    }
}

/// Execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Worker count; 1 runs sequentially
    pub workers: usize,
    pub mismatch_policy: MismatchPolicy,
    pub progress_every: usize,
    /// Where to write the JSON run summary
    pub summary: Option<PathBuf>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            mismatch_policy: MismatchPolicy::FailFast,
            progress_every: 100,
            summary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// All settings of the binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dataset: DatasetSettings,
    pub transform: AdapterConfig,
    pub features: ExtractorConfig,
    pub run: RunSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load defaults, then `file` if given, then the process environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with an explicit environment source
    pub fn load_with(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Builder configuration for the corpus at `root`
    pub fn builder_config(&self, root: &Path) -> BuilderConfig {
        BuilderConfig {
            corpus: CorpusLayout {
                root: root.to_path_buf(),
                authentic_dir: self.dataset.authentic_dir.clone(),
                synthetic_dir: self.dataset.synthetic_dir.clone(),
                order: self.dataset.order,
            },
            adapter: self.transform.clone(),
            extractor: self.features.clone(),
            mismatch_policy: self.run.mismatch_policy,
            progress_every: self.run.progress_every,
        }
    }
}
