//! Labeled corpus layout and enumeration

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Class label of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Authentic,
    Synthetic,
}

impl Label {
    /// Both labels in output order
    pub const ALL: [Label; 2] = [Label::Authentic, Label::Synthetic];

    /// Integer written to the label column
    pub fn as_int(&self) -> u8 {
        match self {
            Label::Authentic => 0,
            Label::Synthetic => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Authentic => "authentic",
            Label::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which files of a label directory are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Filesystem enumeration order
    #[default]
    Directory,
    /// Lexicographic by file name
    Name,
}

/// Where the two label directories live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusLayout {
    /// Dataset root
    pub root: PathBuf,
    /// Directory name of the authentic class (label 0)
    pub authentic_dir: String,
    /// Directory name of the synthetic class (label 1)
    pub synthetic_dir: String,
    /// File visiting order
    pub order: EntryOrder,
}

impl Default for CorpusLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            authentic_dir: "real_balanced".to_string(),
            synthetic_dir: "fake_balanced".to_string(),
            order: EntryOrder::Directory,
        }
    }
}

/// One image scheduled for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// Position in enumeration order
    pub index: usize,
    pub label: Label,
    pub path: PathBuf,
}

impl ImageJob {
    /// File name for logs
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// File stem used as the frame name
    pub fn frame_name(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl CorpusLayout {
    /// Layout rooted at `root` with the default directory names
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Directory holding images of `label`
    pub fn label_dir(&self, label: Label) -> PathBuf {
        match label {
            Label::Authentic => self.root.join(&self.authentic_dir),
            Label::Synthetic => self.root.join(&self.synthetic_dir),
        }
    }

    /// Regular files of one label directory
    pub fn list_files(&self, label: Label) -> Result<Vec<PathBuf>, BuildError> {
        let dir = self.label_dir(label);
        if !dir.is_dir() {
            return Err(BuildError::MissingLabelDir { label, path: dir });
        }

        let io_err = |source| BuildError::Io {
            path: dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                files.push(entry.path());
            }
        }

        if self.order == EntryOrder::Name {
            files.sort();
        }
        if files.is_empty() {
            return Err(BuildError::EmptyCorpus { label, path: dir });
        }

        debug!("{} files under {}", files.len(), dir.display());
        Ok(files)
    }

    /// Every image of both labels, authentic first
    pub fn enumerate(&self) -> Result<Vec<ImageJob>, BuildError> {
        let mut jobs = Vec::new();
        for label in Label::ALL {
            for path in self.list_files(label)? {
                jobs.push(ImageJob {
                    index: jobs.len(),
                    label,
                    path,
                });
            }
        }
        info!("Corpus at {}: {} images", self.root.display(), jobs.len());
        Ok(jobs)
    }
}
