//! Failure log and run summary

use crate::corpus::Label;
use crate::error::{BuildError, SampleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One skipped image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub file: String,
    pub label: Label,
    pub error: String,
}

/// Append-only record of skipped images
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailureLog {
    records: Vec<FailureRecord>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure and report it on the log stream
    pub fn record(&mut self, file: String, label: Label, error: &SampleError) {
        warn!(file = %file, label = %label, error = %error, "Error with {}: {}", file, error);
        self.records.push(FailureRecord {
            file,
            label,
            error: error.to_string(),
        });
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-label counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Final report of a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub authentic: LabelCounts,
    pub synthetic: LabelCounts,
    /// Feature column count of the table
    pub feature_columns: Option<usize>,
    /// Output table, when written
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub failures: Vec<FailureRecord>,
}

impl RunSummary {
    /// Start an empty summary
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            authentic: LabelCounts::default(),
            synthetic: LabelCounts::default(),
            feature_columns: None,
            output: None,
            started_at: now,
            finished_at: now,
            failures: Vec::new(),
        }
    }

    fn counts_mut(&mut self, label: Label) -> &mut LabelCounts {
        match label {
            Label::Authentic => &mut self.authentic,
            Label::Synthetic => &mut self.synthetic,
        }
    }

    /// Count one successfully processed image
    pub fn record_success(&mut self, label: Label) {
        self.attempted += 1;
        self.succeeded += 1;
        let counts = self.counts_mut(label);
        counts.attempted += 1;
        counts.succeeded += 1;
    }

    /// Count one skipped image
    pub fn record_failure(&mut self, label: Label) {
        self.attempted += 1;
        self.failed += 1;
        let counts = self.counts_mut(label);
        counts.attempted += 1;
        counts.failed += 1;
    }

    /// Counters for `label`
    pub fn counts(&self, label: Label) -> LabelCounts {
        match label {
            Label::Authentic => self.authentic,
            Label::Synthetic => self.synthetic,
        }
    }

    /// Close the summary
    pub fn finish(&mut self, feature_columns: Option<usize>, failures: &FailureLog) {
        self.feature_columns = feature_columns;
        self.failures = failures.records().to_vec();
        self.finished_at = Utc::now();
    }

    /// Wall-clock duration in milliseconds
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<(), BuildError> {
        let wrap = |source| BuildError::Summary {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| wrap(e.into()))?;
        std::fs::write(path, json).map_err(wrap)
    }
}
