//! In-memory dataset table and CSV serialization

use crate::corpus::Label;
use crate::error::{BuildError, SampleError};
use csv::Writer;
use curvelet_features::FeatureVector;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::info;

/// Prefix of the feature column names
pub const FEATURE_PREFIX: &str = "curvelet_f";

/// One processed image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    /// File stem of the source image
    pub frame_name: String,
    pub label: Label,
    pub features: FeatureVector,
}

/// Ordered rows sharing one feature column count.
///
/// The column count is fixed by the first row pushed.
#[derive(Debug, Clone, Default)]
pub struct DatasetTable {
    columns: Option<usize>,
    rows: Vec<DatasetRow>,
}

impl DatasetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feature column count, once a row has been pushed
    pub fn feature_columns(&self) -> Option<usize> {
        self.columns
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check a feature vector against the column count
    pub fn check(&self, features: &FeatureVector) -> Result<(), SampleError> {
        match self.columns {
            Some(expected) if expected != features.len() => Err(SampleError::LengthMismatch {
                expected,
                actual: features.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Append a row; the first row fixes the column count
    pub fn push(&mut self, row: DatasetRow) -> Result<(), SampleError> {
        self.check(&row.features)?;
        self.columns.get_or_insert(row.features.len());
        self.rows.push(row);
        Ok(())
    }

    /// Header: `frame_name, label, curvelet_f0 .. curvelet_f(k-1)`
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["frame_name".to_string(), "label".to_string()];
        header.extend((0..self.columns.unwrap_or(0)).map(|i| format!("{}{}", FEATURE_PREFIX, i)));
        header
    }

    /// Serialize as CSV with a header row
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(self.header())?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.features.len() + 2);
            record.push(row.frame_name.clone());
            record.push(row.label.as_int().to_string());
            record.extend(row.features.values.iter().map(|v| format!("{:?}", v)));
            writer.write_record(&record)?;
        }

        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write the table to `path`
    pub fn write_csv(&self, path: &Path) -> Result<(), BuildError> {
        let wrap = |source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::create(path).map_err(|e| wrap(csv::Error::from(e)))?;
        self.write_to(io::BufWriter::new(file)).map_err(wrap)?;

        info!("Saved: {} with {} rows", path.display(), self.rows.len());
        Ok(())
    }
}
