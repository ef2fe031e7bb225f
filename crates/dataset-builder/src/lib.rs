//! Dataset Builder
//!
//! Walks a two-class image corpus (`real_balanced` / `fake_balanced` by
//! default), extracts a curvelet feature vector per image and writes one
//! CSV row per successfully processed image.
//!
//! Per-image failures are logged and skipped. A lost engine session, an
//! empty corpus or a run that produces no rows aborts the build.

mod builder;
mod corpus;
mod error;
mod summary;
mod table;

pub use builder::{BuildReport, BuilderConfig, DatasetBuilder, MismatchPolicy};
pub use corpus::{CorpusLayout, EntryOrder, ImageJob, Label};
pub use error::{BuildError, SampleError};
pub use summary::{FailureLog, FailureRecord, LabelCounts, RunSummary};
pub use table::{DatasetRow, DatasetTable, FEATURE_PREFIX};
