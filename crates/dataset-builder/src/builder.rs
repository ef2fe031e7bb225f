//! Dataset Builder
//!
//! Drives every image of the corpus through the adapter and the feature
//! extractor, isolating per-image failures, and accumulates the rows of the
//! output table in enumeration order.

use crate::corpus::{CorpusLayout, ImageJob};
use crate::error::{BuildError, SampleError};
use crate::summary::{FailureLog, RunSummary};
use crate::table::{DatasetRow, DatasetTable};
use curvelet_features::{ExtractorConfig, FeatureExtractor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use transform_engine::{AdapterConfig, DecompositionAdapter, EngineError, TransformEngine};

/// What to do with a row whose feature count differs from the first row's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Abort the run
    #[default]
    FailFast,
    /// Record the image as failed and continue
    SkipRow,
}

/// Builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Corpus location and enumeration order
    pub corpus: CorpusLayout,
    /// Image normalization and engine parameters
    pub adapter: AdapterConfig,
    /// Feature extractor settings
    pub extractor: ExtractorConfig,
    /// Row length mismatch handling
    pub mismatch_policy: MismatchPolicy,
    /// Log progress every N images (0 disables)
    pub progress_every: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusLayout::default(),
            adapter: AdapterConfig::default(),
            extractor: ExtractorConfig::default(),
            mismatch_policy: MismatchPolicy::FailFast,
            progress_every: 100,
        }
    }
}

impl BuilderConfig {
    /// Default settings for the corpus at `root`
    pub fn for_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            corpus: CorpusLayout::new(root),
            ..Default::default()
        }
    }
}

/// Result of a completed build
#[derive(Debug)]
pub struct BuildReport {
    pub table: DatasetTable,
    pub failures: FailureLog,
    pub summary: RunSummary,
}

type Outcome = Result<DatasetRow, SampleError>;

/// Folds per-image outcomes into the table, in enumeration order
struct Accumulator {
    policy: MismatchPolicy,
    progress_every: usize,
    total: usize,
    table: DatasetTable,
    failures: FailureLog,
    summary: RunSummary,
}

impl Accumulator {
    fn new(config: &BuilderConfig, total: usize) -> Self {
        Self {
            policy: config.mismatch_policy,
            progress_every: config.progress_every,
            total,
            table: DatasetTable::new(),
            failures: FailureLog::new(),
            summary: RunSummary::begin(),
        }
    }

    fn accept(&mut self, job: &ImageJob, outcome: Outcome) -> Result<(), BuildError> {
        match outcome {
            Ok(row) => {
                let frame = row.frame_name.clone();
                let first = self.table.is_empty();
                match self.table.push(row) {
                    Ok(()) => {
                        if first {
                            info!(
                                "Feature columns fixed at {} by {}",
                                self.table.feature_columns().unwrap_or(0),
                                frame
                            );
                        }
                        self.summary.record_success(job.label);
                    }
                    Err(SampleError::LengthMismatch { expected, actual })
                        if self.policy == MismatchPolicy::FailFast =>
                    {
                        error!(
                            "Feature length mismatch for {}: expected {}, got {}",
                            frame, expected, actual
                        );
                        return Err(BuildError::LengthMismatch {
                            frame,
                            expected,
                            actual,
                        });
                    }
                    Err(e) => self.fail(job, &e),
                }
            }
            Err(SampleError::Adapter(e)) if e.is_fatal() => {
                error!("Transform engine lost while processing {}: {}", job.file_name(), e);
                return Err(BuildError::EngineUnavailable {
                    file: job.file_name(),
                    source: e,
                });
            }
            Err(e) => self.fail(job, &e),
        }

        let done = self.summary.attempted;
        if self.progress_every > 0 && done % self.progress_every == 0 {
            info!(
                "Processed {}/{} images ({} failed)",
                done, self.total, self.summary.failed
            );
        }
        Ok(())
    }

    fn fail(&mut self, job: &ImageJob, error: &SampleError) {
        self.failures.record(job.file_name(), job.label, error);
        self.summary.record_failure(job.label);
    }

    fn finish(mut self) -> Result<BuildReport, BuildError> {
        if self.table.is_empty() {
            return Err(BuildError::NoRows {
                attempted: self.summary.attempted,
            });
        }
        self.summary
            .finish(self.table.feature_columns(), &self.failures);

        info!(
            "Build complete: attempted={}, succeeded={}, failed={} in {} ms",
            self.summary.attempted,
            self.summary.succeeded,
            self.summary.failed,
            self.summary.elapsed_ms()
        );

        Ok(BuildReport {
            table: self.table,
            failures: self.failures,
            summary: self.summary,
        })
    }
}

/// Turns a labeled corpus into a feature table
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    config: BuilderConfig,
    adapter: DecompositionAdapter,
    extractor: FeatureExtractor,
}

impl DatasetBuilder {
    /// Create a new builder
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            adapter: DecompositionAdapter::new(config.adapter.clone()),
            extractor: FeatureExtractor::new(config.extractor.clone()),
            config,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Run one image through the adapter and the extractor
    pub fn process<E>(&self, engine: &mut E, job: &ImageJob) -> Result<DatasetRow, SampleError>
    where
        E: TransformEngine + ?Sized,
    {
        let decomposition = self.adapter.decompose_file(engine, &job.path)?;
        let features = self.extractor.extract(&decomposition)?;
        Ok(DatasetRow {
            frame_name: job.frame_name(),
            label: job.label,
            features,
        })
    }

    /// Build the table sequentially on one engine session
    pub fn build<E>(&self, engine: &mut E) -> Result<BuildReport, BuildError>
    where
        E: TransformEngine + ?Sized,
    {
        let jobs = self.config.corpus.enumerate()?;
        info!("Processing {} images with {}", jobs.len(), engine.name());

        let mut acc = Accumulator::new(&self.config, jobs.len());
        for job in &jobs {
            let outcome = self.process(engine, job);
            acc.accept(job, outcome)?;
        }
        acc.finish()
    }

    /// Build the table and write it to `output`
    pub fn run<E>(&self, engine: &mut E, output: &Path) -> Result<BuildReport, BuildError>
    where
        E: TransformEngine + ?Sized,
    {
        let mut report = self.build(engine)?;
        report.table.write_csv(output)?;
        report.summary.output = Some(output.to_path_buf());
        Ok(report)
    }

    /// Build the table with `workers` blocking tasks, each holding its own
    /// engine session from `factory`.
    ///
    /// Outcomes are folded in enumeration order, so the result matches
    /// `build` for a deterministic engine.
    pub async fn build_concurrent<E, F>(&self, workers: usize, factory: F) -> Result<BuildReport, BuildError>
    where
        E: TransformEngine + 'static,
        F: Fn() -> Result<E, EngineError> + Send + Sync + 'static,
    {
        let jobs = self.config.corpus.enumerate()?;
        let workers = workers.clamp(1, jobs.len());
        info!("Processing {} images with {} workers", jobs.len(), workers);

        let mut partitions: Vec<Vec<ImageJob>> = vec![Vec::new(); workers];
        for job in &jobs {
            partitions[job.index % workers].push(job.clone());
        }

        let builder = Arc::new(self.clone());
        let factory = Arc::new(factory);
        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(Progress::new(jobs.len(), self.config.progress_every));
        let mut handles = Vec::with_capacity(workers);
        for (worker, partition) in partitions.into_iter().enumerate() {
            let builder = Arc::clone(&builder);
            let factory = Arc::clone(&factory);
            let cancel = Arc::clone(&cancel);
            let progress = Arc::clone(&progress);
            handles.push(tokio::task::spawn_blocking(move || {
                builder.process_partition::<E, F>(worker, partition, factory.as_ref(), &cancel, &progress)
            }));
        }

        // Every handle is awaited so no worker outlives the call
        let mut outcomes: Vec<Option<Outcome>> = (0..jobs.len()).map(|_| None).collect();
        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(results)) => {
                    for (index, outcome) in results {
                        outcomes[index] = Some(outcome);
                    }
                }
                Ok(Err(e)) => {
                    cancel.store(true, Ordering::Relaxed);
                    first_error.get_or_insert(BuildError::EngineStart(e));
                }
                Err(e) => {
                    cancel.store(true, Ordering::Relaxed);
                    first_error.get_or_insert(BuildError::Worker(e.to_string()));
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let mut acc = Accumulator::new(&self.config, jobs.len());
        acc.progress_every = 0;
        let mut pending = jobs.iter().zip(outcomes);
        while let Some((job, outcome)) = pending.next() {
            match outcome {
                Some(outcome) => acc.accept(job, outcome)?,
                None => return Err(cancellation_cause(job, pending)),
            }
        }
        acc.finish()
    }

    fn process_partition<E, F>(
        &self,
        worker: usize,
        jobs: Vec<ImageJob>,
        factory: &F,
        cancel: &AtomicBool,
        progress: &Progress,
    ) -> Result<Vec<(usize, Outcome)>, EngineError>
    where
        E: TransformEngine,
        F: Fn() -> Result<E, EngineError>,
    {
        let mut engine = factory().map_err(|e| {
            cancel.store(true, Ordering::Relaxed);
            e
        })?;
        let mut results = Vec::with_capacity(jobs.len());

        for job in &jobs {
            if cancel.load(Ordering::Relaxed) {
                debug!("Worker {} cancelled", worker);
                break;
            }
            let outcome = self.process(&mut engine, job);
            let fatal = matches!(&outcome, Err(e) if e.is_fatal());
            results.push((job.index, outcome));
            progress.tick();
            if fatal {
                warn!("Worker {} stopping: engine session lost", worker);
                cancel.store(true, Ordering::Relaxed);
                break;
            }
        }

        if let Err(e) = engine.shutdown() {
            warn!("Worker {} engine shutdown failed: {}", worker, e);
        }
        Ok(results)
    }
}

/// Images processed across all workers
struct Progress {
    done: AtomicUsize,
    total: usize,
    every: usize,
}

impl Progress {
    fn new(total: usize, every: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
            every,
        }
    }

    /// Count one image; returns the count when a progress line was logged
    fn tick(&self) -> Option<usize> {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.every > 0 && (done % self.every == 0 || done == self.total) {
            info!("Processed {}/{} images", done, self.total);
            return Some(done);
        }
        None
    }
}

/// Error for a run whose workers were cancelled before reaching `missing`:
/// the first fatal outcome after it, if any.
fn cancellation_cause<'a>(
    missing: &ImageJob,
    rest: impl Iterator<Item = (&'a ImageJob, Option<Outcome>)>,
) -> BuildError {
    for (job, outcome) in rest {
        if let Some(Err(SampleError::Adapter(e))) = outcome {
            if e.is_fatal() {
                return BuildError::EngineUnavailable {
                    file: job.file_name(),
                    source: e,
                };
            }
        }
    }
    BuildError::Worker(format!("no outcome for {}", missing.file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{EntryOrder, Label};
    use image::{GrayImage, Luma};
    use ndarray::Array2;
    use std::fs;
    use transform_engine::{Decomposition, FixedEngine, Scale, Wedge};

    fn corpus(authentic: &[&str], synthetic: &[&str]) -> (tempfile::TempDir, BuilderConfig) {
        let root = tempfile::tempdir().unwrap();
        let mut config = BuilderConfig::for_root(root.path());
        config.corpus.order = EntryOrder::Name;
        config.adapter.canonical_size = 16;

        for (label, names) in [(Label::Authentic, authentic), (Label::Synthetic, synthetic)] {
            let dir = config.corpus.label_dir(label);
            fs::create_dir_all(&dir).unwrap();
            for name in names.iter() {
                GrayImage::from_pixel(8, 8, Luma([100])).save(dir.join(name)).unwrap();
            }
        }
        (root, config)
    }

    fn decomposition(layout: &[usize]) -> Decomposition {
        layout
            .iter()
            .map(|&n| {
                Scale::new(
                    (0..n)
                        .map(|w| Wedge::from_real(Array2::from_elem((2, 2), w as f64 + 1.0)))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_engine_failure_skips_image() {
        let (_root, config) = corpus(&["a.png", "b.png"], &["c.png"]);
        let builder = DatasetBuilder::new(config);
        let mut engine = FixedEngine::scripted(vec![
            Ok(decomposition(&[1, 2])),
            Err(EngineError::Rejected("bad input".into())),
            Ok(decomposition(&[1, 2])),
        ]);

        let report = builder.build(&mut engine).unwrap();
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures.records()[0].file, "b.png");
        assert_eq!(report.summary.counts(Label::Authentic).failed, 1);
    }

    #[test]
    fn test_lost_session_is_fatal() {
        let (_root, config) = corpus(&["a.png", "b.png"], &["c.png"]);
        let builder = DatasetBuilder::new(config);
        let mut engine = FixedEngine::scripted(vec![Ok(decomposition(&[1, 2]))]);

        let err = builder.build(&mut engine).unwrap_err();
        assert!(matches!(err, BuildError::EngineUnavailable { ref file, .. } if file == "b.png"));
    }

    #[test]
    fn test_length_mismatch_fail_fast() {
        let (_root, config) = corpus(&["a.png"], &["b.png"]);
        let builder = DatasetBuilder::new(config);
        // 3 wedges (odd) then 4 wedges (even): symmetry term appears
        let mut engine = FixedEngine::scripted(vec![
            Ok(decomposition(&[1, 2])),
            Ok(decomposition(&[1, 3])),
        ]);

        let err = builder.build(&mut engine).unwrap_err();
        assert!(matches!(
            err,
            BuildError::LengthMismatch {
                expected: 8,
                actual: 9,
                ..
            }
        ));
    }

    #[test]
    fn test_length_mismatch_skip_row() {
        let (_root, mut config) = corpus(&["a.png"], &["b.png", "c.png"]);
        config.mismatch_policy = MismatchPolicy::SkipRow;
        let builder = DatasetBuilder::new(config);
        let mut engine = FixedEngine::scripted(vec![
            Ok(decomposition(&[1, 2])),
            Ok(decomposition(&[1, 3])),
            Ok(decomposition(&[2, 1])),
        ]);

        let report = builder.build(&mut engine).unwrap();
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.table.feature_columns(), Some(8));
        assert_eq!(report.summary.failed, 1);
        assert!(report.failures.records()[0].error.contains("mismatch"));
    }

    #[test]
    fn test_progress_logs_every_n_and_at_end() {
        let progress = Progress::new(5, 2);
        let logged: Vec<Option<usize>> = (0..5).map(|_| progress.tick()).collect();
        assert_eq!(logged, vec![None, Some(2), None, Some(4), Some(5)]);

        let silent = Progress::new(3, 0);
        assert!((0..3).all(|_| silent.tick().is_none()));
    }

    #[test]
    fn test_cancellation_reports_later_fatal_outcome() {
        let job = |index: usize, name: &str| ImageJob {
            index,
            label: Label::Authentic,
            path: std::path::PathBuf::from(name),
        };
        let jobs = [job(0, "a.png"), job(1, "b.png"), job(2, "c.png")];
        let lost = SampleError::Adapter(transform_engine::AdapterError::Transform(
            EngineError::Unavailable("gone".into()),
        ));
        let rest = vec![(&jobs[1], None), (&jobs[2], Some(Err(lost)))];

        let err = cancellation_cause(&jobs[0], rest.into_iter());
        assert!(matches!(err, BuildError::EngineUnavailable { ref file, .. } if file == "c.png"));

        let err = cancellation_cause(&jobs[0], std::iter::empty());
        assert!(matches!(err, BuildError::Worker(_)));
    }

    #[test]
    fn test_no_rows_is_fatal() {
        let (_root, config) = corpus(&["a.png"], &["b.png"]);
        let builder = DatasetBuilder::new(config);
        let mut engine = FixedEngine::new(Decomposition::default());

        let err = builder.build(&mut engine).unwrap_err();
        assert!(matches!(err, BuildError::NoRows { attempted: 2 }));
    }
}
