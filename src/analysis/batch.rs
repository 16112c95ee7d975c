//! Batch loops for the two analysis modes.
//!
//! Each file is read, parsed and analysed completely before the next one
//! starts. Per-file failures are recorded and never stop the batch.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use super::binning::{Distribution, DistributionBinner};
use super::overlay::SampleAggregator;
use crate::config::AnalysisConfig;
use crate::data::loader::load_file;
use crate::data::model::{MwAverageRow, SampleFile};
use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Progress and outcome
// ---------------------------------------------------------------------------

/// Reported once per finished file, successful or not.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub file: PathBuf,
}

impl BatchProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {:.2}%",
            self.completed,
            self.total,
            self.fraction() * 100.0
        )
    }
}

/// A file that could not be analysed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AnalysisError,
}

/// Results and failures of one batch run.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub results: T,
    pub failures: Vec<FileFailure>,
    /// Files processed before the run stopped.
    pub processed: usize,
    /// Set when the run was stopped before its last file.
    pub cancelled: bool,
}

impl<T> BatchOutcome<T> {
    /// Failed file names grouped by error kind.
    pub fn failure_summary(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut summary: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for f in &self.failures {
            summary
                .entry(f.error.kind())
                .or_default()
                .push(f.path.display().to_string());
        }
        summary
    }
}

/// Controls a batch run from the outside.
///
/// The progress callback must be cheap; it receives no way to influence the
/// pipeline. Cancellation is honoured between files only.
pub struct BatchControl<'a> {
    pub progress: &'a mut dyn FnMut(BatchProgress),
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> BatchControl<'a> {
    pub fn new(progress: &'a mut dyn FnMut(BatchProgress)) -> Self {
        Self {
            progress,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }
}

/// Drive `step` over `files`, collecting failures.
fn run_files<F>(
    files: &[PathBuf],
    control: &mut BatchControl<'_>,
    mut step: F,
) -> (Vec<FileFailure>, usize, bool)
where
    F: FnMut(&Path) -> AnalysisResult<()>,
{
    let mut failures = Vec::new();
    let mut processed = 0;
    let total = files.len();

    for path in files {
        if control.cancelled() {
            info!("batch cancelled after {processed}/{total} files");
            return (failures, processed, true);
        }
        if let Err(error) = step(path.as_path()) {
            warn!("skipping {}: {error}", path.display());
            failures.push(FileFailure {
                path: path.clone(),
                error,
            });
        }
        processed += 1;
        (control.progress)(BatchProgress {
            completed: processed,
            total,
            file: path.clone(),
        });
    }

    (failures, processed, false)
}

// ---------------------------------------------------------------------------
// Mode A: per-file distribution
// ---------------------------------------------------------------------------

/// Distribution analysis of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDistribution {
    pub file_name: String,
    /// File name without extension, used as plot title.
    pub title: String,
    pub sample_name: String,
    pub averages: Vec<MwAverageRow>,
    pub distribution: Distribution,
}

impl FileDistribution {
    /// `(Mn, Mw, PD)` for every MW-average row.
    pub fn summary(&self) -> Vec<[String; 3]> {
        self.averages
            .iter()
            .map(|r| {
                [r.mn(), r.mw(), r.pd()].map(|v| v.unwrap_or_default().to_string())
            })
            .collect()
    }
}

/// Bin one parsed file with the configured edges and bar width.
pub fn analyze_distribution(
    file: SampleFile,
    config: &AnalysisConfig,
) -> AnalysisResult<FileDistribution> {
    let binner = DistributionBinner::new(&config.edges.active(), config.settings.bar_width);
    let distribution = binner.bin(&file.file_name, &file.peaks)?;
    Ok(FileDistribution {
        title: file.stem().to_string(),
        file_name: file.file_name,
        sample_name: file.sample_name,
        averages: file.averages,
        distribution,
    })
}

pub fn run_distribution(
    files: &[PathBuf],
    config: &AnalysisConfig,
    control: &mut BatchControl<'_>,
) -> BatchOutcome<Vec<FileDistribution>> {
    let mut results = Vec::with_capacity(files.len());
    let (failures, processed, cancelled) = run_files(files, control, |path| {
        let parsed = load_file(path)?;
        results.push(analyze_distribution(parsed, config)?);
        Ok(())
    });
    info!(
        "distribution batch: {} ok, {} failed of {}",
        results.len(),
        failures.len(),
        files.len()
    );
    BatchOutcome {
        results,
        failures,
        processed,
        cancelled,
    }
}

// ---------------------------------------------------------------------------
// Mode B: multi-sample overlay
// ---------------------------------------------------------------------------

/// Parse every file and merge them by sample name. A file that fails to
/// parse contributes nothing.
pub fn run_overlay(
    files: &[PathBuf],
    control: &mut BatchControl<'_>,
) -> BatchOutcome<SampleAggregator> {
    let mut aggregator = SampleAggregator::new();
    let (failures, processed, cancelled) = run_files(files, control, |path| {
        aggregator.add(load_file(path)?);
        Ok(())
    });
    info!(
        "overlay batch: {} samples from {} files, {} failed",
        aggregator.len(),
        processed,
        failures.len()
    );
    BatchOutcome {
        results: aggregator,
        failures,
        processed,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_display() {
        let p = BatchProgress {
            completed: 1,
            total: 4,
            file: PathBuf::from("a.rst"),
        };
        assert_eq!(p.to_string(), "1/4 25.00%");
    }

    #[test]
    fn missing_files_do_not_stop_the_batch() {
        let files = vec![PathBuf::from("/nope/a.rst"), PathBuf::from("/nope/b.rst")];
        let mut seen = Vec::new();
        let mut progress = |p: BatchProgress| seen.push(p.completed);
        let mut control = BatchControl::new(&mut progress);
        let outcome = run_overlay(&files, &mut control);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.processed, 2);
        assert!(!outcome.cancelled);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failure_summary()["not found"].len(), 2);
        drop(control);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn cancellation_stops_before_next_file() {
        let files = vec![PathBuf::from("/nope/a.rst"), PathBuf::from("/nope/b.rst")];
        let flag = AtomicBool::new(true);
        let mut progress = |_: BatchProgress| {};
        let mut control = BatchControl::new(&mut progress).with_cancel(&flag);
        let outcome = run_distribution(&files, &AnalysisConfig::default(), &mut control);
        assert!(outcome.cancelled);
        assert_eq!(outcome.processed, 0);
        assert!(outcome.failures.is_empty());
    }
}
