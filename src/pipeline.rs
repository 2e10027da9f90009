// Batch pipeline - manifest of labeled files → LabeledDataset
//
// Files are processed independently: a file that fails to load is logged,
// recorded in BatchOutcome::failures and skipped, and the batch carries on.
// Workers pull the next file index from a shared atomic counter, and rows
// are assembled in manifest order afterwards, so the dataset does not
// depend on the worker count.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::features::FeatureVector;
use crate::analysis::Preprocessor;
use crate::classifier::KnnClassifier;
use crate::dataset::{discover_by_filename, ClassLabelMap, DatasetManifest, LabeledDataset};
use crate::error::{AudioError, DatasetError};

/// Progress is logged every this many files
const PROGRESS_INTERVAL: usize = 5;

/// Result of a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub dataset: LabeledDataset,
    /// Source file of every dataset row, same order
    pub paths: Vec<PathBuf>,
    /// Files that could not be processed
    pub failures: Vec<(PathBuf, AudioError)>,
}

/// Runs the preprocessor over every file of a manifest
pub struct BatchProcessor<'a> {
    preprocessor: &'a Preprocessor,
    classes: &'a ClassLabelMap,
    workers: usize,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(preprocessor: &'a Preprocessor, classes: &'a ClassLabelMap) -> Self {
        Self {
            preprocessor,
            classes,
            workers: 1,
        }
    }

    /// Process files on `workers` threads (at least 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Discover labeled `.wav` files in `dir` by name and process them
    pub fn process_directory<P: AsRef<Path>>(&self, dir: P) -> Result<BatchOutcome, DatasetError> {
        let manifest = discover_by_filename(dir, self.classes)?;
        self.process_manifest(&manifest)
    }

    /// Extract features for every manifest entry
    ///
    /// # Errors
    /// - `DatasetError::EmptyDataset` when the manifest has no entries
    /// - `DatasetError::UnknownClass` when an entry names an unknown class
    ///
    /// Per-file audio errors never fail the batch; see `BatchOutcome::failures`.
    pub fn process_manifest(&self, manifest: &DatasetManifest) -> Result<BatchOutcome, DatasetError> {
        let jobs = manifest.resolve(self.classes)?;
        if jobs.is_empty() {
            log::warn!("[BatchProcessor] Manifest has no labeled entries");
            return Err(DatasetError::EmptyDataset);
        }

        self.log_class_distribution(&jobs);
        let span = tracing::info_span!("batch", files = jobs.len(), workers = self.workers);
        let _guard = span.enter();

        let results = self.run_jobs(&jobs);

        let mut dataset = LabeledDataset::new(self.classes.len());
        let mut paths = Vec::with_capacity(jobs.len());
        let mut failures = Vec::new();
        for ((path, label), result) in jobs.into_iter().zip(results) {
            match result {
                Ok(features) => {
                    dataset.push(features.into_vec(), label)?;
                    paths.push(path);
                }
                Err(err) => failures.push((path, err)),
            }
        }

        tracing::info!(
            "[BatchProcessor] Extracted {} feature vectors ({} failed)",
            dataset.len(),
            failures.len()
        );
        if !failures.is_empty() {
            log::warn!(
                "[BatchProcessor] {} files could not be processed:",
                failures.len()
            );
            for (path, err) in &failures {
                log::warn!("[BatchProcessor]   {}: {}", path.display(), err);
            }
        }

        Ok(BatchOutcome {
            dataset,
            paths,
            failures,
        })
    }

    fn run_jobs(&self, jobs: &[(PathBuf, usize)]) -> Vec<Result<FeatureVector, AudioError>> {
        let total = jobs.len();
        let next = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<Result<FeatureVector, AudioError>>>> =
            Mutex::new((0..total).map(|_| None).collect());

        let worker = || loop {
            let index = next.fetch_add(1, Ordering::Relaxed);
            if index >= total {
                break;
            }
            let path = &jobs[index].0;
            let result = self.preprocessor.process_file(path);

            match slots.lock() {
                Ok(mut slots) => slots[index] = Some(result),
                Err(poisoned) => poisoned.into_inner()[index] = Some(result),
            }

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                log::info!("[BatchProcessor] Processed {}/{} files", done, total);
            }
        };

        let workers = self.workers.min(total);
        if workers <= 1 {
            worker();
        } else {
            thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(&worker);
                }
            });
        }

        let slots = slots.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .into_iter()
            .zip(jobs)
            .map(|(slot, (path, _))| {
                slot.unwrap_or_else(|| {
                    Err(AudioError::LoadFailed {
                        path: path.display().to_string(),
                        reason: "worker did not process file".to_string(),
                    })
                })
            })
            .collect()
    }

    fn log_class_distribution(&self, jobs: &[(PathBuf, usize)]) {
        let mut counts = vec![0usize; self.classes.len()];
        for (_, label) in jobs {
            counts[*label] += 1;
        }
        log::info!("[BatchProcessor] {} labeled files:", jobs.len());
        for (code, count) in counts.iter().enumerate() {
            log::info!(
                "[BatchProcessor]   {}: {} files",
                self.classes.name(code).unwrap_or("?"),
                count
            );
        }
    }
}

/// Prediction for one new clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipPrediction {
    pub path: PathBuf,
    pub label: usize,
    pub class_name: String,
    /// Class whose name appears in the file name, if any
    pub filename_guess: Option<String>,
}

/// Extract features from `path` and classify them
pub fn predict_clip<P: AsRef<Path>>(
    preprocessor: &Preprocessor,
    classifier: &KnnClassifier,
    classes: &ClassLabelMap,
    path: P,
) -> Result<ClipPrediction> {
    let path = path.as_ref();
    let features = preprocessor
        .process_file(path)
        .with_context(|| format!("extracting features from {}", path.display()))?;
    let label = classifier
        .predict(features.as_slice())
        .with_context(|| format!("classifying {}", path.display()))?;

    let class_name = classes
        .name(label)
        .map(str::to_string)
        .with_context(|| format!("predicted label {} has no class name", label))?;
    let filename_guess = classes
        .guess_from_filename(path)
        .and_then(|code| classes.name(code))
        .map(str::to_string);

    Ok(ClipPrediction {
        path: path.to_path_buf(),
        label,
        class_name,
        filename_guess,
    })
}
