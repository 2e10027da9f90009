// Evaluator - model selection and final evaluation for the KNN classifier
//
// Workflow:
// 1. Evaluator::new builds one stratified train/test split (seeded)
// 2. sweep_k trains on the train split for every candidate k and scores
//    it on the test split
// 3. cross_validate runs stratified k-fold on the train split only
// 4. evaluate_final scores a trained classifier on the test split

pub mod metrics;
pub mod split;

pub use metrics::{accuracy, confusion_matrix, AverageMetrics, ClassMetrics, EvaluationReport};
pub use split::{stratified_folds, stratified_split, EvaluationSplit, SplitSummary};

use serde::Serialize;

use crate::classifier::KnnClassifier;
use crate::config::EvaluationConfig;
use crate::dataset::LabeledDataset;
use crate::error::{log_evaluation_error, EvaluationError};
use crate::stats::mean_std;

/// Accuracy of every candidate k and the winner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KSweep {
    pub best_k: usize,
    pub best_accuracy: f64,
    /// (k, test accuracy) in candidate order
    pub accuracies: Vec<(usize, f64)>,
}

/// Stratified k-fold result on the training split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    pub k: usize,
    pub fold_accuracies: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of the fold accuracies
    pub std: f64,
}

/// Evaluation harness bound to one dataset and one split
pub struct Evaluator {
    split: EvaluationSplit,
    num_classes: usize,
    seed: u64,
    workers: usize,
}

impl Evaluator {
    /// Create an evaluator and its stratified split
    ///
    /// # Arguments
    /// * `dataset` - Labeled feature rows (read-only from here on)
    /// * `config` - Test fraction and seed
    pub fn new(dataset: &LabeledDataset, config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        let split = stratified_split(dataset, config.test_fraction, config.seed).map_err(|err| {
            log_evaluation_error(&err, "Evaluator::new");
            err
        })?;

        log::info!(
            "[Evaluator] Split {} samples: {} train / {} test",
            dataset.len(),
            split.train.len(),
            split.test.len()
        );

        Ok(Self {
            split,
            num_classes: dataset.num_classes(),
            seed: config.seed,
            workers: 1,
        })
    }

    /// Spread test-set prediction across `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn split(&self) -> &EvaluationSplit {
        &self.split
    }

    /// Per-class train/test counts
    pub fn split_summary(&self) -> SplitSummary {
        self.split.summary()
    }

    /// Classifier with `k` neighbors trained on the whole train split
    pub fn train_classifier(&self, k: usize) -> Result<KnnClassifier, EvaluationError> {
        let mut classifier = KnnClassifier::new(k)?;
        classifier.train_on(&self.split.train)?;
        Ok(classifier)
    }

    /// Score every candidate k on the test split
    ///
    /// Equal accuracies resolve to the smallest k.
    ///
    /// # Errors
    /// - `NoCandidates` for an empty candidate list
    /// - `Classifier(InvalidK)` when a candidate is zero
    pub fn sweep_k(&self, candidates: &[usize]) -> Result<KSweep, EvaluationError> {
        if candidates.is_empty() {
            let err = EvaluationError::NoCandidates;
            log_evaluation_error(&err, "sweep_k");
            return Err(err);
        }

        let mut accuracies = Vec::with_capacity(candidates.len());
        let mut best: Option<(usize, f64)> = None;
        for &k in candidates {
            let classifier = self.train_classifier(k)?;
            let predictions = self.predict_test(&classifier)?;
            let score = accuracy(self.split.test.labels(), &predictions);
            log::info!("[Evaluator] k={} test accuracy={:.4}", k, score);

            accuracies.push((k, score));
            let better = match best {
                None => true,
                Some((best_k, best_score)) => {
                    score > best_score || (score == best_score && k < best_k)
                }
            };
            if better {
                best = Some((k, score));
            }
        }

        let (best_k, best_accuracy) = best.ok_or(EvaluationError::NoCandidates)?;
        log::info!(
            "[Evaluator] Best k={} (accuracy {:.4})",
            best_k,
            best_accuracy
        );
        Ok(KSweep {
            best_k,
            best_accuracy,
            accuracies,
        })
    }

    /// Stratified `folds`-fold cross-validation on the train split
    ///
    /// # Errors
    /// `InvalidFolds` unless `2 <= folds <= train size`
    pub fn cross_validate(&self, k: usize, folds: usize) -> Result<CrossValidation, EvaluationError> {
        let train = &self.split.train;
        if folds < 2 || folds > train.len() {
            let err = EvaluationError::InvalidFolds {
                folds,
                samples: train.len(),
            };
            log_evaluation_error(&err, "cross_validate");
            return Err(err);
        }
        // Validate k before any fold work
        KnnClassifier::new(k)?;

        let assignment = stratified_folds(train, folds, self.seed);
        let mut fold_accuracies = Vec::with_capacity(folds);
        for (fold, held_out) in assignment.iter().enumerate() {
            let fit_indices: Vec<usize> = assignment
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != fold)
                .flat_map(|(_, indices)| indices.iter().copied())
                .collect();

            let fit = train.subset(&fit_indices);
            let validation = train.subset(held_out);

            let mut classifier = KnnClassifier::new(k)?;
            classifier.train_on(&fit)?;
            let predictions = classifier.predict_batch_parallel(validation.rows(), self.workers)?;
            let score = accuracy(validation.labels(), &predictions);
            log::debug!(
                "[Evaluator] CV fold {}/{}: {} held out, accuracy={:.4}",
                fold + 1,
                folds,
                validation.len(),
                score
            );
            fold_accuracies.push(score);
        }

        let (mean, std) = mean_std(&fold_accuracies);
        log::info!(
            "[Evaluator] {}-fold CV with k={}: {:.4} ± {:.4}",
            folds,
            k,
            mean,
            std
        );
        Ok(CrossValidation {
            k,
            fold_accuracies,
            mean,
            std,
        })
    }

    /// Score a trained classifier on the test split
    ///
    /// # Errors
    /// - `Classifier(NotTrained)` or `Classifier(DimensionMismatch)` from
    ///   prediction
    /// - `PredictionOutOfRange` when the classifier was trained on labels
    ///   this dataset does not have
    pub fn evaluate_final(
        &self,
        classifier: &KnnClassifier,
    ) -> Result<EvaluationReport, EvaluationError> {
        let predictions = self.predict_test(classifier)?;
        let report = EvaluationReport::from_predictions(
            self.split.test.labels(),
            &predictions,
            self.num_classes,
        );
        log::info!(
            "[Evaluator] Final accuracy {:.4} on {} test samples (macro F1 {:.4})",
            report.accuracy,
            report.total,
            report.macro_avg.f1
        );
        Ok(report)
    }

    fn predict_test(&self, classifier: &KnnClassifier) -> Result<Vec<usize>, EvaluationError> {
        let predictions = classifier.predict_batch_parallel(self.split.test.rows(), self.workers)?;
        if let Some(&label) = predictions.iter().find(|&&label| label >= self.num_classes) {
            let err = EvaluationError::PredictionOutOfRange {
                label,
                num_classes: self.num_classes,
            };
            log_evaluation_error(&err, "predict_test");
            return Err(err);
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;

    /// Four classes on a line, each a tight cluster of `per_class` points
    fn separable(per_class: usize) -> LabeledDataset {
        let mut dataset = LabeledDataset::new(4);
        for label in 0..4 {
            for i in 0..per_class {
                let jitter = i as f64 * 0.01;
                dataset
                    .push(vec![label as f64 * 10.0 + jitter, -jitter], label)
                    .unwrap();
            }
        }
        dataset
    }

    fn evaluator(dataset: &LabeledDataset) -> Evaluator {
        Evaluator::new(dataset, &EvaluationConfig::default()).unwrap()
    }

    #[test]
    fn test_split_summary() {
        let evaluator = evaluator(&separable(10));
        let summary = evaluator.split_summary();
        assert_eq!(summary.train_counts, vec![8, 8, 8, 8]);
        assert_eq!(summary.test_counts, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_sweep_prefers_smallest_k_on_ties() {
        let evaluator = evaluator(&separable(10));
        let sweep = evaluator.sweep_k(&[5, 1, 3]).unwrap();
        assert_eq!(sweep.best_k, 1);
        assert_eq!(sweep.best_accuracy, 1.0);
        assert_eq!(
            sweep.accuracies.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![5, 1, 3]
        );
    }

    #[test]
    fn test_sweep_errors() {
        let evaluator = evaluator(&separable(10));
        assert_eq!(
            evaluator.sweep_k(&[]).unwrap_err(),
            EvaluationError::NoCandidates
        );
        assert_eq!(
            evaluator.sweep_k(&[3, 0]).unwrap_err(),
            EvaluationError::Classifier(ClassifierError::InvalidK { k: 0 })
        );
    }

    #[test]
    fn test_cross_validation() {
        let evaluator = evaluator(&separable(10)).with_workers(2);
        let cv = evaluator.cross_validate(3, 4).unwrap();
        assert_eq!(cv.fold_accuracies.len(), 4);
        assert_eq!(cv.mean, 1.0);
        assert_eq!(cv.std, 0.0);

        assert!(matches!(
            evaluator.cross_validate(3, 1),
            Err(EvaluationError::InvalidFolds { folds: 1, .. })
        ));
        assert!(matches!(
            evaluator.cross_validate(3, 33),
            Err(EvaluationError::InvalidFolds { folds: 33, samples: 32 })
        ));
        assert!(evaluator.cross_validate(3, 32).is_ok());
    }

    #[test]
    fn test_evaluate_final() {
        let evaluator = evaluator(&separable(10));
        let classifier = evaluator.train_classifier(3).unwrap();
        let report = evaluator.evaluate_final(&classifier).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.total, 8);
        assert_eq!(report.confusion[2], vec![0, 0, 2, 0]);

        let untrained = KnnClassifier::new(3).unwrap();
        assert_eq!(
            evaluator.evaluate_final(&untrained).unwrap_err(),
            EvaluationError::Classifier(ClassifierError::NotTrained)
        );
    }

    #[test]
    fn test_foreign_labels_rejected() {
        let evaluator = evaluator(&separable(10));

        // Trained on a six-class dataset that only uses label 5
        let mut foreign = LabeledDataset::new(6);
        foreign.push(vec![0.0, 0.0], 5).unwrap();
        foreign.push(vec![30.0, 0.0], 5).unwrap();
        let mut classifier = KnnClassifier::new(1).unwrap();
        classifier.train_on(&foreign).unwrap();

        assert_eq!(
            evaluator.evaluate_final(&classifier).unwrap_err(),
            EvaluationError::PredictionOutOfRange {
                label: 5,
                num_classes: 4
            }
        );
    }
}
