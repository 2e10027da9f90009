// Classifier - k-nearest-neighbors over labeled feature rows
//
// Training copies the rows into an immutable KnnModel; prediction ranks
// every training row by Euclidean distance to the query and takes a
// majority vote among the k nearest.
//
// Tie policies:
// - equal distances: lower training index ranks first
// - k larger than the training set: all rows vote
// - equal vote counts: the tied label owning the nearest neighbor wins

use std::thread;

use crate::dataset::LabeledDataset;
use crate::error::{log_classifier_error, ClassifierError};

/// One ranked training row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the row in the training set
    pub index: usize,
    pub label: usize,
    pub distance: f64,
}

/// Trained KNN state: an owned copy of the training set
#[derive(Debug, Clone, PartialEq)]
pub struct KnnModel {
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
    k: usize,
    dimension: usize,
}

impl KnnModel {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of training rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `min(k, len)` nearest training rows, closest first
    pub fn neighbors(&self, query: &[f64]) -> Result<Vec<Neighbor>, ClassifierError> {
        if query.len() != self.dimension {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut ranked: Vec<Neighbor> = self
            .rows
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(index, (row, &label))| Neighbor {
                index,
                label,
                distance: euclidean_distance(row, query),
            })
            .collect();

        // Stable sort keeps training order among equal distances
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(self.k.min(self.rows.len()));
        Ok(ranked)
    }

    /// Majority label among the nearest neighbors
    pub fn predict(&self, query: &[f64]) -> Result<usize, ClassifierError> {
        let neighbors = self.neighbors(query)?;
        Ok(majority_vote(&neighbors))
    }
}

/// Majority vote over neighbors sorted closest first
///
/// Among labels with the highest count, the one seen first (i.e. owning the
/// closest neighbor) wins.
fn majority_vote(neighbors: &[Neighbor]) -> usize {
    // (label, votes) in order of first appearance
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for neighbor in neighbors {
        match tally.iter_mut().find(|(label, _)| *label == neighbor.label) {
            Some((_, votes)) => *votes += 1,
            None => tally.push((neighbor.label, 1)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for &(label, votes) in &tally {
        if best.map_or(true, |(_, best_votes)| votes > best_votes) {
            best = Some((label, votes));
        }
    }
    best.map(|(label, _)| label).unwrap_or(0)
}

/// Euclidean distance between two rows of equal length
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// K-nearest-neighbors classifier
///
/// Untrained until [`KnnClassifier::train`] succeeds; retraining replaces the
/// model entirely.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    model: Option<KnnModel>,
}

impl KnnClassifier {
    /// Create an untrained classifier
    ///
    /// # Errors
    /// `ClassifierError::InvalidK` when `k` is zero
    pub fn new(k: usize) -> Result<Self, ClassifierError> {
        if k == 0 {
            let err = ClassifierError::InvalidK { k };
            log_classifier_error(&err, "new");
            return Err(err);
        }
        Ok(Self { k, model: None })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&KnnModel> {
        self.model.as_ref()
    }

    /// Train on parallel rows and labels
    ///
    /// # Errors
    /// - `EmptyTrainingSet` when `rows` is empty
    /// - `LengthMismatch` when row and label counts differ
    /// - `DimensionMismatch` when rows have different lengths
    pub fn train(&mut self, rows: &[Vec<f64>], labels: &[usize]) -> Result<(), ClassifierError> {
        let result = build_model(rows, labels, self.k);
        match result {
            Ok(model) => {
                log::debug!(
                    "[KnnClassifier] Trained k={} on {} rows of dimension {}",
                    self.k,
                    model.len(),
                    model.dimension()
                );
                self.model = Some(model);
                Ok(())
            }
            Err(err) => {
                log_classifier_error(&err, "train");
                Err(err)
            }
        }
    }

    /// Train on every row of a dataset
    pub fn train_on(&mut self, dataset: &LabeledDataset) -> Result<(), ClassifierError> {
        self.train(dataset.rows(), dataset.labels())
    }

    /// Predict the label of one query row
    ///
    /// # Errors
    /// - `NotTrained` before a successful `train`
    /// - `DimensionMismatch` when the query length differs from the training rows
    pub fn predict(&self, query: &[f64]) -> Result<usize, ClassifierError> {
        let result = self
            .trained_model()
            .and_then(|model| model.predict(query));
        if let Err(err) = &result {
            log_classifier_error(err, "predict");
        }
        result
    }

    /// Predict every query in order
    pub fn predict_batch(&self, queries: &[Vec<f64>]) -> Result<Vec<usize>, ClassifierError> {
        queries.iter().map(|query| self.predict(query)).collect()
    }

    /// Predict every query, spreading contiguous chunks across `workers` threads
    ///
    /// Output order matches input order. `workers` is clamped to
    /// `1..=queries.len()`.
    pub fn predict_batch_parallel(
        &self,
        queries: &[Vec<f64>],
        workers: usize,
    ) -> Result<Vec<usize>, ClassifierError> {
        let workers = workers.clamp(1, queries.len().max(1));
        if workers == 1 {
            return self.predict_batch(queries);
        }

        let chunk_size = queries.len().div_ceil(workers);
        let chunk_results: Vec<Result<Vec<usize>, ClassifierError>> = thread::scope(|scope| {
            let handles: Vec<_> = queries
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.predict_batch(chunk)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        let mut predictions = Vec::with_capacity(queries.len());
        for chunk in chunk_results {
            predictions.extend(chunk?);
        }
        Ok(predictions)
    }

    fn trained_model(&self) -> Result<&KnnModel, ClassifierError> {
        self.model.as_ref().ok_or(ClassifierError::NotTrained)
    }
}

fn build_model(rows: &[Vec<f64>], labels: &[usize], k: usize) -> Result<KnnModel, ClassifierError> {
    if rows.is_empty() {
        return Err(ClassifierError::EmptyTrainingSet);
    }
    if rows.len() != labels.len() {
        return Err(ClassifierError::LengthMismatch {
            features: rows.len(),
            labels: labels.len(),
        });
    }
    let dimension = rows[0].len();
    if let Some(row) = rows.iter().find(|row| row.len() != dimension) {
        return Err(ClassifierError::DimensionMismatch {
            expected: dimension,
            actual: row.len(),
        });
    }

    Ok(KnnModel {
        rows: rows.to_vec(),
        labels: labels.to_vec(),
        k,
        dimension,
    })
}

#[cfg(test)]
mod tests;
