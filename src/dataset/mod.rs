// Dataset module - labeled feature rows and their collaborators
//
// - LabeledDataset: rows + integer labels, validated on insertion
// - ClassLabelMap: class name ↔ code bijection
// - manifest: which files belong to which class
// - cache: JSON persistence of extracted features

pub mod cache;
pub mod labels;
pub mod manifest;

pub use cache::FeatureCache;
pub use labels::ClassLabelMap;
pub use manifest::{discover_by_filename, DatasetManifest, ManifestEntry};

use crate::error::DatasetError;

/// Ordered collection of (feature row, label) pairs
///
/// Invariants: every label is `< num_classes` and every row has the same
/// dimension (fixed by the first row pushed).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
    num_classes: usize,
}

impl LabeledDataset {
    pub fn new(num_classes: usize) -> Self {
        Self {
            rows: Vec::new(),
            labels: Vec::new(),
            num_classes,
        }
    }

    /// Build a dataset from parallel rows and labels, validating every pair
    ///
    /// # Errors
    /// `DatasetError::LengthMismatch` when the slices differ in length, plus
    /// everything `push` reports
    pub fn from_parts(
        rows: Vec<Vec<f64>>,
        labels: Vec<usize>,
        num_classes: usize,
    ) -> Result<Self, DatasetError> {
        if rows.len() != labels.len() {
            return Err(DatasetError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        let mut dataset = Self::new(num_classes);
        for (row, label) in rows.into_iter().zip(labels) {
            dataset.push(row, label)?;
        }
        Ok(dataset)
    }

    /// Append one labeled row
    ///
    /// # Errors
    /// - `DatasetError::LabelOutOfRange` when `label >= num_classes`
    /// - `DatasetError::InconsistentDimension` when the row length differs
    ///   from the rows already stored
    pub fn push(&mut self, row: Vec<f64>, label: usize) -> Result<(), DatasetError> {
        if label >= self.num_classes {
            return Err(DatasetError::LabelOutOfRange {
                label,
                num_classes: self.num_classes,
            });
        }
        if let Some(dim) = self.dimension() {
            if row.len() != dim {
                return Err(DatasetError::InconsistentDimension {
                    expected: dim,
                    actual: row.len(),
                });
            }
        }
        self.rows.push(row);
        self.labels.push(label);
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row dimension, `None` while the dataset is empty
    pub fn dimension(&self) -> Option<usize> {
        self.rows.first().map(Vec::len)
    }

    /// Number of rows per class code
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Copy the rows at `indices` (in that order) into a new dataset
    ///
    /// Indices out of range are skipped.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut subset = Self::new(self.num_classes);
        for &i in indices {
            if let (Some(row), Some(&label)) = (self.rows.get(i), self.labels.get(i)) {
                subset.rows.push(row.clone());
                subset.labels.push(label);
            }
        }
        subset
    }
}
