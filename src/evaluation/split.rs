// Stratified train/test split and stratified k-fold assignment
//
// Test slots are allocated per class by largest remainder so that every
// class's test count is within one sample of its exact proportion. Which
// samples fill those slots is decided by a seeded shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::dataset::LabeledDataset;
use crate::error::{DatasetError, EvaluationError};

/// Stratified partition of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSplit {
    /// Indices into the source dataset, ascending
    pub train_indices: Vec<usize>,
    /// Indices into the source dataset, ascending
    pub test_indices: Vec<usize>,
    pub train: LabeledDataset,
    pub test: LabeledDataset,
}

/// Per-class sample counts of a split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub train_counts: Vec<usize>,
    pub test_counts: Vec<usize>,
}

impl EvaluationSplit {
    pub fn summary(&self) -> SplitSummary {
        SplitSummary {
            train_counts: self.train.class_counts(),
            test_counts: self.test.class_counts(),
        }
    }
}

/// Number of test samples for `n` samples at `test_fraction`
///
/// `ceil(test_fraction * n)`, with a small tolerance so that products such as
/// `0.1 * 30 = 3.0000000000000004` are not rounded up.
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    ((test_fraction * n as f64) - 1e-9).ceil().max(0.0) as usize
}

/// Per-class test counts by largest remainder
///
/// Each class gets between one test sample and all but one of its samples
/// (a single-sample class stays in train). Within those bounds the floor
/// shares are topped up by largest remainder, ties going to the lower class
/// code, or trimmed from the smallest remainder when the floors of one
/// overshoot `n_test`.
pub fn allocate_test_counts(class_counts: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = class_counts.iter().sum();
    if n == 0 {
        return vec![0; class_counts.len()];
    }

    let bounds: Vec<(usize, usize)> = class_counts
        .iter()
        .map(|&c| {
            let most = c.saturating_sub(1);
            (most.min(1), most)
        })
        .collect();
    let mut allocation: Vec<usize> = class_counts
        .iter()
        .zip(&bounds)
        .map(|(&c, &(least, most))| (n_test * c / n).clamp(least, most))
        .collect();
    let mut order: Vec<(usize, usize)> = class_counts
        .iter()
        .enumerate()
        .map(|(code, &c)| (code, (n_test * c) % n))
        .collect();
    // Stable: equal remainders keep ascending class order
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let mut assigned: usize = allocation.iter().sum();
    while assigned < n_test {
        let before = assigned;
        for &(code, _) in &order {
            if assigned == n_test {
                break;
            }
            if allocation[code] < bounds[code].1 {
                allocation[code] += 1;
                assigned += 1;
            }
        }
        if assigned == before {
            break;
        }
    }
    while assigned > n_test {
        let before = assigned;
        for &(code, _) in order.iter().rev() {
            if assigned == n_test {
                break;
            }
            if allocation[code] > bounds[code].0 {
                allocation[code] -= 1;
                assigned -= 1;
            }
        }
        if assigned == before {
            break;
        }
    }
    allocation
}

/// Split `dataset` into stratified train and test subsets
///
/// # Errors
/// - `InvalidTestFraction` unless `0 < test_fraction < 1`
/// - `Dataset(EmptyDataset)` for an empty dataset
/// - `InsufficientSamples` when the test or train side would hold fewer
///   samples than there are classes present
/// - `ClassTooSmall` when a class has a single sample, which cannot appear
///   on both sides
pub fn stratified_split(
    dataset: &LabeledDataset,
    test_fraction: f64,
    seed: u64,
) -> Result<EvaluationSplit, EvaluationError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(EvaluationError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }
    if dataset.is_empty() {
        return Err(DatasetError::EmptyDataset.into());
    }

    let n = dataset.len();
    let class_counts = dataset.class_counts();
    let classes_present = class_counts.iter().filter(|&&c| c > 0).count();
    let n_test = test_size(n, test_fraction);
    if n_test < classes_present || n - n_test < classes_present {
        return Err(EvaluationError::InsufficientSamples {
            samples: n,
            classes: classes_present,
            test_samples: n_test,
        });
    }
    if let Some(label) = class_counts.iter().position(|&c| c == 1) {
        return Err(EvaluationError::ClassTooSmall { label, samples: 1 });
    }

    let test_counts = allocate_test_counts(&class_counts, n_test);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(n - n_test);
    let mut test_indices = Vec::with_capacity(n_test);

    for (code, members) in indices_by_class(dataset).into_iter().enumerate() {
        let mut members = members;
        members.shuffle(&mut rng);
        let (test, train) = members.split_at(test_counts[code]);
        test_indices.extend_from_slice(test);
        train_indices.extend_from_slice(train);
    }
    train_indices.sort_unstable();
    test_indices.sort_unstable();

    log::debug!(
        "[Split] {} samples → {} train / {} test (fraction {}, seed {})",
        n,
        train_indices.len(),
        test_indices.len(),
        test_fraction,
        seed
    );

    Ok(EvaluationSplit {
        train: dataset.subset(&train_indices),
        test: dataset.subset(&test_indices),
        train_indices,
        test_indices,
    })
}

/// Assign every sample of `dataset` to one of `folds` stratified folds
///
/// Each class's indices are shuffled, the classes are concatenated in code
/// order, and position `j` of that sequence goes to fold `j % folds`.
///
/// # Returns
/// `folds` lists of indices into `dataset`, each ascending
pub fn stratified_folds(dataset: &LabeledDataset, folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let folds = folds.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignment = vec![Vec::new(); folds];

    let ordered = indices_by_class(dataset).into_iter().flat_map(|mut members| {
        members.shuffle(&mut rng);
        members
    });
    for (position, index) in ordered.enumerate() {
        assignment[position % folds].push(index);
    }
    for fold in &mut assignment {
        fold.sort_unstable();
    }
    assignment
}

fn indices_by_class(dataset: &LabeledDataset) -> Vec<Vec<usize>> {
    let mut by_class = vec![Vec::new(); dataset.num_classes()];
    for (index, &label) in dataset.labels().iter().enumerate() {
        by_class[label].push(index);
    }
    by_class
}
