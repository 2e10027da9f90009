// Classification metrics: confusion matrix, per-class precision/recall/F1
//
// Any metric whose denominator is zero is reported as 0.0.

use serde::Serialize;

/// Per-class metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class
    pub support: usize,
}

/// Averaged precision/recall/F1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Full evaluation of a set of predictions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// `confusion[true][predicted]`
    pub confusion: Vec<Vec<usize>>,
    /// Indexed by class code
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    /// Unweighted mean over classes present in truth or predictions
    pub macro_avg: AverageMetrics,
    /// Support-weighted mean over all classes
    pub weighted_avg: AverageMetrics,
    pub total: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Count (true, predicted) pairs into a `num_classes × num_classes` matrix
///
/// Pairs with a label outside `0..num_classes` have no cell and are left out.
pub fn confusion_matrix(truth: &[usize], predicted: &[usize], num_classes: usize) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0; num_classes]; num_classes];
    for (&t, &p) in truth.iter().zip(predicted) {
        if t < num_classes && p < num_classes {
            matrix[t][p] += 1;
        }
    }
    matrix
}

/// Fraction of positions where prediction equals truth (0.0 when empty)
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    ratio(correct, truth.len().min(predicted.len()))
}

impl EvaluationReport {
    /// Build the report from parallel truth/prediction slices
    ///
    /// Accuracy, support and recall are counted over every truth label, so a
    /// prediction outside `0..num_classes` is an error even though the
    /// confusion matrix has no cell for it.
    pub fn from_predictions(truth: &[usize], predicted: &[usize], num_classes: usize) -> Self {
        let confusion = confusion_matrix(truth, predicted, num_classes);
        let total = truth.len();
        let correct: usize = (0..num_classes).map(|c| confusion[c][c]).sum();

        let per_class: Vec<ClassMetrics> = (0..num_classes)
            .map(|c| {
                let true_positives = confusion[c][c];
                let support = truth.iter().filter(|&&t| t == c).count();
                let predicted_as: usize = confusion.iter().map(|row| row[c]).sum();
                let precision = ratio(true_positives, predicted_as);
                let recall = ratio(true_positives, support);
                ClassMetrics {
                    precision,
                    recall,
                    f1: f1_score(precision, recall),
                    support,
                }
            })
            .collect();

        let observed: Vec<&ClassMetrics> = per_class
            .iter()
            .enumerate()
            .filter(|(c, m)| m.support > 0 || confusion.iter().any(|row| row[*c] > 0))
            .map(|(_, m)| m)
            .collect();
        let macro_avg = average(&observed, |_| 1.0);
        let weighted_avg = average(&per_class.iter().collect::<Vec<_>>(), |m| m.support as f64);

        Self {
            confusion,
            per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            total,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.per_class.len()
    }
}

fn average<W>(metrics: &[&ClassMetrics], weight: W) -> AverageMetrics
where
    W: Fn(&ClassMetrics) -> f64,
{
    let total_weight: f64 = metrics.iter().map(|&m| weight(m)).sum();
    if total_weight == 0.0 {
        return AverageMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let weighted = |field: fn(&ClassMetrics) -> f64| {
        metrics.iter().map(|&m| weight(m) * field(m)).sum::<f64>() / total_weight
    };
    AverageMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1: weighted(|m| m.f1),
    }
}
