// Evaluation error types and constants

use crate::error::{ClassifierError, DatasetError, ErrorCode};
use log::error;
use std::fmt;

/// Evaluation error code constants
///
/// Error code range: 4001-4008
pub struct EvaluationErrorCodes {}

impl EvaluationErrorCodes {
    /// Test fraction outside (0, 1)
    pub const INVALID_TEST_FRACTION: i32 = 4001;

    /// Not enough samples to give every class a train and a test slot
    pub const INSUFFICIENT_SAMPLES: i32 = 4002;

    /// Empty list of k candidates
    pub const NO_CANDIDATES: i32 = 4003;

    /// Fold count outside 2..=n_train
    pub const INVALID_FOLDS: i32 = 4004;

    /// Underlying classifier failure
    pub const CLASSIFIER: i32 = 4005;

    /// Underlying dataset failure
    pub const DATASET: i32 = 4006;

    /// Classifier returned a label outside the dataset's class codes
    pub const PREDICTION_OUT_OF_RANGE: i32 = 4007;

    /// A class has too few samples for a stratified split
    pub const CLASS_TOO_SMALL: i32 = 4008;
}

/// Log an evaluation error with structured context
pub fn log_evaluation_error(err: &EvaluationError, context: &str) {
    error!(
        "Evaluation error in {}: code={}, component=Evaluator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Evaluation harness errors
///
/// Error code range: 4001-4008
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// test_fraction must be strictly between 0 and 1
    InvalidTestFraction { fraction: f64 },

    /// Split cannot place every class in both subsets
    InsufficientSamples {
        samples: usize,
        classes: usize,
        test_samples: usize,
    },

    /// sweep_k() called without candidates
    NoCandidates,

    /// Invalid fold count for cross-validation
    InvalidFolds { folds: usize, samples: usize },

    /// Classifier usage error bubbled up from training or prediction
    Classifier(ClassifierError),

    /// Dataset invariant violated while building subsets
    Dataset(DatasetError),

    /// Predicted label is not a class code of the evaluated dataset
    PredictionOutOfRange { label: usize, num_classes: usize },

    /// Class cannot have both a train and a test sample
    ClassTooSmall { label: usize, samples: usize },
}

impl ErrorCode for EvaluationError {
    fn code(&self) -> i32 {
        match self {
            EvaluationError::InvalidTestFraction { .. } => {
                EvaluationErrorCodes::INVALID_TEST_FRACTION
            }
            EvaluationError::InsufficientSamples { .. } => {
                EvaluationErrorCodes::INSUFFICIENT_SAMPLES
            }
            EvaluationError::NoCandidates => EvaluationErrorCodes::NO_CANDIDATES,
            EvaluationError::InvalidFolds { .. } => EvaluationErrorCodes::INVALID_FOLDS,
            EvaluationError::Classifier(_) => EvaluationErrorCodes::CLASSIFIER,
            EvaluationError::Dataset(_) => EvaluationErrorCodes::DATASET,
            EvaluationError::PredictionOutOfRange { .. } => {
                EvaluationErrorCodes::PREDICTION_OUT_OF_RANGE
            }
            EvaluationError::ClassTooSmall { .. } => EvaluationErrorCodes::CLASS_TOO_SMALL,
        }
    }

    fn message(&self) -> String {
        match self {
            EvaluationError::InvalidTestFraction { fraction } => {
                format!(
                    "Test fraction must be between 0 and 1 (got {})",
                    fraction
                )
            }
            EvaluationError::InsufficientSamples {
                samples,
                classes,
                test_samples,
            } => format!(
                "Cannot split {} samples into train/test for {} classes ({} test samples)",
                samples, classes, test_samples
            ),
            EvaluationError::NoCandidates => "No k candidates supplied".to_string(),
            EvaluationError::InvalidFolds { folds, samples } => format!(
                "Fold count must be between 2 and {} (got {})",
                samples, folds
            ),
            EvaluationError::Classifier(err) => err.message(),
            EvaluationError::Dataset(err) => err.message(),
            EvaluationError::PredictionOutOfRange { label, num_classes } => format!(
                "Classifier predicted label {} but the dataset has {} classes",
                label, num_classes
            ),
            EvaluationError::ClassTooSmall { label, samples } => format!(
                "Class {} has {} sample(s); a stratified split needs at least 2",
                label, samples
            ),
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EvaluationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for EvaluationError {}

impl From<ClassifierError> for EvaluationError {
    fn from(err: ClassifierError) -> Self {
        EvaluationError::Classifier(err)
    }
}

impl From<DatasetError> for EvaluationError {
    fn from(err: DatasetError) -> Self {
        EvaluationError::Dataset(err)
    }
}
