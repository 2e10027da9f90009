// Classifier error types and constants
//
// All of these are usage errors: they are surfaced immediately and never
// retried.

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Classifier error code constants
///
/// Error code range: 2001-2005
pub struct ClassifierErrorCodes {}

impl ClassifierErrorCodes {
    /// predict() called before train()
    pub const NOT_TRAINED: i32 = 2001;

    /// Query dimension differs from the training dimension
    pub const DIMENSION_MISMATCH: i32 = 2002;

    /// Neighbor count must be at least 1
    pub const INVALID_K: i32 = 2003;

    /// train() called with no rows
    pub const EMPTY_TRAINING_SET: i32 = 2004;

    /// Row count and label count differ
    pub const LENGTH_MISMATCH: i32 = 2005;
}

/// Log a classifier error with structured context
pub fn log_classifier_error(err: &ClassifierError, context: &str) {
    error!(
        "Classifier error in {}: code={}, component=KnnClassifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// KNN classifier usage errors
///
/// Error code range: 2001-2005
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// Model has not been trained yet
    NotTrained,

    /// Query vector has the wrong number of features
    DimensionMismatch { expected: usize, actual: usize },

    /// k must be >= 1
    InvalidK { k: usize },

    /// Training set is empty
    EmptyTrainingSet,

    /// Features and labels have different lengths
    LengthMismatch { features: usize, labels: usize },
}

impl ErrorCode for ClassifierError {
    fn code(&self) -> i32 {
        match self {
            ClassifierError::NotTrained => ClassifierErrorCodes::NOT_TRAINED,
            ClassifierError::DimensionMismatch { .. } => ClassifierErrorCodes::DIMENSION_MISMATCH,
            ClassifierError::InvalidK { .. } => ClassifierErrorCodes::INVALID_K,
            ClassifierError::EmptyTrainingSet => ClassifierErrorCodes::EMPTY_TRAINING_SET,
            ClassifierError::LengthMismatch { .. } => ClassifierErrorCodes::LENGTH_MISMATCH,
        }
    }

    fn message(&self) -> String {
        match self {
            ClassifierError::NotTrained => {
                "Classifier not trained. Call train() before predict().".to_string()
            }
            ClassifierError::DimensionMismatch { expected, actual } => {
                format!(
                    "Feature vector has {} values, expected {}",
                    actual, expected
                )
            }
            ClassifierError::InvalidK { k } => {
                format!("Neighbor count k must be at least 1 (got {})", k)
            }
            ClassifierError::EmptyTrainingSet => "Training set is empty".to_string(),
            ClassifierError::LengthMismatch { features, labels } => {
                format!(
                    "Got {} feature vectors but {} labels",
                    features, labels
                )
            }
        }
    }
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassifierError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ClassifierError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_error_codes() {
        assert_eq!(ClassifierError::NotTrained.code(), 2001);
        assert_eq!(
            ClassifierError::DimensionMismatch {
                expected: 36,
                actual: 2
            }
            .code(),
            2002
        );
        assert_eq!(ClassifierError::InvalidK { k: 0 }.code(), 2003);
        assert_eq!(ClassifierError::EmptyTrainingSet.code(), 2004);
        assert_eq!(
            ClassifierError::LengthMismatch {
                features: 3,
                labels: 2
            }
            .code(),
            2005
        );
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = ClassifierError::DimensionMismatch {
            expected: 36,
            actual: 35,
        };
        assert!(err.message().contains("35"));
        assert!(err.message().contains("expected 36"));
    }
}
