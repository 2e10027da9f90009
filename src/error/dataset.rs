// Dataset error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Dataset error code constants
///
/// Error code range: 3001-3009
pub struct DatasetErrorCodes {}

impl DatasetErrorCodes {
    /// No labeled files were discovered
    pub const EMPTY_DATASET: i32 = 3001;

    /// Label code outside 0..num_classes
    pub const LABEL_OUT_OF_RANGE: i32 = 3002;

    /// Row dimension differs from the dataset dimension
    pub const INCONSISTENT_DIMENSION: i32 = 3003;

    /// Class name appears twice in a label map
    pub const DUPLICATE_CLASS: i32 = 3004;

    /// Class name not present in the label map
    pub const UNKNOWN_CLASS: i32 = 3005;

    /// Manifest could not be read or is invalid
    pub const MANIFEST_INVALID: i32 = 3006;

    /// Feature cache could not be read, written or parsed
    pub const CACHE_FAILED: i32 = 3007;

    /// Row and label counts differ
    pub const LENGTH_MISMATCH: i32 = 3008;

    /// Label map built from an empty class list
    pub const EMPTY_CLASS_MAP: i32 = 3009;
}

/// Log a dataset error with structured context
pub fn log_dataset_error(err: &DatasetError, context: &str) {
    error!(
        "Dataset error in {}: code={}, component=Dataset, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Dataset, label map, manifest and cache errors
///
/// Error code range: 3001-3009
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// No labeled files found; aborts the run
    EmptyDataset,

    /// Label is not a valid class code
    LabelOutOfRange { label: usize, num_classes: usize },

    /// Row has the wrong number of features
    InconsistentDimension { expected: usize, actual: usize },

    /// Duplicate (or empty) class name
    DuplicateClass { name: String },

    /// Class name not known to the label map
    UnknownClass { name: String },

    /// Manifest problem
    ManifestInvalid { reason: String },

    /// Feature cache problem
    CacheFailed { reason: String },

    /// Parallel rows/labels of different lengths
    LengthMismatch { rows: usize, labels: usize },

    /// No class names to build a label map from
    EmptyClassMap,
}

impl ErrorCode for DatasetError {
    fn code(&self) -> i32 {
        match self {
            DatasetError::EmptyDataset => DatasetErrorCodes::EMPTY_DATASET,
            DatasetError::LabelOutOfRange { .. } => DatasetErrorCodes::LABEL_OUT_OF_RANGE,
            DatasetError::InconsistentDimension { .. } => {
                DatasetErrorCodes::INCONSISTENT_DIMENSION
            }
            DatasetError::DuplicateClass { .. } => DatasetErrorCodes::DUPLICATE_CLASS,
            DatasetError::UnknownClass { .. } => DatasetErrorCodes::UNKNOWN_CLASS,
            DatasetError::ManifestInvalid { .. } => DatasetErrorCodes::MANIFEST_INVALID,
            DatasetError::CacheFailed { .. } => DatasetErrorCodes::CACHE_FAILED,
            DatasetError::LengthMismatch { .. } => DatasetErrorCodes::LENGTH_MISMATCH,
            DatasetError::EmptyClassMap => DatasetErrorCodes::EMPTY_CLASS_MAP,
        }
    }

    fn message(&self) -> String {
        match self {
            DatasetError::EmptyDataset => {
                "No labeled audio files found. Check the manifest or audio directory."
                    .to_string()
            }
            DatasetError::LabelOutOfRange { label, num_classes } => {
                format!(
                    "Label {} out of range for {} classes",
                    label, num_classes
                )
            }
            DatasetError::InconsistentDimension { expected, actual } => {
                format!(
                    "Feature row has {} values, dataset expects {}",
                    actual, expected
                )
            }
            DatasetError::DuplicateClass { name } => {
                format!("Class name '{}' is empty or duplicated", name)
            }
            DatasetError::UnknownClass { name } => format!("Unknown class '{}'", name),
            DatasetError::ManifestInvalid { reason } => format!("Invalid manifest: {}", reason),
            DatasetError::CacheFailed { reason } => format!("Feature cache error: {}", reason),
            DatasetError::LengthMismatch { rows, labels } => {
                format!("{} feature rows but {} labels", rows, labels)
            }
            DatasetError::EmptyClassMap => "Class list is empty".to_string(),
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DatasetError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DatasetError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_codes() {
        assert_eq!(DatasetError::EmptyDataset.code(), 3001);
        assert_eq!(
            DatasetError::LabelOutOfRange {
                label: 4,
                num_classes: 4
            }
            .code(),
            3002
        );
        assert_eq!(
            DatasetError::CacheFailed {
                reason: "io".to_string()
            }
            .code(),
            3007
        );
        assert_eq!(DatasetError::LengthMismatch { rows: 2, labels: 3 }.code(), 3008);
        assert_eq!(DatasetError::EmptyClassMap.code(), 3009);
    }

    #[test]
    fn test_empty_dataset_message_is_actionable() {
        let err = DatasetError::EmptyDataset;
        assert!(err.message().contains("No labeled audio files"));
    }
}
