// Error types for the fruit classifier
//
// One enum per concern (audio loading, classifier usage, dataset handling,
// evaluation), all sharing the ErrorCode trait so callers can report a
// numeric code plus a human-readable message.

mod audio;
mod classifier;
mod dataset;
mod evaluation;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use classifier::{log_classifier_error, ClassifierError, ClassifierErrorCodes};
pub use dataset::{log_dataset_error, DatasetError, DatasetErrorCodes};
pub use evaluation::{log_evaluation_error, EvaluationError, EvaluationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting from the CLI.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
