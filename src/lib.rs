// Fruit Classifier Core - spoken-word feature extraction and KNN classification
// Clip loading, endpoint detection, MFCC/spectral/temporal features and a
// seeded evaluation harness for short single-word recordings.

// Module declarations
pub mod analysis;
pub mod audio;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod stats;

// Re-exports for convenience
pub use analysis::features::{FeatureExtractor, FeatureVector, FEATURE_COUNT};
pub use analysis::Preprocessor;
pub use audio::AudioClip;
pub use classifier::{KnnClassifier, KnnModel};
pub use config::AppConfig;
pub use dataset::{ClassLabelMap, LabeledDataset};
pub use evaluation::{EvaluationReport, Evaluator};
pub use pipeline::{BatchOutcome, BatchProcessor};
