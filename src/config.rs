//! Configuration management for the feature extraction and evaluation pipeline
//!
//! Parameters are loaded from a JSON file so that analysis settings can be
//! tuned without recompilation. Every section has defaults matching the
//! reference setup (22050 Hz, 1.5 s clips, 2048/512 short-time analysis).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub vad: VadConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Known class names; the position in this list is the integer label
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
}

/// Clip loading and normalization parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Fixed analysis sample rate; every clip is resampled to it
    pub sample_rate: u32,
    /// Length every clip is cropped or padded to, in seconds
    pub target_duration_s: f32,
    /// Crop to the detected voiced segment before normalizing length
    pub detect_voice: bool,
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("audio.sample_rate must be > 0".to_string());
        }
        if !(self.target_duration_s > 0.0) {
            return Err("audio.target_duration_s must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            target_duration_s: 1.5,
            detect_voice: true,
        }
    }
}

/// Energy-based voice activity detection parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VadConfig {
    /// Fraction of the peak window energy a window must exceed to count as voiced
    pub energy_threshold: f64,
    /// Energy window length in milliseconds (stride is half of it)
    pub window_ms: f32,
    /// Margin added on both sides of the voiced segment, in milliseconds
    pub margin_ms: f32,
}

impl VadConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.window_ms > 0.0) || !(self.margin_ms >= 0.0) {
            return Err("vad.window_ms must be > 0 and vad.margin_ms >= 0".to_string());
        }
        if !(0.0..1.0).contains(&self.energy_threshold) {
            return Err("vad.energy_threshold must be in [0, 1)".to_string());
        }
        Ok(())
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.02,
            window_ms: 10.0,
            margin_ms: 50.0,
        }
    }
}

/// Short-time analysis parameters shared by every feature family
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// Frame length and FFT size in samples
    pub n_fft: usize,
    /// Hop between consecutive frames in samples
    pub hop_length: usize,
    /// Number of mel filter banks feeding the MFCC DCT
    pub n_mels: usize,
    /// Spectral roll-off energy fraction
    pub rolloff_percent: f64,
}

impl FeatureConfig {
    /// Reject parameters the STFT, mel filterbank or roll-off cannot use
    pub fn validate(&self) -> Result<(), String> {
        if self.n_fft < 2 || self.hop_length == 0 {
            return Err("features.n_fft must be >= 2 and features.hop_length > 0".to_string());
        }
        if self.n_mels < crate::analysis::features::N_MFCC {
            return Err(format!(
                "features.n_mels must be >= {}",
                crate::analysis::features::N_MFCC
            ));
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent <= 1.0) {
            return Err("features.rolloff_percent must be in (0, 1]".to_string());
        }
        Ok(())
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 40,
            rolloff_percent: 0.85,
        }
    }
}

/// Train/test split, k sweep and cross-validation parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationConfig {
    /// Fraction of samples held out for testing
    pub test_fraction: f64,
    /// Seed for the stratified shuffles
    pub seed: u64,
    /// Neighbor counts tried by the k sweep
    pub candidate_ks: Vec<usize>,
    /// Number of stratified folds for cross-validation
    pub cv_folds: usize,
    /// Neighbor count used when cross-validating without a sweep
    pub cv_k: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            candidate_ks: vec![3, 5, 7, 9, 11],
            cv_folds: 5,
            cv_k: 5,
        }
    }
}

/// Batch processing parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Worker threads used for per-clip feature extraction
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

fn default_classes() -> Vec<String> {
    ["apple", "banana", "orange", "pear"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            vad: VadConfig::default(),
            features: FeatureConfig::default(),
            evaluation: EvaluationConfig::default(),
            pipeline: PipelineConfig::default(),
            classes: default_classes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults when the file is missing or
    /// its JSON is invalid (a warning is logged in both cases)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check that the configuration can drive the pipeline
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_analysis()?;
        if !(self.evaluation.test_fraction > 0.0 && self.evaluation.test_fraction < 1.0) {
            return Err("evaluation.test_fraction must be in (0, 1)".to_string());
        }
        if self.evaluation.candidate_ks.iter().any(|&k| k == 0) {
            return Err("evaluation.candidate_ks must not contain 0".to_string());
        }
        if self.classes.is_empty() {
            return Err("classes must list at least one class".to_string());
        }
        Ok(())
    }

    /// Check only the sections used to turn a clip into features
    /// (audio, vad, features)
    pub fn validate_analysis(&self) -> Result<(), String> {
        self.audio.validate()?;
        self.vad.validate()?;
        self.features.validate()
    }

    /// Number of samples in a normalized clip
    pub fn target_len(&self) -> usize {
        (self.audio.target_duration_s as f64 * self.audio.sample_rate as f64).round() as usize
    }
}
