// Analysis module - DSP pipeline from raw clip to feature vector
//
// Pipeline: SignalFramer/VoiceActivityDetector → AudioNormalizer →
// FeatureExtractor → FeatureVector
//
// The Preprocessor owns one instance of each stage. All stages hold only
// immutable state, so a single Preprocessor is shared by reference across
// batch workers.

use std::path::Path;

use crate::audio::ClipLoader;
use crate::config::AppConfig;
use crate::error::{log_audio_error, AudioError};

pub mod features;
pub mod framing;
pub mod normalizer;
pub mod vad;

use features::{FeatureExtractor, FeatureVector};
use normalizer::AudioNormalizer;
use vad::VoiceActivityDetector;

/// Turns one clip into one feature vector
pub struct Preprocessor {
    loader: ClipLoader,
    normalizer: AudioNormalizer,
    extractor: FeatureExtractor,
}

impl Preprocessor {
    /// Build the pipeline from configuration
    ///
    /// # Errors
    /// - `AudioError::InvalidSampleRate` when `audio.sample_rate` is zero
    /// - `AudioError::InvalidConfig` when the audio, vad or features section
    ///   fails validation
    pub fn new(config: &AppConfig) -> Result<Self, AudioError> {
        let sample_rate = config.audio.sample_rate;
        let loader = ClipLoader::new(sample_rate)?;
        if let Err(reason) = config.validate_analysis() {
            let err = AudioError::InvalidConfig { reason };
            log_audio_error(&err, "Preprocessor::new");
            return Err(err);
        }
        let extractor = FeatureExtractor::new(sample_rate, &config.features)?;

        let mut normalizer = AudioNormalizer::new(sample_rate, config.audio.target_duration_s);
        if config.audio.detect_voice {
            normalizer =
                normalizer.with_voice_detection(VoiceActivityDetector::new(sample_rate, &config.vad));
        }

        log::debug!(
            "[Preprocessor] sample_rate={} target_len={} detect_voice={} n_fft={} hop={}",
            sample_rate,
            normalizer.target_len(),
            config.audio.detect_voice,
            config.features.n_fft,
            config.features.hop_length
        );

        Ok(Self {
            loader,
            normalizer,
            extractor,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.loader.target_rate()
    }

    pub fn target_len(&self) -> usize {
        self.normalizer.target_len()
    }

    /// Normalize and extract features from samples already at the analysis rate
    pub fn process_samples(&self, samples: &[f32]) -> FeatureVector {
        let clip = self.normalizer.normalize(samples);
        self.extractor.extract(&clip)
    }

    /// Load a WAV file and extract its features
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<FeatureVector, AudioError> {
        let clip = self.loader.load(path)?;
        Ok(self.process_samples(&clip.samples))
    }
}
