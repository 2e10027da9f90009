// FeatureExtractor - acoustic feature extraction for spoken-word classification
//
// This module turns a fixed-duration clip into the 36-value feature vector
// used by the KNN classifier. Features are computed from a single short-time
// analysis (centered frames, n_fft = 2048, hop = 512 by default) and each
// per-frame series is reduced to its mean and population standard deviation.
//
// Module organization:
// - types: FeatureVector layout and constants
// - fft: STFT framing and magnitude spectrogram
// - mel: Slaney mel filterbank + MFCC (40 bands → 13 coefficients)
// - spectral: centroid, bandwidth, roll-off
// - temporal: zero-crossing rate, RMS energy
// - mod.rs: Coordinator (FeatureExtractor)
//
// References:
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric representations
//   for monosyllabic word recognition in continuously spoken sentences
// - Peeters, G. (2004). A large set of audio features for sound description

mod fft;
mod mel;
mod spectral;
mod temporal;
mod types;

pub use fft::{Spectrogram, StftProcessor};
pub use mel::{hz_to_mel, mel_to_hz, MelFilterbank, MfccProcessor};
pub use spectral::{SpectralFeatures, SpectralSeries};
pub use temporal::TemporalFeatures;
pub use types::{feature_names, FeatureVector, FEATURE_COUNT, N_MFCC};

use crate::config::FeatureConfig;
use crate::error::AudioError;
use crate::stats::mean_std;

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Holds only immutable, pre-computed state (FFT plan, window, filterbank,
/// DCT basis), so one instance can be shared across worker threads.
pub struct FeatureExtractor {
    stft: StftProcessor,
    mfcc: MfccProcessor,
    spectral_features: SpectralFeatures,
    temporal_features: TemporalFeatures,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (e.g., 22050)
    /// * `config` - Short-time analysis parameters
    ///
    /// # Errors
    /// `AudioError::InvalidSampleRate` for a zero rate, `AudioError::InvalidConfig`
    /// when `config` fails `FeatureConfig::validate`
    pub fn new(sample_rate: u32, config: &FeatureConfig) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: sample_rate });
        }
        config
            .validate()
            .map_err(|reason| AudioError::InvalidConfig { reason })?;

        Ok(Self {
            stft: StftProcessor::new(sample_rate, config.n_fft, config.hop_length),
            mfcc: MfccProcessor::new(sample_rate, config.n_fft, config.n_mels, N_MFCC),
            spectral_features: SpectralFeatures::new(
                sample_rate,
                config.n_fft,
                config.rolloff_percent,
            ),
            temporal_features: TemporalFeatures::new(config.n_fft, config.hop_length),
        })
    }

    /// Number of analysis frames for a clip of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        self.stft.frame_count(len)
    }

    /// Extract the full feature vector from a normalized clip
    ///
    /// This method coordinates the entire feature extraction pipeline:
    /// 1. Compute the magnitude spectrogram
    /// 2. MFCCs per frame from the spectrogram
    /// 3. Spectral shape features per frame from the spectrogram
    /// 4. ZCR and RMS per frame from the time-domain signal
    /// 5. Reduce every series to (mean, std) and assemble the vector
    ///
    /// # Arguments
    /// * `clip` - Fixed-duration clip (any length works, including empty)
    ///
    /// # Returns
    /// FeatureVector with exactly `FEATURE_COUNT` finite values
    pub fn extract(&self, clip: &[f32]) -> FeatureVector {
        let signal: Vec<f64> = clip.iter().map(|&s| s as f64).collect();

        let spectrogram = self.stft.magnitude_spectrogram(&signal);

        let mfcc_frames = self.mfcc.compute(&spectrogram);
        let mut mfcc_stats = [(0.0, 0.0); N_MFCC];
        for (coefficient, stats) in mfcc_stats.iter_mut().enumerate() {
            let series: Vec<f64> = mfcc_frames.iter().map(|frame| frame[coefficient]).collect();
            *stats = mean_std(&series);
        }

        let spectral = self.spectral_features.compute_series(&spectrogram);
        let zcr = self.temporal_features.zcr_series(&signal);
        let rms = self.temporal_features.rms_series(&signal);

        FeatureVector::from_stats(
            &mfcc_stats,
            [mean_std(&zcr), mean_std(&rms)],
            [
                mean_std(&spectral.centroid),
                mean_std(&spectral.bandwidth),
                mean_std(&spectral.rolloff),
            ],
        )
    }
}
