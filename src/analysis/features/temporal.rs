// Temporal module - Time-domain feature extraction
//
// Per-frame zero-crossing rate and RMS energy, framed exactly like the
// STFT (centered frames of n_fft samples, same hop) so that every feature
// series has the same number of frames.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::fft::centered_frames;

/// Samples with magnitude at or below this count as zero for crossings
const ZERO_THRESHOLD: f64 = 1e-10;

/// Temporal feature computation functions
pub struct TemporalFeatures {
    frame_length: usize,
    hop: usize,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `frame_length` - Frame length in samples (matches n_fft)
    /// * `hop` - Hop between frames in samples
    pub fn new(frame_length: usize, hop: usize) -> Self {
        Self { frame_length, hop }
    }

    /// Zero-crossing rate of every frame
    ///
    /// Frames are padded by replicating the edge samples so that padding
    /// never introduces artificial crossings.
    pub fn zcr_series(&self, clip: &[f64]) -> Vec<f64> {
        centered_frames(clip, self.frame_length, self.hop, true)
            .iter()
            .map(|frame| self.compute_zcr(frame))
            .collect()
    }

    /// RMS energy of every frame (zero-padded at the edges)
    pub fn rms_series(&self, clip: &[f64]) -> Vec<f64> {
        centered_frames(clip, self.frame_length, self.hop, false)
            .iter()
            .map(|frame| compute_rms(frame))
            .collect()
    }

    /// Compute zero-crossing rate (ZCR)
    ///
    /// Formula: ZCR = crossings / frame_length
    ///
    /// A crossing is a change of sign between consecutive samples, with
    /// near-zero samples counted as positive.
    ///
    /// # Arguments
    /// * `frame` - Time-domain audio frame
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0)
    pub fn compute_zcr(&self, frame: &[f64]) -> f64 {
        if frame.len() < 2 {
            return 0.0;
        }

        let is_negative = |x: f64| x < -ZERO_THRESHOLD;
        let crossings = frame
            .windows(2)
            .filter(|pair| is_negative(pair[0]) != is_negative(pair[1]))
            .count();

        crossings as f64 / frame.len() as f64
    }
}

/// Root-mean-square amplitude of a frame
pub fn compute_rms(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|x| x * x).sum::<f64>() / frame.len() as f64).sqrt()
}
