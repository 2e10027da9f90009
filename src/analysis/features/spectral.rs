// Spectral module - Frequency-domain feature extraction
//
// This module computes per-frame spectral shape features from magnitude
// spectra. Every function returns 0.0 for a silent frame instead of NaN.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::fft::{bin_frequencies, Spectrogram};

/// Magnitude sums below this are treated as silence
const SILENCE_FLOOR: f64 = 1e-10;

/// Per-frame spectral feature series
#[derive(Debug, Clone, Default)]
pub struct SpectralSeries {
    pub centroid: Vec<f64>,
    pub bandwidth: Vec<f64>,
    pub rolloff: Vec<f64>,
}

/// Spectral feature computation functions
pub struct SpectralFeatures {
    /// Center frequency of each FFT bin
    frequencies: Vec<f64>,
    rolloff_percent: f64,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    /// * `rolloff_percent` - Energy fraction for the roll-off frequency (0.85)
    pub fn new(sample_rate: u32, fft_size: usize, rolloff_percent: f64) -> Self {
        Self {
            frequencies: bin_frequencies(sample_rate, fft_size),
            rolloff_percent,
        }
    }

    /// Compute centroid, bandwidth and roll-off for every frame
    pub fn compute_series(&self, spectrogram: &Spectrogram) -> SpectralSeries {
        let mut series = SpectralSeries::default();
        for spectrum in &spectrogram.frames {
            let centroid = self.compute_centroid(spectrum);
            series.centroid.push(centroid);
            series
                .bandwidth
                .push(self.compute_bandwidth(spectrum, centroid));
            series.rolloff.push(self.compute_rolloff(spectrum));
        }
        series
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// The spectral centroid represents the "center of mass" of the spectrum,
    /// and is a measure of the brightness of a sound.
    ///
    /// # Arguments
    /// * `spectrum` - Magnitude spectrum
    ///
    /// # Returns
    /// Spectral centroid in Hz
    pub fn compute_centroid(&self, spectrum: &[f64]) -> f64 {
        let magnitude_sum: f64 = spectrum.iter().sum();
        if magnitude_sum <= SILENCE_FLOOR {
            return 0.0;
        }

        let weighted_sum: f64 = spectrum
            .iter()
            .zip(&self.frequencies)
            .map(|(&mag, &freq)| freq * mag)
            .sum();

        weighted_sum / magnitude_sum
    }

    /// Compute spectral bandwidth (second-order spread around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ (|X[i]| / Σ|X|) × (f_i − centroid)²)
    ///
    /// # Arguments
    /// * `spectrum` - Magnitude spectrum
    /// * `centroid` - Centroid of the same spectrum in Hz
    ///
    /// # Returns
    /// Spectral bandwidth in Hz
    pub fn compute_bandwidth(&self, spectrum: &[f64], centroid: f64) -> f64 {
        let magnitude_sum: f64 = spectrum.iter().sum();
        if magnitude_sum <= SILENCE_FLOOR {
            return 0.0;
        }

        let spread: f64 = spectrum
            .iter()
            .zip(&self.frequencies)
            .map(|(&mag, &freq)| (mag / magnitude_sum) * (freq - centroid).powi(2))
            .sum();

        spread.sqrt()
    }

    /// Compute spectral rolloff
    ///
    /// Finds the lowest bin frequency at which the cumulative magnitude
    /// reaches `rolloff_percent` of the frame total.
    ///
    /// # Arguments
    /// * `spectrum` - Magnitude spectrum
    ///
    /// # Returns
    /// Rolloff frequency in Hz
    pub fn compute_rolloff(&self, spectrum: &[f64]) -> f64 {
        let total: f64 = spectrum.iter().sum();
        if total <= SILENCE_FLOOR {
            return 0.0;
        }

        let threshold = self.rolloff_percent * total;
        let mut cumulative = 0.0;
        for (&mag, &freq) in spectrum.iter().zip(&self.frequencies) {
            cumulative += mag;
            if cumulative >= threshold {
                return freq;
            }
        }

        // Rounding can leave the cumulative sum a hair short: report Nyquist
        self.frequencies.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn processor() -> SpectralFeatures {
        // 8 samples at 8 Hz: bins at 0, 1, 2, 3, 4 Hz
        SpectralFeatures::new(8, 8, 0.85)
    }

    #[test]
    fn test_single_bin_spectrum() {
        let spectral = processor();
        let spectrum = [0.0, 0.0, 3.0, 0.0, 0.0];
        let centroid = spectral.compute_centroid(&spectrum);
        assert_relative_eq!(centroid, 2.0);
        assert_relative_eq!(spectral.compute_bandwidth(&spectrum, centroid), 0.0);
        assert_relative_eq!(spectral.compute_rolloff(&spectrum), 2.0);
    }

    #[test]
    fn test_two_bin_spectrum() {
        let spectral = processor();
        let spectrum = [0.0, 1.0, 0.0, 1.0, 0.0];
        let centroid = spectral.compute_centroid(&spectrum);
        assert_relative_eq!(centroid, 2.0);
        // half the weight at distance 1 on each side
        assert_relative_eq!(spectral.compute_bandwidth(&spectrum, centroid), 1.0);
        // 85% is only reached once the 3 Hz bin is included
        assert_relative_eq!(spectral.compute_rolloff(&spectrum), 3.0);
    }

    #[test]
    fn test_silent_frame_is_zero() {
        let spectral = processor();
        let silence = [0.0; 5];
        assert_eq!(spectral.compute_centroid(&silence), 0.0);
        assert_eq!(spectral.compute_bandwidth(&silence, 0.0), 0.0);
        assert_eq!(spectral.compute_rolloff(&silence), 0.0);
    }

    #[test]
    fn test_rolloff_higher_for_brighter_spectrum() {
        let spectral = processor();
        let dark = [4.0, 2.0, 1.0, 0.0, 0.0];
        let bright = [0.0, 0.0, 1.0, 2.0, 4.0];
        assert!(spectral.compute_rolloff(&bright) > spectral.compute_rolloff(&dark));
        assert!(spectral.compute_centroid(&bright) > spectral.compute_centroid(&dark));
    }

    #[test]
    fn test_series_has_one_value_per_frame() {
        let spectral = processor();
        let spectrogram = Spectrogram {
            frames: vec![vec![0.0, 1.0, 0.0, 0.0, 0.0]; 3],
            sample_rate: 8,
            n_fft: 8,
        };
        let series = spectral.compute_series(&spectrogram);
        assert_eq!(series.centroid, vec![1.0; 3]);
        assert_eq!(series.bandwidth.len(), 3);
        assert_eq!(series.rolloff, vec![1.0; 3]);
    }
}
