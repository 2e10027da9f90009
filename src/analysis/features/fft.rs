// FFT module - short-time Fourier transform
//
// Computes centered, Hann-windowed magnitude spectrograms. Frames are
// centered on multiples of the hop: the clip is padded with n_fft/2 zeros on
// both sides, so a clip of `len` samples yields `1 + len / hop` frames.
// Every spectral feature (MFCC included) is computed from this one framing.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Magnitude spectrogram, one `n_fft / 2 + 1` bin vector per frame
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `frames[t][k]` = |X_t[k]|
    pub frames: Vec<Vec<f64>>,
    pub sample_rate: u32,
    pub n_fft: usize,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Center frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f64> {
        bin_frequencies(self.sample_rate, self.n_fft)
    }
}

/// Center frequencies of the non-negative FFT bins
pub fn bin_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    let bin_width = sample_rate as f64 / n_fft as f64;
    (0..=n_fft / 2).map(|k| k as f64 * bin_width).collect()
}

/// Split `signal` into centered frames of `frame_len` with the given hop
///
/// Padding is `frame_len / 2` samples on each side, zeros unless
/// `replicate_edges` repeats the first/last sample instead.
pub(crate) fn centered_frames(
    signal: &[f64],
    frame_len: usize,
    hop: usize,
    replicate_edges: bool,
) -> Vec<Vec<f64>> {
    let half = frame_len / 2;
    let (left, right) = if replicate_edges && !signal.is_empty() {
        (signal[0], signal[signal.len() - 1])
    } else {
        (0.0, 0.0)
    };

    let mut padded = Vec::with_capacity(signal.len() + 2 * half);
    padded.resize(half, left);
    padded.extend_from_slice(signal);
    padded.resize(padded.len() + half, right);
    if padded.len() < frame_len {
        padded.resize(frame_len, right);
    }

    let num_frames = 1 + (padded.len() - frame_len) / hop;
    (0..num_frames)
        .map(|t| padded[t * hop..t * hop + frame_len].to_vec())
        .collect()
}

/// FFT processor that computes magnitude spectrograms from clips
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    n_fft: usize,
    hop: usize,
    sample_rate: u32,
    /// Periodic Hann window (pre-computed)
    window: Vec<f64>,
}

impl StftProcessor {
    /// Create a new STFT processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - Frame length and FFT size (2048 by default)
    /// * `hop` - Hop between frames (512 by default)
    pub fn new(sample_rate: u32, n_fft: usize, hop: usize) -> Self {
        // Periodic Hann window to reduce spectral leakage
        let window = (0..n_fft)
            .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n_fft as f64).cos())
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);

        Self {
            fft,
            n_fft,
            hop,
            sample_rate,
            window,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of frames produced for a clip of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        let padded = (len + 2 * (self.n_fft / 2)).max(self.n_fft);
        1 + (padded - self.n_fft) / self.hop
    }

    /// Compute the magnitude spectrogram of a clip
    ///
    /// # Returns
    /// Spectrogram with `frame_count(clip.len())` frames of `n_fft / 2 + 1` bins
    pub fn magnitude_spectrogram(&self, clip: &[f64]) -> Spectrogram {
        let frames = centered_frames(clip, self.n_fft, self.hop, false);
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(self.n_fft);

        let frames = frames
            .iter()
            .map(|frame| {
                buffer.clear();
                buffer.extend(
                    frame
                        .iter()
                        .zip(&self.window)
                        .map(|(&sample, &w)| Complex::new(sample * w, 0.0)),
                );
                self.fft.process_with_scratch(&mut buffer, &mut scratch);

                // Only positive frequencies (real input is conjugate-symmetric)
                buffer[..self.n_fft / 2 + 1]
                    .iter()
                    .map(|c| c.norm())
                    .collect()
            })
            .collect();

        Spectrogram {
            frames,
            sample_rate: self.sample_rate,
            n_fft: self.n_fft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_matches_centered_framing() {
        let stft = StftProcessor::new(22_050, 2048, 512);
        assert_eq!(stft.frame_count(33_075), 65);
        assert_eq!(stft.frame_count(0), 1);

        let clip = vec![0.0; 33_075];
        assert_eq!(stft.magnitude_spectrogram(&clip).num_frames(), 65);
    }

    #[test]
    fn test_centered_frames_padding_modes() {
        let signal = [1.0, 2.0, 3.0];
        let zero = centered_frames(&signal, 4, 2, false);
        assert_eq!(zero[0], vec![0.0, 0.0, 1.0, 2.0]);

        let edge = centered_frames(&signal, 4, 2, true);
        assert_eq!(edge[0], vec![1.0, 1.0, 1.0, 2.0]);
        assert_eq!(edge.last().unwrap(), &vec![2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let sample_rate = 22_050;
        let stft = StftProcessor::new(sample_rate, 2048, 512);
        // 1000 Hz lands between bins; the peak must be the nearest one
        let clip: Vec<f64> = (0..8192)
            .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / sample_rate as f64).sin())
            .collect();

        let spectrogram = stft.magnitude_spectrogram(&clip);
        let middle = &spectrogram.frames[spectrogram.num_frames() / 2];
        let peak_bin = middle
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(k, _)| k)
            .unwrap();

        let expected = (1000.0 * 2048.0 / sample_rate as f64).round() as usize;
        assert_eq!(peak_bin, expected);
    }

    #[test]
    fn test_silence_has_zero_magnitudes() {
        let stft = StftProcessor::new(22_050, 512, 128);
        let spectrogram = stft.magnitude_spectrogram(&vec![0.0; 2048]);
        assert!(spectrogram
            .frames
            .iter()
            .all(|frame| frame.len() == 257 && frame.iter().all(|&m| m == 0.0)));
    }
}
