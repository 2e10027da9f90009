// Mel module - mel filterbank and cepstral coefficients
//
// MFCC chain per frame:
//   |X|² → mel filterbank (Slaney scale, area-normalized) → dB
//   (floor 1e-10, clamped to 80 dB below the clip's peak) → orthonormal DCT-II
//
// The dB clamp is taken over the whole clip, so frames are computed together.

use super::fft::{bin_frequencies, Spectrogram};

const MIN_POWER: f64 = 1e-10;
const TOP_DB: f64 = 80.0;

// Slaney mel scale: linear below 1 kHz, logarithmic above
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert a frequency in Hz to the Slaney mel scale
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Inverse of [`hz_to_mel`]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filterbank over the non-negative FFT bins
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    /// `weights[m][k]`: contribution of bin k to mel band m
    weights: Vec<Vec<f64>>,
}

impl MelFilterbank {
    /// Build `n_mels` filters spanning 0 Hz to Nyquist
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let fft_freqs = bin_frequencies(sample_rate, n_fft);
        let mel_max = hz_to_mel(sample_rate as f64 / 2.0);

        // n_mels + 2 edge points, evenly spaced in mel
        let edges: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
                let area_norm = 2.0 / (right - left);
                fft_freqs
                    .iter()
                    .map(|&f| {
                        let rising = (f - left) / (center - left);
                        let falling = (right - f) / (right - center);
                        rising.min(falling).max(0.0) * area_norm
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn num_bands(&self) -> usize {
        self.weights.len()
    }

    /// Mel-band energies of one power spectrum
    pub fn apply(&self, power: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|band| band.iter().zip(power).map(|(&w, &p)| w * p).sum())
            .collect()
    }
}

/// Computes per-frame MFCCs from a magnitude spectrogram
#[derive(Debug, Clone)]
pub struct MfccProcessor {
    filterbank: MelFilterbank,
    /// Orthonormal DCT-II rows, one per kept coefficient
    dct: Vec<Vec<f64>>,
}

impl MfccProcessor {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize, n_mfcc: usize) -> Self {
        Self {
            filterbank: MelFilterbank::new(sample_rate, n_fft, n_mels),
            dct: dct_matrix(n_mfcc, n_mels),
        }
    }

    pub fn num_coefficients(&self) -> usize {
        self.dct.len()
    }

    /// MFCCs for every frame of the spectrogram
    ///
    /// # Returns
    /// `result[t][c]`: coefficient c of frame t
    pub fn compute(&self, spectrogram: &Spectrogram) -> Vec<Vec<f64>> {
        let mut log_mel: Vec<Vec<f64>> = spectrogram
            .frames
            .iter()
            .map(|magnitudes| {
                let power: Vec<f64> = magnitudes.iter().map(|m| m * m).collect();
                self.filterbank
                    .apply(&power)
                    .into_iter()
                    .map(|energy| 10.0 * energy.max(MIN_POWER).log10())
                    .collect()
            })
            .collect();

        let peak_db = log_mel
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let floor_db = peak_db - TOP_DB;
        for value in log_mel.iter_mut().flatten() {
            *value = value.max(floor_db);
        }

        log_mel
            .iter()
            .map(|bands| {
                self.dct
                    .iter()
                    .map(|row| row.iter().zip(bands).map(|(&c, &b)| c * b).sum())
                    .collect()
            })
            .collect()
    }
}

/// Orthonormal DCT-II basis: `n_out` rows of length `n_in`
fn dct_matrix(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    let n = n_in as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| {
                    scale
                        * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n))
                            .cos()
                })
                .collect()
        })
        .collect()
}
