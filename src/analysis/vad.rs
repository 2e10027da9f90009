// VoiceActivityDetector - energy-based endpoint detection
//
// Locates the voiced segment of a single-word clip from short-window
// energies: energies are normalized by their peak, windows above a fraction
// of the peak are treated as voiced, and the first/last voiced window bound
// the segment (widened by a fixed margin).
//
// When nothing crosses the threshold the whole clip is returned. That is a
// policy, not an error.

use crate::analysis::framing::SignalFramer;
use crate::config::VadConfig;

/// Voiced segment bounds in samples (`end` is exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSegment {
    pub start: usize,
    pub end: usize,
}

impl VoiceSegment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Detects the voiced region of a clip
#[derive(Debug, Clone)]
pub struct VoiceActivityDetector {
    framer: SignalFramer,
    threshold: f64,
    margin_samples: usize,
}

impl VoiceActivityDetector {
    /// Create a detector for the given sample rate and VAD parameters
    pub fn new(sample_rate: u32, config: &VadConfig) -> Self {
        let margin_samples = (config.margin_ms as f64 / 1000.0 * sample_rate as f64) as usize;
        Self {
            framer: SignalFramer::for_sample_rate(sample_rate, config.window_ms),
            threshold: config.energy_threshold,
            margin_samples,
        }
    }

    pub fn framer(&self) -> &SignalFramer {
        &self.framer
    }

    /// Detect the voiced segment of `clip`
    pub fn detect(&self, clip: &[f32]) -> VoiceSegment {
        self.locate(clip.len(), self.framer.energies(clip))
    }

    /// Locate the voiced segment from a precomputed energy sequence
    ///
    /// # Arguments
    /// * `clip_len` - Length of the clip the energies were computed from
    /// * `energies` - Per-window energies from this detector's framer
    ///
    /// # Returns
    /// Segment bounds clamped to `[0, clip_len]`; the full clip when no window
    /// exceeds the threshold or the sequence is empty
    pub fn locate<I>(&self, clip_len: usize, energies: I) -> VoiceSegment
    where
        I: IntoIterator<Item = f64>,
    {
        let energies: Vec<f64> = energies.into_iter().collect();
        let full_clip = VoiceSegment {
            start: 0,
            end: clip_len,
        };

        let max_energy = energies.iter().copied().fold(0.0f64, f64::max);
        // Skip normalization for all-zero energies (nothing can cross the threshold anyway)
        let scale = if max_energy > 0.0 { max_energy } else { 1.0 };

        let mut active = energies
            .iter()
            .enumerate()
            .filter(|(_, &energy)| energy / scale > self.threshold)
            .map(|(idx, _)| idx);

        let Some(first) = active.next() else {
            log::debug!("[VAD] No window above threshold, using full clip");
            return full_clip;
        };
        let last = active.last().unwrap_or(first);

        let stride = self.framer.stride();
        let start = (first * stride).saturating_sub(self.margin_samples);
        let end = (last * stride + self.framer.window() + self.margin_samples).min(clip_len);

        VoiceSegment { start, end }
    }
}
