// SignalFramer - short-window energy framing
//
// Splits a clip into 50%-overlapping windows and yields the sum-of-squares
// energy of each window. The sequence is lazy and restartable: calling
// `energies()` again (or cloning the iterator) starts from the first window.

/// Splits audio into overlapping windows of fixed length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalFramer {
    window: usize,
    stride: usize,
}

impl SignalFramer {
    /// Create a framer with explicit window length and stride (in samples)
    ///
    /// Both are clamped to at least one sample.
    pub fn new(window: usize, stride: usize) -> Self {
        Self {
            window: window.max(1),
            stride: stride.max(1),
        }
    }

    /// Create a framer with a window of `window_ms` and 50% overlap
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `window_ms` - Window length in milliseconds (10 ms → 220 samples at 22050 Hz)
    pub fn for_sample_rate(sample_rate: u32, window_ms: f32) -> Self {
        let window = (window_ms as f64 / 1000.0 * sample_rate as f64) as usize;
        Self::new(window, window / 2)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of complete windows that fit in a clip of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        if len < self.window {
            0
        } else {
            (len - self.window) / self.stride + 1
        }
    }

    /// Lazily compute per-window energies for `clip`
    ///
    /// A clip shorter than one window yields an empty sequence.
    pub fn energies<'a>(&self, clip: &'a [f32]) -> EnergyFrames<'a> {
        EnergyFrames {
            clip,
            window: self.window,
            stride: self.stride,
            next_frame: 0,
            total_frames: self.frame_count(clip.len()),
        }
    }
}

/// Iterator over per-window sum-of-squares energies
#[derive(Debug, Clone)]
pub struct EnergyFrames<'a> {
    clip: &'a [f32],
    window: usize,
    stride: usize,
    next_frame: usize,
    total_frames: usize,
}

impl Iterator for EnergyFrames<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next_frame >= self.total_frames {
            return None;
        }

        let start = self.next_frame * self.stride;
        let energy = self.clip[start..start + self.window]
            .iter()
            .map(|&s| {
                let s = s as f64;
                s * s
            })
            .sum();
        self.next_frame += 1;
        Some(energy)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_frames - self.next_frame;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EnergyFrames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_clip_yields_no_windows() {
        let framer = SignalFramer::new(220, 110);
        let clip = vec![0.5f32; 219];
        assert_eq!(framer.energies(&clip).count(), 0);
        assert_eq!(framer.energies(&[]).count(), 0);
    }

    #[test]
    fn test_exact_window_yields_one_frame() {
        let framer = SignalFramer::new(4, 2);
        let clip = [1.0f32, 1.0, 1.0, 1.0];
        let energies: Vec<f64> = framer.energies(&clip).collect();
        assert_eq!(energies, vec![4.0]);
    }

    #[test]
    fn test_overlapping_energies() {
        let framer = SignalFramer::new(4, 2);
        let clip = [1.0f32, 1.0, 2.0, 2.0, 0.0, 0.0, 3.0];
        let energies: Vec<f64> = framer.energies(&clip).collect();
        // windows start at 0 and 2; a window at 4 would need samples up to index 7
        assert_eq!(energies, vec![10.0, 8.0]);
    }

    #[test]
    fn test_energies_are_restartable() {
        let framer = SignalFramer::new(3, 1);
        let clip = [0.1f32, -0.2, 0.3, -0.4, 0.5];
        let frames = framer.energies(&clip);
        let first: Vec<f64> = frames.clone().collect();
        let second: Vec<f64> = frames.collect();
        let third: Vec<f64> = framer.energies(&clip).collect();
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_for_sample_rate_uses_half_window_stride() {
        let framer = SignalFramer::for_sample_rate(22_050, 10.0);
        assert_eq!(framer.window(), 220);
        assert_eq!(framer.stride(), 110);
        assert_eq!(framer.energies(&vec![0.0; 1000]).len(), framer.frame_count(1000));
    }
}
