// AudioNormalizer - fixed-duration clips centered on the voiced segment
//
// Every clip entering feature extraction has exactly `target_len` samples:
// - shorter clips are center-padded with zeros (odd extra sample at the end)
// - longer clips keep their centered sub-segment
// Only slicing and copying is involved, so the output is bit-for-bit
// deterministic for identical input.

use crate::analysis::vad::VoiceActivityDetector;

/// Crops/pads clips to a fixed number of samples
#[derive(Debug, Clone)]
pub struct AudioNormalizer {
    target_len: usize,
    detector: Option<VoiceActivityDetector>,
}

impl AudioNormalizer {
    /// Create a normalizer producing `target_duration_s` seconds at `sample_rate`
    pub fn new(sample_rate: u32, target_duration_s: f32) -> Self {
        let target_len = (target_duration_s as f64 * sample_rate as f64).round() as usize;
        Self::with_target_len(target_len)
    }

    pub fn with_target_len(target_len: usize) -> Self {
        Self {
            target_len,
            detector: None,
        }
    }

    /// Crop to the voiced segment before fitting the length
    pub fn with_voice_detection(mut self, detector: VoiceActivityDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Normalize a raw clip
    ///
    /// Crops to the detected voice segment when a detector is attached,
    /// then pads or center-crops to the target length.
    pub fn normalize(&self, clip: &[f32]) -> Vec<f32> {
        let voiced = match &self.detector {
            Some(detector) => {
                let segment = detector.detect(clip);
                log::trace!(
                    "[Normalizer] Voice segment {}..{} of {} samples",
                    segment.start,
                    segment.end,
                    clip.len()
                );
                &clip[segment.start..segment.end]
            }
            None => clip,
        };
        self.fit_length(voiced)
    }

    /// Pad or center-crop `clip` to exactly `target_len` samples
    pub fn fit_length(&self, clip: &[f32]) -> Vec<f32> {
        let target = self.target_len;

        if clip.len() < target {
            let pad_total = target - clip.len();
            let pad_start = pad_total / 2;
            let pad_end = pad_total - pad_start;

            let mut out = Vec::with_capacity(target);
            out.resize(pad_start, 0.0);
            out.extend_from_slice(clip);
            out.resize(pad_start + clip.len() + pad_end, 0.0);
            out
        } else {
            let start = (clip.len() - target) / 2;
            clip[start..start + target].to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VadConfig;

    #[test]
    fn test_target_len_from_duration() {
        let normalizer = AudioNormalizer::new(22_050, 1.5);
        assert_eq!(normalizer.target_len(), 33_075);
    }

    #[test]
    fn test_output_length_is_always_target() {
        let normalizer = AudioNormalizer::with_target_len(1000);
        for len in [0usize, 1, 999, 1000, 1001, 4321] {
            let clip = vec![0.25f32; len];
            assert_eq!(
                normalizer.fit_length(&clip).len(),
                1000,
                "input length {} not normalized",
                len
            );
        }
    }

    #[test]
    fn test_even_padding_is_symmetric() {
        let normalizer = AudioNormalizer::with_target_len(8);
        let out = normalizer.fit_length(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_odd_padding_extra_sample_goes_to_end() {
        let normalizer = AudioNormalizer::with_target_len(6);
        let out = normalizer.fit_length(&[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_longer_clip_keeps_center() {
        let normalizer = AudioNormalizer::with_target_len(3);
        let clip: Vec<f32> = (0..8).map(|i| i as f32).collect();
        // (8 - 3) / 2 = 2
        assert_eq!(normalizer.fit_length(&clip), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_equal_length_is_unchanged() {
        let normalizer = AudioNormalizer::with_target_len(4);
        let clip = vec![0.1f32, -0.2, 0.3, -0.4];
        assert_eq!(normalizer.fit_length(&clip), clip);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = AudioNormalizer::new(22_050, 1.5)
            .with_voice_detection(VoiceActivityDetector::new(22_050, &VadConfig::default()));
        let clip: Vec<f32> = (0..50_000)
            .map(|i| if (20_000..30_000).contains(&i) { ((i % 37) as f32 - 18.0) / 18.0 } else { 0.0 })
            .collect();

        let first = normalizer.normalize(&clip);
        let second = normalizer.normalize(&clip);
        assert_eq!(first.len(), 33_075);
        assert_eq!(first, second);
    }

    #[test]
    fn test_voice_crop_centers_burst() {
        let normalizer = AudioNormalizer::with_target_len(4000)
            .with_voice_detection(VoiceActivityDetector::new(22_050, &VadConfig::default()));
        let mut clip = vec![0.0f32; 40_000];
        for sample in clip.iter_mut().skip(2_000).take(1_000) {
            *sample = 0.5;
        }

        let out = normalizer.normalize(&clip);
        assert_eq!(out.len(), 4000);

        let first_loud = out.iter().position(|&s| s != 0.0).unwrap();
        let last_loud = out.iter().rposition(|&s| s != 0.0).unwrap();
        let lead = first_loud;
        let tail = out.len() - 1 - last_loud;
        assert!(
            (lead as i64 - tail as i64).abs() <= 220,
            "burst not centered: lead {} tail {}",
            lead,
            tail
        );
    }
}
