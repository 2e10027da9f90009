// Audio module - clip representation and WAV loading

pub mod loader;

pub use loader::{
    downmix_to_mono, is_audio_file, load_clip, resample_linear, ClipLoader, AUDIO_EXTENSIONS,
};

/// Mono audio clip at a known sample rate
///
/// Samples are in [-1.0, 1.0]. A clip is only mutated while it is being
/// normalized and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip duration in seconds (0.0 when the sample rate is unknown)
    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
