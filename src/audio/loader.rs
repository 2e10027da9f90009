// Clip loader - WAV decoding, mono downmix and rate conversion
//
// Every clip leaves this module as mono f32 at the analysis sample rate, so
// nothing downstream ever has to reason about the source file's format.

use std::path::Path;

use super::AudioClip;
use crate::error::{log_audio_error, AudioError};

/// Extensions recognized as recorded clips when scanning a directory
///
/// Only WAV is decoded. MP3 and M4A clips are recognized so they surface as
/// `AudioError::UnsupportedFormat` instead of vanishing from a batch.
pub const AUDIO_EXTENSIONS: [&str; 3] = ["wav", "mp3", "m4a"];

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// True when `path` has one of [`AUDIO_EXTENSIONS`] (case-insensitive)
pub fn is_audio_file(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

/// Loads WAV files as mono clips at a fixed sample rate
#[derive(Debug, Clone, Copy)]
pub struct ClipLoader {
    target_rate: u32,
}

impl ClipLoader {
    /// # Arguments
    /// * `target_rate` - Analysis sample rate in Hz (22050 by default)
    pub fn new(target_rate: u32) -> Result<Self, AudioError> {
        if target_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: target_rate });
        }
        Ok(Self { target_rate })
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Load a clip, downmix it to mono and resample it to the target rate
    ///
    /// Errors are logged before being returned so that batch callers can
    /// simply record the failure and move on.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<AudioClip, AudioError> {
        let path = path.as_ref();
        let result = self.load_inner(path);
        if let Err(err) = &result {
            log_audio_error(err, &path.display().to_string());
        }
        result
    }

    fn load_inner(&self, path: &Path) -> Result<AudioClip, AudioError> {
        let compressed = lowercase_extension(path).filter(|ext| ext != "wav" && is_audio_file(path));
        if let Some(ext) = compressed {
            return Err(AudioError::UnsupportedFormat {
                path: path.display().to_string(),
                details: format!("{} clips are not decoded, convert them to WAV", ext),
            });
        }
        let (interleaved, channels, source_rate) = read_wav(path)?;
        if source_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: source_rate });
        }

        let mono = downmix_to_mono(&interleaved, channels);
        if mono.is_empty() {
            return Err(AudioError::EmptyClip {
                path: path.display().to_string(),
            });
        }

        let samples = resample_linear(&mono, source_rate, self.target_rate);
        log::debug!(
            "[ClipLoader] {} loaded: {} Hz x{} ch, {} → {} samples",
            path.display(),
            source_rate,
            channels,
            mono.len(),
            samples.len()
        );
        Ok(AudioClip::new(samples, self.target_rate))
    }
}

/// Convenience wrapper around [`ClipLoader::load`]
pub fn load_clip<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<AudioClip, AudioError> {
    ClipLoader::new(target_rate)?.load(path)
}

/// Average interleaved channels into a single mono channel
///
/// A trailing partial frame (fewer samples than `channels`) is dropped.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample by linear interpolation between neighbouring samples
///
/// Output length is `round(len * to / from)`.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 {
        return samples.to_vec();
    }

    let step = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * step;
            let idx0 = (position.floor() as usize).min(last);
            let idx1 = (idx0 + 1).min(last);
            let frac = (position - idx0 as f64).clamp(0.0, 1.0) as f32;
            samples[idx0] * (1.0 - frac) + samples[idx1] * frac
        })
        .collect()
}

/// Decode a WAV file into interleaved f32 samples
///
/// # Returns
/// (interleaved samples, channel count, sample rate)
fn read_wav(path: &Path) -> Result<(Vec<f32>, u16, u32), AudioError> {
    let display = path.display().to_string();
    let mut reader = hound::WavReader::open(path).map_err(|err| match err {
        hound::Error::IoError(io) => AudioError::LoadFailed {
            path: display.clone(),
            reason: io.to_string(),
        },
        other => AudioError::UnsupportedFormat {
            path: display.clone(),
            details: other.to_string(),
        },
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat {
            path: display,
            details: "zero channels".to_string(),
        });
    }

    let decode_error = |err: hound::Error| AudioError::DecodeFailed {
        path: display.clone(),
        reason: err.to_string(),
    };

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(decode_error))
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) - 1).max(1) as f32;
            match spec.bits_per_sample {
                8 | 16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|v| v as f32 / max).map_err(decode_error))
                    .collect::<Result<Vec<f32>, _>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / max).map_err(decode_error))
                    .collect::<Result<Vec<f32>, _>>()?,
                bits => {
                    return Err(AudioError::UnsupportedFormat {
                        path: display,
                        details: format!("unsupported bits_per_sample={}", bits),
                    })
                }
            }
        }
    };

    Ok((samples, spec.channels, spec.sample_rate))
}
