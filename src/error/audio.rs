// Audio error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Single source of truth for the numeric codes reported by the CLI.
///
/// Error code range: 1001-1006
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// File could not be opened or read
    pub const LOAD_FAILED: i32 = 1001;

    /// File decoded but its sample format is not supported
    pub const UNSUPPORTED_FORMAT: i32 = 1002;

    /// File decoded to zero samples
    pub const EMPTY_CLIP: i32 = 1003;

    /// Sample rate is zero or otherwise unusable
    pub const INVALID_SAMPLE_RATE: i32 = 1004;

    /// Malformed sample data inside an otherwise valid container
    pub const DECODE_FAILED: i32 = 1005;

    /// Analysis parameters the DSP stages cannot run with
    pub const INVALID_CONFIG: i32 = 1006;
}

/// Log an audio error with structured context
///
/// Logs the numeric code, the component and the message. Never panics.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=AudioLoader, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio-related errors
///
/// These errors cover loading and decoding of clips. During batch
/// processing they are collected per file and never abort the batch.
///
/// Error code range: 1001-1006
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// File could not be opened or read
    LoadFailed { path: String, reason: String },

    /// Sample format not supported by the decoder
    UnsupportedFormat { path: String, details: String },

    /// Clip contains no samples
    EmptyClip { path: String },

    /// Sample rate is zero
    InvalidSampleRate { rate: u32 },

    /// Sample stream was truncated or corrupt
    DecodeFailed { path: String, reason: String },

    /// Audio, VAD or feature settings rejected at construction
    InvalidConfig { reason: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::LoadFailed { .. } => AudioErrorCodes::LOAD_FAILED,
            AudioError::UnsupportedFormat { .. } => AudioErrorCodes::UNSUPPORTED_FORMAT,
            AudioError::EmptyClip { .. } => AudioErrorCodes::EMPTY_CLIP,
            AudioError::InvalidSampleRate { .. } => AudioErrorCodes::INVALID_SAMPLE_RATE,
            AudioError::DecodeFailed { .. } => AudioErrorCodes::DECODE_FAILED,
            AudioError::InvalidConfig { .. } => AudioErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::LoadFailed { path, reason } => {
                format!("Failed to load {}: {}", path, reason)
            }
            AudioError::UnsupportedFormat { path, details } => {
                format!("Unsupported audio format in {}: {}", path, details)
            }
            AudioError::EmptyClip { path } => format!("Clip {} contains no samples", path),
            AudioError::InvalidSampleRate { rate } => {
                format!("Sample rate must be greater than 0 (got {})", rate)
            }
            AudioError::DecodeFailed { path, reason } => {
                format!("Failed to decode samples in {}: {}", path, reason)
            }
            AudioError::InvalidConfig { reason } => {
                format!("Invalid analysis configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::LoadFailed {
                path: "x.wav".to_string(),
                reason: "missing".to_string()
            }
            .code(),
            AudioErrorCodes::LOAD_FAILED
        );
        assert_eq!(
            AudioError::UnsupportedFormat {
                path: "x.wav".to_string(),
                details: "8-bit".to_string()
            }
            .code(),
            AudioErrorCodes::UNSUPPORTED_FORMAT
        );
        assert_eq!(
            AudioError::EmptyClip {
                path: "x.wav".to_string()
            }
            .code(),
            AudioErrorCodes::EMPTY_CLIP
        );
        assert_eq!(
            AudioError::InvalidSampleRate { rate: 0 }.code(),
            AudioErrorCodes::INVALID_SAMPLE_RATE
        );
        assert_eq!(
            AudioError::DecodeFailed {
                path: "x.wav".to_string(),
                reason: "eof".to_string()
            }
            .code(),
            AudioErrorCodes::DECODE_FAILED
        );
        assert_eq!(
            AudioError::InvalidConfig {
                reason: "hop".to_string()
            }
            .code(),
            1006
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::LoadFailed {
            path: "banana_01.wav".to_string(),
            reason: "No such file".to_string(),
        };
        assert_eq!(err.message(), "Failed to load banana_01.wav: No such file");

        let err = AudioError::InvalidSampleRate { rate: 0 };
        assert!(err.message().contains("got 0"));
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::EmptyClip {
            path: "pear.wav".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains(&err.code().to_string()));
    }
}
