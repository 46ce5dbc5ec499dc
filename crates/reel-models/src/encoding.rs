//! Encoding defaults shared by the pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Audio codec used when muxing uncompressed audio into a video container
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Codec for extracted audio tracks
pub const PCM_AUDIO_CODEC: &str = "pcm_s16le";
/// Sample rate for extracted audio tracks
pub const PCM_SAMPLE_RATE: u32 = 44_100;
/// Channel count for extracted audio tracks
pub const PCM_CHANNELS: u32 = 2;

/// Default overlap when looping audio
pub const DEFAULT_AUDIO_CROSSFADE_SECS: f64 = 5.0;
/// Default overlap when looping video
pub const DEFAULT_VIDEO_CROSSFADE_SECS: f64 = 3.0;

/// Lower bound accepted by one `atempo` stage
pub const ATEMPO_MIN: f64 = 0.5;
/// Upper bound accepted by one `atempo` stage
pub const ATEMPO_MAX: f64 = 100.0;

/// `cropdetect` luminance threshold
pub const CROPDETECT_LIMIT: u32 = 24;
/// `cropdetect` dimension rounding
pub const CROPDETECT_ROUND: u32 = 16;

/// Default target frame rate for motion interpolation
pub const DEFAULT_UPSCALE_FPS: u32 = 60;

/// Container format of an audio track being muxed into a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Ogg,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
        }
    }

    /// How the track is encoded when muxed: WAV is compressed, the rest is
    /// stream-copied.
    pub fn mux_encoding(&self) -> AudioEncoding {
        match self {
            AudioFormat::Wav => AudioEncoding::Encode(DEFAULT_AUDIO_CODEC),
            AudioFormat::Mp3 | AudioFormat::Ogg => AudioEncoding::Copy,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        extension.parse().ok()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = AudioFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            "ogg" => Ok(AudioFormat::Ogg),
            _ => Err(AudioFormatParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown audio format: {0}")]
pub struct AudioFormatParseError(String);

/// Audio codec argument for an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Stream copy (`-c:a copy`)
    Copy,
    /// Re-encode with the named codec
    Encode(&'static str),
}

impl AudioEncoding {
    pub fn codec(&self) -> &'static str {
        match self {
            AudioEncoding::Copy => "copy",
            AudioEncoding::Encode(codec) => codec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_encoding() {
        assert_eq!(AudioFormat::Wav.mux_encoding().codec(), "aac");
        assert_eq!(AudioFormat::Mp3.mux_encoding().codec(), "copy");
        assert_eq!(AudioFormat::Ogg.mux_encoding(), AudioEncoding::Copy);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(AudioFormat::from_extension("WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension("flac"), None);
    }
}
