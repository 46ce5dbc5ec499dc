//! Inference service request/response types.

use reel_models::{DiarizationSegment, MediaRef};
use serde::{Deserialize, Serialize};

/// Status value a service reports while it cannot take the job.
pub const BUSY_STATUS: &str = "busy";

/// Directory, relative to the service's media root, that outputs land in.
pub const OUTPUT_DIR: &str = "media";

/// Common response shape of every inference service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// `"busy"` while the service is occupied; anything else means done
    #[serde(default)]
    pub status: String,
    /// Output written by the service, relative to the media root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ServiceResponse {
    pub fn is_busy(&self) -> bool {
        self.status == BUSY_STATUS
    }
}

/// Speech synthesis request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Output name, without the `media/` prefix
    pub name: String,
    pub output_dir: String,
    /// Inference device, e.g. `cuda`
    pub device: String,
    /// Script to synthesize
    pub text: String,
    /// Voice names joined with `", "`
    pub speaker_names: String,
    /// Classifier-free guidance scale
    pub cfg_scale: f64,
    pub production: bool,
}

/// Speaker diarization request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationRequest {
    /// Audio to analyse
    pub name: String,
    pub output_dir: String,
    pub production: bool,
}

/// Subtitle transcription request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Audio or video to transcribe
    pub name: String,
    pub output_dir: String,
    /// Spoken language code
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words_per_line: Option<u32>,
    /// Whisper model size
    pub model: String,
    pub production: bool,
}

/// Result of a diarization job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diarization {
    /// JSON file the service wrote
    pub file: MediaRef,
    /// Normalized segments read from `file`
    pub segments: Vec<DiarizationSegment>,
}

/// Result of a transcription job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    /// Where the subtitles were copied to
    pub file: MediaRef,
    /// Raw SRT text
    pub srt: String,
}
