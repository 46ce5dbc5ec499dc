//! Client for the remote GPU inference services.
//!
//! Speech synthesis, speaker diarization and subtitle transcription run as
//! separate HTTP services that may decline work while busy. This crate wraps
//! them behind one polling client with a uniform busy/retry contract.

pub mod client;
pub mod diarization;
pub mod error;
pub mod speech;
pub mod transcription;
pub mod types;

pub use client::{parse_max_attempts, InferenceClient, InferenceConfig, ServiceEndpoint};
pub use diarization::parse_segments;
pub use error::{InferenceError, InferenceResult};
pub use speech::{generated_name, SpeechOptions};
pub use transcription::{subtitle_path, TranscriptionOptions};
pub use types::{Diarization, ServiceResponse, Transcript};
