//! Speech synthesis.

use reel_models::MediaRef;
use tracing::info;

use crate::client::InferenceClient;
use crate::error::{InferenceError, InferenceResult};
use crate::types::{SpeechRequest, OUTPUT_DIR};

/// Guidance scale used when the caller does not pick one.
pub const DEFAULT_CFG_SCALE: f64 = 1.8;

pub const DEFAULT_DEVICE: &str = "cuda";

/// Voice and sampling options for a synthesis job.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub speakers: Vec<String>,
    pub cfg_scale: f64,
    pub device: String,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            speakers: Vec::new(),
            cfg_scale: DEFAULT_CFG_SCALE,
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl SpeechOptions {
    pub fn with_speakers<I, S>(speakers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            speakers: speakers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Name the service gives its output when it does not report one.
pub fn generated_name(dest: &MediaRef) -> InferenceResult<MediaRef> {
    Ok(MediaRef::parse(format!("{}_generated.wav", dest.as_relative()))?)
}

fn speech_request(dest: &MediaRef, text: &str, options: &SpeechOptions, production: bool) -> SpeechRequest {
    SpeechRequest {
        name: dest.as_relative().to_string(),
        output_dir: OUTPUT_DIR.to_string(),
        device: options.device.clone(),
        text: text.to_string(),
        speaker_names: options.speakers.join(", "),
        cfg_scale: options.cfg_scale,
        production,
    }
}

impl InferenceClient {
    /// Synthesize `text` and return the generated audio.
    pub async fn synthesize_speech(
        &self,
        dest: &MediaRef,
        text: &str,
        options: &SpeechOptions,
    ) -> InferenceResult<MediaRef> {
        if text.trim().is_empty() {
            return Err(InferenceError::Configuration("speech text is empty".to_string()));
        }

        let request = speech_request(dest, text, options, self.config().production);
        let response = self.poll(&self.config().tts, dest.as_relative(), &request).await?;

        let output = match response.path {
            Some(path) => MediaRef::parse(path)?,
            None => generated_name(dest)?,
        };
        info!(dest = %dest, output = %output, "Speech synthesized");
        Ok(output)
    }
}
