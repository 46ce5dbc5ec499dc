//! Subtitle transcription.

use reel_models::MediaRef;
use std::path::Path;
use tracing::{info, warn};

use crate::client::InferenceClient;
use crate::error::InferenceResult;
use crate::types::{Transcript, TranscriptionRequest, OUTPUT_DIR};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MODEL: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionOptions {
    pub language: String,
    pub max_words_per_line: Option<u32>,
    pub model: String,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            max_words_per_line: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Where the service writes subtitles for `src` when it does not say.
pub fn subtitle_path(src: &MediaRef) -> MediaRef {
    src.with_extension("srt")
}

impl InferenceClient {
    /// Transcribe `src` to subtitles stored at `dest`.
    ///
    /// The service's own SRT file is moved to `dest` and the subtitle text is
    /// returned alongside the reference.
    pub async fn transcribe(
        &self,
        src: &MediaRef,
        dest: &MediaRef,
        options: &TranscriptionOptions,
    ) -> InferenceResult<Transcript> {
        let request = TranscriptionRequest {
            name: src.as_relative().to_string(),
            output_dir: OUTPUT_DIR.to_string(),
            language: options.language.clone(),
            max_words_per_line: options.max_words_per_line,
            model: options.model.clone(),
            production: self.config().production,
        };
        let response = self.poll(&self.config().srt, src.as_relative(), &request).await?;

        let generated = match response.path {
            Some(path) => MediaRef::parse(path)?,
            None => subtitle_path(src),
        };

        let from = self.root().resolve(&generated);
        let to = self.root().resolve(dest);
        if from != to {
            if let Some(parent) = to.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&from, &to).await?;
            remove_best_effort(&from).await;
        }

        let srt = tokio::fs::read_to_string(&to).await?;
        info!(src = %src, dest = %dest, bytes = srt.len(), "Transcription finished");

        Ok(Transcript {
            file: dest.clone(),
            srt,
        })
    }
}

async fn remove_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove service subtitle file"),
    }
}
