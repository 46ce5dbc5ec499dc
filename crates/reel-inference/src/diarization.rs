//! Speaker diarization.

use reel_models::{normalize_segments, DiarizationSegment, MediaRef};
use tracing::info;

use crate::client::InferenceClient;
use crate::error::InferenceResult;
use crate::types::{Diarization, DiarizationRequest, OUTPUT_DIR};

/// Parse the service's JSON output and normalize it.
pub fn parse_segments(raw: &str) -> InferenceResult<Vec<DiarizationSegment>> {
    let segments: Vec<DiarizationSegment> = serde_json::from_str(raw)?;
    Ok(normalize_segments(segments))
}

impl InferenceClient {
    /// Diarize `audio` into the default output directory.
    pub async fn diarize(&self, audio: &MediaRef) -> InferenceResult<Diarization> {
        self.diarize_into(audio, OUTPUT_DIR).await
    }

    /// Diarize `audio`, asking the service to write into `output_dir`.
    ///
    /// When the service does not report where it wrote the segments, they are
    /// expected next to the audio with a `.json` extension.
    pub async fn diarize_into(&self, audio: &MediaRef, output_dir: &str) -> InferenceResult<Diarization> {
        let request = DiarizationRequest {
            name: audio.as_relative().to_string(),
            output_dir: output_dir.to_string(),
            production: self.config().production,
        };
        let response = self
            .poll(&self.config().diarization, audio.as_relative(), &request)
            .await?;

        let file = match response.path {
            Some(path) => MediaRef::parse(path)?,
            None => audio.with_extension("json"),
        };
        let raw = tokio::fs::read_to_string(self.root().resolve(&file)).await?;
        let segments = parse_segments(&raw)?;

        info!(audio = %audio, file = %file, segments = segments.len(), "Diarization finished");
        Ok(Diarization { file, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments_normalizes() {
        let raw = r#"[
            {"speaker": 1, "start": 0.0, "end": 2.5},
            {"speaker": 0, "start": 2.5, "end": 2.9},
            {"speaker": 0, "start": 2.9, "end": 6.0}
        ]"#;
        let segments = parse_segments(raw).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, 0);
        assert_eq!(segments[1].speaker, 1);
    }

    #[test]
    fn test_parse_segments_rejects_garbage() {
        assert!(parse_segments("not json").is_err());
    }
}
