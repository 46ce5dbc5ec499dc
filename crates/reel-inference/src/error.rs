//! Inference client error types.

use reel_models::ReferenceError;
use thiserror::Error;

pub type InferenceResult<T> = Result<T, InferenceError>;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("{service} service remained busy after {attempts} attempts for \"{job}\"")]
    Exhausted {
        service: String,
        job: String,
        attempts: u32,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid media reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// True when the service never left its busy state.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, InferenceError::Exhausted { .. })
    }

    /// Attempts made before giving up, for exhausted jobs.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            InferenceError::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_names_job_and_attempts() {
        let err = InferenceError::Exhausted {
            service: "srt".to_string(),
            job: "talk.wav".to_string(),
            attempts: 20,
        };
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), Some(20));
        assert_eq!(
            err.to_string(),
            "srt service remained busy after 20 attempts for \"talk.wav\""
        );
    }

    #[test]
    fn test_other_errors_have_no_attempts() {
        let err = InferenceError::Timeout(30);
        assert!(!err.is_exhausted());
        assert_eq!(err.attempts(), None);
    }
}
