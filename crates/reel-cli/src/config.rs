//! Runtime configuration assembled from the environment and CLI flags.

use reel_inference::InferenceConfig;
use reel_media::{MediaContext, RunnerConfig};
use reel_models::MediaRoot;
use std::path::PathBuf;

/// Everything a command needs to run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub media_root: MediaRoot,
    pub runner: RunnerConfig,
    pub inference: InferenceConfig,
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            media_root: MediaRoot::from_env(),
            runner: RunnerConfig::from_env(),
            inference: InferenceConfig::from_env(),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, media_root: Option<PathBuf>, ffmpeg_timeout: Option<u64>) -> Self {
        if let Some(dir) = media_root {
            self.media_root = MediaRoot::new(dir);
        }
        if let Some(secs) = ffmpeg_timeout.filter(|secs| *secs > 0) {
            self.runner.timeout_secs = Some(secs);
        }
        self
    }

    pub fn media_context(&self) -> MediaContext {
        MediaContext::with_runner(self.media_root.clone(), self.runner.clone())
    }
}
