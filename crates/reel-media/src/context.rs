//! Shared state handed to every pipeline operation.

use reel_models::{MediaRef, MediaRoot};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::{FfmpegRunner, RunnerConfig};
use crate::error::{MediaError, MediaResult};
use crate::probe::MediaInfo;
use crate::tool::MediaTool;

/// Media root plus the tool used to execute commands.
#[derive(Clone)]
pub struct MediaContext {
    root: MediaRoot,
    tool: Arc<dyn MediaTool>,
}

impl MediaContext {
    pub fn new(root: MediaRoot, tool: Arc<dyn MediaTool>) -> Self {
        Self { root, tool }
    }

    /// Context backed by real FFmpeg/yt-dlp processes.
    pub fn with_runner(root: MediaRoot, config: RunnerConfig) -> Self {
        Self::new(root, Arc::new(FfmpegRunner::with_config(config)))
    }

    /// Context resolved entirely from the environment.
    pub fn from_env() -> Self {
        Self::with_runner(MediaRoot::from_env(), RunnerConfig::from_env())
    }

    pub fn root(&self) -> &MediaRoot {
        &self.root
    }

    pub fn tool(&self) -> &dyn MediaTool {
        self.tool.as_ref()
    }

    /// Filesystem path of a reference under this root.
    pub fn resolve(&self, reference: &MediaRef) -> PathBuf {
        self.root.resolve(reference)
    }

    /// Resolve an output reference, creating its parent directory.
    pub async fn output_path(&self, reference: &MediaRef) -> MediaResult<PathBuf> {
        let path = self.resolve(reference);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(path)
    }

    /// Probe a reference.
    pub async fn probe(&self, reference: &MediaRef) -> MediaResult<MediaInfo> {
        self.tool.probe(&self.resolve(reference)).await
    }

    /// Duration of a reference in seconds.
    pub async fn duration(&self, reference: &MediaRef) -> MediaResult<f64> {
        let info = self.probe(reference).await?;
        if !info.duration.is_finite() || info.duration < 0.0 {
            return Err(MediaError::InvalidMedia(format!(
                "{} reported an invalid duration: {}",
                reference, info.duration
            )));
        }
        Ok(info.duration)
    }
}

impl fmt::Debug for MediaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaContext")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
