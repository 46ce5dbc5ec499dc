//! The seam between pipeline orchestration and external processes.

use async_trait::async_trait;
use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner, ToolOutput};
use crate::download::run_ytdlp;
use crate::error::MediaResult;
use crate::probe::{probe_media, MediaInfo};

/// External media tooling used by every pipeline.
///
/// [`FfmpegRunner`] implements it with real processes; tests substitute a
/// recording fake.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Run one FFmpeg invocation to completion.
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput>;

    /// Inspect a media file.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Fetch a remote video into `output`.
    async fn download(&self, url: &str, output: &Path) -> MediaResult<()>;
}

#[async_trait]
impl MediaTool for FfmpegRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput> {
        FfmpegRunner::run(self, cmd).await
    }

    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media(path).await
    }

    async fn download(&self, url: &str, output: &Path) -> MediaResult<()> {
        run_ytdlp(url, output, self.config().cookies_file.as_deref()).await
    }
}
