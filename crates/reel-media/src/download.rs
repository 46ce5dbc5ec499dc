//! Video download using yt-dlp, and the download-then-loop pipelines.

use reel_models::MediaRef;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn, Instrument};

use crate::audio::extract_audio;
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::job::PipelineJob;
use crate::ledger::TempArtifacts;
use crate::normalize::{loop_audio, normalize_video, VideoLoopOptions};
use crate::speed::upscale_fps;

/// Preferred formats: MP4 video with M4A audio, else any single MP4.
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Download `url` into `output_path` with yt-dlp.
pub async fn run_ytdlp(url: &str, output_path: &Path, cookies: Option<&Path>) -> MediaResult<()> {
    if url.trim().is_empty() {
        return Err(MediaError::configuration("download URL is empty"));
    }

    // Check yt-dlp exists
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    info!("Downloading video from {} to {}", url, output_path.display());

    let mut cmd = Command::new("yt-dlp");
    cmd.args(["--no-playlist", "--merge-output-format", "mp4", "-f", FORMAT_SELECTOR, "-o"])
        .arg(output_path);

    match cookies {
        Some(path) if path.exists() => {
            cmd.arg("--cookies").arg(path);
        }
        Some(path) => {
            debug!("Cookies file {} not found, skipping", path.display());
        }
        None => {}
    }
    cmd.arg(url);

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);

        let error_msg = stderr.lines().last().unwrap_or("Unknown error");
        if stderr.contains("429") || stderr.contains("Too Many Requests") {
            warn!(url = %url, "Rate limit detected while downloading");
        }

        return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
    }

    // Verify file was created
    if !output_path.exists() {
        return Err(MediaError::download_failed("Output file not created"));
    }

    let file_size = output_path.metadata()?.len();
    info!(
        output = %output_path.display(),
        size_mb = file_size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );

    Ok(())
}

/// Download `url` into `dest`.
pub async fn download_video(ctx: &MediaContext, url: &str, dest: &MediaRef) -> MediaResult<MediaRef> {
    let dest_path = ctx.output_path(dest).await?;
    ctx.tool().download(url, &dest_path).await?;
    Ok(dest.clone())
}

/// Download a video and loop it, audio and picture, to exactly
/// `options.target_secs`, optionally interpolating to `upscale` fps.
pub async fn download_and_loop_video(
    ctx: &MediaContext,
    url: &str,
    dest: &MediaRef,
    options: &VideoLoopOptions,
    upscale: Option<u32>,
) -> MediaResult<MediaRef> {
    let job = PipelineJob::new("download_and_loop_video");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {}", url, dest));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = async {
            let downloaded = temps.reserve(dest, "download");
            download_video(ctx, url, &downloaded).await?;
            job.log_progress("download finished");

            let looped = temps.reserve(dest, "looped");
            normalize_video(ctx, &downloaded, &looped, options).await?;
            temps.release(&downloaded).await;

            if let Some(fps) = upscale {
                upscale_fps(ctx, &looped, &looped, fps).await?;
                job.log_progress("frame rate upscaled");
            }

            move_file(ctx.resolve(&looped), ctx.output_path(dest).await?).await?;
            Ok::<_, MediaError>(dest.clone())
        }
        .await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}

/// Download a video, keep only its audio track, and loop it to exactly
/// `target_secs`.
pub async fn download_and_loop_audio(
    ctx: &MediaContext,
    url: &str,
    dest: &MediaRef,
    target_secs: f64,
) -> MediaResult<MediaRef> {
    let job = PipelineJob::new("download_and_loop_audio");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {}", url, dest));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = async {
            let downloaded = temps.reserve_with_extension(dest, "download", "mp4");
            download_video(ctx, url, &downloaded).await?;

            let track = temps.reserve_with_extension(dest, "tmp", "wav");
            extract_audio(ctx, &downloaded, &track).await?;
            temps.release(&downloaded).await;
            job.log_progress("audio extracted");

            loop_audio(ctx, &track, dest, target_secs).await
        }
        .await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}
