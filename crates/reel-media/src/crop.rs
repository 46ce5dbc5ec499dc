//! Black-bar detection and removal.
//!
//! Detection relies on a specific behavior of FFmpeg's `cropdetect`: with
//! `reset=0` it never forgets earlier frames, so every line it logs is the
//! bounding box of all content seen so far and the last line covers the whole
//! asset. If a future FFmpeg changes that, [`parse_last_crop`] is the place
//! to revisit.

use reel_models::encoding::{CROPDETECT_LIMIT, CROPDETECT_ROUND, DEFAULT_VIDEO_CODEC};
use reel_models::{CropRect, MediaRef};
use tracing::{info, Instrument};

use crate::command::{FfmpegCommand, NULL_OUTPUT};
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::job::PipelineJob;
use crate::ledger::TempArtifacts;

/// `cropdetect` filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropDetectSettings {
    /// Black threshold (0-255)
    pub limit: u32,
    /// Width/height are rounded to a multiple of this
    pub round: u32,
}

impl Default for CropDetectSettings {
    fn default() -> Self {
        Self {
            limit: CROPDETECT_LIMIT,
            round: CROPDETECT_ROUND,
        }
    }
}

impl CropDetectSettings {
    fn filter(&self) -> String {
        format!("cropdetect=limit={}:round={}:reset=0", self.limit, self.round)
    }
}

/// Parse the last `crop=W:H:X:Y` token in `cropdetect` output.
///
/// Only the final token counts. When it does not describe a rectangle (for
/// example `crop=-1904:-1056:...` on an all-black asset) the result is `None`
/// rather than an earlier, partial bounding box.
pub fn parse_last_crop(stderr: &str) -> Option<CropRect> {
    let rest = stderr
        .lines()
        .rev()
        .find_map(|line| line.rfind("crop=").map(|idx| &line[idx + 5..]))?;
    let token: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':' || *c == '-')
        .collect();
    token.parse().ok()
}

/// Scan all of `src` and return the crop rectangle that removes its black
/// bars.
///
/// No rectangle in the detector output is an error; there is no "no crop"
/// default.
pub async fn detect_crop(
    ctx: &MediaContext,
    src: &MediaRef,
    settings: CropDetectSettings,
) -> MediaResult<CropRect> {
    let src_path = ctx.resolve(src);
    // cropdetect reports at info level
    let cmd = FfmpegCommand::new(&src_path, NULL_OUTPUT)
        .log_level("info")
        .video_filter(settings.filter())
        .format("null");

    let output = ctx.tool().run(&cmd).await?;
    let rect = parse_last_crop(&output.stderr).ok_or(MediaError::CropNotDetected(src_path))?;

    info!(src = %src, crop = %rect, "Detected crop");
    Ok(rect)
}

/// Re-encode `src` into `dest` with its black bars cropped away.
///
/// Audio is stream-copied.
pub async fn remove_black_bars(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    settings: CropDetectSettings,
) -> MediaResult<MediaRef> {
    let job = PipelineJob::new("remove_black_bars");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {}", src, dest));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = crop_into(ctx, &mut temps, src, dest, settings).await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}

async fn crop_into(
    ctx: &MediaContext,
    temps: &mut TempArtifacts,
    src: &MediaRef,
    dest: &MediaRef,
    settings: CropDetectSettings,
) -> MediaResult<MediaRef> {
    let rect = detect_crop(ctx, src, settings).await?;

    let cropped = temps.reserve(dest, "tmp");
    let cmd = FfmpegCommand::new(ctx.resolve(src), ctx.output_path(&cropped).await?)
        .video_filter(rect.filter())
        .video_codec(DEFAULT_VIDEO_CODEC)
        .audio_codec("copy");
    ctx.tool().run(&cmd).await?;

    move_file(ctx.resolve(&cropped), ctx.output_path(dest).await?).await?;
    Ok(dest.clone())
}
