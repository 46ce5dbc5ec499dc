//! Cutting a time range out of an asset.

use reel_models::encoding::DEFAULT_VIDEO_CODEC;
use reel_models::MediaRef;
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};

/// Keep `[start, end)` of `src` in `dest`.
///
/// Both bounds are applied as input options, so FFmpeg seeks instead of
/// decoding up to `start`. Audio-only assets are stream-copied; video is
/// re-encoded with H.264 so the cut lands on the requested frame, audio is
/// copied.
pub async fn trim(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    start: f64,
    end: f64,
    audio_only: bool,
) -> MediaResult<MediaRef> {
    if !start.is_finite() || start < 0.0 {
        return Err(MediaError::configuration(format!(
            "trim start must be a non-negative number, got {}",
            start
        )));
    }
    if !end.is_finite() || end <= start {
        return Err(MediaError::configuration(format!(
            "trim end ({}) must be greater than start ({})",
            end, start
        )));
    }

    let dest_path = ctx.output_path(dest).await?;
    let mut cmd = FfmpegCommand::new(ctx.resolve(src), &dest_path)
        .seek(start)
        .until(end);

    if !audio_only {
        cmd = cmd.video_codec(DEFAULT_VIDEO_CODEC);
    }
    cmd = cmd.audio_codec("copy");

    debug!(src = %src, dest = %dest, start, end, audio_only, "Trimming");
    ctx.tool().run(&cmd).await?;

    Ok(dest.clone())
}
