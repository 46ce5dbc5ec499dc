//! Playback speed change and frame-rate upscaling.

use reel_models::MediaRef;
use tracing::{debug, Instrument};

use crate::command::FfmpegCommand;
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::job::PipelineJob;
use crate::ledger::TempArtifacts;
use crate::tempo::{atempo_filter, build_chain};

/// Retime `src` by `pts_factor`.
///
/// A factor of 2 doubles the duration (half speed), 0.5 halves it. Video is
/// retimed with `setpts`; audio tempo moves by the inverse ratio through an
/// `atempo` chain so extreme factors stay valid.
pub async fn change_speed(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    pts_factor: f64,
) -> MediaResult<MediaRef> {
    if !pts_factor.is_finite() || pts_factor <= 0.0 {
        return Err(MediaError::configuration(format!(
            "speed factor must be a positive number, got {}",
            pts_factor
        )));
    }
    let stages = build_chain(1.0 / pts_factor)?;

    let info = ctx.probe(src).await?;
    let dest_path = ctx.output_path(dest).await?;

    let mut cmd = FfmpegCommand::new(ctx.resolve(src), &dest_path);
    if info.has_video {
        cmd = cmd.output_args(["-filter:v".to_string(), format!("setpts={}*PTS", pts_factor)]);
    }
    if info.has_audio {
        cmd = cmd.output_args(["-filter:a".to_string(), atempo_filter(&stages)]);
    }

    debug!(src = %src, dest = %dest, pts_factor, stages = stages.len(), "Changing speed");
    ctx.tool().run(&cmd).await?;

    Ok(dest.clone())
}

/// Raise the frame rate of `src` to `fps` with motion interpolation.
///
/// `src` and `dest` may be the same reference.
pub async fn upscale_fps(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    fps: u32,
) -> MediaResult<MediaRef> {
    if fps == 0 {
        return Err(MediaError::configuration("target fps must be positive"));
    }

    let job = PipelineJob::new("upscale_fps");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {} at {} fps", src, dest, fps));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = interpolate_into(ctx, &mut temps, src, dest, fps).await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}

async fn interpolate_into(
    ctx: &MediaContext,
    temps: &mut TempArtifacts,
    src: &MediaRef,
    dest: &MediaRef,
    fps: u32,
) -> MediaResult<MediaRef> {
    let interpolated = temps.reserve(dest, "tmp");
    let cmd = FfmpegCommand::new(ctx.resolve(src), ctx.output_path(&interpolated).await?)
        .output_args(["-filter:v", "minterpolate"])
        .output_args(["-r".to_string(), fps.to_string()]);
    ctx.tool().run(&cmd).await?;

    move_file(ctx.resolve(&interpolated), ctx.output_path(dest).await?).await?;
    Ok(dest.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_tempo_chain_for_slow_motion() {
        // 100x slower video needs audio at 0.01x tempo
        let stages = build_chain(1.0 / 100.0).unwrap();
        let product: f64 = stages.iter().product();
        assert!((product - 0.01).abs() < 1e-12);
        assert!(stages.len() > 1);
    }
}
