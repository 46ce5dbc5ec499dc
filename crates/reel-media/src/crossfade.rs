//! Crossfade pair joiner.
//!
//! Joins exactly two assets, overlapping the tail of the first with the head
//! of the second. Audio uses `acrossfade` with an exponential fade-out and a
//! logarithmic fade-in; video uses `xfade` anchored at
//! `duration(first) - overlap` and carries no audio.

use reel_models::encoding::DEFAULT_VIDEO_CODEC;
use reel_models::{MediaRef, Transition};
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};

/// How two assets are blended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossfade {
    Audio { overlap: f64 },
    Video { overlap: f64, transition: Transition },
}

impl Crossfade {
    pub fn audio(overlap: f64) -> Self {
        Self::Audio { overlap }
    }

    pub fn video(overlap: f64, transition: Transition) -> Self {
        Self::Video { overlap, transition }
    }

    /// Seconds shared by the two joined assets.
    pub fn overlap(&self) -> f64 {
        match self {
            Self::Audio { overlap } | Self::Video { overlap, .. } => *overlap,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }

    /// Reject overlaps that cannot be applied to a first input of
    /// `first_duration` seconds.
    pub fn validate(&self, first: &MediaRef, first_duration: f64) -> MediaResult<()> {
        let overlap = self.overlap();
        if !overlap.is_finite() || overlap <= 0.0 {
            return Err(MediaError::configuration(format!(
                "crossfade overlap must be a positive number, got {}",
                overlap
            )));
        }
        if overlap >= first_duration {
            return Err(MediaError::configuration(format!(
                "crossfade overlap of {}s is not shorter than {} ({}s); source too short for the requested overlap",
                overlap, first, first_duration
            )));
        }
        Ok(())
    }

    /// FFmpeg command joining `first` and `second` into `dest`.
    fn command(
        &self,
        ctx: &MediaContext,
        first: &MediaRef,
        second: &MediaRef,
        dest: &std::path::Path,
        first_duration: f64,
    ) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(ctx.resolve(first), dest).input(ctx.resolve(second));
        match *self {
            Self::Audio { overlap } => {
                cmd.filter_complex(format!("acrossfade=d={}:c1=exp:c2=log", overlap))
            }
            Self::Video {
                overlap,
                transition,
            } => {
                let offset = first_duration - overlap;
                cmd.filter_complex(format!(
                    "[0:v][1:v]xfade=transition={}:duration={}:offset={:.3}[v]",
                    transition, overlap, offset
                ))
                .map("[v]")
                .video_codec(DEFAULT_VIDEO_CODEC)
            }
        }
    }
}

/// Join `first` and `second` into `dest`.
///
/// The first input is probed before anything runs; an overlap that is not
/// strictly shorter than it fails with a configuration error and no FFmpeg
/// process is started.
pub async fn join(
    ctx: &MediaContext,
    first: &MediaRef,
    second: &MediaRef,
    dest: &MediaRef,
    crossfade: Crossfade,
) -> MediaResult<MediaRef> {
    let first_duration = ctx.duration(first).await?;
    crossfade.validate(first, first_duration)?;

    let dest_path = ctx.output_path(dest).await?;
    let cmd = crossfade.command(ctx, first, second, &dest_path, first_duration);

    debug!(
        first = %first,
        second = %second,
        dest = %dest,
        overlap = crossfade.overlap(),
        first_duration,
        "Joining pair with crossfade"
    );
    ctx.tool().run(&cmd).await?;

    Ok(dest.clone())
}

/// Join two audio assets with an `exp`/`log` crossfade.
pub async fn join_audio(
    ctx: &MediaContext,
    first: &MediaRef,
    second: &MediaRef,
    dest: &MediaRef,
    overlap: f64,
) -> MediaResult<MediaRef> {
    join(ctx, first, second, dest, Crossfade::audio(overlap)).await
}

/// Join two video assets with a visual transition.
pub async fn join_video(
    ctx: &MediaContext,
    first: &MediaRef,
    second: &MediaRef,
    dest: &MediaRef,
    overlap: f64,
    transition: Transition,
) -> MediaResult<MediaRef> {
    join(ctx, first, second, dest, Crossfade::video(overlap, transition)).await
}
