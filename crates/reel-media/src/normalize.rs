//! Duration normalization: loop an asset to an exact length.
//!
//! The source is duplicated `N` times, the copies are crossfade-merged in
//! order and the result is trimmed to the target. With a source of duration
//! `d` and overlap `c`, every copy contributes `e = d - c` seconds, so
//! `N = ceil(target / e)` copies give `N * e + c >= target` seconds of raw
//! material.

use reel_models::encoding::{DEFAULT_AUDIO_CROSSFADE_SECS, DEFAULT_VIDEO_CROSSFADE_SECS};
use reel_models::{AudioFormat, MediaRef, Transition};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::audio::{add_audio_to_video, extract_audio};
use crate::context::MediaContext;
use crate::crossfade::Crossfade;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::job::PipelineJob;
use crate::ledger::TempArtifacts;
use crate::merge::merge;
use crate::trim::trim;

/// Upper bound on source copies per loop. Every copy costs one join, so a
/// source barely longer than its overlap is refused instead of queued.
pub const MAX_REPETITIONS: usize = 1000;

/// Options for [`normalize_video`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoLoopOptions {
    /// Exact output duration in seconds
    pub target_secs: f64,
    /// Visual overlap between consecutive copies
    #[serde(default = "default_video_crossfade")]
    pub crossfade_secs: f64,
    /// Audio overlap; the visual overlap when unset
    #[serde(default)]
    pub audio_crossfade_secs: Option<f64>,
    #[serde(default)]
    pub transition: Transition,
}

fn default_video_crossfade() -> f64 {
    DEFAULT_VIDEO_CROSSFADE_SECS
}

impl VideoLoopOptions {
    pub fn new(target_secs: f64) -> Self {
        Self {
            target_secs,
            crossfade_secs: DEFAULT_VIDEO_CROSSFADE_SECS,
            audio_crossfade_secs: None,
            transition: Transition::default(),
        }
    }

    pub fn with_crossfade(mut self, secs: f64) -> Self {
        self.crossfade_secs = secs;
        self
    }

    pub fn with_audio_crossfade(mut self, secs: f64) -> Self {
        self.audio_crossfade_secs = Some(secs);
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    pub fn audio_crossfade(&self) -> f64 {
        self.audio_crossfade_secs.unwrap_or(self.crossfade_secs)
    }
}

/// Number of source copies needed to cover `target_secs`.
///
/// Fails with a configuration error when the target or overlap is not
/// positive, when the overlap is not shorter than the source, or when more
/// than [`MAX_REPETITIONS`] copies would be needed.
pub fn repetitions(source_secs: f64, crossfade_secs: f64, target_secs: f64) -> MediaResult<usize> {
    if !target_secs.is_finite() || target_secs <= 0.0 {
        return Err(MediaError::configuration(format!(
            "target duration must be a positive number, got {}",
            target_secs
        )));
    }
    if !crossfade_secs.is_finite() || crossfade_secs <= 0.0 {
        return Err(MediaError::configuration(format!(
            "crossfade must be a positive number, got {}",
            crossfade_secs
        )));
    }

    let effective = source_secs - crossfade_secs;
    if effective <= 0.0 {
        return Err(MediaError::configuration(format!(
            "source is too short for the requested overlap: {}s crossfade on a {}s source",
            crossfade_secs, source_secs
        )));
    }

    let copies = (target_secs / effective).ceil();
    if copies > MAX_REPETITIONS as f64 {
        return Err(MediaError::configuration(format!(
            "looping a {}s source with a {}s crossfade to {}s needs {} copies, more than the limit of {}",
            source_secs, crossfade_secs, target_secs, copies, MAX_REPETITIONS
        )));
    }

    Ok((copies as usize).max(1))
}

/// Loop an audio asset to exactly `target_secs`.
pub async fn normalize_audio(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    target_secs: f64,
    crossfade_secs: f64,
) -> MediaResult<MediaRef> {
    let job = PipelineJob::new("normalize_audio");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {} ({}s)", src, dest, target_secs));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = loop_track(
            ctx,
            &mut temps,
            src,
            dest,
            target_secs,
            Crossfade::audio(crossfade_secs),
        )
        .await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}

/// Loop an audio asset with the default audio overlap.
pub async fn loop_audio(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    target_secs: f64,
) -> MediaResult<MediaRef> {
    normalize_audio(ctx, src, dest, target_secs, DEFAULT_AUDIO_CROSSFADE_SECS).await
}

/// Loop a video asset to exactly `options.target_secs`.
///
/// The visual track is looped with `xfade` and the audio track is extracted
/// and looped separately with `acrossfade`, then the two are muxed at offset
/// zero.
pub async fn normalize_video(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
    options: &VideoLoopOptions,
) -> MediaResult<MediaRef> {
    let job = PipelineJob::new("normalize_video");
    let span = job.span();

    async {
        job.log_start(&format!("{} -> {} ({}s)", src, dest, options.target_secs));

        let mut temps = TempArtifacts::new(ctx.root());
        let result = loop_video(ctx, &job, &mut temps, src, dest, options).await;
        temps.cleanup().await;

        job.finish(result)
    }
    .instrument(span)
    .await
}

async fn loop_video(
    ctx: &MediaContext,
    job: &PipelineJob,
    temps: &mut TempArtifacts,
    src: &MediaRef,
    dest: &MediaRef,
    options: &VideoLoopOptions,
) -> MediaResult<MediaRef> {
    let info = ctx.probe(src).await?;
    // Validate both overlaps before any work starts
    repetitions(info.duration, options.crossfade_secs, options.target_secs)?;
    if info.has_audio {
        repetitions(info.duration, options.audio_crossfade(), options.target_secs)?;
    }

    let looped_video = temps.reserve(dest, "noaudio");
    loop_track(
        ctx,
        temps,
        src,
        &looped_video,
        options.target_secs,
        Crossfade::video(options.crossfade_secs, options.transition),
    )
    .await?;
    job.log_progress("video track looped");

    if !info.has_audio {
        move_file(ctx.resolve(&looped_video), ctx.output_path(dest).await?).await?;
        return Ok(dest.clone());
    }

    let track = temps.reserve_with_extension(dest, "tmp", "wav");
    extract_audio(ctx, src, &track).await?;

    let looped_audio = temps.reserve_with_extension(dest, "looped", "wav");
    loop_track(
        ctx,
        temps,
        &track,
        &looped_audio,
        options.target_secs,
        Crossfade::audio(options.audio_crossfade()),
    )
    .await?;
    temps.release(&track).await;
    job.log_progress("audio track looped");

    let muxed = temps.reserve(dest, "tmp");
    add_audio_to_video(ctx, &looped_video, &looped_audio, &muxed, 0.0, AudioFormat::Wav).await?;
    move_file(ctx.resolve(&muxed), ctx.output_path(dest).await?).await?;

    Ok(dest.clone())
}

/// Loop one track of `src` into `out`, which is written last.
async fn loop_track(
    ctx: &MediaContext,
    temps: &mut TempArtifacts,
    src: &MediaRef,
    out: &MediaRef,
    target_secs: f64,
    crossfade: Crossfade,
) -> MediaResult<MediaRef> {
    let source_secs = ctx.duration(src).await?;
    let copies = repetitions(source_secs, crossfade.overlap(), target_secs)?;

    tracing::info!(
        src = %src,
        source_secs,
        overlap = crossfade.overlap(),
        target_secs,
        copies,
        "Looping track"
    );

    // A single copy already covers the target; only the trim is needed
    let raw = if copies == 1 {
        src.clone()
    } else {
        let raw = temps.reserve(out, "raw");
        let inputs = vec![src.clone(); copies];
        merge(ctx, &inputs, &raw, crossfade).await?;
        raw
    };

    let cut = temps.reserve(out, "tmp");
    trim(ctx, &raw, &cut, 0.0, target_secs, crossfade.is_audio()).await?;
    if raw != *src {
        temps.release(&raw).await;
    }

    move_file(ctx.resolve(&cut), ctx.output_path(out).await?).await?;
    Ok(out.clone())
}
