//! Audio track extraction and muxing.

use reel_models::encoding::{PCM_AUDIO_CODEC, PCM_CHANNELS, PCM_SAMPLE_RATE};
use reel_models::{AudioFormat, MediaRef};
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};

/// Extract the audio track of `src` as 16-bit PCM stereo WAV.
pub async fn extract_audio(
    ctx: &MediaContext,
    src: &MediaRef,
    dest: &MediaRef,
) -> MediaResult<MediaRef> {
    let dest_path = ctx.output_path(dest).await?;
    let cmd = FfmpegCommand::new(ctx.resolve(src), &dest_path)
        .no_video()
        .output_args(["-acodec", PCM_AUDIO_CODEC])
        .output_args(["-ar".to_string(), PCM_SAMPLE_RATE.to_string()])
        .output_args(["-ac".to_string(), PCM_CHANNELS.to_string()]);

    debug!(src = %src, dest = %dest, "Extracting audio track");
    ctx.tool().run(&cmd).await?;

    Ok(dest.clone())
}

/// Mux `audio` into `video`, delaying the audio by `offset` seconds.
///
/// The video stream is copied. WAV audio is encoded to AAC; MP3 and OGG are
/// stream-copied.
pub async fn add_audio_to_video(
    ctx: &MediaContext,
    video: &MediaRef,
    audio: &MediaRef,
    dest: &MediaRef,
    offset: f64,
    format: AudioFormat,
) -> MediaResult<MediaRef> {
    if !offset.is_finite() || offset < 0.0 {
        return Err(MediaError::configuration(format!(
            "audio offset must be a non-negative number, got {}",
            offset
        )));
    }

    let dest_path = ctx.output_path(dest).await?;
    let cmd = FfmpegCommand::new(ctx.resolve(video), &dest_path)
        .input(ctx.resolve(audio))
        .offset(offset)
        .map("0:v")
        .map("1:a")
        .video_codec("copy")
        .audio_codec(format.mux_encoding().codec());

    debug!(video = %video, audio = %audio, dest = %dest, offset, %format, "Muxing audio into video");
    ctx.tool().run(&cmd).await?;

    Ok(dest.clone())
}
