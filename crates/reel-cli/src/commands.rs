//! Subcommand dispatch.

use anyhow::{anyhow, Context, Result};
use reel_inference::{InferenceClient, SpeechOptions, TranscriptionOptions};
use reel_media::command::{check_ffmpeg, check_ffprobe, check_ytdlp};
use reel_media::{
    add_audio_to_video, change_speed, detect_crop, download_and_loop_audio, download_and_loop_video, download_video,
    extract_audio, join, merge, normalize_audio, normalize_video, remove_black_bars, trim, upscale_fps, CropDetectSettings,
    Crossfade, VideoLoopOptions,
};
use reel_models::{AudioFormat, Transition};

use crate::cli::Commands;
use crate::config::AppConfig;

fn crossfade(overlap: f64, transition: Option<Transition>) -> Crossfade {
    match transition {
        Some(transition) => Crossfade::video(overlap, transition),
        None => Crossfade::audio(overlap),
    }
}

/// Run one subcommand and return what should be printed on stdout.
pub async fn execute(command: Commands, config: &AppConfig) -> Result<String> {
    let ctx = config.media_context();

    let output = match command {
        Commands::Probe { src } => {
            let info = ctx.probe(&src).await?;
            serde_json::to_string_pretty(&info)?
        }
        Commands::Join {
            first,
            second,
            dest,
            overlap,
            transition,
        } => join(&ctx, &first, &second, &dest, crossfade(overlap, transition))
            .await?
            .to_string(),
        Commands::Merge {
            dest,
            inputs,
            overlap,
            transition,
        } => merge(&ctx, &inputs, &dest, crossfade(overlap, transition))
            .await?
            .to_string(),
        Commands::LoopAudio {
            src,
            dest,
            target,
            crossfade,
        } => normalize_audio(&ctx, &src, &dest, target, crossfade).await?.to_string(),
        Commands::LoopVideo {
            src,
            dest,
            target,
            crossfade,
            audio_crossfade,
            transition,
        } => {
            let mut options = VideoLoopOptions::new(target)
                .with_crossfade(crossfade)
                .with_transition(transition);
            if let Some(secs) = audio_crossfade {
                options = options.with_audio_crossfade(secs);
            }
            normalize_video(&ctx, &src, &dest, &options).await?.to_string()
        }
        Commands::DetectCrop { src } => detect_crop(&ctx, &src, CropDetectSettings::default())
            .await?
            .to_string(),
        Commands::RemoveBars { src, dest } => remove_black_bars(&ctx, &src, &dest, CropDetectSettings::default())
            .await?
            .to_string(),
        Commands::Trim {
            src,
            dest,
            start,
            end,
            audio_only,
        } => trim(&ctx, &src, &dest, start, end, audio_only).await?.to_string(),
        Commands::Speed { src, dest, factor } => change_speed(&ctx, &src, &dest, factor).await?.to_string(),
        Commands::Upscale { src, dest, fps } => upscale_fps(&ctx, &src, &dest, fps).await?.to_string(),
        Commands::ExtractAudio { src, dest } => extract_audio(&ctx, &src, &dest).await?.to_string(),
        Commands::Mux {
            video,
            audio,
            dest,
            offset,
            format,
        } => {
            let format = match format {
                Some(format) => format,
                None => audio
                    .extension()
                    .and_then(AudioFormat::from_extension)
                    .ok_or_else(|| anyhow!("cannot infer audio format of {}, pass --format", audio))?,
            };
            add_audio_to_video(&ctx, &video, &audio, &dest, offset, format)
                .await?
                .to_string()
        }
        Commands::Download {
            url,
            dest,
            target,
            crossfade,
            upscale,
        } => match target {
            Some(target) => {
                let options = VideoLoopOptions::new(target).with_crossfade(crossfade);
                download_and_loop_video(&ctx, &url, &dest, &options, upscale)
                    .await?
                    .to_string()
            }
            None => download_video(&ctx, &url, &dest).await?.to_string(),
        },
        Commands::DownloadAudio { url, dest, target } => download_and_loop_audio(&ctx, &url, &dest, target)
            .await?
            .to_string(),
        Commands::Speak {
            dest,
            text,
            speakers,
            cfg_scale,
        } => {
            let mut options = SpeechOptions::with_speakers(speakers);
            if let Some(scale) = cfg_scale {
                options.cfg_scale = scale;
            }
            inference_client(config)?
                .synthesize_speech(&dest, &text, &options)
                .await?
                .to_string()
        }
        Commands::Diarize { audio } => {
            let diarization = inference_client(config)?.diarize(&audio).await?;
            serde_json::to_string_pretty(&diarization)?
        }
        Commands::Transcribe {
            src,
            dest,
            language,
            max_words_per_line,
            model,
        } => {
            let options = TranscriptionOptions {
                language,
                max_words_per_line,
                model,
            };
            inference_client(config)?
                .transcribe(&src, &dest, &options)
                .await?
                .file
                .to_string()
        }
        Commands::CheckTools => {
            let ffmpeg = check_ffmpeg()?;
            let ffprobe = check_ffprobe()?;
            let ytdlp = check_ytdlp()?;
            format!(
                "ffmpeg: {}\nffprobe: {}\nyt-dlp: {}",
                ffmpeg.display(),
                ffprobe.display(),
                ytdlp.display()
            )
        }
    };

    Ok(output)
}

fn inference_client(config: &AppConfig) -> Result<InferenceClient> {
    InferenceClient::new(config.inference.clone(), config.media_root.clone())
        .context("failed to create inference client")
}
