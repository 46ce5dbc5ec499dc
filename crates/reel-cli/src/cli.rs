use clap::{Parser, Subcommand};
use reel_models::{AudioFormat, MediaRef, Transition};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reel")]
#[command(author, version, about = "Loop, join, crop and retime media to exact durations")]
pub struct Cli {
    /// Media root every reference resolves against
    #[arg(long, global = true, env = "MEDIA_ROOT")]
    pub media_root: Option<PathBuf>,

    /// Kill FFmpeg after this many seconds
    #[arg(long, global = true, env = "FFMPEG_TIMEOUT_SECS")]
    pub ffmpeg_timeout: Option<u64>,

    /// Enable debug logging for the reel crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print duration and stream information
    Probe {
        src: MediaRef,
    },

    /// Join two assets with a crossfade
    Join {
        first: MediaRef,
        second: MediaRef,
        dest: MediaRef,
        /// Overlap in seconds
        #[arg(long, default_value_t = 3.0)]
        overlap: f64,
        /// Join as video with this transition instead of as audio
        #[arg(long)]
        transition: Option<Transition>,
    },

    /// Join several assets, in order, with crossfades
    Merge {
        dest: MediaRef,
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<MediaRef>,
        #[arg(long, default_value_t = 3.0)]
        overlap: f64,
        #[arg(long)]
        transition: Option<Transition>,
    },

    /// Loop audio to an exact duration
    LoopAudio {
        src: MediaRef,
        dest: MediaRef,
        /// Target duration in seconds
        #[arg(long)]
        target: f64,
        #[arg(long, default_value_t = 5.0)]
        crossfade: f64,
    },

    /// Loop video, picture and sound, to an exact duration
    LoopVideo {
        src: MediaRef,
        dest: MediaRef,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value_t = 3.0)]
        crossfade: f64,
        /// Audio overlap, defaults to the visual one
        #[arg(long)]
        audio_crossfade: Option<f64>,
        #[arg(long, default_value_t = Transition::default())]
        transition: Transition,
    },

    /// Print the crop rectangle that removes black bars
    DetectCrop {
        src: MediaRef,
    },

    /// Crop black bars away
    RemoveBars {
        src: MediaRef,
        dest: MediaRef,
    },

    /// Cut a time range
    Trim {
        src: MediaRef,
        dest: MediaRef,
        #[arg(long)]
        start: f64,
        #[arg(long)]
        end: f64,
        #[arg(long)]
        audio_only: bool,
    },

    /// Retime by a presentation timestamp factor (2 = half speed)
    Speed {
        src: MediaRef,
        dest: MediaRef,
        #[arg(long)]
        factor: f64,
    },

    /// Interpolate to a higher frame rate
    Upscale {
        src: MediaRef,
        dest: MediaRef,
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },

    /// Extract the audio track as PCM WAV
    ExtractAudio {
        src: MediaRef,
        dest: MediaRef,
    },

    /// Mux an audio track into a video
    Mux {
        video: MediaRef,
        audio: MediaRef,
        dest: MediaRef,
        /// Delay before the audio starts, in seconds
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
        /// Audio container, inferred from the audio extension when omitted
        #[arg(long)]
        format: Option<AudioFormat>,
    },

    /// Download a video
    Download {
        url: String,
        dest: MediaRef,
        /// Loop the download to this many seconds
        #[arg(long)]
        target: Option<f64>,
        #[arg(long, default_value_t = 3.0)]
        crossfade: f64,
        /// Interpolate the looped video to this frame rate
        #[arg(long)]
        upscale: Option<u32>,
    },

    /// Download a video and keep its audio looped to a duration
    DownloadAudio {
        url: String,
        dest: MediaRef,
        #[arg(long)]
        target: f64,
    },

    /// Synthesize speech
    Speak {
        dest: MediaRef,
        text: String,
        /// Voice name, repeatable
        #[arg(long = "speaker")]
        speakers: Vec<String>,
        #[arg(long)]
        cfg_scale: Option<f64>,
    },

    /// Diarize speakers in an audio file
    Diarize {
        audio: MediaRef,
    },

    /// Transcribe to SRT subtitles
    Transcribe {
        src: MediaRef,
        dest: MediaRef,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long)]
        max_words_per_line: Option<u32>,
        #[arg(long, default_value = "base")]
        model: String,
    },

    /// Check that required external tools are available
    CheckTools,
}
