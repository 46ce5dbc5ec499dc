//! FFmpeg orchestration for the reel media pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a process runner
//! - Duration probing via FFprobe
//! - Crossfade pair joins and the ordered N-way merge reducer
//! - Duration normalization for audio and video
//! - Black-bar detection and removal, speed changes, trimming, muxing
//! - A ledger that cleans up intermediate files on every exit path
//!
//! All operations take a [`MediaContext`] and [`reel_models::MediaRef`]
//! references relative to its media root, and return the reference they wrote.

pub mod audio;
pub mod command;
pub mod context;
pub mod crop;
pub mod crossfade;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod job;
pub mod ledger;
pub mod merge;
pub mod normalize;
pub mod probe;
pub mod speed;
pub mod tempo;
pub mod tool;
pub mod trim;

pub use audio::{add_audio_to_video, extract_audio};
pub use command::{FfmpegCommand, FfmpegRunner, RunnerConfig, ToolOutput};
pub use context::MediaContext;
pub use crop::{detect_crop, parse_last_crop, remove_black_bars, CropDetectSettings};
pub use crossfade::{join, join_audio, join_video, Crossfade};
pub use download::{download_and_loop_audio, download_and_loop_video, download_video};
pub use error::{MediaError, MediaResult};
pub use job::PipelineJob;
pub use ledger::TempArtifacts;
pub use merge::merge;
pub use normalize::{loop_audio, normalize_audio, normalize_video, repetitions, VideoLoopOptions, MAX_REPETITIONS};
pub use probe::{probe_media, MediaInfo};
pub use speed::{change_speed, upscale_fps};
pub use tempo::{atempo_filter, build_chain};
pub use tool::MediaTool;
pub use trim::trim;
