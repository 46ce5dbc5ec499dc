//! Error types for media operations.

use reel_models::ReferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    /// Impossible or invalid parameters. Never retried.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid media reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("FFmpeg command failed: {message} (command: {command})")]
    FfmpegFailed {
        message: String,
        command: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("No crop rectangle detected for {0}")]
    CropNotDetected(PathBuf),

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid media file: {0}")]
    InvalidMedia(String),
}

impl MediaError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        command: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            command: command.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Invalid parameters or references; fatal and never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidReference(_))
    }

    /// The external tool was missing, failed, timed out, or produced
    /// unusable output.
    pub fn is_external_tool(&self) -> bool {
        matches!(
            self,
            Self::FfmpegNotFound
                | Self::FfprobeNotFound
                | Self::YtDlpNotFound
                | Self::FfmpegFailed { .. }
                | Self::FfprobeFailed { .. }
                | Self::CropNotDetected(_)
                | Self::DownloadFailed { .. }
                | Self::Timeout(_)
        )
    }
}
