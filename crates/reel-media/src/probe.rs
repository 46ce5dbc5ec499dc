//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Audio or video file information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels (0 when there is no video stream)
    pub width: u32,
    /// Height in pixels (0 when there is no video stream)
    pub height: u32,
    /// Frame rate (fps, 0 when there is no video stream)
    pub fps: f64,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaInfo {
    /// Info for an audio-only asset of the given duration.
    pub fn audio(duration: f64) -> Self {
        Self {
            duration,
            has_audio: true,
            ..Self::default()
        }
    }

    /// Info for a video asset with an audio track.
    pub fn video(duration: f64, width: u32, height: u32, fps: f64) -> Self {
        Self {
            duration,
            width,
            height,
            fps,
            has_video: true,
            has_audio: true,
        }
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a media file for information.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    // Check FFprobe exists
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse `ffprobe -print_format json` output.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::InvalidMedia("No duration reported".to_string()))?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    let mut info = MediaInfo {
        duration,
        has_audio,
        ..MediaInfo::default()
    };

    if let Some(stream) = video_stream {
        info.has_video = true;
        info.width = stream.width.unwrap_or(0);
        info.height = stream.height.unwrap_or(0);
        info.fps = stream
            .avg_frame_rate
            .as_ref()
            .or(stream.r_frame_rate.as_ref())
            .and_then(|r| parse_frame_rate(r))
            .unwrap_or(30.0);
    }

    Ok(info)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
