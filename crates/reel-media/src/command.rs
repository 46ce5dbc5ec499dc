//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Number of trailing stderr lines kept from each FFmpeg run.
pub const STDERR_TAIL_LINES: usize = 512;

/// Output path that discards the muxed result (`-f null -`).
pub const NULL_OUTPUT: &str = "-";

/// One `-i` input together with the options that precede it.
#[derive(Debug, Clone)]
pub struct FfmpegInput {
    pub path: PathBuf,
    pub args: Vec<String>,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                path: input.as_ref().to_path_buf(),
                args: Vec::new(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append another input. Subsequent input arguments apply to it.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            path: path.as_ref().to_path_buf(),
            args: Vec::new(),
        });
        self
    }

    /// Add an argument before the most recently added `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(last) = self.inputs.last_mut() {
            last.args.push(arg.into());
        }
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position on the current input (fast input seek).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Stop reading the current input at this position.
    pub fn until(self, seconds: f64) -> Self {
        self.input_arg("-to").input_arg(format!("{:.3}", seconds))
    }

    /// Delay the timestamps of the current input.
    pub fn offset(self, seconds: f64) -> Self {
        self.input_arg("-itsoffset").input_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Select a stream or filter label for the output.
    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Drop video from the output.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Force the output container format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Input files in `-i` order.
    pub fn inputs(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(|i| i.path.as_path())
    }

    /// Output file path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Whether the output is discarded.
    pub fn is_null_output(&self) -> bool {
        self.output == Path::new(NULL_OUTPUT)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        // Output args
        args.extend(self.output_args.iter().cloned());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Human readable command line, used in error context.
    pub fn command_line(&self) -> String {
        format!("ffmpeg {}", self.build_args().join(" "))
    }
}

/// Captured result of a successful FFmpeg run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Trailing stderr lines, newline separated
    pub stderr: String,
}

/// Runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Kill FFmpeg after this many seconds
    pub timeout_secs: Option<u64>,
    /// Netscape cookies file passed to yt-dlp
    pub cookies_file: Option<PathBuf>,
}

impl RunnerConfig {
    /// Load from `FFMPEG_TIMEOUT_SECS` and `YTDLP_COOKIES_FILE`.
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0),
            cookies_file: std::env::var("YTDLP_COOKIES_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Runs FFmpeg processes with an optional timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    config: RunnerConfig,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner from explicit configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run an FFmpeg command, returning the tail of its stderr.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput> {
        // Check FFmpeg exists
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        let command_line = cmd.command_line();
        debug!("Running FFmpeg: {}", command_line);

        let started = Instant::now();
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::InvalidMedia("FFmpeg stderr not captured".to_string()))?;
        let mut reader = BufReader::new(stderr).lines();

        // Keep only the tail; cropdetect alone prints one line per frame
        let stderr_handle = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = reader.next_line().await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        });

        let status = self.wait_for_completion(&mut child).await;
        let stderr = stderr_handle.await.unwrap_or_default();

        let elapsed = started.elapsed().as_secs_f64();
        let outcome = match &status {
            Ok(s) if s.success() => "success",
            _ => "failure",
        };
        metrics::counter!("reel_ffmpeg_runs_total", "outcome" => outcome).increment(1);
        metrics::histogram!("reel_ffmpeg_duration_seconds").record(elapsed);

        let status = status?;
        if status.success() {
            Ok(ToolOutput { stderr })
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                command_line,
                Some(stderr),
                status.code(),
            ))
        }
    }

    /// Wait for child process with optional timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let status = match self.config.timeout_secs {
            Some(timeout_secs) => {
                match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", timeout_secs);
                        let _ = child.kill().await;
                        return Err(MediaError::Timeout(timeout_secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        Ok(status)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Check if yt-dlp is available.
pub fn check_ytdlp() -> MediaResult<PathBuf> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .seek(10.0)
            .until(30.0)
            .video_codec("libx264")
            .audio_codec("copy");

        let args = cmd.build_args();
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"10.000".to_string()));
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));

        // Seek arguments precede the input they apply to
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < i);
    }

    #[test]
    fn test_offset_binds_to_latest_input() {
        let cmd = FfmpegCommand::new("video.mp4", "out.mp4")
            .input("audio.wav")
            .offset(1.5)
            .map("0:v")
            .map("1:a");

        let args = cmd.build_args();
        let first_i = args.iter().position(|a| a == "video.mp4").unwrap();
        let offset = args.iter().position(|a| a == "-itsoffset").unwrap();
        let second_i = args.iter().position(|a| a == "audio.wav").unwrap();
        assert!(first_i < offset && offset < second_i);
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert_eq!(cmd.inputs().count(), 2);
    }

    #[test]
    fn test_null_output() {
        let cmd = FfmpegCommand::new("in.mp4", NULL_OUTPUT).format("null");
        assert!(cmd.is_null_output());
        assert!(cmd.command_line().ends_with("-f null -"));
    }

    #[test]
    fn test_runner_config_defaults() {
        let config = RunnerConfig::default();
        assert!(config.timeout_secs.is_none());
        assert!(config.cookies_file.is_none());
        assert_eq!(FfmpegRunner::new().with_timeout(30).config().timeout_secs, Some(30));
    }
}
