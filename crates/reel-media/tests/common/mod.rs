//! Recording stand-in for FFmpeg, FFprobe and yt-dlp.

#![allow(dead_code)]

use async_trait::async_trait;
use reel_media::{FfmpegCommand, MediaContext, MediaError, MediaInfo, MediaResult, MediaTool, ToolOutput};
use reel_models::{MediaRef, MediaRoot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
pub struct FakeTool {
    commands: Mutex<Vec<FfmpegCommand>>,
    infos: Mutex<HashMap<String, MediaInfo>>,
    default_info: Mutex<MediaInfo>,
    fail_on_run: Mutex<Option<usize>>,
    stderr: Mutex<String>,
    downloads: Mutex<Vec<String>>,
}

impl FakeTool {
    pub fn new(default_info: MediaInfo) -> Arc<Self> {
        let tool = Self::default();
        *tool.default_info.lock().unwrap() = default_info;
        Arc::new(tool)
    }

    /// Report `info` for files with this name.
    pub fn set_info(&self, file_name: &str, info: MediaInfo) {
        self.infos.lock().unwrap().insert(file_name.to_string(), info);
    }

    /// Make the `index`-th FFmpeg run (0-based) fail.
    pub fn fail_on_run(&self, index: usize) {
        *self.fail_on_run.lock().unwrap() = Some(index);
    }

    /// Stderr returned by every successful run.
    pub fn set_stderr(&self, stderr: &str) {
        *self.stderr.lock().unwrap() = stderr.to_string();
    }

    pub fn commands(&self) -> Vec<FfmpegCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    /// Commands whose arguments include `flag` followed by a value
    /// containing `needle`.
    pub fn commands_with(&self, flag: &str, needle: &str) -> Vec<FfmpegCommand> {
        self.commands()
            .into_iter()
            .filter(|cmd| arg_value(cmd, flag).map_or(false, |v| v.contains(needle)))
            .collect()
    }
}

/// Value following the first occurrence of `flag`.
pub fn arg_value(cmd: &FfmpegCommand, flag: &str) -> Option<String> {
    let args = cmd.build_args();
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

/// File names of a command's inputs.
pub fn input_names(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.inputs().map(file_name).collect()
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput> {
        let index = {
            let mut commands = self.commands.lock().unwrap();
            commands.push(cmd.clone());
            commands.len() - 1
        };

        if *self.fail_on_run.lock().unwrap() == Some(index) {
            return Err(MediaError::ffmpeg_failed(
                "simulated failure",
                cmd.command_line(),
                Some("Conversion failed!".to_string()),
                Some(1),
            ));
        }

        for input in cmd.inputs() {
            if !input.exists() {
                return Err(MediaError::FileNotFound(input.to_path_buf()));
            }
        }

        if !cmd.is_null_output() {
            std::fs::write(cmd.output(), format!("output of run {}", index))?;
        }

        Ok(ToolOutput {
            stderr: self.stderr.lock().unwrap().clone(),
        })
    }

    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let name = file_name(path);
        let info = self.infos.lock().unwrap().get(&name).cloned();
        Ok(info.unwrap_or_else(|| self.default_info.lock().unwrap().clone()))
    }

    async fn download(&self, url: &str, output: &Path) -> MediaResult<()> {
        self.downloads.lock().unwrap().push(url.to_string());
        std::fs::write(output, b"downloaded")?;
        Ok(())
    }
}

/// A temporary media root wired to a fake tool.
pub struct Fixture {
    pub dir: TempDir,
    pub tool: Arc<FakeTool>,
    pub ctx: MediaContext,
}

impl Fixture {
    pub fn new(default_info: MediaInfo) -> Self {
        let dir = TempDir::new().unwrap();
        let tool = FakeTool::new(default_info);
        let ctx = MediaContext::new(MediaRoot::new(dir.path()), tool.clone());
        Self { dir, tool, ctx }
    }

    /// Create a source file and return its reference.
    pub fn source(&self, name: &str) -> MediaRef {
        let reference = MediaRef::parse(name).unwrap();
        std::fs::write(self.ctx.resolve(&reference), b"source").unwrap();
        reference
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Sorted names of every file left in the media root.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

pub fn media(name: &str) -> MediaRef {
    MediaRef::parse(name).unwrap()
}
