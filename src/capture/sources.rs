// src/capture/sources.rs — File, directory and command frame sources

use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::FrameSource;
use crate::infra::errors::MoodChatError;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read and decode an image file off the async executor.
async fn load(path: PathBuf) -> Result<DynamicImage, MoodChatError> {
    tokio::task::spawn_blocking(move || {
        image::open(&path).map_err(|e| MoodChatError::Capture(format!("{}: {e}", path.display())))
    })
    .await
    .map_err(|e| MoodChatError::Capture(format!("frame load task failed: {e}")))?
}

// ─── File ───────────────────────────────────────────────────────

/// A still image re-read on every grab, so an external tool that keeps
/// overwriting it acts as a live camera.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self, MoodChatError> {
        if !path.is_file() {
            return Err(MoodChatError::Capture(format!(
                "camera file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

#[async_trait]
impl FrameSource for FileSource {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError> {
        load(self.path.clone()).await
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

// ─── Directory ──────────────────────────────────────────────────

/// Replays the images of a directory in file-name order, wrapping around.
pub struct DirectorySource {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    next: usize,
}

impl DirectorySource {
    pub fn open(dir: &Path) -> Result<Self, MoodChatError> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| MoodChatError::Capture(format!("{}: {e}", dir.display())))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(MoodChatError::Capture(format!(
                "no .jpg/.jpeg/.png frames in {}",
                dir.display()
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            frames,
            next: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameSource for DirectorySource {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError> {
        let path = self.frames[self.next].clone();
        self.next = (self.next + 1) % self.frames.len();
        load(path).await
    }

    fn describe(&self) -> String {
        format!("{} frames in {}", self.frames.len(), self.dir.display())
    }
}

// ─── Command ────────────────────────────────────────────────────

/// Runs `sh -c <command>` per grab and decodes the image it prints.
///
/// A command that does not finish within the timeout is killed and the grab
/// fails; the next tick starts a fresh one.
pub struct CommandSource {
    command: String,
    timeout: Duration,
}

impl CommandSource {
    pub fn open(command: &str, timeout: Duration) -> Result<Self, MoodChatError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(MoodChatError::Capture("camera command is empty".into()));
        }
        Ok(Self {
            command: command.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl FrameSource for CommandSource {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                MoodChatError::Capture(format!(
                    "camera command timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        if !output.status.success() {
            return Err(MoodChatError::Capture(format!(
                "camera command exited with {}",
                output.status
            )));
        }
        if output.stdout.is_empty() {
            return Err(MoodChatError::Capture(
                "camera command produced no output".into(),
            ));
        }
        Ok(image::load_from_memory(&output.stdout)?)
    }

    fn describe(&self) -> String {
        format!("command `{}`", crate::util::truncate_str(&self.command, 60))
    }
}
