// src/capture/mod.rs — Camera frame sources
//
// A frame source is opened once at startup and then asked for the current
// frame on every detection tick.

pub mod encode;
pub mod sources;

use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;

use crate::infra::config::CameraConfig;
use crate::infra::errors::MoodChatError;

pub use encode::{encode_data_url, FrameEncoder};
pub use sources::{CommandSource, DirectorySource, FileSource};

/// Anything that can produce the current camera image.
#[async_trait]
pub trait FrameSource: Send {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError>;

    /// Short description for logs and the status line.
    fn describe(&self) -> String;
}

/// Open the configured source, validating it up front. `grab_timeout`
/// bounds how long a command source may take for one frame.
pub fn open(
    config: &CameraConfig,
    grab_timeout: Duration,
) -> Result<Box<dyn FrameSource>, MoodChatError> {
    let source: Box<dyn FrameSource> = match config {
        CameraConfig::File { path } => Box::new(FileSource::open(path)?),
        CameraConfig::Dir { path } => Box::new(DirectorySource::open(path)?),
        CameraConfig::Command { command } => {
            Box::new(CommandSource::open(command, grab_timeout)?)
        }
    };
    tracing::info!("Camera stream opened: {}", source.describe());
    Ok(source)
}
