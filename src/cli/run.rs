// src/cli/run.rs — Default command: run the client loop

use std::sync::Arc;
use std::time::Duration;

use crate::backend::HttpBackend;
use crate::capture::{self, FrameSource};
use crate::controller::{Controller, ControllerOptions};
use crate::infra::config::Config;
use crate::tui;

use super::headless;

/// Acquire the camera once. Failure is logged and the client runs without
/// detection. A single grab may take at most one capture interval.
pub fn open_camera(config: &Config) -> Option<Box<dyn FrameSource>> {
    let Some(ref camera) = config.camera else {
        tracing::warn!("No camera configured ([camera] or --camera-*)");
        return None;
    };
    let grab_timeout = Duration::from_millis(config.capture.interval_ms);
    match capture::open(camera, grab_timeout) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::error!("Webcam access failed: {}", e);
            None
        }
    }
}

/// Start the controller and the chosen front end; returns when the user quits.
pub async fn run_client(config: &Config, headless: bool) -> anyhow::Result<()> {
    let backend = Arc::new(HttpBackend::from_config(&config.server)?);
    tracing::info!("Using emotion service at {}", backend.base_url());

    let source = open_camera(config);
    let handle = Controller::spawn(backend, source, ControllerOptions::from_config(config));

    let result = if headless {
        headless::run_headless(&handle).await
    } else {
        let commands = handle.commands();
        let snapshots = handle.snapshots();
        tokio::task::spawn_blocking(move || tui::run_client_ui(commands, snapshots)).await?
    };

    handle.shutdown().await;
    result
}
