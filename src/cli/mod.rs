// src/cli/mod.rs — CLI definition (clap derive)

pub mod headless;
pub mod oneshot;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infra::config::{CameraConfig, Config};

#[derive(Parser)]
#[command(
    name = "moodchat",
    about = "Camera-aware chat companion for a remote emotion service",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Emotion service base URL (overrides [server].base_url)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// User id sent with every request
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Detection interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Use a still image (re-read every tick) as the camera
    #[arg(long, conflicts_with_all = ["camera_dir", "camera_command"])]
    pub camera_file: Option<PathBuf>,

    /// Replay the images of a directory as the camera
    #[arg(long, conflicts_with = "camera_command")]
    pub camera_dir: Option<PathBuf>,

    /// Shell command printing one image to stdout per frame
    #[arg(long)]
    pub camera_command: Option<String>,

    /// Line-oriented mode: print the transcript, read messages from stdin
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the client (default)
    Run,
    /// Detect the emotion in a single image and print it
    Detect {
        /// Image file (jpg/png)
        image: PathBuf,
    },
    /// Print the emotion distribution for the user
    Stats,
    /// Send one chat message and print the reply
    Chat {
        /// Emotion to send along with the message
        #[arg(long, default_value = "neutral")]
        emotion: String,
        /// Message text
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Serve a canned local backend for offline development
    Devserver {
        /// Port to listen on (overrides [devserver].port)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref server) = self.server {
            config.server.base_url = server.clone();
        }
        if let Some(ref user) = self.user {
            config.session.user_id = user.clone();
        }
        if let Some(ms) = self.interval_ms {
            config.capture.interval_ms = ms;
        }
        if let Some(ref path) = self.camera_file {
            config.camera = Some(CameraConfig::File { path: path.clone() });
        } else if let Some(ref path) = self.camera_dir {
            config.camera = Some(CameraConfig::Dir { path: path.clone() });
        } else if let Some(ref command) = self.camera_command {
            config.camera = Some(CameraConfig::Command {
                command: command.clone(),
            });
        }
        if let Some(Commands::Devserver { port: Some(port) }) = &self.command {
            config.devserver.port = *port;
        }
    }
}
