// src/infra/paths.rs — Config and data locations
//
// MOODCHAT_HOME overrides everything. Otherwise config lives in
// ~/.moodchat/ and data (logs) in the platform data dir.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

fn moodchat_home() -> Option<PathBuf> {
    std::env::var_os("MOODCHAT_HOME").map(PathBuf::from)
}

/// Configuration directory: $MOODCHAT_HOME/ or ~/.moodchat/
pub fn config_dir() -> PathBuf {
    if let Some(home) = moodchat_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".moodchat"),
        None => PathBuf::from(".moodchat"),
    }
}

/// Data directory: $MOODCHAT_HOME/data/ or the platform local data dir.
pub fn data_dir() -> PathBuf {
    if let Some(home) = moodchat_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "moodchat") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn log_file_path() -> PathBuf {
    data_dir().join("moodchat.log")
}
