// src/infra/errors.rs — Error types for moodchat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodChatError {
    // Backend errors (all surfaced the same way, never retried)
    #[error("Request to '{endpoint}' failed: {message}")]
    Http {
        endpoint: String,
        message: String,
        network: bool,
    },

    #[error("'{endpoint}' returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from '{endpoint}': {message}")]
    Decode { endpoint: String, message: String },

    // Camera / frame errors
    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MoodChatError {
    /// True when the server could not be reached at all (connect/timeout).
    pub fn is_network(&self) -> bool {
        matches!(self, MoodChatError::Http { network: true, .. })
    }

    pub(crate) fn http(endpoint: &str, err: reqwest::Error) -> Self {
        MoodChatError::Http {
            endpoint: endpoint.to_string(),
            network: err.is_timeout() || err.is_connect(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(endpoint: &str, message: impl ToString) -> Self {
        MoodChatError::Decode {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<image::ImageError> for MoodChatError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) => MoodChatError::Encode(e.to_string()),
            _ => MoodChatError::Capture(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodChatError>;
