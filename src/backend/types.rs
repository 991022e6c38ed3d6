// src/backend/types.rs — Wire types of the emotion service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectRequest {
    /// `data:image/jpeg;base64,...`
    pub image: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReplyRequest {
    pub emotion: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub emotion: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub emotion: Option<String>,
}

/// Body of `/emotion_response` and `/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Error body sent with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsQuery {
    pub user_id: String,
}

/// Treat `""` like a missing field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
