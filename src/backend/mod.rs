// src/backend/mod.rs — Emotion service abstraction
//
// The controller only talks to `EmotionBackend`; `HttpBackend` is the real
// implementation, tests plug in scripted ones.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::infra::errors::MoodChatError;
use crate::session::EmotionDistribution;

pub use http::HttpBackend;
pub use types::{ChatRequest, DetectRequest, EmotionReplyRequest};

pub const DETECT_PATH: &str = "/detect_emotion";
pub const EMOTION_RESPONSE_PATH: &str = "/emotion_response";
pub const CHAT_PATH: &str = "/chat";
pub const STATS_PATH: &str = "/emotion_stats";

#[async_trait]
pub trait EmotionBackend: Send + Sync {
    /// Detect the dominant emotion in an encoded frame. `Ok(None)` when the
    /// server answered without a label.
    async fn detect_emotion(&self, request: DetectRequest) -> Result<Option<String>, MoodChatError>;

    /// Canned reply for an emotion change. `Ok(None)` when the reply is empty.
    async fn emotion_response(
        &self,
        request: EmotionReplyRequest,
    ) -> Result<Option<String>, MoodChatError>;

    /// Free-text chat. `Ok(None)` when the reply is empty.
    async fn chat(&self, request: ChatRequest) -> Result<Option<String>, MoodChatError>;

    /// Aggregate emotion counts for a user.
    async fn emotion_stats(&self, user_id: &str) -> Result<EmotionDistribution, MoodChatError>;
}
