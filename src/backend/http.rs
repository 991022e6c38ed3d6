// src/backend/http.rs — reqwest implementation of the emotion service

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::{
    non_empty, ChatRequest, DetectRequest, DetectResponse, EmotionReplyRequest, ErrorResponse,
    ReplyResponse, StatsQuery,
};
use super::{EmotionBackend, CHAT_PATH, DETECT_PATH, EMOTION_RESPONSE_PATH, STATS_PATH};
use crate::infra::config::ServerConfig;
use crate::infra::errors::MoodChatError;
use crate::session::EmotionDistribution;

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MoodChatError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| MoodChatError::Config(format!("invalid server URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MoodChatError::Config(format!(
                "server URL must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MoodChatError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, MoodChatError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, MoodChatError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| MoodChatError::http(path, e))?;
        decode(path, response).await
    }
}

/// Turn a response into `R`, mapping non-2xx statuses to `Status` errors
/// that carry the server's `{"error": ...}` message when there is one.
async fn decode<R: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<R, MoodChatError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(MoodChatError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| MoodChatError::decode(path, e))
}

#[async_trait]
impl EmotionBackend for HttpBackend {
    async fn detect_emotion(&self, request: DetectRequest) -> Result<Option<String>, MoodChatError> {
        tracing::debug!(
            "POST {} ({} byte frame)",
            DETECT_PATH,
            request.image.len()
        );
        let resp: DetectResponse = self.post_json(DETECT_PATH, &request).await?;
        Ok(non_empty(resp.emotion))
    }

    async fn emotion_response(
        &self,
        request: EmotionReplyRequest,
    ) -> Result<Option<String>, MoodChatError> {
        tracing::debug!("POST {} emotion={}", EMOTION_RESPONSE_PATH, request.emotion);
        let resp: ReplyResponse = self.post_json(EMOTION_RESPONSE_PATH, &request).await?;
        Ok(non_empty(resp.response))
    }

    async fn chat(&self, request: ChatRequest) -> Result<Option<String>, MoodChatError> {
        tracing::debug!("POST {} emotion={}", CHAT_PATH, request.emotion);
        let resp: ReplyResponse = self.post_json(CHAT_PATH, &request).await?;
        Ok(non_empty(resp.response))
    }

    async fn emotion_stats(&self, user_id: &str) -> Result<EmotionDistribution, MoodChatError> {
        let response = self
            .client
            .get(self.url(STATS_PATH))
            .query(&StatsQuery {
                user_id: user_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| MoodChatError::http(STATS_PATH, e))?;
        decode(STATS_PATH, response).await
    }
}
