// src/devserver/handlers.rs

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use base64::Engine as _;
use serde::Deserialize;

use super::{replies, SharedDevState};
use crate::backend::types::{DetectResponse, ErrorResponse, ReplyResponse};
use crate::session::EmotionDistribution;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn internal(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn user_or_anonymous(user_id: Option<String>) -> String {
    user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "anonymous".into())
}

#[derive(Debug, Deserialize)]
pub struct DetectBody {
    pub image: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmotionBody {
    pub emotion: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: Option<String>,
    pub emotion: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub user_id: Option<String>,
}

/// True for `data:<mime>;base64,<payload>` with a decodable, non-empty payload.
fn is_image_data_url(image: &str) -> bool {
    let Some((header, payload)) = image.split_once(',') else {
        return false;
    };
    header.starts_with("data:image/")
        && header.ends_with(";base64")
        && base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map(|b| !b.is_empty())
            .unwrap_or(false)
}

/// POST /detect_emotion: next label of the rotation.
pub async fn detect_emotion(
    State(state): State<SharedDevState>,
    Json(body): Json<DetectBody>,
) -> Result<Json<DetectResponse>, ApiError> {
    let image = body.image.unwrap_or_default();
    if !is_image_data_url(&image) {
        tracing::warn!("Rejected frame: not a base64 image data URL");
        return Err(bad_request("Emotion detection failed"));
    }

    let user_id = user_or_anonymous(body.user_id);
    let emotion = state
        .lock()
        .map_err(|_| internal("Emotion detection failed"))?
        .detect(&user_id);
    tracing::debug!("Detected '{}' for {}", emotion, user_id);

    Ok(Json(DetectResponse {
        emotion: Some(emotion),
    }))
}

/// POST /emotion_response: canned line for an emotion change.
pub async fn emotion_response(Json(body): Json<EmotionBody>) -> Json<ReplyResponse> {
    let emotion = body.emotion.unwrap_or_else(|| "neutral".into());
    Json(ReplyResponse {
        response: Some(replies::emotion_reply(&emotion).to_string()),
    })
}

/// POST /chat: echo the message in a tone matching the emotion.
pub async fn chat(Json(body): Json<ChatBody>) -> Result<Json<ReplyResponse>, ApiError> {
    let message = body.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(bad_request("Chat processing failed"));
    }
    let emotion = body.emotion.unwrap_or_else(|| "neutral".into());
    tracing::debug!(
        "Chat from {} ({})",
        user_or_anonymous(body.user_id),
        emotion
    );
    Ok(Json(ReplyResponse {
        response: Some(replies::chat_reply(&message, &emotion)),
    }))
}

/// GET /emotion_stats?user_id=: percentages of logged detections.
pub async fn emotion_stats(
    State(state): State<SharedDevState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<EmotionDistribution>, ApiError> {
    let user_id = user_or_anonymous(params.user_id);
    let (labels, data) = state
        .lock()
        .map_err(|_| internal("Failed to fetch stats"))?
        .stats(&user_id);
    Ok(Json(EmotionDistribution { labels, data }))
}
