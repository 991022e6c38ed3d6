// src/devserver/mod.rs — Canned emotion backend for offline development
//
// Serves the same four endpoints as the real service. Nothing is analysed:
// `/detect_emotion` checks the frame is a base64 data URL and answers from a
// fixed rotation. Detections are kept in memory for `/emotion_stats`.

pub mod handlers;
pub mod replies;

use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::backend::{CHAT_PATH, DETECT_PATH, EMOTION_RESPONSE_PATH, STATS_PATH};
use crate::infra::config::DevServerConfig;

/// Mutable state behind the handlers.
#[derive(Debug, Default)]
pub struct DevState {
    rotation: Vec<String>,
    next: usize,
    /// (user_id, emotion) per detection, oldest first.
    detections: Vec<(String, String)>,
}

impl DevState {
    pub fn new(rotation: Vec<String>) -> Self {
        let rotation = if rotation.is_empty() {
            vec!["neutral".to_string()]
        } else {
            rotation
        };
        Self {
            rotation,
            next: 0,
            detections: Vec::new(),
        }
    }

    /// Next label of the rotation, logged against `user_id`.
    pub fn detect(&mut self, user_id: &str) -> String {
        let emotion = self.rotation[self.next % self.rotation.len()].clone();
        self.next = self.next.wrapping_add(1);
        self.detections.push((user_id.to_string(), emotion.clone()));
        emotion
    }

    /// Per-label share (percent) of a user's detections, first-seen order.
    pub fn stats(&self, user_id: &str) -> (Vec<String>, Vec<f64>) {
        let mut labels: Vec<String> = Vec::new();
        let mut counts: Vec<u64> = Vec::new();
        for (_, emotion) in self.detections.iter().filter(|(u, _)| u == user_id) {
            match labels.iter().position(|l| l == emotion) {
                Some(i) => counts[i] += 1,
                None => {
                    labels.push(emotion.clone());
                    counts.push(1);
                }
            }
        }

        let total: u64 = counts.iter().sum();
        if total == 0 {
            return (Vec::new(), Vec::new());
        }
        let data = counts
            .iter()
            .map(|c| (*c as f64 / total as f64) * 100.0)
            .collect();
        (labels, data)
    }
}

pub type SharedDevState = Arc<Mutex<DevState>>;

/// Build the axum router with all endpoints.
pub fn build_router(state: SharedDevState) -> Router {
    Router::new()
        .route(DETECT_PATH, post(handlers::detect_emotion))
        .route(EMOTION_RESPONSE_PATH, post(handlers::emotion_response))
        .route(CHAT_PATH, post(handlers::chat))
        .route(STATS_PATH, get(handlers::emotion_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on 127.0.0.1:`port` until `shutdown` resolves.
pub async fn serve(
    config: &DevServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", config.port);
    let state = Arc::new(Mutex::new(DevState::new(config.rotation.clone())));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dev backend listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
