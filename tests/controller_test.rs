// tests/controller_test.rs — Integration tests for the client loop controller

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use tokio::sync::watch;

use moodchat::backend::{ChatRequest, DetectRequest, EmotionBackend, EmotionReplyRequest};
use moodchat::capture::{FrameEncoder, FrameSource};
use moodchat::controller::{Command, Controller, ControllerHandle, ControllerOptions, Snapshot};
use moodchat::infra::errors::MoodChatError;
use moodchat::session::{EmotionDistribution, Role, APOLOGY};

// ---------- Scripted backend ----------

type Reply = Result<Option<String>, MoodChatError>;

#[derive(Default)]
struct Script {
    /// (delay in ms, result) per detection call.
    detections: VecDeque<(u64, Reply)>,
    replies: VecDeque<Reply>,
    /// Extra latency (ms) for the emotion reply of a given label.
    reply_delays: HashMap<String, u64>,
    chats: VecDeque<Reply>,
    stats: VecDeque<EmotionDistribution>,
}

#[derive(Default)]
struct Calls {
    detect: usize,
    images_are_data_urls: bool,
    replies: Vec<EmotionReplyRequest>,
    chats: Vec<ChatRequest>,
    stats: usize,
}

#[derive(Default)]
struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl ScriptedBackend {
    fn detect_count(&self) -> usize {
        self.calls.lock().unwrap().detect
    }

    fn replies(&self) -> Vec<EmotionReplyRequest> {
        self.calls.lock().unwrap().replies.clone()
    }

    fn chats(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().chats.clone()
    }

    fn stats_count(&self) -> usize {
        self.calls.lock().unwrap().stats
    }
}

fn net_err(endpoint: &str) -> MoodChatError {
    MoodChatError::Http {
        endpoint: endpoint.into(),
        message: "connection refused".into(),
        network: true,
    }
}

fn ok(text: &str) -> Reply {
    Ok(Some(text.to_string()))
}

#[async_trait]
impl EmotionBackend for ScriptedBackend {
    async fn detect_emotion(&self, request: DetectRequest) -> Reply {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.detect += 1;
            calls.images_are_data_urls = request.image.starts_with("data:image/jpeg;base64,");
        }
        let (delay, result) = self
            .script
            .lock()
            .unwrap()
            .detections
            .pop_front()
            .unwrap_or((0, ok("neutral")));
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        result
    }

    async fn emotion_response(&self, request: EmotionReplyRequest) -> Reply {
        let delay = {
            let script = self.script.lock().unwrap();
            script.reply_delays.get(&request.emotion).copied().unwrap_or(0)
        };
        self.calls.lock().unwrap().replies.push(request.clone());
        let next = self.script.lock().unwrap().replies.pop_front();
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        next.unwrap_or_else(|| Ok(Some(format!("reply {}", request.emotion))))
    }

    async fn chat(&self, request: ChatRequest) -> Reply {
        self.calls.lock().unwrap().chats.push(request);
        let next = self.script.lock().unwrap().chats.pop_front();
        next.unwrap_or_else(|| ok("sure"))
    }

    async fn emotion_stats(&self, _user_id: &str) -> Result<EmotionDistribution, MoodChatError> {
        self.calls.lock().unwrap().stats += 1;
        let next = self.script.lock().unwrap().stats.pop_front();
        Ok(next.unwrap_or_default())
    }
}

// ---------- Fixtures ----------

struct StillSource;

#[async_trait]
impl FrameSource for StillSource {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError> {
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            16,
            12,
            Rgb([90, 60, 30]),
        )))
    }

    fn describe(&self) -> String {
        "still".into()
    }
}

/// A camera that takes far longer than the tick interval per frame.
struct SlowSource {
    grabs: Arc<AtomicUsize>,
}

#[async_trait]
impl FrameSource for SlowSource {
    async fn grab(&mut self) -> Result<DynamicImage, MoodChatError> {
        self.grabs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        let mut still = StillSource;
        still.grab().await
    }

    fn describe(&self) -> String {
        "slow".into()
    }
}

fn options(interval: Duration) -> ControllerOptions {
    ControllerOptions {
        user_id: "anonymous".into(),
        greeting: "Hey there!".into(),
        interval,
        encoder: FrameEncoder {
            width: 8,
            height: 8,
            quality: 80,
        },
    }
}

/// Controller whose timer never fires during a test; cycles run on DetectNow.
fn start(backend: Arc<ScriptedBackend>) -> ControllerHandle {
    Controller::spawn(
        backend,
        Some(Box::new(StillSource)),
        options(Duration::from_secs(3600)),
    )
}

async fn wait_for(
    rx: &mut watch::Receiver<Snapshot>,
    pred: impl FnMut(&Snapshot) -> bool,
) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for controller")
        .expect("controller stopped")
        .clone()
}

/// Let spawned request tasks that should NOT happen have a chance to.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn texts(snap: &Snapshot) -> Vec<String> {
    snap.transcript
        .entries()
        .iter()
        .map(|e| e.to_line())
        .collect()
}

// ---------- Startup ----------

#[tokio::test]
async fn test_startup_seeds_greeting_and_refreshes_chart() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.script.lock().unwrap().stats.push_back(EmotionDistribution {
        labels: vec!["neutral".into()],
        data: vec![100.0],
    });
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    let snap = wait_for(&mut rx, |s| !s.distribution.labels.is_empty()).await;
    assert_eq!(texts(&snap), vec!["Bot: Hey there!"]);
    assert_eq!(snap.camera.as_deref(), Some("still"));
    assert_eq!(snap.feeling_line(), "Feeling: ...");
    assert_eq!(backend.stats_count(), 1);
    assert_eq!(backend.detect_count(), 0);

    handle.shutdown().await;
}

// ---------- Detection & emotion reply ----------

#[tokio::test]
async fn test_happy_detection_scenario() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        script.detections.push_back((0, ok("happy")));
        script.replies.push_back(ok("Great to hear!"));
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 2).await;

    assert_eq!(snap.feeling_line(), "Feeling: Happy");
    let last = snap.transcript.last().unwrap();
    assert_eq!(last.role, Role::Bot);
    assert_eq!(last.text, "Great to hear!");
    assert!(!last.is_error);
    assert_eq!(
        backend.replies(),
        vec![EmotionReplyRequest {
            emotion: "happy".into(),
            user_id: "anonymous".into(),
        }]
    );
    assert!(backend.calls.lock().unwrap().images_are_data_urls);

    // "happy" is now the previous emotion: the same label stays quiet.
    backend.script.lock().unwrap().detections.push_back((0, ok("happy")));
    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.detections == 2).await;
    settle().await;
    assert_eq!(backend.replies().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_reply_fetched_once_per_transition() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        for label in ["happy", "sad", "sad", "sad", "happy"] {
            script.detections.push_back((0, ok(label)));
        }
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    let expected_transcript_len = [2, 3, 3, 3, 4];
    for (i, len) in expected_transcript_len.iter().enumerate() {
        handle.send(Command::DetectNow).await.unwrap();
        wait_for(&mut rx, |s| s.detections == i as u64 + 1 && s.transcript.len() == *len).await;
        settle().await;
    }

    let emotions: Vec<String> = backend.replies().into_iter().map(|r| r.emotion).collect();
    assert_eq!(emotions, vec!["happy", "sad", "happy"]);
    assert_eq!(rx.borrow().feeling_line(), "Feeling: Happy");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_late_reply_for_older_emotion_does_not_refetch() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        for label in ["happy", "sad", "sad"] {
            script.detections.push_back((0, ok(label)));
        }
        script.reply_delays.insert("happy".into(), 300);
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.detections == 1).await;

    // The sad reply overtakes the slow happy one.
    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.detections == 2 && s.transcript.len() == 2).await;
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 3).await;
    assert_eq!(
        texts(&snap),
        vec!["Bot: Hey there!", "Bot: reply sad", "Bot: reply happy"]
    );

    // Still sad: that transition already got its reply.
    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.detections == 3).await;
    settle().await;

    let emotions: Vec<String> = backend.replies().into_iter().map(|r| r.emotion).collect();
    assert_eq!(emotions, vec!["happy", "sad"]);
    assert_eq!(rx.borrow().transcript.len(), 3);
    assert_eq!(rx.borrow().feeling_line(), "Feeling: Sad");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_failed_reply_shows_apology_and_retries() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        script.detections.push_back((0, ok("angry")));
        script.detections.push_back((0, ok("angry")));
        script.replies.push_back(Err(net_err("/emotion_response")));
        script.replies.push_back(ok("Take a breath."));
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 2).await;
    // Display follows the detection even though the reply failed.
    assert_eq!(snap.feeling_line(), "Feeling: Angry");
    let last = snap.transcript.last().unwrap();
    assert!(last.is_error);
    assert_eq!(last.text, APOLOGY);

    // Same transition again: the latch was not moved, so it is retried.
    handle.send(Command::DetectNow).await.unwrap();
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 3).await;
    assert_eq!(snap.transcript.last().unwrap().text, "Take a breath.");
    assert_eq!(backend.replies().len(), 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_detection_failure_is_logged_only() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .script
        .lock()
        .unwrap()
        .detections
        .push_back((0, Err(net_err("/detect_emotion"))));
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    let snap = wait_for(&mut rx, |s| s.last_error.is_some()).await;
    settle().await;

    assert_eq!(snap.detections, 0);
    assert!(snap.emotion.is_none());
    assert_eq!(snap.transcript.len(), 1);
    assert!(backend.replies().is_empty());
    // No chart refresh beyond the startup one.
    assert_eq!(backend.stats_count(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_response_without_emotion_is_ignored() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.script.lock().unwrap().detections.push_back((0, Ok(None)));
    let handle = start(backend.clone());
    let rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.detect_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    settle().await;

    assert_eq!(rx.borrow().detections, 0);
    assert!(rx.borrow().emotion.is_none());
    assert!(backend.replies().is_empty());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_stale_detection_is_dropped() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        // The first cycle answers after the second one.
        script.detections.push_back((200, ok("angry")));
        script.detections.push_back((0, ok("happy")));
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.send(Command::DetectNow).await.unwrap();

    wait_for(&mut rx, |s| s.detections == 1).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let snap = rx.borrow().clone();
    assert_eq!(snap.detections, 1);
    assert_eq!(snap.feeling_line(), "Feeling: Happy");
    let emotions: Vec<String> = backend.replies().into_iter().map(|r| r.emotion).collect();
    assert_eq!(emotions, vec!["happy"]);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_no_camera_means_no_detection() {
    let backend = Arc::new(ScriptedBackend::default());
    let handle = Controller::spawn(backend.clone(), None, options(Duration::from_millis(10)));
    let rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(backend.detect_count(), 0);
    assert!(rx.borrow().camera.is_none());

    handle.shutdown().await;
}

// ---------- Timer & teardown ----------

#[tokio::test]
async fn test_timer_drives_detection_until_shutdown() {
    let backend = Arc::new(ScriptedBackend::default());
    let handle = Controller::spawn(
        backend.clone(),
        Some(Box::new(StillSource)),
        options(Duration::from_millis(20)),
    );
    let mut rx = handle.snapshots();

    wait_for(&mut rx, |s| s.detections >= 2).await;
    handle.shutdown().await;

    let after_shutdown = backend.detect_count();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(backend.detect_count(), after_shutdown);
}

#[tokio::test]
async fn test_slow_camera_skips_ticks_instead_of_queueing() {
    let backend = Arc::new(ScriptedBackend::default());
    let grabs = Arc::new(AtomicUsize::new(0));
    let handle = Controller::spawn(
        backend.clone(),
        Some(Box::new(SlowSource {
            grabs: grabs.clone(),
        })),
        options(Duration::from_millis(20)),
    );

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(grabs.load(Ordering::SeqCst), 1);
    assert_eq!(backend.detect_count(), 0);

    // Shutdown abandons the hung grab rather than waiting for it.
    tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
        .await
        .expect("shutdown waited on the camera");
}

#[tokio::test]
async fn test_shutdown_command_stops_loop() {
    let backend = Arc::new(ScriptedBackend::default());
    let handle = start(backend);
    let token = handle.cancellation_token();
    handle.send(Command::Shutdown).await.unwrap();

    // The loop cancels its own token on the way out.
    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("loop did not stop");
    handle.shutdown().await;
}

// ---------- Chat ----------

#[tokio::test]
async fn test_blank_chat_is_ignored() {
    let backend = Arc::new(ScriptedBackend::default());
    let handle = start(backend.clone());
    let rx = handle.snapshots();

    handle.send_chat("   \t ").await.unwrap();
    handle.send(Command::RefreshStats).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.stats_count() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(rx.borrow().transcript.len(), 1);
    assert!(backend.chats().is_empty());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_chat_sends_current_emotion() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        script.detections.push_back((0, ok("sad")));
        script.replies.push_back(ok("I'm here."));
        script.chats.push_back(ok("Tell me more."));
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.transcript.len() == 2).await;

    handle.send_chat("  hello ").await.unwrap();
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 4).await;

    assert_eq!(
        backend.chats(),
        vec![ChatRequest {
            message: "hello".into(),
            emotion: "sad".into(),
            user_id: "anonymous".into(),
        }]
    );
    assert_eq!(
        texts(&snap)[2..].to_vec(),
        vec!["You: hello", "Bot: Tell me more."]
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_failed_chat_appends_apology() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .script
        .lock()
        .unwrap()
        .chats
        .push_back(Err(net_err("/chat")));
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send_chat("hello").await.unwrap();
    let snap = wait_for(&mut rx, |s| s.transcript.len() == 3).await;

    let entries = snap.transcript.entries();
    assert_eq!(entries[1].role, Role::User);
    assert_eq!(entries[1].text, "hello");
    assert_eq!(entries[2].role, Role::Bot);
    assert!(entries[2].is_error);
    assert_eq!(entries[2].text, APOLOGY);
    // Default emotion before any detection.
    assert_eq!(backend.chats()[0].emotion, "neutral");

    handle.shutdown().await;
}

// ---------- Chart ----------

#[tokio::test]
async fn test_chart_refresh_replaces_wholesale() {
    let backend = Arc::new(ScriptedBackend::default());
    {
        let mut script = backend.script.lock().unwrap();
        script.stats.push_back(EmotionDistribution {
            labels: vec!["happy".into(), "sad".into(), "fear".into()],
            data: vec![50.0, 30.0, 20.0],
        });
        script.stats.push_back(EmotionDistribution {
            labels: vec!["neutral".into()],
            data: vec![100.0],
        });
    }
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    wait_for(&mut rx, |s| s.distribution.labels.len() == 3).await;
    handle.send(Command::RefreshStats).await.unwrap();
    let snap = wait_for(&mut rx, |s| s.distribution.labels.len() == 1).await;

    assert_eq!(
        snap.distribution,
        EmotionDistribution {
            labels: vec!["neutral".into()],
            data: vec![100.0],
        }
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_successful_detection_refreshes_chart() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.script.lock().unwrap().detections.push_back((0, ok("neutral")));
    let handle = start(backend.clone());
    let mut rx = handle.snapshots();

    handle.send(Command::DetectNow).await.unwrap();
    wait_for(&mut rx, |s| s.detections == 1).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.stats_count() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    handle.shutdown().await;
}
