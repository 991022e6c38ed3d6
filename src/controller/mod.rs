// src/controller/mod.rs — Client loop controller
//
// One task owns the session, transcript and chart data and is the only
// writer. The detection timer, user commands and request completions are
// multiplexed with `tokio::select!`; every network call runs in its own
// spawned task and reports back through the event queue. Front ends read
// immutable `Snapshot`s from a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::{ChatRequest, DetectRequest, EmotionBackend, EmotionReplyRequest};
use crate::capture::{FrameEncoder, FrameSource};
use crate::infra::config::Config;
use crate::infra::errors::MoodChatError;
use crate::session::{
    EmotionDistribution, EmotionLabel, SequenceGuard, SessionContext, Transcript,
    TranscriptEntry, Transition,
};
use crate::util::truncate_str;

/// Requests from a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit a chat message. Blank text is ignored.
    SendChat(String),
    /// Run a detection cycle now instead of waiting for the timer.
    DetectNow,
    /// Re-fetch the emotion distribution.
    RefreshStats,
    Shutdown,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Latest detected emotion, `None` until the first detection.
    pub emotion: Option<EmotionLabel>,
    pub transcript: Transcript,
    pub distribution: EmotionDistribution,
    /// Description of the camera stream, `None` when there is none.
    pub camera: Option<String>,
    /// Detection results applied so far (stale ones excluded).
    pub detections: u64,
    pub last_error: Option<String>,
}

impl Snapshot {
    pub fn feeling_line(&self) -> String {
        match &self.emotion {
            Some(e) => e.feeling_line(),
            None => "Feeling: ...".to_string(),
        }
    }
}

/// Knobs the controller needs from the config.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub user_id: String,
    pub greeting: String,
    pub interval: Duration,
    pub encoder: FrameEncoder,
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_id: config.session.user_id.clone(),
            greeting: config.session.greeting.clone(),
            interval: Duration::from_millis(config.capture.interval_ms),
            encoder: FrameEncoder::from_config(&config.capture),
        }
    }
}

/// Completions reported by spawned request tasks.
enum Event {
    Detected {
        seq: u64,
        result: Result<Option<String>, MoodChatError>,
    },
    EmotionReply {
        transition: Transition,
        result: Result<Option<String>, MoodChatError>,
    },
    ChatReply {
        result: Result<Option<String>, MoodChatError>,
    },
    Stats {
        seq: u64,
        result: Result<EmotionDistribution, MoodChatError>,
    },
}

type SharedSource = Arc<Mutex<Box<dyn FrameSource>>>;
type SourceGuard = OwnedMutexGuard<Box<dyn FrameSource>>;

/// Handle held by the front end. Dropping it does not stop the loop; call
/// [`ControllerHandle::shutdown`].
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn send(&self, command: Command) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow::anyhow!("controller has stopped"))
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.send(Command::SendChat(text.into())).await
    }

    /// A sender usable from other tasks (e.g. a stdin reader).
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the timer, abandon in-flight requests and wait for the loop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Controller task ended abnormally: {}", e);
        }
    }
}

pub struct Controller {
    backend: Arc<dyn EmotionBackend>,
    source: Option<SharedSource>,
    camera: Option<String>,
    options: ControllerOptions,

    session: SessionContext,
    transcript: Transcript,
    distribution: EmotionDistribution,
    emotion: Option<EmotionLabel>,
    detections: u64,
    last_error: Option<String>,

    detect_seq: SequenceGuard,
    stats_seq: SequenceGuard,

    cancel: CancellationToken,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn EmotionBackend>,
        source: Option<Box<dyn FrameSource>>,
        options: ControllerOptions,
    ) -> (Self, watch::Receiver<Snapshot>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let camera = source.as_ref().map(|s| s.describe());

        let controller = Self {
            backend,
            source: source.map(|s| Arc::new(Mutex::new(s))),
            camera,
            session: SessionContext::new(options.user_id.clone()),
            options,
            transcript: Transcript::new(),
            distribution: EmotionDistribution::default(),
            emotion: None,
            detections: 0,
            last_error: None,
            detect_seq: SequenceGuard::default(),
            stats_seq: SequenceGuard::default(),
            cancel: CancellationToken::new(),
            events_tx,
            events_rx,
            snapshot_tx,
        };
        (controller, snapshot_rx)
    }

    /// Start the loop on the current runtime.
    pub fn spawn(
        backend: Arc<dyn EmotionBackend>,
        source: Option<Box<dyn FrameSource>>,
        options: ControllerOptions,
    ) -> ControllerHandle {
        let (controller, snapshots) = Self::new(backend, source, options);
        let cancel = controller.cancel.clone();
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let task = tokio::spawn(controller.run(commands_rx));

        ControllerHandle {
            commands: commands_tx,
            snapshots,
            cancel,
            task,
        }
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        // Startup: greeting, then one immediate distribution refresh.
        self.transcript
            .push(TranscriptEntry::bot(self.options.greeting.clone()));
        if self.source.is_none() {
            tracing::warn!("No camera stream; emotion detection is idle");
        }
        self.refresh_stats();
        self.publish();

        let period = self.options.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Controller running (every {}ms, user {})",
            period.as_millis(),
            self.session.user_id()
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(event) = self.events_rx.recv() => self.apply(event),
                cmd = commands.recv() => match cmd {
                    Some(Command::SendChat(text)) => self.send_chat(&text),
                    Some(Command::DetectNow) => self.start_detection(),
                    Some(Command::RefreshStats) => self.refresh_stats(),
                    Some(Command::Shutdown) | None => break,
                },
                _ = ticker.tick() => self.start_detection(),
            }
            self.publish();
        }

        // Abandon whatever is still in flight.
        self.cancel.cancel();
        tracing::info!("Controller stopped");
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Snapshot {
            emotion: self.emotion.clone(),
            transcript: self.transcript.clone(),
            distribution: self.distribution.clone(),
            camera: self.camera.clone(),
            detections: self.detections,
            last_error: self.last_error.clone(),
        });
    }

    /// Run `work` in its own task, dropping it on shutdown.
    fn spawn_request<F>(&self, work: F)
    where
        F: std::future::Future<Output = Event> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                event = work => {
                    let _ = tx.send(event);
                }
            }
        });
    }

    // ─── Capture & detect ───────────────────────────────────────

    fn start_detection(&mut self) {
        let Some(source) = self.source.clone() else {
            tracing::debug!("Detection tick skipped: no camera stream");
            return;
        };
        // One grab at a time; a slow camera skips ticks instead of queueing them.
        let Ok(source) = source.try_lock_owned() else {
            tracing::debug!("Detection tick skipped: previous frame still being grabbed");
            return;
        };

        let seq = self.detect_seq.next();
        let encoder = self.options.encoder;
        let backend = self.backend.clone();
        let user_id = self.session.user_id().to_string();

        self.spawn_request(async move {
            let result = match grab_and_encode(source, encoder).await {
                Ok(image) => backend.detect_emotion(DetectRequest { image, user_id }).await,
                Err(e) => Err(e),
            };
            Event::Detected { seq, result }
        });
    }

    fn on_detected(&mut self, seq: u64, result: Result<Option<String>, MoodChatError>) {
        if !self.detect_seq.accept(seq) {
            tracing::debug!("Dropping stale detection #{}", seq);
            return;
        }

        let raw = match result {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Detection #{} returned no emotion", seq);
                return;
            }
            Err(e) => {
                tracing::warn!("Emotion detection failed: {}", e);
                self.last_error = Some(e.to_string());
                return;
            }
        };
        let Some(label) = EmotionLabel::new(&raw) else {
            return;
        };

        self.detections += 1;
        self.last_error = None;
        self.emotion = Some(label.clone());

        if let Some(transition) = self.session.observe(label) {
            tracing::info!(
                "Emotion changed: {} -> {}",
                self.session
                    .previous()
                    .map(|p| p.as_str())
                    .unwrap_or("none"),
                transition.label
            );
            self.fetch_emotion_reply(transition);
        }
        self.refresh_stats();
    }

    // ─── Emotion reply ──────────────────────────────────────────

    fn fetch_emotion_reply(&self, transition: Transition) {
        let backend = self.backend.clone();
        let request = EmotionReplyRequest {
            emotion: transition.label.as_str().to_string(),
            user_id: self.session.user_id().to_string(),
        };
        self.spawn_request(async move {
            let result = backend.emotion_response(request).await;
            Event::EmotionReply { transition, result }
        });
    }

    fn on_emotion_reply(
        &mut self,
        transition: Transition,
        result: Result<Option<String>, MoodChatError>,
    ) {
        match result {
            Ok(reply) => {
                if let Some(text) = reply {
                    self.transcript.push(TranscriptEntry::bot(text));
                }
                if !self.session.commit_transition(&transition) {
                    tracing::debug!(
                        "Late reply for '{}' kept, newer emotion already latched",
                        transition.label
                    );
                }
            }
            Err(e) => {
                tracing::error!("Emotion response for '{}' failed: {}", transition.label, e);
                self.transcript.push(TranscriptEntry::apology());
                self.session.abandon_transition(&transition);
            }
        }
    }

    // ─── Distribution ───────────────────────────────────────────

    fn refresh_stats(&mut self) {
        let seq = self.stats_seq.next();
        let backend = self.backend.clone();
        let user_id = self.session.user_id().to_string();
        self.spawn_request(async move {
            let result = backend.emotion_stats(&user_id).await;
            Event::Stats { seq, result }
        });
    }

    fn on_stats(&mut self, seq: u64, result: Result<EmotionDistribution, MoodChatError>) {
        if !self.stats_seq.accept(seq) {
            tracing::debug!("Dropping stale distribution #{}", seq);
            return;
        }
        match result {
            Ok(distribution) => self.distribution = distribution,
            Err(e) => tracing::warn!("Failed to update emotion chart: {}", e),
        }
    }

    // ─── Chat ───────────────────────────────────────────────────

    fn send_chat(&mut self, text: &str) {
        let message = text.trim();
        if message.is_empty() {
            return;
        }

        self.transcript.push(TranscriptEntry::user(message));
        tracing::debug!("Chat send: {}", truncate_str(message, 80));

        let backend = self.backend.clone();
        let request = ChatRequest {
            message: message.to_string(),
            emotion: self.session.current().as_str().to_string(),
            user_id: self.session.user_id().to_string(),
        };
        self.spawn_request(async move {
            let result = backend.chat(request).await;
            Event::ChatReply { result }
        });
    }

    fn on_chat_reply(&mut self, result: Result<Option<String>, MoodChatError>) {
        match result {
            Ok(Some(text)) => self.transcript.push(TranscriptEntry::bot(text)),
            Ok(None) => tracing::debug!("Chat reply was empty"),
            Err(e) => {
                tracing::error!("Chat failed: {}", e);
                self.transcript.push(TranscriptEntry::apology());
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::Detected { seq, result } => self.on_detected(seq, result),
            Event::EmotionReply { transition, result } => {
                self.on_emotion_reply(transition, result)
            }
            Event::ChatReply { result } => self.on_chat_reply(result),
            Event::Stats { seq, result } => self.on_stats(seq, result),
        }
    }
}

/// Grab the current frame, release the camera, then encode off the executor.
async fn grab_and_encode(
    mut source: SourceGuard,
    encoder: FrameEncoder,
) -> Result<String, MoodChatError> {
    let frame = source.grab().await;
    drop(source);
    let frame = frame?;

    tokio::task::spawn_blocking(move || encoder.encode(&frame))
        .await
        .map_err(|e| MoodChatError::Capture(format!("encode task failed: {e}")))?
}
