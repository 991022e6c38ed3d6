// src/session/mod.rs — Per-run client state: emotion latch, transcript, chart data.

pub mod context;
pub mod distribution;
pub mod emotion;
pub mod sequence;
pub mod transcript;

pub use context::{SessionContext, Transition};
pub use distribution::EmotionDistribution;
pub use emotion::EmotionLabel;
pub use sequence::SequenceGuard;
pub use transcript::{Role, Transcript, TranscriptEntry, APOLOGY};
