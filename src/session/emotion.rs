// src/session/emotion.rs — Emotion labels as returned by the detector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels the detector is known to produce. Anything else is still
/// accepted and displayed, it just has no fixed chart colour.
pub const KNOWN_EMOTIONS: [&str; 7] = [
    "happy", "sad", "angry", "neutral", "disgust", "fear", "surprise",
];

/// A normalised (trimmed, lower-case) emotion label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let label = raw.trim().to_lowercase();
        if label.is_empty() {
            None
        } else {
            Some(Self(label))
        }
    }

    pub fn neutral() -> Self {
        Self("neutral".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        KNOWN_EMOTIONS.contains(&self.0.as_str())
    }

    /// Display form: first character upper-cased (`happy` -> `Happy`).
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Text of the emotion display line.
    pub fn feeling_line(&self) -> String {
        format!("Feeling: {}", self.capitalized())
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
