// src/session/transcript.rs — Append-only chat transcript.

use chrono::{DateTime, Local};

/// Generic apology shown when a reply could not be fetched.
pub const APOLOGY: &str = "Oops, something went wrong!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn speaker(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// Apology entries are rendered in the error style.
    pub is_error: bool,
    pub at: DateTime<Local>,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), false)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text.into(), false)
    }

    pub fn apology() -> Self {
        Self::new(Role::Bot, APOLOGY.to_string(), true)
    }

    fn new(role: Role, text: String, is_error: bool) -> Self {
        Self {
            role,
            text,
            is_error,
            at: Local::now(),
        }
    }

    /// Plain one-line rendering, e.g. `Bot: Great to hear!`.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.role.speaker(), self.text)
    }
}

/// Ordered log of entries. Grows for the whole run, nothing is evicted.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}
