// src/session/context.rs — Session context passed to every operation.

use super::emotion::EmotionLabel;
use super::sequence::SequenceGuard;

/// A change-triggered reply request. Transitions are numbered in detection
/// order so a late reply cannot move the latch back to an older label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub label: EmotionLabel,
    seq: u64,
}

/// Current/previous emotion and the fixed user id for one client run.
///
/// `previous` is only moved forward by [`SessionContext::commit_transition`],
/// i.e. after a change-triggered reply was fetched successfully. A failed
/// reply therefore leaves the transition pending and it is tried again on
/// the next detection. A reply that completes after a newer transition was
/// committed is kept in the transcript but does not touch `previous`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    user_id: String,
    current: EmotionLabel,
    previous: Option<EmotionLabel>,
    /// Labels whose change-triggered reply is in flight.
    in_flight: Vec<EmotionLabel>,
    transitions: SequenceGuard,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current: EmotionLabel::neutral(),
            previous: None,
            in_flight: Vec::new(),
            transitions: SequenceGuard::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current(&self) -> &EmotionLabel {
        &self.current
    }

    pub fn previous(&self) -> Option<&EmotionLabel> {
        self.previous.as_ref()
    }

    /// Record a detection. Returns the transition a reply should be fetched
    /// for, or `None` when the label matches `previous` or a reply for it is
    /// already in flight.
    pub fn observe(&mut self, label: EmotionLabel) -> Option<Transition> {
        self.current = label;
        if self.previous.as_ref() == Some(&self.current) {
            return None;
        }
        if self.in_flight.contains(&self.current) {
            return None;
        }
        self.in_flight.push(self.current.clone());
        Some(Transition {
            label: self.current.clone(),
            seq: self.transitions.next(),
        })
    }

    /// The reply for `transition` arrived. Latches its label as previous
    /// unless a newer transition was committed first; returns whether it did.
    pub fn commit_transition(&mut self, transition: &Transition) -> bool {
        self.in_flight.retain(|l| l != &transition.label);
        if !self.transitions.accept(transition.seq) {
            return false;
        }
        self.previous = Some(transition.label.clone());
        true
    }

    /// The reply for `transition` failed: leave `previous` alone.
    pub fn abandon_transition(&mut self, transition: &Transition) {
        self.in_flight.retain(|l| l != &transition.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> EmotionLabel {
        EmotionLabel::new(s).unwrap()
    }

    fn observed(s: &mut SessionContext, raw: &str) -> Option<String> {
        s.observe(label(raw)).map(|t| t.label.as_str().to_string())
    }

    #[test]
    fn test_starts_neutral_without_previous() {
        let s = SessionContext::new("anonymous");
        assert_eq!(s.current().as_str(), "neutral");
        assert!(s.previous().is_none());
        assert_eq!(s.user_id(), "anonymous");
    }

    #[test]
    fn test_first_detection_triggers_reply() {
        let mut s = SessionContext::new("anonymous");
        assert_eq!(observed(&mut s, "neutral").as_deref(), Some("neutral"));
    }

    #[test]
    fn test_same_label_after_commit_is_quiet() {
        let mut s = SessionContext::new("anonymous");
        let t = s.observe(label("happy")).unwrap();
        assert!(s.commit_transition(&t));
        assert_eq!(s.observe(label("happy")), None);
        assert_eq!(s.previous(), Some(&label("happy")));
    }

    #[test]
    fn test_in_flight_reply_not_duplicated() {
        let mut s = SessionContext::new("anonymous");
        assert!(s.observe(label("sad")).is_some());
        assert_eq!(s.observe(label("sad")), None);
    }

    #[test]
    fn test_failed_reply_retried_next_cycle() {
        let mut s = SessionContext::new("anonymous");
        let t = s.observe(label("angry")).unwrap();
        s.abandon_transition(&t);
        assert!(s.previous().is_none());
        assert_eq!(observed(&mut s, "angry").as_deref(), Some("angry"));
    }

    #[test]
    fn test_interleaved_transitions_each_fetch_once() {
        let mut s = SessionContext::new("anonymous");
        let happy = s.observe(label("happy")).unwrap();
        let fear = s.observe(label("fear")).unwrap();
        assert_eq!(s.observe(label("happy")), None);
        assert!(s.commit_transition(&happy));
        assert!(s.commit_transition(&fear));
        assert_eq!(s.previous(), Some(&label("fear")));
    }

    #[test]
    fn test_late_reply_does_not_move_latch_back() {
        let mut s = SessionContext::new("anonymous");
        let happy = s.observe(label("happy")).unwrap();
        let sad = s.observe(label("sad")).unwrap();

        // The sad reply lands first, the happy one afterwards.
        assert!(s.commit_transition(&sad));
        assert!(!s.commit_transition(&happy));
        assert_eq!(s.previous(), Some(&label("sad")));

        // Still sad: nothing new to fetch.
        assert_eq!(s.observe(label("sad")), None);
        // Back to happy is a fresh transition.
        assert_eq!(observed(&mut s, "happy").as_deref(), Some("happy"));
    }

    #[test]
    fn test_current_tracks_latest_even_while_pending() {
        let mut s = SessionContext::new("anonymous");
        s.observe(label("happy"));
        s.observe(label("fear"));
        assert_eq!(s.current(), &label("fear"));
    }
}
