//! Chord matching
//!
//! Turns a stream of single-key tokens into binding keys. A chord such as
//! `g,g` is held while its steps arrive inside the chord window; single-key
//! bindings never wait.

use std::time::{Duration, Instant};

/// Default time allowed between the steps of a chord
pub const DEFAULT_CHORD_WINDOW: Duration = Duration::from_millis(600);

/// Queries the matcher needs from the currently eligible bindings
pub trait ChordLookup {
    /// Some eligible binding has exactly this key
    fn has_exact(&self, candidate: &str) -> bool;

    /// Some eligible binding's key extends `candidate` by at least one step
    fn has_prefix(&self, candidate: &str) -> bool;
}

/// Does `key` continue the chord `candidate` with further steps
pub fn extends(key: &str, candidate: &str) -> bool {
    key.len() > candidate.len()
        && key.starts_with(candidate)
        && key[candidate.len()..].starts_with(',')
}

/// Result of feeding one token into the matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordOutcome {
    /// A binding key resolved; state has been reset
    Matched(String),
    /// Waiting for more steps of a chord
    Pending(Vec<String>),
    /// Nothing matched; state has been reset
    NoMatch,
}

/// Partial chord awaiting further keys
#[derive(Debug, Clone, Default)]
pub struct ChordState {
    pending: Vec<String>,
    expires_at: Option<Instant>,
}

impl ChordState {
    /// Keys received so far
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Deadline for the next step, if a chord is pending
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// True when no chord is in progress
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Stateful recognizer shared by every scope
#[derive(Debug, Clone)]
pub struct ChordMatcher {
    window: Duration,
    state: ChordState,
}

impl Default for ChordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CHORD_WINDOW)
    }
}

impl ChordMatcher {
    /// Create a matcher with the given step window
    pub fn new(window: Duration) -> Self {
        ChordMatcher {
            window,
            state: ChordState::default(),
        }
    }

    /// Time allowed between chord steps
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current partial chord
    pub fn state(&self) -> &ChordState {
        &self.state
    }

    /// Keys of the partial chord
    pub fn pending(&self) -> &[String] {
        self.state.pending()
    }

    /// Drop any partial chord
    pub fn reset(&mut self) {
        self.state.pending.clear();
        self.state.expires_at = None;
    }

    /// Clear a partial chord whose window has elapsed. Never resolves a
    /// binding. Returns true if state was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state.expires_at {
            Some(deadline) if now >= deadline => {
                tracing::trace!(pending = ?self.state.pending, "Chord window elapsed");
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Feed one normalized token that arrived at `now`
    pub fn feed<L>(&mut self, token: &str, now: Instant, lookup: &L) -> ChordOutcome
    where
        L: ChordLookup + ?Sized,
    {
        self.expire(now);
        self.state.pending.push(token.to_string());

        if let Some(outcome) = self.evaluate(now, lookup) {
            return outcome;
        }

        // The sequence cannot grow into anything; retry the new key alone
        if self.state.pending.len() > 1 {
            self.state.pending.clear();
            self.state.pending.push(token.to_string());
            if let Some(outcome) = self.evaluate(now, lookup) {
                return outcome;
            }
        }

        self.reset();
        ChordOutcome::NoMatch
    }

    fn evaluate<L>(&mut self, now: Instant, lookup: &L) -> Option<ChordOutcome>
    where
        L: ChordLookup + ?Sized,
    {
        let candidate = self.state.pending.join(",");
        if lookup.has_exact(&candidate) {
            self.reset();
            return Some(ChordOutcome::Matched(candidate));
        }
        if lookup.has_prefix(&candidate) {
            self.state.expires_at = Some(now + self.window);
            return Some(ChordOutcome::Pending(self.state.pending.clone()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Keys(Vec<&'static str>);

    impl ChordLookup for Keys {
        fn has_exact(&self, candidate: &str) -> bool {
            self.0.iter().any(|key| *key == candidate)
        }

        fn has_prefix(&self, candidate: &str) -> bool {
            self.0.iter().any(|key| extends(key, candidate))
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_extends() {
        assert!(extends("g,g", "g"));
        assert!(extends("g,g,x", "g,g"));
        assert!(!extends("gg", "g"));
        assert!(!extends("g", "g"));
        assert!(!extends("ctrl+g,x", "g"));
    }

    #[test]
    fn test_chord_within_window() {
        let keys = Keys(vec!["g,g"]);
        let mut matcher = ChordMatcher::default();
        let t0 = Instant::now();

        assert_eq!(
            matcher.feed("g", t0, &keys),
            ChordOutcome::Pending(vec!["g".to_string()])
        );
        assert_eq!(
            matcher.feed("g", t0 + ms(50), &keys),
            ChordOutcome::Matched("g,g".to_string())
        );
        assert!(matcher.pending().is_empty());
    }

    #[test]
    fn test_chord_past_window_restarts() {
        let keys = Keys(vec!["g,g"]);
        let mut matcher = ChordMatcher::default();
        let t0 = Instant::now();

        matcher.feed("g", t0, &keys);
        assert_eq!(
            matcher.feed("g", t0 + ms(1000), &keys),
            ChordOutcome::Pending(vec!["g".to_string()])
        );
    }

    #[test]
    fn test_single_key_never_waits() {
        let keys = Keys(vec!["g,g", "j"]);
        let mut matcher = ChordMatcher::default();
        let t0 = Instant::now();

        matcher.feed("g", t0, &keys);
        assert_eq!(
            matcher.feed("j", t0 + ms(10), &keys),
            ChordOutcome::Matched("j".to_string())
        );
        assert!(matcher.pending().is_empty());
    }

    #[test]
    fn test_broken_chord_restarts_from_new_key() {
        let keys = Keys(vec!["g,g", "d,d"]);
        let mut matcher = ChordMatcher::default();
        let t0 = Instant::now();

        matcher.feed("d", t0, &keys);
        assert_eq!(
            matcher.feed("g", t0 + ms(10), &keys),
            ChordOutcome::Pending(vec!["g".to_string()])
        );
        assert_eq!(
            matcher.feed("g", t0 + ms(20), &keys),
            ChordOutcome::Matched("g,g".to_string())
        );
    }

    #[test]
    fn test_unmatched_resets() {
        let keys = Keys(vec!["g,g"]);
        let mut matcher = ChordMatcher::default();
        assert_eq!(matcher.feed("x", Instant::now(), &keys), ChordOutcome::NoMatch);
        assert!(matcher.state().is_empty());
    }

    #[test]
    fn test_expire_only_after_deadline() {
        let keys = Keys(vec!["g,g"]);
        let mut matcher = ChordMatcher::new(ms(100));
        let t0 = Instant::now();

        matcher.feed("g", t0, &keys);
        assert!(!matcher.expire(t0 + ms(50)));
        assert_eq!(matcher.pending().to_vec(), vec!["g".to_string()]);
        assert!(matcher.expire(t0 + ms(100)));
        assert!(matcher.pending().is_empty());
    }

    #[test]
    fn test_three_step_chord_refreshes_window() {
        let keys = Keys(vec!["g,o,t"]);
        let mut matcher = ChordMatcher::new(ms(100));
        let t0 = Instant::now();

        matcher.feed("g", t0, &keys);
        matcher.feed("o", t0 + ms(90), &keys);
        assert_eq!(
            matcher.feed("t", t0 + ms(180), &keys),
            ChordOutcome::Matched("g,o,t".to_string())
        );
    }
}
