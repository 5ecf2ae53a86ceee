//! Saving and restoring practice data.
//!
//! The storage backend is opaque: anything that can load and save a whole
//! [`PersistedState`] works. Writes are debounced by [`Autosave`], which the
//! host polls from its event loop.

use crate::clock::Clock;
use crate::error::Result;
use crate::problem::PracticeAttempt;
use crate::session::PracticeSession;
use crate::settings::PracticeSettings;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Newest first.
    pub attempts: Vec<PracticeAttempt>,
    pub settings: PracticeSettings,
}

pub trait Store {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Loads saved state, starting fresh if there is none or it can't be read.
pub fn load_or_default<S: Store + ?Sized>(store: &S) -> PersistedState {
    match store.load() {
        Ok(Some(state)) => {
            info!(attempts = state.attempts.len(), "loaded practice data");
            state
        }
        Ok(None) => {
            info!("no saved practice data, starting fresh");
            PersistedState::default()
        }
        Err(e) => {
            warn!(error = %e, "could not load practice data, starting fresh");
            PersistedState::default()
        }
    }
}

/// Debounced writer for a session's persisted state.
///
/// A change resets the timer. Once the session has been quiet for `debounce`
/// the snapshot is written. A failed write leaves the session untouched and is
/// retried one debounce later.
pub struct Autosave<S> {
    store: S,
    debounce: Duration,
    saved_revision: u64,
    seen_revision: u64,
    pending_since: Option<DateTime<Utc>>,
}

impl<S: Store> Autosave<S> {
    /// `revision` is the session revision the store already reflects.
    pub fn new(store: S, debounce: Duration, revision: u64) -> Self {
        Self {
            store,
            debounce,
            saved_revision: revision,
            seen_revision: revision,
            pending_since: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn is_dirty<C: Clock>(&self, session: &PracticeSession<C>) -> bool {
        session.revision() != self.saved_revision
    }

    /// How long until a pending write is due, if one is pending.
    pub fn due_in(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.pending_since
            .map(|since| (since + self.debounce - now).max(Duration::zero()))
    }

    /// Returns true when a write happened.
    pub fn poll<C: Clock>(&mut self, session: &PracticeSession<C>, now: DateTime<Utc>) -> bool {
        if !self.is_dirty(session) {
            self.pending_since = None;
            return false;
        }

        if session.revision() != self.seen_revision || self.pending_since.is_none() {
            self.seen_revision = session.revision();
            self.pending_since = Some(now);
        }

        match self.pending_since {
            Some(since) if now - since >= self.debounce => {
                if self.write(session) {
                    true
                } else {
                    self.pending_since = Some(now);
                    false
                }
            }
            _ => false,
        }
    }

    /// Writes immediately if anything is unsaved.
    pub fn flush<C: Clock>(&mut self, session: &PracticeSession<C>) -> bool {
        if !self.is_dirty(session) {
            return false;
        }
        self.write(session)
    }

    fn write<C: Clock>(&mut self, session: &PracticeSession<C>) -> bool {
        match self.store.save(&session.snapshot()) {
            Ok(()) => {
                self.saved_revision = session.revision();
                self.seen_revision = session.revision();
                self.pending_since = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "could not save practice data");
                false
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;
    use crate::clock::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> (PracticeSession<ManualClock>, ManualClock) {
        let clock = ManualClock::at_millis(0);
        let s = PracticeSession::with_parts(
            PersistedState::default(),
            clock.clone(),
            StdRng::seed_from_u64(3),
        );
        (s, clock)
    }

    #[test]
    fn test_load_or_default_when_empty() {
        let store = MemoryStore::default();
        assert_eq!(load_or_default(&store), PersistedState::default());
    }

    #[test]
    fn test_load_or_default_on_error() {
        let store = MemoryStore::default();
        store.fail.set(true);
        assert_eq!(load_or_default(&store), PersistedState::default());
    }

    #[test]
    fn test_load_or_default_returns_saved() {
        let store = MemoryStore::default();
        let mut state = PersistedState::default();
        state.settings.max_number = 12;
        store.save(&state).unwrap();

        assert_eq!(load_or_default(&store), state);
    }

    #[test]
    fn test_nothing_to_save_when_clean() {
        let (s, clock) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::seconds(1), 0);

        assert!(!autosave.poll(&s, clock.now()));
        assert!(!autosave.flush(&s));
        assert_eq!(autosave.store().saves.get(), 0);
    }

    #[test]
    fn test_waits_for_debounce() {
        let (mut s, clock) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::seconds(1), 0);

        s.clear_history();
        assert!(!autosave.poll(&s, clock.now()));
        assert_eq!(autosave.due_in(clock.now()), Some(Duration::seconds(1)));

        clock.advance_ms(999);
        assert!(!autosave.poll(&s, clock.now()));

        clock.advance_ms(1);
        assert!(autosave.poll(&s, clock.now()));
        assert_eq!(autosave.store().saves.get(), 1);
        assert!(!autosave.is_dirty(&s));
        assert_eq!(autosave.due_in(clock.now()), None);

        clock.advance_ms(5_000);
        assert!(!autosave.poll(&s, clock.now()));
        assert_eq!(autosave.store().saves.get(), 1);
    }

    #[test]
    fn test_new_change_resets_timer() {
        let (mut s, clock) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::seconds(1), 0);

        s.update_settings(s.settings().toggle_excluded(3));
        autosave.poll(&s, clock.now());
        clock.advance_ms(800);

        s.update_settings(s.settings().toggle_excluded(4));
        assert!(!autosave.poll(&s, clock.now()));
        clock.advance_ms(800);
        assert!(!autosave.poll(&s, clock.now()));
        clock.advance_ms(200);
        assert!(autosave.poll(&s, clock.now()));

        let saved = autosave.store().saved.borrow().clone().unwrap();
        assert_eq!(saved.settings, *s.settings());
        assert_eq!(autosave.store().saves.get(), 1);
    }

    #[test]
    fn test_zero_debounce_saves_immediately() {
        let (mut s, clock) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::zero(), 0);

        s.generate_problem();
        s.submit_answer(0);
        assert!(autosave.poll(&s, clock.now()));

        let saved = autosave.store().saved.borrow().clone().unwrap();
        assert_eq!(saved.attempts, s.attempts());
    }

    #[test]
    fn test_flush_writes_pending_change() {
        let (mut s, _) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::seconds(30), 0);

        s.clear_history();
        assert!(autosave.flush(&s));
        assert!(!autosave.flush(&s));
        assert_eq!(autosave.store().saves.get(), 1);
    }

    #[test]
    fn test_failed_save_keeps_state_and_retries() {
        let (mut s, clock) = session();
        let mut autosave = Autosave::new(MemoryStore::default(), Duration::seconds(1), 0);
        autosave.store().fail.set(true);

        s.generate_problem();
        let attempt = s.submit_answer(7).unwrap();
        autosave.poll(&s, clock.now());
        clock.advance_ms(1_000);
        assert!(!autosave.poll(&s, clock.now()));
        assert!(autosave.is_dirty(&s));
        assert_eq!(s.attempts()[0], attempt);

        autosave.store().fail.set(false);
        clock.advance_ms(500);
        assert!(!autosave.poll(&s, clock.now()));
        clock.advance_ms(500);
        assert!(autosave.poll(&s, clock.now()));
        assert!(!autosave.is_dirty(&s));
    }

    #[test]
    fn test_persisted_layout() {
        let json = serde_json::to_value(PersistedState::default()).unwrap();
        assert!(json["attempts"].as_array().unwrap().is_empty());
        assert_eq!(json["settings"]["minNumber"], 2);
        assert_eq!(json["settings"]["maxNumber"], 20);
        assert_eq!(json["settings"]["mode"], "bucket");
    }
}
