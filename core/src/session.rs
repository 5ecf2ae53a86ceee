use crate::clock::{Clock, SystemClock};
use crate::generator;
use crate::persist::PersistedState;
use crate::problem::{CurrentProblem, PracticeAttempt};
use crate::settings::{PracticeSettings, SettingsPatch};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingAnswer,
}

/// Owns the live problem, the attempt history (newest first) and the settings.
///
/// `revision` goes up on every change to persisted data, so a saver can tell
/// whether a snapshot is stale without diffing it.
pub struct PracticeSession<C = SystemClock> {
    current_problem: Option<CurrentProblem>,
    attempts: Vec<PracticeAttempt>,
    settings: PracticeSettings,
    revision: u64,
    clock: C,
    rng: StdRng,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::restore(PersistedState::default())
    }

    pub fn restore(state: PersistedState) -> Self {
        Self::with_parts(state, SystemClock, StdRng::from_entropy())
    }
}

impl<C: Clock> PracticeSession<C> {
    pub fn with_parts(state: PersistedState, clock: C, rng: StdRng) -> Self {
        Self {
            current_problem: None,
            attempts: state.attempts,
            settings: state.settings,
            revision: 0,
            clock,
            rng,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.current_problem {
            Some(_) => SessionPhase::AwaitingAnswer,
            None => SessionPhase::Idle,
        }
    }

    pub fn current_problem(&self) -> Option<&CurrentProblem> {
        self.current_problem.as_ref()
    }

    pub fn attempts(&self) -> &[PracticeAttempt] {
        &self.attempts
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            attempts: self.attempts.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Replaces any problem already in flight.
    pub fn generate_problem(&mut self) -> CurrentProblem {
        let problem = generator::generate(&self.settings, &mut self.rng);
        let current = CurrentProblem {
            problem,
            start_time: self.clock.now(),
        };
        debug!(a = problem.a, b = problem.b, "generated problem");
        self.current_problem = Some(current);
        current
    }

    /// Returns `None` without touching anything when no problem is live.
    pub fn submit_answer(&mut self, answer: u64) -> Option<PracticeAttempt> {
        let current = self.current_problem.take()?;
        let attempt = PracticeAttempt::record(&current, answer, self.clock.now());
        debug!(
            a = attempt.first_number,
            b = attempt.second_number,
            correct = attempt.is_correct,
            time_ms = attempt.time_ms,
            "recorded attempt"
        );

        self.attempts.insert(0, attempt.clone());
        self.revision += 1;
        Some(attempt)
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        if patch.is_empty() {
            return;
        }
        self.settings.apply(patch);
        self.revision += 1;
    }

    pub fn clear_history(&mut self) {
        self.attempts.clear();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::problem::Problem;
    use std::collections::BTreeSet;

    fn session() -> (PracticeSession<ManualClock>, ManualClock) {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let session = PracticeSession::with_parts(
            PersistedState::default(),
            clock.clone(),
            StdRng::seed_from_u64(1),
        );
        (session, clock)
    }

    #[test]
    fn test_starts_idle() {
        let (s, _) = session();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.current_problem().is_none());
        assert!(s.attempts().is_empty());
        assert_eq!(*s.settings(), PracticeSettings::default());
    }

    #[test]
    fn test_generate_moves_to_awaiting() {
        let (mut s, clock) = session();
        let current = s.generate_problem();

        assert_eq!(s.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(s.current_problem(), Some(&current));
        assert_eq!(current.start_time, clock.now());
        assert!((2..=20).contains(&current.first_number()));
        assert!((2..=20).contains(&current.second_number()));
    }

    #[test]
    fn test_submit_without_problem_is_noop() {
        let (mut s, _) = session();
        let before = s.revision();

        assert!(s.submit_answer(12).is_none());
        assert!(s.attempts().is_empty());
        assert_eq!(s.revision(), before);
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_submit_records_and_returns_to_idle() {
        let (mut s, clock) = session();
        let current = s.generate_problem();
        clock.advance_ms(1_234);

        let expected = current.problem.answer();
        let attempt = s.submit_answer(expected).unwrap();

        assert!(attempt.is_correct);
        assert_eq!(attempt.correct_answer, expected);
        assert_eq!(attempt.time_ms, 1_234);
        assert_eq!(attempt.timestamp, clock.now().timestamp_millis());
        assert!(s.current_problem().is_none());
        assert_eq!(s.attempts()[0], attempt);
    }

    #[test]
    fn test_wrong_answer_is_recorded() {
        let (mut s, _) = session();
        let current = s.generate_problem();
        let attempt = s.submit_answer(current.problem.answer() + 1).unwrap();

        assert!(!attempt.is_correct);
        assert_eq!(attempt.correct_answer, current.problem.answer());
    }

    #[test]
    fn test_history_is_newest_first() {
        let (mut s, clock) = session();
        s.generate_problem();
        let first = s.submit_answer(1).unwrap();
        clock.advance_ms(10);
        s.generate_problem();
        let second = s.submit_answer(2).unwrap();

        assert_eq!(s.attempts(), &[second, first]);
    }

    #[test]
    fn test_second_submit_is_noop() {
        let (mut s, _) = session();
        s.generate_problem();
        assert!(s.submit_answer(4).is_some());
        assert!(s.submit_answer(4).is_none());
        assert_eq!(s.attempts().len(), 1);
    }

    #[test]
    fn test_regenerate_replaces_problem() {
        let (mut s, clock) = session();
        s.generate_problem();
        clock.advance_ms(500);
        let replacement = s.generate_problem();

        assert_eq!(s.current_problem(), Some(&replacement));
        assert_eq!(replacement.start_time, clock.now());
    }

    #[test]
    fn test_generation_follows_settings() {
        let (mut s, _) = session();
        s.update_settings(SettingsPatch {
            included_buckets: Some(BTreeSet::from([9])),
            ..Default::default()
        });
        let current = s.generate_problem();
        assert_eq!(current.problem, Problem::new(9, 9));
    }

    #[test]
    fn test_update_settings_merges() {
        let (mut s, _) = session();
        s.update_settings(SettingsPatch {
            excluded_buckets: Some(BTreeSet::from([5])),
            ..Default::default()
        });
        s.update_settings(SettingsPatch {
            min_number: Some(3),
            ..Default::default()
        });

        assert_eq!(s.settings().excluded_buckets, BTreeSet::from([5]));
        assert_eq!(s.settings().min_number, 3);
    }

    #[test]
    fn test_update_settings_keeps_problem_and_history() {
        let (mut s, _) = session();
        s.generate_problem();
        s.submit_answer(0);
        let current = s.generate_problem();

        s.update_settings(s.settings().toggle_excluded(current.first_number()));

        assert_eq!(s.current_problem(), Some(&current));
        assert_eq!(s.attempts().len(), 1);
    }

    #[test]
    fn test_clear_history_keeps_settings_and_problem() {
        let (mut s, _) = session();
        s.update_settings(s.settings().toggle_included(4));
        s.generate_problem();
        s.submit_answer(16);
        let current = s.generate_problem();

        s.clear_history();

        assert!(s.attempts().is_empty());
        assert_eq!(s.current_problem(), Some(&current));
        assert!(s.settings().is_included(4));
    }

    #[test]
    fn test_revision_tracks_persisted_changes_only() {
        let (mut s, _) = session();
        assert_eq!(s.revision(), 0);

        s.generate_problem();
        assert_eq!(s.revision(), 0);

        s.submit_answer(1);
        assert_eq!(s.revision(), 1);

        s.update_settings(SettingsPatch::default());
        assert_eq!(s.revision(), 1);

        s.update_settings(s.settings().toggle_excluded(2));
        assert_eq!(s.revision(), 2);

        s.clear_history();
        assert_eq!(s.revision(), 3);
    }

    #[test]
    fn test_restore_round_trips_snapshot() {
        let (mut s, clock) = session();
        s.update_settings(s.settings().toggle_excluded(11));
        s.generate_problem();
        s.submit_answer(3);
        s.generate_problem();

        let restored =
            PracticeSession::with_parts(s.snapshot(), clock, StdRng::seed_from_u64(2));

        assert_eq!(restored.attempts(), s.attempts());
        assert_eq!(restored.settings(), s.settings());
        assert_eq!(restored.phase(), SessionPhase::Idle);
    }
}
