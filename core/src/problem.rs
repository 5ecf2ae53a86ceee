use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
}

impl Problem {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn answer(&self) -> u64 {
        u64::from(self.a) * u64::from(self.b)
    }

    pub fn display(&self) -> String {
        format!("{} × {}", self.a, self.b)
    }
}

/// The problem currently waiting for an answer. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentProblem {
    pub problem: Problem,
    pub start_time: DateTime<Utc>,
}

impl CurrentProblem {
    pub fn first_number(&self) -> u32 {
        self.problem.a
    }

    pub fn second_number(&self) -> u32 {
        self.problem.b
    }
}

/// One answered problem. Created once by the session and never changed after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeAttempt {
    /// A v4 UUID for new attempts. Older records may carry any other string.
    pub id: String,
    pub first_number: u32,
    pub second_number: u32,
    pub user_answer: u64,
    pub correct_answer: u64,
    pub time_ms: u64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub is_correct: bool,
}

impl PracticeAttempt {
    pub fn record(current: &CurrentProblem, user_answer: u64, answered_at: DateTime<Utc>) -> Self {
        let correct_answer = current.problem.answer();
        let time_ms = (answered_at - current.start_time).num_milliseconds().max(0) as u64;

        Self {
            id: Uuid::new_v4().to_string(),
            first_number: current.problem.a,
            second_number: current.problem.b,
            user_answer,
            correct_answer,
            time_ms,
            timestamp: answered_at.timestamp_millis(),
            is_correct: user_answer == correct_answer,
        }
    }

    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }
}
