//! Transition history tracking.
//!
//! Every committed transition is recorded with its trigger and a timestamp.
//! History is diagnostic data: the engine never reads it back to make
//! decisions.

use super::ident::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state transitioned from
    pub from: State,
    /// The state transitioned to
    pub to: State,
    /// The event that caused the transition
    pub trigger: Event,
    /// When the transition committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// `record` returns a new history rather than mutating in place, so a
/// snapshot taken before a transition stays valid afterwards.
///
/// # Example
///
/// ```rust
/// use fsmkit::{History, TransitionRecord};
/// use chrono::Utc;
///
/// let history = History::new();
/// let history = history.record(TransitionRecord {
///     from: "RECEIVED".into(),
///     to: "PROCESSING".into(),
///     trigger: "VALIDATED".into(),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.path();
/// assert_eq!(path.len(), 2); // RECEIVED -> PROCESSING
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct History {
    records: Vec<TransitionRecord>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// The path of states traversed: the first record's source state, then
    /// the destination of each record in order. Empty if nothing has been
    /// recorded.
    pub fn path(&self) -> Vec<&State> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Elapsed time between the first and last recorded transition.
    ///
    /// `None` if the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last
                .timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok(),
            _ => None,
        }
    }

    /// All recorded transitions in order.
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }
}
