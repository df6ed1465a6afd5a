//! The transition table: a flat mapping from (source state, event) to a
//! destination state plus an ordered side-effect list.
//!
//! The table is one flat `BTreeMap` keyed by the composite (source, event)
//! pair. Inserting an existing key replaces the whole record, destination
//! and side-effects both — last write wins, never an additive merge. The
//! ordered map also gives the graph exporter its (source, event) edge
//! ordering for free.

use super::error::Error;
use crate::core::{Event, State};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A stored side-effect, run synchronously after a transition commits.
///
/// The returned flag is informational only: it is surfaced in
/// [`ApplyReport`](crate::machine::ApplyReport) but never gates, retries,
/// or rolls back the committed transition.
pub type Action = Arc<dyn Fn() -> bool + Send + Sync>;

/// A transition rule: (source, trigger) -> destination plus side-effects.
///
/// # Example
///
/// ```rust
/// use fsmkit::Transition;
///
/// let transition = Transition::new("VALIDATED", "RECEIVED", "PROCESSING")
///     .with_action(|| {
///         println!("validated");
///         true
///     });
/// assert_eq!(transition.actions.len(), 1);
/// ```
pub struct Transition {
    /// The event that fires this transition
    pub trigger: Event,
    /// The source state the machine must be in
    pub source: State,
    /// The destination state committed on application
    pub target: State,
    /// Side-effects run in order after the destination is committed
    pub actions: Vec<Action>,
}

impl Transition {
    /// Create a transition with no side-effects.
    pub fn new(
        trigger: impl Into<Event>,
        source: impl Into<State>,
        target: impl Into<State>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            source: source.into(),
            target: target.into(),
            actions: Vec::new(),
        }
    }

    /// Append a side-effect, preserving registration order.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.actions.push(Arc::new(action));
        self
    }
}

impl Clone for Transition {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            actions: self.actions.iter().map(Arc::clone).collect(),
        }
    }
}

/// The stored value for one (source, event) key.
pub(crate) struct TransitionTarget {
    pub(crate) destination: State,
    pub(crate) actions: Vec<Action>,
}

// Actions are opaque closures, so report only how many there are.
impl fmt::Debug for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTarget")
            .field("destination", &self.destination)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Flat composite-key transition table.
#[derive(Default)]
pub(crate) struct TransitionTable {
    entries: BTreeMap<(State, Event), TransitionTarget>,
}

impl TransitionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a record, fully replacing any prior record for the same key.
    pub(crate) fn insert(&mut self, transition: Transition) {
        let Transition {
            trigger,
            source,
            target,
            actions,
        } = transition;
        self.entries
            .insert((source, trigger), TransitionTarget { destination: target, actions });
    }

    /// Look up the record for (current state, event). Pure read.
    pub(crate) fn resolve(&self, current: &State, event: &Event) -> Result<&TransitionTarget, Error> {
        self.entries
            .get(&(current.clone(), event.clone()))
            .ok_or_else(|| Error::NoSuchTransition {
                state: current.clone(),
                event: event.clone(),
            })
    }

    pub(crate) fn contains(&self, current: &State, event: &Event) -> bool {
        self.resolve(current, event).is_ok()
    }

    /// Events defined for the given state, in lexicographic order.
    pub(crate) fn events_from(&self, state: &State) -> Vec<Event> {
        self.entries
            .keys()
            .filter(|(source, _)| source == state)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// All entries, ordered by (source, event).
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&(State, Event), &TransitionTarget)> {
        self.entries.iter()
    }
}

/// Validate one transition against the declared state registry.
///
/// Identifiers must be non-empty; source and destination must be members of
/// the registry. The event namespace is open, so only emptiness is checked
/// for the trigger.
pub(crate) fn validate(registry: &[State], transition: &Transition) -> Result<(), Error> {
    if transition.trigger.is_empty() {
        return Err(Error::EmptyIdentifier { what: "event" });
    }
    if transition.source.is_empty() {
        return Err(Error::EmptyIdentifier {
            what: "source state",
        });
    }
    if transition.target.is_empty() {
        return Err(Error::EmptyIdentifier {
            what: "destination state",
        });
    }
    for state in [&transition.source, &transition.target] {
        if !registry.contains(state) {
            return Err(Error::UnknownState {
                state: state.clone(),
            });
        }
    }
    Ok(())
}
