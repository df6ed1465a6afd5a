//! The machine: current state, state registry, transition table, and the
//! event-application protocol.

use super::error::Error;
use super::table::{self, Action, Transition, TransitionTable};
use crate::core::{Event, History, State, TransitionRecord};
use chrono::Utc;
use tracing::{debug, warn};

/// Diagnostics returned by a successful `apply`.
///
/// `action_outcomes` holds each side-effect's flag in execution order. The
/// flags are informational: by the time they exist the destination state is
/// already committed, and a `false` outcome neither fails the application
/// nor rolls it back.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ApplyReport {
    /// The event that was applied
    pub trigger: Event,
    /// The state the machine was in before the transition
    pub from: State,
    /// The committed destination state
    pub to: State,
    /// One flag per side-effect, in execution order
    pub action_outcomes: Vec<bool>,
}

/// A finite-state machine over string state and event identifiers.
///
/// A machine is built with an initial state and the closed registry of
/// declared states, then populated with transitions. It is single-owner:
/// no internal locking, no global state — wrap it in a mutex or route
/// operations through one consumer if the surrounding program is parallel.
///
/// # Example
///
/// ```rust
/// use fsmkit::{Machine, Transition};
///
/// let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING", "FINISHED"]);
/// machine.register(Transition::new("VALIDATED", "RECEIVED", "PROCESSING"))?;
///
/// assert!(machine.can("VALIDATED"));
/// machine.apply("VALIDATED")?;
/// assert_eq!(machine.current().as_str(), "PROCESSING");
/// # Ok::<(), fsmkit::Error>(())
/// ```
pub struct Machine {
    current: State,
    states: Vec<State>,
    table: TransitionTable,
    history: History,
}

impl Machine {
    /// Create a machine in `initial` with the given declared states.
    ///
    /// The initial state is expected to be one of the declared states;
    /// registration-time validation covers transitions, not this argument.
    pub fn new<I, S>(initial: impl Into<State>, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        Self {
            current: initial.into(),
            states: states.into_iter().map(Into::into).collect(),
            table: TransitionTable::new(),
            history: History::new(),
        }
    }

    /// Register one transition, replacing any prior record for the same
    /// (source, event) key in full.
    pub fn register(&mut self, transition: Transition) -> Result<(), Error> {
        table::validate(&self.states, &transition)?;
        self.table.insert(transition);
        Ok(())
    }

    /// Register a batch of transitions atomically: the whole batch is
    /// validated first, and on the first invalid entry nothing is applied.
    pub fn register_many(&mut self, transitions: Vec<Transition>) -> Result<(), Error> {
        for transition in &transitions {
            table::validate(&self.states, transition)?;
        }
        for transition in transitions {
            self.table.insert(transition);
        }
        Ok(())
    }

    /// The current state. Pure read.
    pub fn current(&self) -> &State {
        &self.current
    }

    /// The declared state registry, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// True iff a transition is registered for (current state, `event`).
    pub fn can(&self, event: impl Into<Event>) -> bool {
        self.table.contains(&self.current, &event.into())
    }

    /// Events registered for the current state, sorted lexicographically.
    pub fn available_events(&self) -> Vec<Event> {
        self.table.events_from(&self.current)
    }

    /// The log of committed transitions.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Apply `event` to the machine.
    ///
    /// If no transition is registered for (current state, event), fails with
    /// [`Error::NoSuchTransition`] and the current state is untouched.
    /// Otherwise the destination is committed first, then the record's
    /// side-effects run synchronously in registration order; a side-effect
    /// that reads state observes the destination. Their outcomes are
    /// collected into the returned [`ApplyReport`] and never roll the
    /// transition back.
    pub fn apply(&mut self, event: impl Into<Event>) -> Result<ApplyReport, Error> {
        let event = event.into();
        let resolved = self.table.resolve(&self.current, &event)?;
        let target = resolved.destination.clone();
        let actions: Vec<Action> = resolved.actions.iter().map(std::sync::Arc::clone).collect();

        let from = std::mem::replace(&mut self.current, target.clone());
        self.history = self.history.record(TransitionRecord {
            from: from.clone(),
            to: target.clone(),
            trigger: event.clone(),
            timestamp: Utc::now(),
        });
        debug!(%from, to = %target, trigger = %event, "transition applied");

        let action_outcomes = run_actions(&event, &target, &actions);

        Ok(ApplyReport {
            trigger: event,
            from,
            to: target,
            action_outcomes,
        })
    }
}

/// Run a committed transition's side-effects in order, collecting their
/// outcome flags.
pub(crate) fn run_actions(trigger: &Event, state: &State, actions: &[Action]) -> Vec<bool> {
    let mut outcomes = Vec::with_capacity(actions.len());
    for action in actions {
        let ok = action();
        if !ok {
            warn!(%trigger, %state, "side-effect reported failure");
        }
        outcomes.push(ok);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn dispute_machine() -> Machine {
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING", "FINISHED"]);
        machine
            .register_many(vec![
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING"),
                Transition::new("FAILED", "RECEIVED", "FINISHED"),
            ])
            .unwrap();
        machine
    }

    #[test]
    fn apply_commits_the_destination() {
        let mut machine = dispute_machine();

        let report = machine.apply("VALIDATED").unwrap();

        assert_eq!(machine.current().as_str(), "PROCESSING");
        assert_eq!(report.from.as_str(), "RECEIVED");
        assert_eq!(report.to.as_str(), "PROCESSING");
        assert_eq!(report.trigger.as_str(), "VALIDATED");
    }

    #[test]
    fn apply_unknown_event_leaves_state_untouched() {
        let mut machine = dispute_machine();
        machine.apply("VALIDATED").unwrap();

        let err = machine.apply("UNKNOWN").unwrap_err();

        assert_eq!(
            err,
            Error::NoSuchTransition {
                state: "PROCESSING".into(),
                event: "UNKNOWN".into(),
            }
        );
        assert_eq!(machine.current().as_str(), "PROCESSING");
    }

    #[test]
    fn can_tracks_the_current_state() {
        let mut machine = dispute_machine();
        assert!(machine.can("VALIDATED"));
        assert!(machine.can("FAILED"));

        machine.apply("VALIDATED").unwrap();

        // no transitions are registered from PROCESSING
        assert!(!machine.can("FAILED"));
        assert!(!machine.can("VALIDATED"));
    }

    #[test]
    fn available_events_are_sorted() {
        let machine = dispute_machine();
        let events = machine.available_events();
        let names: Vec<&str> = events.iter().map(Event::as_str).collect();
        assert_eq!(names, ["FAILED", "VALIDATED"]);

        let mut machine = dispute_machine();
        machine.apply("FAILED").unwrap();
        assert!(machine.available_events().is_empty());
    }

    #[test]
    fn actions_run_in_order_exactly_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING"]);

        let first = Arc::clone(&log);
        let second = Arc::clone(&log);
        machine
            .register(
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING")
                    .with_action(move || {
                        first.lock().unwrap().push("notify");
                        true
                    })
                    .with_action(move || {
                        second.lock().unwrap().push("persist");
                        true
                    }),
            )
            .unwrap();

        machine.apply("VALIDATED").unwrap();

        assert_eq!(*log.lock().unwrap(), ["notify", "persist"]);
    }

    #[test]
    fn failing_action_does_not_fail_or_roll_back() {
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING"]);
        machine
            .register(
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING")
                    .with_action(|| false)
                    .with_action(|| true),
            )
            .unwrap();

        let report = machine.apply("VALIDATED").unwrap();

        assert_eq!(report.action_outcomes, [false, true]);
        assert_eq!(machine.current().as_str(), "PROCESSING");
    }

    #[test]
    fn reregistration_overwrites_destination_and_actions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING", "FINISHED"]);

        let counter = Arc::clone(&calls);
        machine
            .register(
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING").with_action(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                }),
            )
            .unwrap();
        machine
            .register(Transition::new("VALIDATED", "RECEIVED", "FINISHED"))
            .unwrap();

        let report = machine.apply("VALIDATED").unwrap();

        assert_eq!(machine.current().as_str(), "FINISHED");
        assert!(report.action_outcomes.is_empty());
        // the discarded record's side-effect never runs
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn register_rejects_undeclared_states() {
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING"]);

        let err = machine
            .register(Transition::new("SHIP", "PROCESSING", "SHIPPED"))
            .unwrap_err();

        assert_eq!(
            err,
            Error::UnknownState {
                state: "SHIPPED".into()
            }
        );
    }

    #[test]
    fn register_many_is_atomic() {
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING"]);

        let err = machine
            .register_many(vec![
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING"),
                Transition::new("SHIP", "PROCESSING", "SHIPPED"),
            ])
            .unwrap_err();

        assert_eq!(
            err,
            Error::UnknownState {
                state: "SHIPPED".into()
            }
        );
        // the valid first entry must not have been applied either
        assert!(!machine.can("VALIDATED"));
    }

    #[test]
    fn reapplying_an_event_uses_the_new_current_state() {
        let mut machine = dispute_machine();
        machine.apply("VALIDATED").unwrap();

        // second application looks up (PROCESSING, VALIDATED), which is absent
        assert!(machine.apply("VALIDATED").is_err());
        assert_eq!(machine.current().as_str(), "PROCESSING");
    }

    #[test]
    fn history_mirrors_applied_transitions() {
        let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING", "FINISHED"]);
        machine
            .register_many(vec![
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING"),
                Transition::new("DISPUTE_WON", "PROCESSING", "FINISHED"),
            ])
            .unwrap();

        machine.apply("VALIDATED").unwrap();
        machine.apply("DISPUTE_WON").unwrap();

        let path: Vec<&str> = machine.history().path().iter().map(|s| s.as_str()).collect();
        assert_eq!(path, ["RECEIVED", "PROCESSING", "FINISHED"]);
        assert_eq!(
            machine.history().records()[1].trigger.as_str(),
            "DISPUTE_WON"
        );
    }
}
