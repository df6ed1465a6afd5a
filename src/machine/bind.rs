//! Binding machine state to an external domain entity.
//!
//! Some integrators want the current state to live inside their own domain
//! object (an order row, a dispute aggregate) rather than in the machine.
//! The entity only has to expose a get/set capability pair; the engine never
//! depends on the concrete domain type.

use super::engine::{run_actions, ApplyReport};
use super::error::Error;
use super::table::{self, Action, Transition, TransitionTable};
use crate::core::{Event, History, State, TransitionRecord};
use chrono::Utc;
use tracing::debug;

/// Capability pair a bound entity must expose.
///
/// `state` may be called several times per operation, so it should be a
/// cheap read. The same single-owner discipline as for
/// [`Machine`](crate::Machine) applies to the entity: no synchronization is
/// added here.
pub trait StateStore {
    /// The entity's current state.
    fn state(&self) -> State;

    /// Overwrite the entity's current state.
    fn set_state(&mut self, state: State);
}

/// A machine whose current state is read from and written to a bound
/// entity instead of an internal field.
///
/// # Example
///
/// ```rust
/// use fsmkit::{BoundMachine, State, StateStore, Transition};
///
/// struct Order {
///     id: u64,
///     status: State,
/// }
///
/// impl StateStore for Order {
///     fn state(&self) -> State {
///         self.status.clone()
///     }
///     fn set_state(&mut self, state: State) {
///         self.status = state;
///     }
/// }
///
/// let order = Order { id: 7, status: "RECEIVED".into() };
/// let mut machine = BoundMachine::new(order, ["RECEIVED", "PROCESSING"]);
/// machine.register(Transition::new("VALIDATED", "RECEIVED", "PROCESSING"))?;
///
/// machine.apply("VALIDATED")?;
/// assert_eq!(machine.model().status.as_str(), "PROCESSING");
/// assert_eq!(machine.model().id, 7);
/// # Ok::<(), fsmkit::Error>(())
/// ```
pub struct BoundMachine<M: StateStore> {
    model: M,
    states: Vec<State>,
    table: TransitionTable,
    history: History,
}

impl<M: StateStore> BoundMachine<M> {
    /// Bind `model` with the given declared states. The entity keeps
    /// whatever state it is currently in.
    pub fn new<I, S>(model: M, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        Self {
            model,
            states: states.into_iter().map(Into::into).collect(),
            table: TransitionTable::new(),
            history: History::new(),
        }
    }

    /// The bound entity.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the bound entity.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Unbind, returning the entity.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Register one transition. Same validation and overwrite semantics as
    /// [`Machine::register`](crate::Machine::register).
    pub fn register(&mut self, transition: Transition) -> Result<(), Error> {
        table::validate(&self.states, &transition)?;
        self.table.insert(transition);
        Ok(())
    }

    /// Register a batch atomically.
    pub fn register_many(&mut self, transitions: Vec<Transition>) -> Result<(), Error> {
        for transition in &transitions {
            table::validate(&self.states, transition)?;
        }
        for transition in transitions {
            self.table.insert(transition);
        }
        Ok(())
    }

    /// The entity's current state.
    pub fn current(&self) -> State {
        self.model.state()
    }

    /// The declared state registry, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// True iff a transition is registered for the entity's current state
    /// and `event`.
    pub fn can(&self, event: impl Into<Event>) -> bool {
        self.table.contains(&self.model.state(), &event.into())
    }

    /// Events registered for the entity's current state, sorted
    /// lexicographically.
    pub fn available_events(&self) -> Vec<Event> {
        self.table.events_from(&self.model.state())
    }

    /// The log of committed transitions.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply `event`: read the entity's state, look up the table, write the
    /// destination through the entity's setter, then run side-effects.
    /// Failure semantics match [`Machine::apply`](crate::Machine::apply).
    pub fn apply(&mut self, event: impl Into<Event>) -> Result<ApplyReport, Error> {
        let event = event.into();
        let from = self.model.state();
        let resolved = self.table.resolve(&from, &event)?;
        let target = resolved.destination.clone();
        let actions: Vec<Action> = resolved.actions.iter().map(std::sync::Arc::clone).collect();

        self.model.set_state(target.clone());
        self.history = self.history.record(TransitionRecord {
            from: from.clone(),
            to: target.clone(),
            trigger: event.clone(),
            timestamp: Utc::now(),
        });
        debug!(%from, to = %target, trigger = %event, "bound transition applied");

        let action_outcomes = run_actions(&event, &target, &actions);

        Ok(ApplyReport {
            trigger: event,
            from,
            to: target,
            action_outcomes,
        })
    }

    /// Graphviz rendering of the table and the entity's current state, same
    /// grammar as [`visualize`](crate::visualize).
    pub fn visualize(&self) -> String {
        crate::graph::render(&self.table, &self.states, &self.model.state())
    }
}
