//! Fluent construction of machines.

use crate::core::State;
use crate::machine::Error as MachineError;
use crate::machine::{Machine, Transition};
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states declared. Call .states([..]) before .build()")]
    NoStates,

    #[error(transparent)]
    Invalid(#[from] MachineError),
}

/// Builder for constructing machines with a fluent API.
///
/// `build` registers the collected transitions as one atomic batch, so a
/// single invalid entry fails the whole construction.
///
/// # Example
///
/// ```rust
/// use fsmkit::{MachineBuilder, Transition};
///
/// let machine = MachineBuilder::new()
///     .initial("RECEIVED")
///     .states(["RECEIVED", "PROCESSING", "FINISHED"])
///     .transition(Transition::new("VALIDATED", "RECEIVED", "PROCESSING"))
///     .transition(Transition::new("FAILED", "RECEIVED", "FINISHED"))
///     .build()?;
///
/// assert_eq!(machine.current().as_str(), "RECEIVED");
/// # Ok::<(), fsmkit::BuildError>(())
/// ```
#[derive(Default)]
pub struct MachineBuilder {
    initial: Option<State>,
    states: Vec<State>,
    transitions: Vec<Transition>,
}

impl MachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<State>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Declare the state registry (required, at least one state).
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add a transition.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the machine.
    ///
    /// Fails if required fields are missing or any collected transition is
    /// invalid; in the latter case no machine is produced at all.
    pub fn build(self) -> Result<Machine, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut machine = Machine::new(initial, self.states);
        machine.register_many(self.transitions)?;
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_an_initial_state() {
        let result = MachineBuilder::new()
            .states(["RECEIVED", "PROCESSING"])
            .build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_declared_states() {
        let result = MachineBuilder::new().initial("RECEIVED").build();

        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn fluent_api_builds_a_machine() {
        let machine = MachineBuilder::new()
            .initial("RECEIVED")
            .states(["RECEIVED", "PROCESSING", "FINISHED"])
            .transitions([
                Transition::new("VALIDATED", "RECEIVED", "PROCESSING"),
                Transition::new("FAILED", "RECEIVED", "FINISHED"),
            ])
            .build()
            .unwrap();

        assert_eq!(machine.current().as_str(), "RECEIVED");
        assert!(machine.can("VALIDATED"));
        assert!(machine.can("FAILED"));
    }

    #[test]
    fn machine_without_transitions_is_legal() {
        // every declared state behaves as terminal
        let machine = MachineBuilder::new()
            .initial("FINISHED")
            .states(["FINISHED"])
            .build()
            .unwrap();

        assert!(machine.available_events().is_empty());
    }

    #[test]
    fn invalid_transition_fails_the_build() {
        let result = MachineBuilder::new()
            .initial("RECEIVED")
            .states(["RECEIVED", "PROCESSING"])
            .transition(Transition::new("SHIP", "PROCESSING", "SHIPPED"))
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Invalid(MachineError::UnknownState { .. }))
        ));
    }
}
