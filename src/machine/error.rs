//! Engine errors.

use crate::core::{Event, State};
use thiserror::Error;

/// Errors raised by transition registration and event application.
///
/// `EmptyIdentifier` and `UnknownState` are registration-time validation
/// failures and are never raised by `apply`. `NoSuchTransition` is the
/// normal-operation failure of `apply` and leaves the current state
/// untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{what} identifier must not be empty")]
    EmptyIdentifier { what: &'static str },

    #[error("state '{state}' is not in the declared state registry")]
    UnknownState { state: State },

    #[error("no transition for event '{event}' from state '{state}'")]
    NoSuchTransition { state: State, event: Event },
}
