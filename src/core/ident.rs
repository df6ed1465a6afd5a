//! String identifiers for states and events.
//!
//! Both are opaque to the engine: a state means whatever the integrator says
//! it means, and an event is just a name for a trigger. States form a closed
//! registry declared at machine construction; the event namespace is open.
//! The ordering derives give the transition table its deterministic
//! (source, event) iteration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A state identifier.
///
/// # Example
///
/// ```rust
/// use fsmkit::State;
///
/// let state = State::new("RECEIVED");
/// assert_eq!(state.as_str(), "RECEIVED");
/// assert_eq!(state, State::from("RECEIVED"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

/// An event identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(String);

impl State {
    /// Create a state identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True iff the identifier is the empty string. Empty identifiers are
    /// rejected at transition registration.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Event {
    /// Create an event identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True iff the identifier is the empty string. Empty identifiers are
    /// rejected at transition registration.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for State {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Event {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<str> for Event {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
