//! fsmkit: a small embeddable finite-state-machine engine.
//!
//! A machine is defined by its declared states, an initial state, and a
//! table of permitted (state, event) transitions. Domain code registers
//! transitions — each naming a trigger event, a source state, a destination
//! state, and zero or more side-effects — and then drives the machine by
//! applying events one at a time. The transition table can be rendered as a
//! deterministic Graphviz digraph for diagnostics.
//!
//! # Core Concepts
//!
//! - **State / Event**: opaque string identifiers; states form a closed
//!   registry, events are an open set
//! - **Transition**: (source, event) → destination plus an ordered list of
//!   side-effects, last registration wins
//! - **Machine**: holds the current state and applies events; failed lookups
//!   never mutate state
//! - **Graph export**: [`visualize`] renders the table and current state as
//!   DOT text
//!
//! # Example
//!
//! ```rust
//! use fsmkit::{Machine, Transition};
//!
//! let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING", "FINISHED"]);
//! machine.register_many(vec![
//!     Transition::new("VALIDATED", "RECEIVED", "PROCESSING"),
//!     Transition::new("FAILED", "RECEIVED", "FINISHED"),
//! ])?;
//!
//! machine.apply("VALIDATED")?;
//! assert_eq!(machine.current().as_str(), "PROCESSING");
//!
//! // no transition from PROCESSING for FAILED
//! assert!(!machine.can("FAILED"));
//! assert!(machine.apply("FAILED").is_err());
//! assert_eq!(machine.current().as_str(), "PROCESSING");
//! # Ok::<(), fsmkit::Error>(())
//! ```
//!
//! The machine is single-owner: one logical execution context at a time, no
//! internal locking. The [`retry`] module is an unrelated backoff helper
//! shipped alongside the engine; the engine never calls it.

pub mod builder;
pub mod core;
pub mod graph;
pub mod machine;
pub mod retry;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use crate::core::{Event, History, State, TransitionRecord};
pub use graph::visualize;
pub use machine::{Action, ApplyReport, BoundMachine, Error, Machine, StateStore, Transition};
