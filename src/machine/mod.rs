//! The machine engine: transition table, event application, and external
//! entity binding.

mod bind;
mod engine;
mod error;
mod table;

pub use bind::{BoundMachine, StateStore};
pub use engine::{ApplyReport, Machine};
pub use error::Error;
pub use table::{Action, Transition};

pub(crate) use table::TransitionTable;
