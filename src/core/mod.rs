//! Core identifier and history types.
//!
//! Everything here is plain data: string identifiers for states and events,
//! and the timestamped log of committed transitions.

mod history;
mod ident;

pub use history::{History, TransitionRecord};
pub use ident::{Event, State};
