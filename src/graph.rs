//! Graphviz export of a machine's transition table and current state.
//!
//! The output is a plain DOT digraph: one edge line per registered
//! transition, sorted by source state then event, then one line per declared
//! state in declaration order, with the current state colored red. The text
//! is a pure function of the machine, byte-identical across repeated calls
//! on an unchanged machine.

use crate::core::State;
use crate::machine::{Machine, TransitionTable};
use std::fmt::Write;

/// Render `machine` as a Graphviz digraph.
///
/// # Example
///
/// ```rust
/// use fsmkit::{visualize, Machine, Transition};
///
/// let mut machine = Machine::new("RECEIVED", ["RECEIVED", "PROCESSING"]);
/// machine.register(Transition::new("VALIDATED", "RECEIVED", "PROCESSING"))?;
///
/// let dot = visualize(&machine);
/// assert!(dot.contains("\"RECEIVED\" -> \"PROCESSING\" [ label = \"VALIDATED\" ];"));
/// assert!(dot.contains("\"RECEIVED\" [color = \"red\"];"));
/// # Ok::<(), fsmkit::Error>(())
/// ```
pub fn visualize(machine: &Machine) -> String {
    render(machine.table(), machine.states(), machine.current())
}

pub(crate) fn render(table: &TransitionTable, states: &[State], current: &State) -> String {
    let mut out = String::new();

    out.push_str("digraph fsm {\n");

    // edge lines come out sorted by (source, event) straight from the table
    for ((source, event), target) in table.iter() {
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [ label = \"{}\" ];",
            source,
            target.destination,
            event
        );
    }
    out.push('\n');

    for state in states {
        if state == current {
            let _ = writeln!(out, "    \"{}\" [color = \"red\"];", state);
        } else {
            let _ = writeln!(out, "    \"{}\";", state);
        }
    }

    out.push_str("}\n");
    out
}
