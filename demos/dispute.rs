//! Dispute Lifecycle
//!
//! This example drives a payment-dispute lifecycle through the machine.
//!
//! Key concepts:
//! - Closed state registry declared up front
//! - Side-effects attached to specific transitions
//! - Binding machine state to a domain entity via `StateStore`
//! - Graphviz export of the transition table
//!
//! Run with: cargo run --example dispute

use fsmkit::{BoundMachine, State, StateStore, Transition};
use std::sync::{Arc, Mutex};

const STATE_RECEIVED: &str = "RECEIVED";
const STATE_CREATE_CLAIM: &str = "CREATE_CLAIM";
const STATE_PROCESSING: &str = "PROCESSING";
const STATE_FINISHED: &str = "FINISHED";

const EVENT_VALIDATION_SUCCEEDED: &str = "VALIDATION_SUCCEEDED";
const EVENT_VALIDATION_FAILED: &str = "VALIDATION_FAILED";
const EVENT_CLAIM_CREATED: &str = "CLAIM_CREATED";
const EVENT_DISPUTE_WON: &str = "DISPUTE_WON";
const EVENT_DISPUTE_LOST: &str = "DISPUTE_LOST";

struct Dispute {
    id: String,
    state: State,
}

/// Shared handle to the dispute, so transition side-effects can observe the
/// entity the machine is bound to.
#[derive(Clone)]
struct SharedDispute(Arc<Mutex<Dispute>>);

impl StateStore for SharedDispute {
    fn state(&self) -> State {
        self.0.lock().unwrap().state.clone()
    }

    fn set_state(&mut self, state: State) {
        self.0.lock().unwrap().state = state;
    }
}

fn send_warning_mail(dispute: &SharedDispute) -> bool {
    let dispute = dispute.0.lock().unwrap();
    println!(
        "EMAIL: DISPUTE {} STATE WAS TRANSITIONED TO {}",
        dispute.id, dispute.state
    );
    true
}

fn new_dispute_machine(
    dispute: SharedDispute,
) -> Result<BoundMachine<SharedDispute>, fsmkit::Error> {
    let states = [
        STATE_RECEIVED,
        STATE_CREATE_CLAIM,
        STATE_PROCESSING,
        STATE_FINISHED,
    ];

    let mut machine = BoundMachine::new(dispute.clone(), states);

    let on_failed = dispute.clone();
    let on_lost = dispute;
    machine.register_many(vec![
        Transition::new(EVENT_VALIDATION_SUCCEEDED, STATE_RECEIVED, STATE_CREATE_CLAIM),
        Transition::new(EVENT_VALIDATION_FAILED, STATE_RECEIVED, STATE_FINISHED)
            .with_action(move || send_warning_mail(&on_failed)),
        Transition::new(EVENT_CLAIM_CREATED, STATE_CREATE_CLAIM, STATE_PROCESSING),
        Transition::new(EVENT_DISPUTE_WON, STATE_PROCESSING, STATE_FINISHED),
        Transition::new(EVENT_DISPUTE_LOST, STATE_PROCESSING, STATE_FINISHED)
            .with_action(move || send_warning_mail(&on_lost)),
    ])?;

    Ok(machine)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dispute = SharedDispute(Arc::new(Mutex::new(Dispute {
        id: "123abc".to_string(),
        state: STATE_RECEIVED.into(),
    })));

    let mut machine = new_dispute_machine(dispute)?;

    println!("BEFORE: {}", machine.current());
    machine.apply(EVENT_VALIDATION_SUCCEEDED)?;
    println!("AFTER: {}", machine.current());

    println!("BEFORE: {}", machine.current());
    machine.apply(EVENT_CLAIM_CREATED)?;
    println!("AFTER: {}", machine.current());

    println!("{}", machine.visualize());
    Ok(())
}
