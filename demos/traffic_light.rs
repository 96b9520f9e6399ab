//! Traffic Light State Machine
//!
//! A cyclic machine timed by how long each light has been on.
//!
//! Key concepts:
//! - Monitored states and entry-duration conditions
//! - Polling with `run()` under a time budget
//! - Reading the transition history afterwards
//!
//! Run with: RUST_LOG=debug cargo run --example traffic_light

use statebot::builder::timed_transition;
use statebot::core::{Layout, State};
use statebot::machine::{FiniteStateMachine, RunOptions};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn light(name: &'static str) -> State {
    State::monitored(name).with_entering_action(move || {
        tracing::info!(light = name, "Light on");
        Ok(())
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut layout = Layout::new();
    let green = layout.add_state(light("GREEN"));
    let yellow = layout.add_state(light("YELLOW"));
    let red = layout.add_state(light("RED"));

    timed_transition(&mut layout, green, yellow, Duration::from_secs(4))?;
    timed_transition(&mut layout, yellow, red, Duration::from_secs(1))?;
    timed_transition(&mut layout, red, green, Duration::from_secs(5))?;
    layout.set_initial_state(green)?;

    let mut machine = FiniteStateMachine::builder()
        .layout(layout)
        .validated(true)
        .build()?;

    println!("=== Traffic Light State Machine ===\n");
    let outcome = machine.run(RunOptions::default().time_budget(Duration::from_secs(12)))?;

    println!("finished {outcome} after {} transitions", machine.history().len());
    for record in machine.history().records() {
        println!(
            "{} -> {} at {}",
            machine.layout().state_name(record.from),
            machine.layout().state_name(record.to),
            record.timestamp.format("%H:%M:%S%.3f"),
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
