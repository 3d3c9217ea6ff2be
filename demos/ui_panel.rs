//! UI Panel Controller
//!
//! This demo shows a presentation-layer collaborator driving a UI panel
//! from state machine notifications.
//!
//! Key concepts:
//! - Per-state property snapshots owned by the controller
//! - Tweening between snapshots on every committed change
//! - Gating a state behind an external condition
//! - Index-based requests, as an inspector dropdown would send
//!
//! Run with: cargo run --example ui_panel

use stateflow::builder::StateMachineBuilder;
use stateflow::state_enum;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

state_enum! {
    enum PanelState {
        Collapsed,
        Peek,
        Expanded,
    }
}

#[derive(Clone, Copy, Debug)]
struct Snapshot {
    height: f32,
    opacity: f32,
}

impl Snapshot {
    fn lerp(self, to: Snapshot, t: f32) -> Snapshot {
        Snapshot {
            height: self.height + (to.height - self.height) * t,
            opacity: self.opacity + (to.opacity - self.opacity) * t,
        }
    }
}

fn main() {
    println!("=== UI Panel Controller ===\n");

    let snapshots: HashMap<PanelState, Snapshot> = HashMap::from([
        (PanelState::Collapsed, Snapshot { height: 0.0, opacity: 0.0 }),
        (PanelState::Peek, Snapshot { height: 120.0, opacity: 0.6 }),
        (PanelState::Expanded, Snapshot { height: 480.0, opacity: 1.0 }),
    ]);
    let current = Rc::new(RefCell::new(snapshots[&PanelState::Collapsed]));
    let content_loaded = Rc::new(Cell::new(false));

    let tween_target = Rc::clone(&current);
    let loaded = Rc::clone(&content_loaded);
    let machine = StateMachineBuilder::new()
        .initial(PanelState::Collapsed)
        .refresh_on_same_state(true)
        .gate(PanelState::Expanded, move || loaded.get())
        .on_enter(PanelState::Expanded, || println!("  [enter] Expanded: focus first field"))
        .on_exit(PanelState::Expanded, || println!("  [exit]  Expanded: blur fields"))
        .subscribe(move |from, to| {
            let start = *tween_target.borrow();
            let end = snapshots[&to];
            println!("  [tween] {from:?} -> {to:?}");
            for step in 1..=4 {
                let frame = start.lerp(end, step as f32 / 4.0);
                println!(
                    "          height={:>6.1} opacity={:.2}",
                    frame.height, frame.opacity
                );
            }
            *tween_target.borrow_mut() = end;
        })
        .build()
        .unwrap();

    println!("Hover: peek");
    machine.set_state(PanelState::Peek);

    println!("\nClick before content loaded:");
    let outcome = machine.set_state(PanelState::Expanded);
    println!("  outcome: {outcome:?}");

    content_loaded.set(true);
    println!("\nClick after content loaded:");
    machine.set_state(PanelState::Expanded);

    println!("\nClick again (refresh):");
    machine.set_state(PanelState::Expanded);

    println!("\nInspector dropdown picks index 0 of {:?}:", machine.names());
    machine.set_state_index(0).unwrap();

    println!("\nInspector dropdown picks index 7:");
    if let Err(err) = machine.set_state_index(7) {
        println!("  rejected: {err}");
    }

    println!("\nVisited: {:?}", machine.history().path());
    println!("\n=== Demo Complete ===");
}
