//! Stratum: a hierarchical state machine library
//!
//! Stratum models behavior as a fixed tree of states with enter/update/exit
//! lifecycle hooks. Each tick, only the active leaf is polled for a
//! transition and updated; when a transition fires, the machine exits states
//! from the old leaf up to the lowest common ancestor and enters states from
//! there down to the new leaf. Nothing outside that slice of the tree is
//! touched.
//!
//! # Core Concepts
//!
//! - **State**: one tree node with lifecycle hooks, via the [`State`] trait
//! - **Active path**: the chain from the root to the active leaf; the only
//!   states considered "entered" at any moment
//! - **LCA transitions**: moves between arbitrary states exit/enter the
//!   minimal set of ancestors/descendants, in leaf-to-ancestor and
//!   ancestor-to-leaf order respectively
//! - **Driving context**: a caller-owned value every hook and guard receives;
//!   the machine itself is engine-agnostic and side-effect free
//!
//! # Example
//!
//! ```rust
//! use stratum::{State, StateMachineBuilder};
//!
//! struct Input {
//!     move_axis: f32,
//! }
//!
//! struct Named(&'static str);
//! impl State<Input> for Named {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! let mut builder = StateMachineBuilder::new();
//! let root = builder.root(Named("Root")).unwrap();
//! let idle = builder.child(root, Named("Idle")).unwrap();
//! let moving = builder.child(root, Named("Move")).unwrap();
//! builder.transition(root, idle, |_: &Input| true).unwrap();
//! builder
//!     .transition(idle, moving, |input: &Input| input.move_axis.abs() > 0.0)
//!     .unwrap();
//! builder
//!     .transition(moving, idle, |input: &Input| input.move_axis == 0.0)
//!     .unwrap();
//!
//! let mut machine = builder.build().unwrap();
//! let mut input = Input { move_axis: 0.0 };
//!
//! machine.update(&mut input, 0.016).unwrap(); // starts, Root -> Idle
//! assert_eq!(machine.active_path_string(), "Root/Idle");
//!
//! input.move_axis = 1.0;
//! machine.update(&mut input, 0.016).unwrap();
//! assert_eq!(machine.active_path_string(), "Root/Move");
//! ```

pub mod builder;
pub mod core;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use core::{
    Guard, MachineError, State, StateHistory, StateId, StateMachine, StateTransition, StateTree,
    TransitionRule,
};
pub use snapshot::{Snapshot, SnapshotError};
