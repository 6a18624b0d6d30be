//! Core hierarchical state machine types.
//!
//! This module contains the machine itself and everything it is built from:
//! - State definitions via the [`State`] trait and their [`StateId`] handles
//! - Guard predicates and declared transition rules
//! - The tree arena with its traversal utilities (LCA, active path)
//! - The driver with the minimal exit/enter transition algorithm
//! - Immutable transition history

mod error;
mod guard;
mod history;
mod machine;
mod state;
mod transition;
pub(crate) mod tree;

pub use error::MachineError;
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use machine::StateMachine;
pub use state::{State, StateId};
pub use transition::TransitionRule;
pub use tree::StateTree;
