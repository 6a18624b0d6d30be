//! Builder API for ergonomic machine construction.
//!
//! The builder wires the tree (root, children, declared transition rules),
//! validates the configuration up front, and hands back the machine together
//! with the [`StateId`](crate::core::StateId) handles concrete states use to
//! target each other.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
