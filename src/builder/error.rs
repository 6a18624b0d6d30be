//! Build errors for tree and machine construction.

use thiserror::Error;

/// Errors raised while constructing a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Root state not specified. Call .root(state) before .build()")]
    MissingRoot,

    #[error("Root state already specified. A tree has exactly one root")]
    DuplicateRoot,

    #[error("Unknown parent state. Add a parent before adding its children")]
    UnknownParent,

    #[error("Transition endpoint does not belong to this tree")]
    UnknownEndpoint,

    #[error("Transition from '{state}' to itself would never fire")]
    SelfTransition { state: String },
}
