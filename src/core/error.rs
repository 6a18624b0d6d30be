//! Machine runtime errors.

use crate::core::state::StateId;
use thiserror::Error;

/// Errors raised while driving a [`StateMachine`](crate::core::StateMachine).
///
/// All of these are configuration or invariant errors: the machine has no
/// transient failure modes. Any of them raised mid-transition leaves the
/// active-path bookkeeping suspect, so the machine faults itself and refuses
/// further updates until [`reset`](crate::core::StateMachine::reset).
#[derive(Debug, Error)]
pub enum MachineError {
    /// The id was not minted by this machine's tree.
    #[error("State {0} does not belong to this tree")]
    UnknownState(StateId),

    /// Attempt to enter a state that is already on the active path.
    #[error("State '{state}' is already entered; it must exit before entering again")]
    AlreadyEntered { state: String },

    /// Attempt to exit a state that is not on the active path.
    #[error("State '{state}' is not entered and cannot exit")]
    NotEntered { state: String },

    /// The two transition endpoints share no ancestor. Unreachable for a
    /// tree built by the builder (a single root is always a common
    /// ancestor), kept as an explicit guard.
    #[error("States '{a}' and '{b}' share no common ancestor")]
    NoCommonAncestor { a: String, b: String },

    /// `start` was called on a machine that is already running.
    #[error("Machine is already started")]
    AlreadyStarted,

    /// The machine faulted on an earlier error and must be reset.
    #[error("Machine is faulted; call reset() before driving it again")]
    Faulted,
}
