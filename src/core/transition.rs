//! Declared transition rules.
//!
//! A rule couples a target state with a guard predicate. Rules are attached
//! to their source state at build time and polled in declaration order while
//! that state is the active leaf; the first rule whose guard passes wins.
//! States that prefer to decide in code override
//! [`State::transition`](crate::core::State::transition) instead, which is
//! polled before any declared rules.

use crate::core::guard::Guard;
use crate::core::state::StateId;

/// A declared transition out of one state of the tree.
///
/// The source state is implicit: rules live on the node they leave from.
pub struct TransitionRule<C> {
    /// State to move to when the guard passes.
    pub target: StateId,
    /// Predicate over the driving context.
    pub guard: Guard<C>,
}

impl<C> TransitionRule<C> {
    /// Create a rule targeting `target`, gated by `guard`.
    pub fn new(target: StateId, guard: Guard<C>) -> Self {
        Self { target, guard }
    }

    /// Check whether this rule fires for the current context.
    pub fn can_fire(&self, ctx: &C) -> bool {
        self.guard.check(ctx)
    }
}
