//! Guard predicates for controlling declared transitions.
//!
//! Guards are pure boolean functions over the driving context. A declared
//! transition rule fires when its guard returns `true` while its source state
//! is the active leaf.

/// Pure predicate over the driving context that decides whether a declared
/// transition may fire.
///
/// Guards must be deterministic for a given context value and must not
/// mutate anything; they are evaluated once per tick on the active leaf.
///
/// # Example
///
/// ```rust
/// use stratum::Guard;
///
/// struct Input {
///     move_axis: f32,
/// }
///
/// let wants_to_move = Guard::new(|input: &Input| input.move_axis.abs() > 0.0);
///
/// assert!(wants_to_move.check(&Input { move_axis: 1.0 }));
/// assert!(!wants_to_move.check(&Input { move_axis: 0.0 }));
/// ```
pub struct Guard<C> {
    predicate: Box<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate against the current context.
    pub fn check(&self, ctx: &C) -> bool {
        (self.predicate)(ctx)
    }
}
