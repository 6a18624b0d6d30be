//! Core `State` trait and the identity handle for tree nodes.
//!
//! A state is one node of a hierarchical state tree. Concrete states override
//! the lifecycle hooks to mutate the caller's driving context, and optionally
//! the transition hook to request a move to another state in the same tree.

use std::fmt;

/// Opaque handle to a state inside a [`StateTree`](crate::core::StateTree).
///
/// Ids are minted by [`StateMachineBuilder`](crate::builder::StateMachineBuilder)
/// in construction order and index into the arena that owns every state. They
/// are only meaningful for the tree that minted them; handing a foreign id to
/// a machine is a configuration error surfaced as
/// [`MachineError::UnknownState`](crate::core::MachineError::UnknownState).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the hierarchical state tree.
///
/// The machine drives the lifecycle: `on_enter` when the state joins the
/// active path, `on_update` once per tick while it is the active leaf, and
/// `on_exit` when it leaves the active path. All hooks receive the
/// caller-owned driving context `C` (input flags, physics results, whatever
/// the embedding supplies); the machine never stores or copies it.
///
/// `transition` is polled on the active leaf at the top of each tick, before
/// `on_update`. Returning a target pre-empts `on_update` for that tick: a
/// state that decides to leave does not also run its steady-state logic.
/// Declarative alternatives to overriding `transition` can be attached with
/// [`StateMachineBuilder::transition`](crate::builder::StateMachineBuilder::transition).
///
/// # Example
///
/// ```rust
/// use stratum::State;
///
/// struct Ctx {
///     elapsed: f32,
/// }
///
/// struct Warmup;
///
/// impl State<Ctx> for Warmup {
///     fn name(&self) -> &str {
///         "Warmup"
///     }
///
///     fn on_enter(&mut self, ctx: &mut Ctx) {
///         ctx.elapsed = 0.0;
///     }
///
///     fn on_update(&mut self, ctx: &mut Ctx, dt: f32) {
///         ctx.elapsed += dt;
///     }
/// }
/// ```
pub trait State<C>: Send {
    /// State name for logging and diagnostics.
    fn name(&self) -> &str;

    /// Called when this state joins the active path.
    fn on_enter(&mut self, _ctx: &mut C) {}

    /// Called once per tick while this state is the active leaf, with the
    /// elapsed time in seconds since the previous tick.
    fn on_update(&mut self, _ctx: &mut C, _dt: f32) {}

    /// Called when this state leaves the active path.
    ///
    /// Must not assume anything `on_enter` set up in the context is still
    /// present.
    fn on_exit(&mut self, _ctx: &mut C) {}

    /// Transition hook, polled on the active leaf before `on_update`.
    ///
    /// The default implementation never transitions. The target may be any
    /// state in the same tree; the machine performs the minimal exit/enter
    /// walk between the two.
    fn transition(&self, _ctx: &C) -> Option<StateId> {
        None
    }
}
