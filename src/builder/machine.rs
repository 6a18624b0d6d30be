//! Builder for constructing hierarchical state machines.

use crate::builder::error::BuildError;
use crate::core::tree::Node;
use crate::core::{Guard, State, StateId, StateMachine, StateTree, TransitionRule};

/// Builder that wires a state tree and produces the machine that drives it.
///
/// The builder is the only way to mint [`StateId`]s: the root first, then
/// children in any order as long as each parent already exists. Parent links
/// are final once a state is added. Declared transition rules are attached
/// after their endpoints exist, which is how two siblings can target each
/// other.
///
/// # Example
///
/// ```rust
/// use stratum::{State, StateMachineBuilder};
///
/// struct Door;
/// impl State<bool> for Door {
///     fn name(&self) -> &str {
///         "Door"
///     }
/// }
///
/// struct Open;
/// impl State<bool> for Open {
///     fn name(&self) -> &str {
///         "Open"
///     }
/// }
///
/// struct Closed;
/// impl State<bool> for Closed {
///     fn name(&self) -> &str {
///         "Closed"
///     }
/// }
///
/// let mut builder = StateMachineBuilder::new();
/// let door = builder.root(Door).unwrap();
/// let open = builder.child(door, Open).unwrap();
/// let closed = builder.child(door, Closed).unwrap();
/// builder.transition(door, closed, |_: &bool| true).unwrap();
/// builder.transition(closed, open, |want_open: &bool| *want_open).unwrap();
/// builder.transition(open, closed, |want_open: &bool| !*want_open).unwrap();
///
/// let machine = builder.build().unwrap();
/// assert_eq!(machine.tree().len(), 3);
/// ```
pub struct StateMachineBuilder<C> {
    nodes: Vec<Node<C>>,
}

impl<C> StateMachineBuilder<C> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add the root state. Must be called exactly once, before any child.
    pub fn root<S>(&mut self, state: S) -> Result<StateId, BuildError>
    where
        S: State<C> + 'static,
    {
        if !self.nodes.is_empty() {
            return Err(BuildError::DuplicateRoot);
        }
        self.nodes.push(Node::new(Box::new(state), None));
        Ok(StateId(0))
    }

    /// Add a state under `parent`. The parent link never changes afterward.
    pub fn child<S>(&mut self, parent: StateId, state: S) -> Result<StateId, BuildError>
    where
        S: State<C> + 'static,
    {
        if parent.index() >= self.nodes.len() {
            return Err(BuildError::UnknownParent);
        }
        let id = StateId(self.nodes.len());
        self.nodes.push(Node::new(Box::new(state), Some(parent)));
        Ok(id)
    }

    /// Declare a guarded transition from `from` to `to`.
    ///
    /// Rules are polled in declaration order while `from` is the active
    /// leaf, after the state's own
    /// [`State::transition`](crate::core::State::transition) hook. A rule
    /// from a state to itself is rejected: the machine treats same-state
    /// changes as no-ops, so it could never fire.
    pub fn transition<F>(
        &mut self,
        from: StateId,
        to: StateId,
        guard: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        if from.index() >= self.nodes.len() || to.index() >= self.nodes.len() {
            return Err(BuildError::UnknownEndpoint);
        }
        if from == to {
            return Err(BuildError::SelfTransition {
                state: self.nodes[from.index()].behavior.name().to_string(),
            });
        }
        self.nodes[from.index()]
            .rules
            .push(TransitionRule::new(to, Guard::new(guard)));
        Ok(self)
    }

    /// Build the machine. Fails if no root was added.
    pub fn build(self) -> Result<StateMachine<C>, BuildError> {
        if self.nodes.is_empty() {
            return Err(BuildError::MissingRoot);
        }
        Ok(StateMachine::new(StateTree::from_nodes(self.nodes)))
    }
}

impl<C> Default for StateMachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
