//! The state tree arena.
//!
//! The tree owns every state behind an arena of nodes; all cross-references
//! (parent links, active-child links, transition targets) are [`StateId`]
//! indexes into that arena. Parent links are fixed when the tree is built;
//! only the active path (`active_child` + `ready` flags) changes at runtime.

use crate::core::error::MachineError;
use crate::core::state::{State, StateId};
use crate::core::transition::TransitionRule;

pub(crate) struct Node<C> {
    pub(crate) behavior: Box<dyn State<C>>,
    pub(crate) parent: Option<StateId>,
    pub(crate) active_child: Option<StateId>,
    pub(crate) ready: bool,
    pub(crate) rules: Vec<TransitionRule<C>>,
}

impl<C> Node<C> {
    pub(crate) fn new(behavior: Box<dyn State<C>>, parent: Option<StateId>) -> Self {
        Self {
            behavior,
            parent,
            active_child: None,
            ready: false,
            rules: Vec::new(),
        }
    }
}

/// A rooted tree of states with runtime active-path bookkeeping.
///
/// Built once by [`StateMachineBuilder`](crate::builder::StateMachineBuilder)
/// and owned by the machine for its whole life. The traversal utilities here
/// are read-only; all mutation goes through the machine.
pub struct StateTree<C> {
    nodes: Vec<Node<C>>,
}

impl<C> StateTree<C> {
    pub(crate) fn from_nodes(nodes: Vec<Node<C>>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    /// The root state. The builder guarantees it is the first node.
    pub fn root(&self) -> StateId {
        StateId(0)
    }

    /// Number of states in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A built tree always has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` was minted for this tree.
    pub fn contains(&self, id: StateId) -> bool {
        id.index() < self.nodes.len()
    }

    pub(crate) fn node(&self, id: StateId) -> Result<&Node<C>, MachineError> {
        self.nodes
            .get(id.index())
            .ok_or(MachineError::UnknownState(id))
    }

    pub(crate) fn node_mut(&mut self, id: StateId) -> Result<&mut Node<C>, MachineError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(MachineError::UnknownState(id))
    }

    /// Name of the state, as reported by its [`State::name`] hook.
    pub fn name(&self, id: StateId) -> Result<&str, MachineError> {
        Ok(self.node(id)?.behavior.name())
    }

    /// Parent of `id`, or `None` for the root.
    pub fn parent(&self, id: StateId) -> Result<Option<StateId>, MachineError> {
        Ok(self.node(id)?.parent)
    }

    /// Whether `id` is currently on the active path.
    pub fn is_ready(&self, id: StateId) -> Result<bool, MachineError> {
        Ok(self.node(id)?.ready)
    }

    /// The active child of `id`, set only while `id` is an ancestor of the
    /// active leaf.
    pub fn active_child(&self, id: StateId) -> Result<Option<StateId>, MachineError> {
        Ok(self.node(id)?.active_child)
    }

    /// Path from `id` up to the root, inclusive on both ends.
    pub fn path_to_root(&self, id: StateId) -> Result<Vec<StateId>, MachineError> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(state) = cursor {
            path.push(state);
            cursor = self.parent(state)?;
        }
        Ok(path)
    }

    /// Lowest common ancestor of `a` and `b`: the deepest state that is an
    /// ancestor of (or equal to) both.
    ///
    /// Returns `Ok(None)` only if the two states share no ancestor, which
    /// cannot happen for ids minted by the same builder; the machine treats
    /// that as a fatal configuration error.
    pub fn lca(&self, a: StateId, b: StateId) -> Result<Option<StateId>, MachineError> {
        let ancestors_of_a = self.path_to_root(a)?;

        let mut cursor = Some(b);
        while let Some(state) = cursor {
            if ancestors_of_a.contains(&state) {
                return Ok(Some(state));
            }
            cursor = self.parent(state)?;
        }
        Ok(None)
    }

    /// Drop every `ready`/`active_child` flag. Used by the machine's reset;
    /// hooks are deliberately not run.
    pub(crate) fn clear_activity(&mut self) {
        for node in &mut self.nodes {
            node.ready = false;
            node.active_child = None;
        }
    }

    /// The active path from the root to the active leaf, connected via
    /// `active_child` links. Empty before the machine starts.
    pub fn active_path(&self) -> Vec<StateId> {
        let mut path = Vec::new();
        let mut cursor = self.root();

        if !self.nodes[cursor.index()].ready {
            return path;
        }
        loop {
            path.push(cursor);
            match self.nodes[cursor.index()].active_child {
                Some(child) if self.nodes[child.index()].ready => cursor = child,
                _ => return path,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl State<()> for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    /// Root -> Grounded -> {Idle, Move}, Root -> Airborne.
    fn character_tree() -> (StateTree<()>, [StateId; 5]) {
        let nodes = vec![
            Node::new(Box::new(Named("Root")), None),
            Node::new(Box::new(Named("Grounded")), Some(StateId(0))),
            Node::new(Box::new(Named("Idle")), Some(StateId(1))),
            Node::new(Box::new(Named("Move")), Some(StateId(1))),
            Node::new(Box::new(Named("Airborne")), Some(StateId(0))),
        ];
        let ids = [StateId(0), StateId(1), StateId(2), StateId(3), StateId(4)];
        (StateTree::from_nodes(nodes), ids)
    }

    #[test]
    fn lca_of_siblings_is_their_parent() {
        let (tree, [_, grounded, idle, move_, _]) = character_tree();
        assert_eq!(tree.lca(idle, move_).unwrap(), Some(grounded));
    }

    #[test]
    fn lca_across_branches_is_the_root() {
        let (tree, [root, _, idle, _, airborne]) = character_tree();
        assert_eq!(tree.lca(idle, airborne).unwrap(), Some(root));
    }

    #[test]
    fn lca_of_a_state_with_itself_is_itself() {
        let (tree, [_, grounded, ..]) = character_tree();
        assert_eq!(tree.lca(grounded, grounded).unwrap(), Some(grounded));
    }

    #[test]
    fn lca_with_an_ancestor_is_the_ancestor() {
        let (tree, [root, grounded, idle, ..]) = character_tree();
        assert_eq!(tree.lca(idle, grounded).unwrap(), Some(grounded));
        assert_eq!(tree.lca(root, idle).unwrap(), Some(root));
    }

    #[test]
    fn path_to_root_is_leaf_first() {
        let (tree, [root, grounded, idle, ..]) = character_tree();
        assert_eq!(tree.path_to_root(idle).unwrap(), vec![idle, grounded, root]);
        assert_eq!(tree.path_to_root(root).unwrap(), vec![root]);
    }

    #[test]
    fn active_path_is_empty_before_start() {
        let (tree, _) = character_tree();
        assert!(tree.active_path().is_empty());
    }

    #[test]
    fn unknown_id_is_rejected() {
        let (tree, _) = character_tree();
        let foreign = StateId(99);

        assert!(!tree.contains(foreign));
        assert!(matches!(
            tree.name(foreign),
            Err(MachineError::UnknownState(_))
        ));
        assert!(matches!(
            tree.lca(foreign, StateId(0)),
            Err(MachineError::UnknownState(_))
        ));
    }

    #[test]
    fn names_come_from_behaviors() {
        let (tree, [root, _, idle, ..]) = character_tree();
        assert_eq!(tree.name(root).unwrap(), "Root");
        assert_eq!(tree.name(idle).unwrap(), "Idle");
        assert_eq!(tree.len(), 5);
        assert!(!tree.is_empty());
    }
}
