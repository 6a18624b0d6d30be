//! The state machine driver.
//!
//! Owns the tree, drives the per-tick update of the active leaf, and applies
//! transitions by exiting up to the lowest common ancestor and entering down
//! to the target.

use crate::core::error::MachineError;
use crate::core::history::{StateHistory, StateTransition};
use crate::core::state::StateId;
use crate::core::tree::StateTree;
use chrono::Utc;
use log::{debug, trace};

/// Machine lifecycle. Kept explicit so starting is not hidden behind a
/// mutable flag check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    NotStarted,
    Running,
    Faulted,
}

/// A hierarchical state machine over a caller-owned driving context `C`.
///
/// The machine is single-threaded and poll-driven: the owning context calls
/// [`update`](StateMachine::update) exactly once per logical tick, and every
/// operation runs synchronously to completion. At most one transition is
/// committed per tick; a freshly entered state is not polled again until the
/// next tick, so misconfigured cyclic transition graphs advance one hop per
/// tick instead of looping forever.
///
/// # Example
///
/// ```rust
/// use stratum::{State, StateMachineBuilder};
///
/// struct Ctx {
///     busy: bool,
/// }
///
/// struct App;
/// impl State<Ctx> for App {
///     fn name(&self) -> &str {
///         "App"
///     }
/// }
///
/// struct Idle;
/// impl State<Ctx> for Idle {
///     fn name(&self) -> &str {
///         "Idle"
///     }
/// }
///
/// struct Working;
/// impl State<Ctx> for Working {
///     fn name(&self) -> &str {
///         "Working"
///     }
/// }
///
/// let mut builder = StateMachineBuilder::new();
/// let app = builder.root(App).unwrap();
/// let idle = builder.child(app, Idle).unwrap();
/// let working = builder.child(app, Working).unwrap();
/// builder.transition(app, idle, |_: &Ctx| true).unwrap();
/// builder.transition(idle, working, |ctx: &Ctx| ctx.busy).unwrap();
/// builder.transition(working, idle, |ctx: &Ctx| !ctx.busy).unwrap();
/// let mut machine = builder.build().unwrap();
///
/// let mut ctx = Ctx { busy: false };
/// machine.update(&mut ctx, 0.016).unwrap(); // lazy start, App -> Idle
/// assert_eq!(machine.current(), idle);
///
/// ctx.busy = true;
/// machine.update(&mut ctx, 0.016).unwrap();
/// assert_eq!(machine.current(), working);
/// assert_eq!(machine.previous(), Some(idle));
/// ```
pub struct StateMachine<C> {
    tree: StateTree<C>,
    current: StateId,
    previous: Option<StateId>,
    phase: Phase,
    history: StateHistory,
    tick: u64,
}

impl<C> StateMachine<C> {
    /// Create a machine over a built tree. The machine starts lazily on the
    /// first [`update`](StateMachine::update), or explicitly via
    /// [`start`](StateMachine::start).
    pub fn new(tree: StateTree<C>) -> Self {
        let root = tree.root();
        Self {
            tree,
            current: root,
            previous: None,
            phase: Phase::NotStarted,
            history: StateHistory::new(),
            tick: 0,
        }
    }

    /// Start the machine: the root becomes current and is entered.
    ///
    /// Only the root is entered; descending to an initial leaf is driven by
    /// the root's own transition on the first ticks. Starting an already
    /// running machine is an error.
    pub fn start(&mut self, ctx: &mut C) -> Result<(), MachineError> {
        match self.phase {
            Phase::Faulted => return Err(MachineError::Faulted),
            Phase::Running => return Err(MachineError::AlreadyStarted),
            Phase::NotStarted => {}
        }
        let root = self.tree.root();
        self.current = root;
        if let Err(err) = self.enter(root, ctx) {
            self.phase = Phase::Faulted;
            return Err(err);
        }
        self.phase = Phase::Running;
        debug!("machine started at '{}'", self.tree.name(root)?);
        Ok(())
    }

    /// Drive one tick. `dt` is the elapsed time in seconds since the
    /// previous tick.
    ///
    /// Starts the machine if it has not started yet, then polls the active
    /// leaf for a transition: the virtual [`State::transition`] hook first,
    /// then its declared rules in order. A produced target is applied
    /// immediately and pre-empts `on_update` for this tick; otherwise the
    /// leaf's `on_update` runs.
    ///
    /// [`State::transition`]: crate::core::State::transition
    pub fn update(&mut self, ctx: &mut C, dt: f32) -> Result<(), MachineError> {
        match self.phase {
            Phase::Faulted => return Err(MachineError::Faulted),
            Phase::NotStarted => self.start(ctx)?,
            Phase::Running => {}
        }
        self.tick += 1;

        let current = self.current;
        let target = {
            let node = self.tree.node(current)?;
            if !node.ready {
                // Current state was forced off the active path; nothing to run.
                return Ok(());
            }
            let ctx_ref: &C = ctx;
            node.behavior.transition(ctx_ref).or_else(|| {
                node.rules
                    .iter()
                    .find(|rule| rule.can_fire(ctx_ref))
                    .map(|rule| rule.target)
            })
        };

        match target {
            Some(to) => {
                trace!("tick {}: leaf {} requested a transition", self.tick, current);
                self.change_state(current, to, ctx)
            }
            None => {
                self.tree.node_mut(current)?.behavior.on_update(ctx, dt);
                Ok(())
            }
        }
    }

    /// Move the active leaf from `from` to `to`.
    ///
    /// A no-op when `from == to`. Otherwise exits every state on the path
    /// from `from` up to (excluding) the lowest common ancestor, leaf to
    /// ancestor, then enters every state from (excluding) the LCA down to
    /// `to`, ancestor to leaf. [`previous`](StateMachine::previous) is set
    /// from the machine's own current state, which equals `from` in the
    /// ordinary leaf-initiated case.
    ///
    /// Any error flags the machine as faulted, because the active-path
    /// bookkeeping may be mid-transition; see
    /// [`reset`](StateMachine::reset).
    pub fn change_state(
        &mut self,
        from: StateId,
        to: StateId,
        ctx: &mut C,
    ) -> Result<(), MachineError> {
        if self.phase == Phase::Faulted {
            return Err(MachineError::Faulted);
        }
        if from == to {
            return Ok(());
        }
        if let Err(err) = self.apply_transition(from, to, ctx) {
            self.phase = Phase::Faulted;
            return Err(err);
        }
        Ok(())
    }

    fn apply_transition(
        &mut self,
        from: StateId,
        to: StateId,
        ctx: &mut C,
    ) -> Result<(), MachineError> {
        let from_name = self.tree.name(from)?.to_string();
        let to_name = self.tree.name(to)?.to_string();

        let lca = self
            .tree
            .lca(from, to)?
            .ok_or_else(|| MachineError::NoCommonAncestor {
                a: from_name.clone(),
                b: to_name.clone(),
            })?;

        // Exit walk: from -> lca exclusive, leaf to ancestor.
        let mut cursor = from;
        while cursor != lca {
            self.exit(cursor, ctx)?;
            cursor = self
                .tree
                .parent(cursor)?
                .ok_or_else(|| MachineError::NoCommonAncestor {
                    a: from_name.clone(),
                    b: to_name.clone(),
                })?;
        }

        // Enter walk: lca -> to exclusive, collected upward then reversed so
        // each state is entered only after its parent.
        let mut descending = Vec::new();
        let mut cursor = to;
        while cursor != lca {
            descending.push(cursor);
            cursor = self
                .tree
                .parent(cursor)?
                .ok_or_else(|| MachineError::NoCommonAncestor {
                    a: from_name.clone(),
                    b: to_name.clone(),
                })?;
        }
        for id in descending.into_iter().rev() {
            self.enter(id, ctx)?;
        }

        let old = self.current;
        self.previous = Some(old);
        self.current = to;
        self.history = self.history.record(StateTransition {
            from: self.tree.name(old)?.to_string(),
            to: to_name.clone(),
            timestamp: Utc::now(),
            tick: self.tick,
        });
        debug!(
            "transition '{}' -> '{}' (pivot '{}')",
            from_name,
            to_name,
            self.tree.name(lca)?
        );
        Ok(())
    }

    fn enter(&mut self, id: StateId, ctx: &mut C) -> Result<(), MachineError> {
        if self.tree.node(id)?.ready {
            return Err(MachineError::AlreadyEntered {
                state: self.tree.name(id)?.to_string(),
            });
        }
        if let Some(parent) = self.tree.node(id)?.parent {
            self.tree.node_mut(parent)?.active_child = Some(id);
        }
        debug!("enter '{}'", self.tree.name(id)?);
        let node = self.tree.node_mut(id)?;
        node.behavior.on_enter(ctx);
        node.ready = true;
        Ok(())
    }

    fn exit(&mut self, id: StateId, ctx: &mut C) -> Result<(), MachineError> {
        if !self.tree.node(id)?.ready {
            return Err(MachineError::NotEntered {
                state: self.tree.name(id)?.to_string(),
            });
        }
        debug!("exit '{}'", self.tree.name(id)?);
        let node = self.tree.node_mut(id)?;
        node.ready = false;
        node.behavior.on_exit(ctx);
        node.active_child = None;
        if let Some(parent) = self.tree.node(id)?.parent {
            let parent_node = self.tree.node_mut(parent)?;
            if parent_node.active_child == Some(id) {
                parent_node.active_child = None;
            }
        }
        Ok(())
    }

    /// Clear the fault and all active-path bookkeeping, returning the
    /// machine to its not-started phase.
    ///
    /// No exit hooks run: after a fault the tree may be mid-transition
    /// inconsistent, so flags are dropped wholesale. History and the tick
    /// counter are retained for post-mortem inspection.
    pub fn reset(&mut self) {
        self.tree.clear_activity();
        self.current = self.tree.root();
        self.previous = None;
        self.phase = Phase::NotStarted;
        debug!("machine reset");
    }

    /// The tree's root state.
    pub fn root(&self) -> StateId {
        self.tree.root()
    }

    /// The currently active leaf, or the root before the first transition.
    pub fn current(&self) -> StateId {
        self.current
    }

    /// The leaf that was active immediately before the last committed
    /// transition.
    pub fn previous(&self) -> Option<StateId> {
        self.previous
    }

    /// Read-only access to the tree for traversal and diagnostics.
    pub fn tree(&self) -> &StateTree<C> {
        &self.tree
    }

    /// Name of a state, or `None` for a foreign id.
    pub fn name_of(&self, id: StateId) -> Option<&str> {
        self.tree.name(id).ok()
    }

    /// The active path from root to the active leaf. Empty before start.
    pub fn active_path(&self) -> Vec<StateId> {
        self.tree.active_path()
    }

    /// The active path as a `/`-joined string of state names, for logging.
    pub fn active_path_string(&self) -> String {
        self.active_path()
            .into_iter()
            .filter_map(|id| self.name_of(id))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Whether the machine has started (lazily or explicitly).
    pub fn is_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    /// Whether the machine refused further updates after an invariant
    /// violation.
    pub fn is_faulted(&self) -> bool {
        self.phase == Phase::Faulted
    }

    /// Number of completed [`update`](StateMachine::update) calls.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Log of committed transitions.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;
    use crate::core::state::State;

    type Log = Vec<String>;

    struct Tracked {
        name: &'static str,
    }

    impl Tracked {
        fn new(name: &'static str) -> Self {
            Self { name }
        }
    }

    impl State<Log> for Tracked {
        fn name(&self) -> &str {
            self.name
        }

        fn on_enter(&mut self, log: &mut Log) {
            log.push(format!("enter:{}", self.name));
        }

        fn on_update(&mut self, log: &mut Log, _dt: f32) {
            log.push(format!("update:{}", self.name));
        }

        fn on_exit(&mut self, log: &mut Log) {
            log.push(format!("exit:{}", self.name));
        }
    }

    /// Root -> Grounded -> {Idle, Move}, Root -> Airborne. No rules; tests
    /// drive transitions explicitly.
    fn character_machine() -> (StateMachine<Log>, [StateId; 5]) {
        let mut builder = StateMachineBuilder::new();
        let root = builder.root(Tracked::new("Root")).unwrap();
        let grounded = builder.child(root, Tracked::new("Grounded")).unwrap();
        let idle = builder.child(grounded, Tracked::new("Idle")).unwrap();
        let move_ = builder.child(grounded, Tracked::new("Move")).unwrap();
        let airborne = builder.child(root, Tracked::new("Airborne")).unwrap();
        let machine = builder.build().unwrap();
        (machine, [root, grounded, idle, move_, airborne])
    }

    #[test]
    fn lazy_start_enters_root_only() {
        let (mut machine, [root, ..]) = character_machine();
        let mut log = Log::new();

        assert!(!machine.is_started());
        machine.update(&mut log, 0.016).unwrap();

        assert!(machine.is_started());
        assert_eq!(machine.current(), root);
        // Root is entered, then runs its first update in the same tick.
        assert_eq!(log, vec!["enter:Root", "update:Root"]);
    }

    #[test]
    fn explicit_start_is_rejected_when_running() {
        let (mut machine, _) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        let err = machine.start(&mut log).unwrap_err();

        assert!(matches!(err, MachineError::AlreadyStarted));
        assert!(!machine.is_faulted());
    }

    #[test]
    fn transition_between_siblings_pivots_on_their_parent() {
        let (mut machine, [_, _, idle, move_, _]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();
        log.clear();

        machine.change_state(idle, move_, &mut log).unwrap();

        // Grounded is neither exited nor re-entered.
        assert_eq!(log, vec!["exit:Idle", "enter:Move"]);
        assert_eq!(machine.current(), move_);
        assert_eq!(machine.previous(), Some(idle));
    }

    #[test]
    fn cross_branch_transition_exits_up_to_the_root() {
        let (mut machine, [_, _, _, move_, airborne]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), move_, &mut log).unwrap();
        log.clear();

        machine.change_state(move_, airborne, &mut log).unwrap();

        assert_eq!(log, vec!["exit:Move", "exit:Grounded", "enter:Airborne"]);
        assert_eq!(machine.current(), airborne);
    }

    #[test]
    fn returning_to_an_exited_subtree_reenters_it() {
        let (mut machine, [_, _, idle, _, airborne]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), airborne, &mut log).unwrap();
        log.clear();

        machine.change_state(airborne, idle, &mut log).unwrap();

        assert_eq!(log, vec!["exit:Airborne", "enter:Grounded", "enter:Idle"]);
    }

    #[test]
    fn same_state_change_is_a_noop() {
        let (mut machine, [_, _, idle, ..]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();
        let previous = machine.previous();
        log.clear();

        machine.change_state(idle, idle, &mut log).unwrap();

        assert!(log.is_empty());
        assert_eq!(machine.current(), idle);
        assert_eq!(machine.previous(), previous);
        assert_eq!(machine.history().transitions().len(), 1);
    }

    #[test]
    fn transition_to_descendant_only_enters() {
        let (mut machine, [root, grounded, idle, ..]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        log.clear();

        machine.change_state(root, idle, &mut log).unwrap();

        assert_eq!(log, vec!["enter:Grounded", "enter:Idle"]);
        assert_eq!(machine.active_path(), vec![root, grounded, idle]);
    }

    #[test]
    fn transition_to_ancestor_only_exits() {
        let (mut machine, [root, grounded, idle, ..]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(root, idle, &mut log).unwrap();
        log.clear();

        machine.change_state(idle, grounded, &mut log).unwrap();

        assert_eq!(log, vec!["exit:Idle"]);
        assert_eq!(machine.current(), grounded);
        assert_eq!(machine.active_path(), vec![root, grounded]);
    }

    #[test]
    fn exiting_a_state_that_is_not_entered_faults_the_machine() {
        let (mut machine, [_, _, idle, move_, _]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();

        // Move was never entered, so using it as the transition source is a
        // bookkeeping violation.
        let err = machine.change_state(move_, idle, &mut log).unwrap_err();
        assert!(matches!(err, MachineError::NotEntered { .. }));
        assert!(machine.is_faulted());

        let err = machine.update(&mut log, 0.016).unwrap_err();
        assert!(matches!(err, MachineError::Faulted));
    }

    #[test]
    fn entering_an_already_entered_state_faults_the_machine() {
        let (mut machine, [_, grounded, idle, ..]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();

        // Forcing a change whose enter walk lands on the already-active
        // Idle violates the enter-once bookkeeping.
        let err = machine.change_state(grounded, idle, &mut log).unwrap_err();
        assert!(matches!(err, MachineError::AlreadyEntered { .. }));
        assert!(machine.is_faulted());
    }

    #[test]
    fn reset_clears_the_fault_and_allows_a_restart() {
        let (mut machine, [root, _, idle, move_, _]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();
        machine.change_state(move_, idle, &mut log).unwrap_err();
        assert!(machine.is_faulted());

        machine.reset();
        assert!(!machine.is_started());
        assert!(machine.active_path().is_empty());

        log.clear();
        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), root);
        assert_eq!(log, vec!["enter:Root", "update:Root"]);
    }

    #[test]
    fn history_records_leaf_to_leaf_moves() {
        let (mut machine, [_, _, idle, _, airborne]) = character_machine();
        let mut log = Log::new();

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();
        machine.change_state(idle, airborne, &mut log).unwrap();

        assert_eq!(
            machine.history().leaf_path(),
            vec!["Root", "Idle", "Airborne"]
        );
    }

    #[test]
    fn active_path_string_joins_names() {
        let (mut machine, [_, _, idle, ..]) = character_machine();
        let mut log = Log::new();

        assert_eq!(machine.active_path_string(), "");

        machine.start(&mut log).unwrap();
        machine.change_state(machine.current(), idle, &mut log).unwrap();

        assert_eq!(machine.active_path_string(), "Root/Grounded/Idle");
    }

    struct Restless {
        name: &'static str,
        target: Option<StateId>,
    }

    impl State<Log> for Restless {
        fn name(&self) -> &str {
            self.name
        }

        fn on_update(&mut self, log: &mut Log, _dt: f32) {
            log.push(format!("update:{}", self.name));
        }

        fn transition(&self, _log: &Log) -> Option<StateId> {
            self.target
        }
    }

    #[test]
    fn transitions_preempt_update_for_that_tick() {
        let mut builder = StateMachineBuilder::new();
        let root = builder
            .root(Restless {
                name: "Root",
                target: None,
            })
            .unwrap();
        // Built after the root, so it can hold the root id as its way back.
        let child = builder
            .child(
                root,
                Restless {
                    name: "Child",
                    target: Some(root),
                },
            )
            .unwrap();
        builder.transition(root, child, |_: &Log| true).unwrap();
        let mut machine = builder.build().unwrap();

        let mut log = Log::new();

        // Tick 1: the declared rule fires, so Root never runs its update.
        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), child);
        assert!(!log.contains(&"update:Root".to_string()));

        // Tick 2: the virtual hook fires, so Child never runs its update.
        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), root);
        assert!(!log.contains(&"update:Child".to_string()));
    }

    #[test]
    fn cyclic_rules_advance_one_hop_per_tick() {
        let mut builder = StateMachineBuilder::new();
        let root = builder.root(Tracked::new("Root")).unwrap();
        let ping = builder.child(root, Tracked::new("Ping")).unwrap();
        let pong = builder.child(root, Tracked::new("Pong")).unwrap();
        builder.transition(root, ping, |_: &Log| true).unwrap();
        builder.transition(ping, pong, |_: &Log| true).unwrap();
        builder.transition(pong, ping, |_: &Log| true).unwrap();
        let mut machine = builder.build().unwrap();

        let mut log = Log::new();
        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), ping);

        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), pong);

        machine.update(&mut log, 0.016).unwrap();
        assert_eq!(machine.current(), ping);

        // Exactly one committed transition per tick.
        assert_eq!(machine.history().transitions().len() as u64, machine.tick());
    }
}
