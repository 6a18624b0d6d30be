//! Transition history tracking.
//!
//! Every committed transition is recorded by leaf name, tick, and wall-clock
//! timestamp. The log is immutable: `record` returns a new history with the
//! transition appended, which keeps snapshots of earlier histories valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition between active leaves.
///
/// States are identified by name because the tree owns them as trait
/// objects; the record is a diagnostic view, not a handle back into the
/// tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Name of the leaf that was active before the transition.
    pub from: String,
    /// Name of the leaf that became active.
    pub to: String,
    /// When the transition was committed.
    pub timestamp: DateTime<Utc>,
    /// The machine tick on which the transition was committed. Tick 0 means
    /// the transition was forced before the first update.
    pub tick: u64,
}

/// Ordered, immutable log of committed transitions.
///
/// # Example
///
/// ```rust
/// use stratum::StateHistory;
/// use stratum::StateTransition;
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(StateTransition {
///     from: "Idle".to_string(),
///     to: "Move".to_string(),
///     timestamp: Utc::now(),
///     tick: 1,
/// });
///
/// assert_eq!(history.leaf_path(), vec!["Idle", "Move"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// All recorded transitions, in commit order.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// The sequence of active-leaf names: the first transition's origin,
    /// then the destination of each transition. Empty if nothing was
    /// recorded.
    pub fn leaf_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Wall-clock span from the first to the last recorded transition, or
    /// `None` if the log is empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: &str, to: &str, tick: u64) -> StateTransition {
        StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
            tick,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.transitions().is_empty());
        assert!(history.leaf_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let recorded = history.record(transition("Idle", "Move", 1));

        assert!(history.transitions().is_empty());
        assert_eq!(recorded.transitions().len(), 1);
    }

    #[test]
    fn leaf_path_chains_transitions() {
        let history = StateHistory::new()
            .record(transition("Idle", "Move", 1))
            .record(transition("Move", "Airborne", 4))
            .record(transition("Airborne", "Idle", 9));

        assert_eq!(
            history.leaf_path(),
            vec!["Idle", "Move", "Airborne", "Idle"]
        );
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                from: "Idle".to_string(),
                to: "Move".to_string(),
                timestamp: start,
                tick: 1,
            })
            .record(StateTransition {
                from: "Move".to_string(),
                to: "Idle".to_string(),
                timestamp: start + chrono::Duration::milliseconds(250),
                tick: 2,
            });

        assert_eq!(history.duration().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn history_round_trips_through_json() {
        let history = StateHistory::new().record(transition("Idle", "Move", 1));

        let json = serde_json::to_string(&history).unwrap();
        let decoded: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.transitions(), history.transitions());
    }
}
