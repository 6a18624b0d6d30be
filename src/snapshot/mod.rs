//! Serializable diagnostic snapshots of a running machine.
//!
//! A snapshot captures the machine's observable position (active path,
//! current/previous leaf, tick, transition history) by state name. It is a
//! read-only view for logging, dashboards, and bug reports; tree states are
//! trait objects and cannot be resumed from a snapshot.

use crate::core::{StateHistory, StateMachine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable view of a machine at one point in time.
///
/// # Example
///
/// ```rust
/// use stratum::{Snapshot, State, StateMachineBuilder};
///
/// struct Named(&'static str);
/// impl State<()> for Named {
///     fn name(&self) -> &str {
///         self.0
///     }
/// }
///
/// let mut builder = StateMachineBuilder::new();
/// let root = builder.root(Named("Root")).unwrap();
/// builder.child(root, Named("Child")).unwrap();
/// let mut machine = builder.build().unwrap();
/// machine.update(&mut (), 0.016).unwrap();
///
/// let snapshot = Snapshot::capture(&machine);
/// assert_eq!(snapshot.current, "Root");
/// let json = snapshot.to_json().unwrap();
/// let decoded = Snapshot::from_json(&json).unwrap();
/// assert_eq!(decoded.active_path, vec!["Root".to_string()]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// When the snapshot was captured
    pub taken_at: DateTime<Utc>,

    /// Number of completed update calls at capture time
    pub tick: u64,

    /// Name of the active leaf
    pub current: String,

    /// Name of the leaf active before the last committed transition
    pub previous: Option<String>,

    /// Names along the active path, root first
    pub active_path: Vec<String>,

    /// Whether the machine was faulted at capture time
    pub faulted: bool,

    /// Complete transition history
    pub history: StateHistory,
}

impl Snapshot {
    /// Capture the observable position of `machine`.
    pub fn capture<C>(machine: &StateMachine<C>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            tick: machine.tick(),
            current: machine
                .name_of(machine.current())
                .unwrap_or("")
                .to_string(),
            previous: machine
                .previous()
                .and_then(|id| machine.name_of(id))
                .map(str::to_string),
            active_path: machine
                .active_path()
                .into_iter()
                .filter_map(|id| machine.name_of(id))
                .map(str::to_string)
                .collect(),
            faulted: machine.is_faulted(),
            history: machine.history().clone(),
        }
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode from JSON, rejecting snapshots from other format versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}
