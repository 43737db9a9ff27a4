use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WatchError;

/// OS-assigned process identifier. The OS reuses these after a process
/// exits, so a `ProcessId` alone never identifies a logical process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable metadata captured the moment a process is first observed.
///
/// `start_time` is the fingerprint that distinguishes the logical process
/// from a later occupant of the same recycled PID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: ProcessId,
    pub name: String,
    pub command_line: String,
    pub start_time: u64,
}

impl ProcessSnapshot {
    /// Stable human-readable description; safe to render after the process
    /// has terminated.
    pub fn describe(&self) -> String {
        format!("PID {} [{}]: {}", self.pid, self.name, self.command_line)
    }
}

/// Whether the logical process behind a snapshot is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// The PID is gone, or it now belongs to a different process
    /// (start time mismatch). Both mean the watched process ended.
    Terminated,
}

/// OS process inspection surface consumed by the watcher.
///
/// Implementations must be cheap to query repeatedly; every poll tick calls
/// `liveness` once per watched process and `enumerate` once when discovery
/// is enabled.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// Capture a snapshot of the process currently holding `pid`.
    ///
    /// Fails with [`WatchError::ProcessNotFound`] when no such process
    /// exists at call time.
    async fn snapshot(&self, pid: ProcessId) -> Result<ProcessSnapshot, WatchError>;

    /// Re-check whether the process described by `snapshot` is still the
    /// one holding its PID. Never fails: a missing process is the expected
    /// terminal outcome, not an error.
    async fn liveness(&self, snapshot: &ProcessSnapshot) -> Liveness;

    /// All currently running processes as (pid, command line) pairs.
    async fn enumerate(&self) -> Vec<(ProcessId, String)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_contains_identity_and_command() {
        let snapshot = ProcessSnapshot {
            pid: ProcessId(4242),
            name: "worker".to_string(),
            command_line: "/usr/bin/worker --queue jobs".to_string(),
            start_time: 1_700_000_000,
        };

        let info = snapshot.describe();
        assert!(info.contains("4242"));
        assert!(info.contains("worker"));
        assert!(info.contains("--queue jobs"));
    }

    #[test]
    fn test_process_id_display() {
        assert_eq!(ProcessId(17).to_string(), "17");
        assert_eq!(ProcessId::from(9).0, 9);
    }
}
