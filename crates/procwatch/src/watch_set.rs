use std::collections::HashMap;
use std::sync::Arc;

use procwatch_core::{Liveness, ProcessId, ProcessProbe, ProcessSnapshot, WatchError};

/// A watched process: the snapshot captured when it was first observed,
/// plus the probe used to re-check it against that snapshot.
#[derive(Clone)]
pub struct WatchedProcess {
    snapshot: ProcessSnapshot,
    probe: Arc<dyn ProcessProbe>,
}

impl WatchedProcess {
    fn new(snapshot: ProcessSnapshot, probe: Arc<dyn ProcessProbe>) -> Self {
        Self { snapshot, probe }
    }

    pub fn pid(&self) -> ProcessId {
        self.snapshot.pid
    }

    pub fn snapshot(&self) -> &ProcessSnapshot {
        &self.snapshot
    }

    /// Re-check liveness. Reports `Terminated` both when the PID is gone and
    /// when it has been recycled by an unrelated process.
    pub async fn check(&self) -> Liveness {
        self.probe.liveness(&self.snapshot).await
    }

    /// Human-readable description; safe to call after termination.
    pub fn info(&self) -> String {
        self.snapshot.describe()
    }
}

/// The set of processes currently being watched, keyed by PID.
///
/// Entries are added by resolution and discovery only, removed by the poll
/// step only after a confirmed termination. The scan never mutates the map
/// while iterating it: callers take `handles()` and apply removals after a
/// full pass.
pub struct WatchSet {
    probe: Arc<dyn ProcessProbe>,
    entries: HashMap<ProcessId, WatchedProcess>,
}

impl WatchSet {
    pub fn new(probe: Arc<dyn ProcessProbe>) -> Self {
        Self {
            probe,
            entries: HashMap::new(),
        }
    }

    /// Start watching `pid`. Idempotent: re-adding a watched PID is a no-op
    /// and keeps the original snapshot. Returns whether a new entry was
    /// inserted; propagates [`WatchError::ProcessNotFound`] from resolution.
    pub async fn add(&mut self, pid: ProcessId) -> Result<bool, WatchError> {
        if self.entries.contains_key(&pid) {
            return Ok(false);
        }

        let snapshot = self.probe.snapshot(pid).await?;
        self.entries
            .insert(pid, WatchedProcess::new(snapshot, self.probe.clone()));
        Ok(true)
    }

    /// Stop watching `pid`; no-op when absent.
    pub fn remove(&mut self, pid: ProcessId) -> Option<WatchedProcess> {
        self.entries.remove(&pid)
    }

    pub fn get(&self, pid: ProcessId) -> Option<&WatchedProcess> {
        self.entries.get(&pid)
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.entries.contains_key(&pid)
    }

    /// Current handles, detached from the map so the caller can scan them
    /// while mutating the set afterwards.
    pub fn handles(&self) -> Vec<WatchedProcess> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let probe = Arc::new(FakeProbe::new());
        probe.spawn(100, "worker", "/usr/bin/worker", 1_000);

        let mut set = WatchSet::new(probe);
        assert!(set.add(ProcessId(100)).await.unwrap());
        assert!(!set.add(ProcessId(100)).await.unwrap());
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_add_keeps_original_snapshot() {
        let probe = Arc::new(FakeProbe::new());
        probe.spawn(100, "worker", "/usr/bin/worker", 1_000);

        let mut set = WatchSet::new(probe.clone());
        set.add(ProcessId(100)).await.unwrap();

        // PID recycled between the two add calls; the existing entry wins.
        probe.spawn(100, "other", "/usr/bin/other", 2_000);
        assert!(!set.add(ProcessId(100)).await.unwrap());
        assert_eq!(set.get(ProcessId(100)).unwrap().snapshot().start_time, 1_000);
    }

    #[tokio::test]
    async fn test_add_propagates_process_not_found() {
        let probe = Arc::new(FakeProbe::new());
        let mut set = WatchSet::new(probe);

        match set.add(ProcessId(404)).await {
            Err(WatchError::ProcessNotFound(pid)) => assert_eq!(pid, ProcessId(404)),
            other => panic!("expected ProcessNotFound, got {:?}", other.is_ok()),
        }
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_noop_when_absent() {
        let probe = Arc::new(FakeProbe::new());
        let mut set = WatchSet::new(probe);
        assert!(set.remove(ProcessId(5)).is_none());
    }

    #[tokio::test]
    async fn test_handle_checks_against_snapshot() {
        let probe = Arc::new(FakeProbe::new());
        probe.spawn(7, "job", "/usr/bin/job --once", 500);

        let mut set = WatchSet::new(probe.clone());
        set.add(ProcessId(7)).await.unwrap();
        let handle = set.get(ProcessId(7)).unwrap().clone();

        assert_eq!(handle.check().await, Liveness::Alive);

        probe.kill(7);
        assert_eq!(handle.check().await, Liveness::Terminated);

        // info stays renderable after termination
        assert!(handle.info().contains("--once"));
    }
}
