use procwatch_core::{Liveness, ProcessId, ProcessProbe, WatchError};
use procwatch_system::SystemProbe;

/// Test that the probe can snapshot the test process itself
#[tokio::test]
async fn test_snapshot_of_own_process() {
    let probe = SystemProbe::new();
    let own_pid = ProcessId(std::process::id());

    let snapshot = probe.snapshot(own_pid).await.unwrap();
    assert_eq!(snapshot.pid, own_pid);
    assert!(!snapshot.name.is_empty());
    assert!(!snapshot.command_line.is_empty());
    assert!(snapshot.start_time > 0);
}

#[tokio::test]
async fn test_snapshot_of_nonexistent_process() {
    let probe = SystemProbe::new();
    // Far above any real pid_max, so never a running process.
    let missing = ProcessId(u32::MAX);

    match probe.snapshot(missing).await {
        Err(WatchError::ProcessNotFound(pid)) => assert_eq!(pid, missing),
        other => panic!("expected ProcessNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_own_process_is_alive() {
    let probe = SystemProbe::new();
    let snapshot = probe.snapshot(ProcessId(std::process::id())).await.unwrap();

    assert_eq!(probe.liveness(&snapshot).await, Liveness::Alive);
}

/// A snapshot whose start time does not match the current occupant of the
/// PID must read as terminated, even though the PID exists.
#[tokio::test]
async fn test_start_time_mismatch_reads_as_terminated() {
    let probe = SystemProbe::new();
    let mut snapshot = probe.snapshot(ProcessId(std::process::id())).await.unwrap();
    snapshot.start_time += 1;

    assert_eq!(probe.liveness(&snapshot).await, Liveness::Terminated);
}

#[tokio::test]
async fn test_missing_process_is_terminated() {
    let probe = SystemProbe::new();
    let mut snapshot = probe.snapshot(ProcessId(std::process::id())).await.unwrap();
    snapshot.pid = ProcessId(u32::MAX);

    assert_eq!(probe.liveness(&snapshot).await, Liveness::Terminated);
}

#[tokio::test]
async fn test_enumeration_includes_own_process() {
    let probe = SystemProbe::new();
    let own_pid = ProcessId(std::process::id());

    let listing = probe.enumerate().await;
    assert!(!listing.is_empty());
    assert!(listing.iter().any(|(pid, _)| *pid == own_pid));
}
