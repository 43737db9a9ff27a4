//! In-memory doubles for the probe and sink capabilities, used by the
//! engine tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use procwatch_core::{
    Liveness, NotificationEvent, NotificationSink, ProcessId, ProcessProbe, ProcessSnapshot,
    WatchError,
};

struct FakeProcess {
    name: String,
    command_line: String,
    start_time: u64,
    /// Listed by `enumerate` but gone by the time `snapshot` runs, like a
    /// process dying between the two calls.
    ghost: bool,
}

/// Scriptable process table.
pub(crate) struct FakeProbe {
    processes: Mutex<HashMap<u32, FakeProcess>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(HashMap::new()),
        }
    }

    /// Insert (or replace, simulating PID reuse) a running process.
    pub fn spawn(&self, pid: u32, name: &str, command_line: &str, start_time: u64) {
        self.processes.lock().unwrap().insert(
            pid,
            FakeProcess {
                name: name.to_string(),
                command_line: command_line.to_string(),
                start_time,
                ghost: false,
            },
        );
    }

    /// Insert a process that shows up in enumeration but cannot be
    /// snapshotted.
    pub fn ghost(&self, pid: u32, command_line: &str) {
        self.processes.lock().unwrap().insert(
            pid,
            FakeProcess {
                name: String::new(),
                command_line: command_line.to_string(),
                start_time: 0,
                ghost: true,
            },
        );
    }

    pub fn kill(&self, pid: u32) {
        self.processes.lock().unwrap().remove(&pid);
    }
}

#[async_trait]
impl ProcessProbe for FakeProbe {
    async fn snapshot(&self, pid: ProcessId) -> Result<ProcessSnapshot, WatchError> {
        let processes = self.processes.lock().unwrap();
        match processes.get(&pid.0) {
            Some(process) if !process.ghost => Ok(ProcessSnapshot {
                pid,
                name: process.name.clone(),
                command_line: process.command_line.clone(),
                start_time: process.start_time,
            }),
            _ => Err(WatchError::ProcessNotFound(pid)),
        }
    }

    async fn liveness(&self, snapshot: &ProcessSnapshot) -> Liveness {
        let processes = self.processes.lock().unwrap();
        match processes.get(&snapshot.pid.0) {
            Some(process) if !process.ghost && process.start_time == snapshot.start_time => {
                Liveness::Alive
            }
            _ => Liveness::Terminated,
        }
    }

    async fn enumerate(&self) -> Vec<(ProcessId, String)> {
        self.processes
            .lock()
            .unwrap()
            .iter()
            .map(|(pid, process)| (ProcessId(*pid), process.command_line.clone()))
            .collect()
    }
}

/// Sink that remembers every event it was sent.
pub(crate) struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), WatchError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink that fails every delivery.
pub(crate) struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _event: &NotificationEvent) -> Result<(), WatchError> {
        Err(WatchError::SinkDelivery {
            sink: "failing".to_string(),
            reason: "always fails".to_string(),
        })
    }
}
