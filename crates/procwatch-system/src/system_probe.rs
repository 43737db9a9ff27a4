use async_trait::async_trait;
use std::ffi::OsString;
use std::sync::Mutex;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use procwatch_core::{Liveness, ProcessId, ProcessProbe, ProcessSnapshot, WatchError};

/// Process probe backed by the OS process table via `sysinfo`.
///
/// Holds one `System` and refreshes only the processes a call needs, so the
/// per-tick cost stays proportional to the watch set.
pub struct SystemProbe {
    system: Mutex<System>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Refresh kind for calls that need the command line populated.
    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always)
    }

    /// Joined command line, falling back to the process name for kernel
    /// threads and other processes with an empty argument vector.
    fn command_line(process: &Process) -> String {
        let cmd: &[OsString] = process.cmd();
        if cmd.is_empty() {
            return process.name().to_string_lossy().into_owned();
        }

        let mut cmdline = String::new();
        for arg in cmd {
            if !cmdline.is_empty() {
                cmdline.push(' ');
            }
            cmdline.push_str(&arg.to_string_lossy());
        }
        cmdline
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessProbe for SystemProbe {
    async fn snapshot(&self, pid: ProcessId) -> Result<ProcessSnapshot, WatchError> {
        let sys_pid = Pid::from_u32(pid.0);
        let mut system = self.system.lock().unwrap();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            Self::refresh_kind(),
        );

        let process = system
            .process(sys_pid)
            .ok_or(WatchError::ProcessNotFound(pid))?;

        Ok(ProcessSnapshot {
            pid,
            name: process.name().to_string_lossy().into_owned(),
            command_line: Self::command_line(process),
            start_time: process.start_time(),
        })
    }

    async fn liveness(&self, snapshot: &ProcessSnapshot) -> Liveness {
        let sys_pid = Pid::from_u32(snapshot.pid.0);
        let mut system = self.system.lock().unwrap();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        match system.process(sys_pid) {
            Some(process) if process.start_time() == snapshot.start_time => Liveness::Alive,
            Some(process) => {
                // Same PID, different start time: the watched process died
                // and the OS recycled its PID.
                debug!(
                    pid = snapshot.pid.0,
                    expected = snapshot.start_time,
                    current = process.start_time(),
                    "PID recycled by another process"
                );
                Liveness::Terminated
            }
            None => Liveness::Terminated,
        }
    }

    async fn enumerate(&self) -> Vec<(ProcessId, String)> {
        let mut system = self.system.lock().unwrap();
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());

        system
            .processes()
            .iter()
            .map(|(pid, process)| (ProcessId(pid.as_u32()), Self::command_line(process)))
            .collect()
    }
}
