use async_trait::async_trait;

use crate::error::WatchError;
use crate::process::ProcessSnapshot;

/// Termination event delivered to every configured sink. Carries the final
/// snapshot of the process that ended; sinks read it, never mutate it.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub snapshot: ProcessSnapshot,
}

impl NotificationEvent {
    pub fn new(snapshot: ProcessSnapshot) -> Self {
        Self { snapshot }
    }

    /// Short one-line headline for the notification.
    pub fn summary(&self) -> String {
        format!(
            "Process {} ({}) ended",
            self.snapshot.pid, self.snapshot.name
        )
    }

    /// Full description used as the notification body.
    pub fn body(&self) -> String {
        self.snapshot.describe()
    }
}

/// A notification delivery channel.
///
/// Sinks are constructed and validated once at startup; construction failure
/// is fatal for the run. `send` failures are isolated per sink and per event:
/// the watcher logs them and keeps going.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name used in diagnostics.
    fn name(&self) -> &str;

    /// Deliver one termination event.
    async fn send(&self, event: &NotificationEvent) -> Result<(), WatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessId;

    fn sample_event() -> NotificationEvent {
        NotificationEvent::new(ProcessSnapshot {
            pid: ProcessId(77),
            name: "backup".to_string(),
            command_line: "/usr/local/bin/backup --full".to_string(),
            start_time: 1_700_000_123,
        })
    }

    #[test]
    fn test_summary_names_the_process() {
        let event = sample_event();
        let summary = event.summary();
        assert!(summary.contains("77"));
        assert!(summary.contains("backup"));
    }

    #[test]
    fn test_body_is_the_full_description() {
        let event = sample_event();
        assert_eq!(event.body(), event.snapshot.describe());
    }
}
