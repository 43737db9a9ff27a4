use async_trait::async_trait;
use notify_rust::Notification;
use tracing::debug;

use procwatch_core::{NotificationEvent, NotificationSink, WatchError};

/// Desktop notification sink backed by the session notification server.
pub struct DesktopSink;

impl DesktopSink {
    /// Probe the notification server so a missing bus surfaces at startup
    /// instead of on the first termination.
    pub fn new() -> Result<Self, WatchError> {
        let info =
            notify_rust::get_server_information().map_err(|e| WatchError::SinkInitialization {
                sink: "desktop".to_string(),
                reason: format!("no desktop notification server reachable: {e}"),
            })?;
        debug!(server = %info.name, "desktop notification server found");
        Ok(Self)
    }
}

#[async_trait]
impl NotificationSink for DesktopSink {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), WatchError> {
        Notification::new()
            .summary(&event.summary())
            .body(&event.body())
            .show()
            .map_err(|e| WatchError::SinkDelivery {
                sink: "desktop".to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
