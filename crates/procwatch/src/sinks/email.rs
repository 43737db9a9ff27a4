use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use procwatch_core::{NotificationEvent, NotificationSink, WatchError};

/// SMTP email sink. One sink carries all recipient addresses; each event is
/// mailed to every recipient.
pub struct EmailSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailSink {
    /// Parse the addresses and verify the relay is reachable. Runs at
    /// startup; any failure here is fatal for the run.
    pub async fn new(
        relay: &str,
        port: u16,
        from: &str,
        recipients: &[String],
    ) -> Result<Self, WatchError> {
        let init_error = |reason: String| WatchError::SinkInitialization {
            sink: "email".to_string(),
            reason,
        };

        let from = from
            .parse::<Mailbox>()
            .map_err(|e| init_error(format!("invalid sender address `{from}`: {e}")))?;

        if recipients.is_empty() {
            return Err(init_error("no recipient addresses given".to_string()));
        }
        let recipients = recipients
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .map_err(|e| init_error(format!("invalid recipient address `{addr}`: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(relay)
            .port(port)
            .build();
        let reachable = transport
            .test_connection()
            .await
            .map_err(|e| init_error(format!("cannot reach SMTP relay {relay}:{port}: {e}")))?;
        if !reachable {
            return Err(init_error(format!(
                "SMTP relay {relay}:{port} did not accept the connection test"
            )));
        }
        debug!(relay, port, "SMTP relay verified");

        Ok(Self {
            transport,
            from,
            recipients,
        })
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), WatchError> {
        let delivery_error = |reason: String| WatchError::SinkDelivery {
            sink: "email".to_string(),
            reason,
        };

        for recipient in &self.recipients {
            let message = Message::builder()
                .from(self.from.clone())
                .to(recipient.clone())
                .subject(event.summary())
                .body(event.body())
                .map_err(|e| delivery_error(format!("could not build message: {e}")))?;

            self.transport
                .send(message)
                .await
                .map_err(|e| delivery_error(e.to_string()))?;
        }
        Ok(())
    }
}
