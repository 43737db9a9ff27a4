use thiserror::Error;

use crate::process::ProcessId;

/// Error types for watch operations
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("no running process with PID {0}")]
    ProcessNotFound(ProcessId),

    #[error("invalid command pattern `{pattern}`: {reason}")]
    PatternInvalid { pattern: String, reason: String },

    #[error("failed to initialize {sink} sink: {reason}")]
    SinkInitialization { sink: String, reason: String },

    #[error("{sink} sink failed to deliver notification: {reason}")]
    SinkDelivery { sink: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WatchError {
    /// Check if this error is worth retrying. Only a failed delivery
    /// attempt is; everything else reflects state that will not change
    /// by trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WatchError::SinkDelivery { .. })
    }

    /// Check if this error must abort the run when it occurs during
    /// startup resolution or sink construction.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            WatchError::ProcessNotFound(_)
                | WatchError::PatternInvalid { .. }
                | WatchError::SinkInitialization { .. }
                | WatchError::Configuration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        // Retryable errors
        assert!(
            WatchError::SinkDelivery {
                sink: "email".to_string(),
                reason: "connection reset".to_string(),
            }
            .is_retryable()
        );

        // Non-retryable errors
        assert!(!WatchError::ProcessNotFound(ProcessId(1)).is_retryable());
        assert!(
            !WatchError::Configuration("interval must be positive".to_string()).is_retryable()
        );
    }

    #[test]
    fn test_startup_fatality() {
        assert!(WatchError::ProcessNotFound(ProcessId(1234)).is_fatal_at_startup());
        assert!(
            WatchError::SinkInitialization {
                sink: "desktop".to_string(),
                reason: "no notification server".to_string(),
            }
            .is_fatal_at_startup()
        );

        assert!(
            !WatchError::SinkDelivery {
                sink: "email".to_string(),
                reason: "timeout".to_string(),
            }
            .is_fatal_at_startup()
        );
    }

    #[test]
    fn test_error_display() {
        let error = WatchError::ProcessNotFound(ProcessId(4321));
        assert!(format!("{error}").contains("4321"));

        let error = WatchError::PatternInvalid {
            pattern: "worker[".to_string(),
            reason: "unclosed character class".to_string(),
        };
        let display = format!("{error}");
        assert!(display.contains("worker["));
        assert!(display.contains("unclosed character class"));
    }
}
