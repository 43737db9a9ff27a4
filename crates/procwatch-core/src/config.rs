use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for notification delivery retries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Minimum delay between delivery attempts (in milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Maximum delay between delivery attempts (in milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Maximum number of retries after the first failed attempt
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Whether to randomize delays between attempts
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a RetryConfig that never retries (fail fast)
    pub fn no_retry() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            max_attempts: 0,
            jitter: false,
        }
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(anyhow::anyhow!(
                "min_delay_ms cannot be greater than max_delay_ms"
            ));
        }

        if self.max_attempts > 10 {
            return Err(anyhow::anyhow!(
                "max_attempts should not exceed 10 to avoid excessive retries"
            ));
        }

        Ok(())
    }

    /// Get the minimum delay as Duration
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Get the maximum delay as Duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Check if retries are enabled
    pub fn retries_enabled(&self) -> bool {
        self.max_attempts > 0
    }
}

/// Main watcher configuration
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct WatcherConfig {
    /// Explicit process IDs to watch
    #[serde(default)]
    #[builder(default)]
    #[builder(setter(custom))]
    pub pids: Vec<u32>,

    /// Regular expressions matched against running command lines
    #[serde(default)]
    #[builder(default)]
    #[builder(setter(custom))]
    pub patterns: Vec<String>,

    /// Keep scanning for newly spawned processes matching `patterns`
    #[serde(default)]
    #[builder(default)]
    pub watch_new: bool,

    /// Seconds between liveness checks
    #[serde(default = "default_interval_secs")]
    #[builder(default = "default_interval_secs()")]
    pub interval_secs: f64,

    /// Suppress progress output on stdout (never suppresses notifications)
    #[serde(default)]
    #[builder(default)]
    pub quiet: bool,

    /// Delivery retry policy applied to each sink send
    #[serde(default)]
    #[builder(default)]
    pub retry: RetryConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            pids: Vec::new(),
            patterns: Vec::new(),
            watch_new: false,
            interval_secs: default_interval_secs(),
            quiet: false,
            retry: RetryConfig::default(),
        }
    }
}

impl WatcherConfig {
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(anyhow::anyhow!(
                "interval must be a positive number of seconds, got {}",
                self.interval_secs
            ));
        }

        self.retry.validate()?;

        Ok(())
    }

    /// Get the polling interval as Duration. Only meaningful on a validated
    /// configuration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    /// Whether the loop keeps scanning for new pattern matches. Watching for
    /// new processes requires at least one pattern to match them with.
    pub fn discovery_enabled(&self) -> bool {
        self.watch_new && !self.patterns.is_empty()
    }
}

impl WatcherConfigBuilder {
    pub fn pids<I: IntoIterator<Item = u32>>(&mut self, iter: I) -> &mut Self {
        self.pids = Some(iter.into_iter().collect());
        self
    }

    pub fn patterns<S: ToString, I: IntoIterator<Item = S>>(&mut self, iter: I) -> &mut Self {
        let patterns: Vec<String> = iter.into_iter().map(|s| s.to_string()).collect();
        self.patterns = Some(patterns);
        self
    }
}

// Default value functions for serde
fn default_min_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_max_attempts() -> u32 {
    3
}
fn default_interval_secs() -> f64 {
    15.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::from_secs(15));
        assert!(!config.discovery_enabled());
        assert!(config.retry.retries_enabled());
    }

    #[test]
    fn test_builder() {
        let config = WatcherConfig::builder()
            .pids([100, 200])
            .patterns(["worker", r"exec\d+"])
            .watch_new(true)
            .interval_secs(0.5)
            .build()
            .unwrap();

        assert_eq!(config.pids, vec![100, 200]);
        assert_eq!(config.patterns.len(), 2);
        assert!(config.discovery_enabled());
        assert_eq!(config.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_discovery_requires_patterns() {
        let config = WatcherConfig::builder()
            .pids([42])
            .watch_new(true)
            .build()
            .unwrap();

        // watch_new without patterns has nothing to discover with
        assert!(!config.discovery_enabled());
    }

    #[test]
    fn test_invalid_interval() {
        let config = WatcherConfig {
            interval_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WatcherConfig {
            interval_secs: -3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WatcherConfig {
            interval_secs: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_retry_config() {
        let config = RetryConfig {
            min_delay_ms: 1000,
            max_delay_ms: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RetryConfig {
            max_attempts: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_retry_config() {
        let config = RetryConfig::no_retry();
        assert!(config.validate().is_ok());
        assert!(!config.retries_enabled());
    }

    #[test]
    fn test_serialization() {
        let config = WatcherConfig::builder()
            .patterns(["worker"])
            .watch_new(true)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: WatcherConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: WatcherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.interval_secs, 15.0);
        assert!(config.pids.is_empty());
        assert!(!config.quiet);
    }
}
