use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::matcher::PatternMatcher;
use crate::report::Reporter;
use crate::watch_set::WatchSet;
use procwatch_core::{
    Liveness, NotificationEvent, NotificationSink, ProcessId, ProcessProbe, RetryConfig,
    WatchError, WatcherConfig,
};

/// What a completed poll tick means for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep polling.
    Continue,
    /// The watch set drained and discovery is off; the loop is done.
    Drained,
}

/// The poll loop: scans the watch set every interval, removes terminated
/// processes, fans their termination events out to the sinks, and discovers
/// new pattern matches when enabled.
pub struct Watcher {
    config: WatcherConfig,
    probe: Arc<dyn ProcessProbe>,
    matcher: PatternMatcher,
    watch_set: WatchSet,
    sinks: Vec<Arc<dyn NotificationSink>>,
    reporter: Reporter,
    retry: ExponentialBuilder,
}

impl Watcher {
    pub fn new(
        config: WatcherConfig,
        probe: Arc<dyn ProcessProbe>,
        sinks: Vec<Arc<dyn NotificationSink>>,
    ) -> Result<Self, WatchError> {
        config
            .validate()
            .map_err(|e| WatchError::Configuration(e.to_string()))?;
        let matcher = PatternMatcher::new(&config.patterns)?;

        Ok(Self {
            reporter: Reporter::new(config.quiet),
            retry: Self::create_retry_strategy(&config.retry),
            watch_set: WatchSet::new(probe.clone()),
            config,
            probe,
            matcher,
            sinks,
        })
    }

    /// Creates a configured retry strategy for sink delivery attempts
    fn create_retry_strategy(retry: &RetryConfig) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(retry.min_delay())
            .with_max_delay(retry.max_delay())
            .with_max_times(retry.max_attempts as usize);

        if retry.jitter {
            builder = builder.with_jitter();
        }

        builder
    }

    /// Resolve the initial watch targets.
    ///
    /// Explicit PIDs are a user assertion: any of them missing fails the
    /// run. Pattern matches that vanish between enumeration and snapshot
    /// are skipped.
    pub async fn resolve_initial(&mut self) -> Result<(), WatchError> {
        for pid in self.config.pids.clone() {
            self.watch_set.add(ProcessId(pid)).await?;
        }

        if !self.matcher.is_empty() {
            let listing = self.probe.enumerate().await;
            for pid in self.matcher.matches(&listing) {
                match self.watch_set.add(pid).await {
                    Ok(_) => {}
                    Err(WatchError::ProcessNotFound(pid)) => {
                        debug!(%pid, "matched process exited before it could be watched");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(count = self.watch_set.len(), "initial resolution complete");
        Ok(())
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    fn is_idle(&self) -> bool {
        self.watch_set.is_empty() && !self.config.discovery_enabled()
    }

    /// Drive the loop until the watch set drains (discovery off) or the
    /// token is cancelled. Call after [`Watcher::resolve_initial`].
    pub async fn run(mut self, cancel: CancellationToken) {
        if self.is_idle() {
            self.reporter.nothing_to_watch();
            return;
        }
        self.reporter.watching(&self.watch_set);

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick fires immediately; consume it so the
        // first scan happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("interrupt received, shutting down");
                    self.reporter.interrupted();
                    return;
                }
                _ = ticker.tick() => {
                    if self.poll_once().await == TickOutcome::Drained {
                        info!("all watched processes have ended");
                        return;
                    }
                }
            }
        }
    }

    /// One full poll tick: liveness scan over a detached snapshot of the
    /// watch set, removals, notification fan-out, then discovery.
    pub async fn poll_once(&mut self) -> TickOutcome {
        let mut ended = Vec::new();
        for handle in self.watch_set.handles() {
            if handle.check().await == Liveness::Terminated {
                ended.push(handle);
            }
        }

        for handle in &ended {
            self.watch_set.remove(handle.pid());
        }
        for handle in &ended {
            self.reporter.stopped(handle);
            let event = NotificationEvent::new(handle.snapshot().clone());
            self.dispatch(&event).await;
        }

        if self.config.discovery_enabled() {
            self.discover().await;
            TickOutcome::Continue
        } else if self.watch_set.is_empty() {
            TickOutcome::Drained
        } else {
            TickOutcome::Continue
        }
    }

    /// Pick up newly spawned processes matching the patterns. Additions are
    /// reported but never notified; only a termination produces an event.
    async fn discover(&mut self) {
        let listing = self.probe.enumerate().await;
        for pid in self.matcher.matches(&listing) {
            if self.watch_set.contains(pid) {
                continue;
            }
            match self.watch_set.add(pid).await {
                Ok(true) => {
                    if let Some(handle) = self.watch_set.get(pid) {
                        info!(%pid, "watching new process");
                        self.reporter.discovered(handle);
                    }
                }
                Ok(false) => {}
                Err(WatchError::ProcessNotFound(pid)) => {
                    debug!(%pid, "matched process exited before it could be watched");
                }
                Err(e) => {
                    warn!(error = %e, "failed to watch discovered process");
                }
            }
        }
    }

    /// Deliver one event to every sink. Failures are retried per the
    /// delivery policy, then logged; one sink failing never blocks the
    /// others.
    async fn dispatch(&self, event: &NotificationEvent) {
        for sink in &self.sinks {
            let send = || async { sink.send(event).await };
            match send
                .retry(self.retry)
                .when(|e: &WatchError| e.is_retryable())
                .await
            {
                Ok(()) => {
                    debug!(sink = sink.name(), pid = event.snapshot.pid.0, "notification delivered");
                }
                Err(e) => {
                    error!(sink = sink.name(), error = %e, "notification delivery failed");
                }
            }
        }
    }
}
