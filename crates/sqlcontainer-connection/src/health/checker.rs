//! Periodic health checking of idle pooled connections

use std::sync::Weak;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlcontainer_core::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::backoff::BackoffStrategy;
use super::ping::ping;
use super::recovery::{RecoveryContext, RecoveryHook};
use crate::pool::PoolInner;
use crate::pool::connector::Connector;
use crate::pool::state::PoolState;

/// Configuration for the background health check task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// How long `destroy` or a task replacement waits for the old task to exit
    #[serde(default = "default_stop_timeout_ms")]
    stop_timeout_ms: u64,
    /// Extra delay added after consecutive failed cycles
    #[serde(default)]
    backoff: BackoffStrategy,
}

fn default_stop_timeout_ms() -> u64 {
    1_000
}

impl HealthCheckConfig {
    pub fn new(stop_timeout_ms: u64, backoff: BackoffStrategy) -> Self {
        Self {
            stop_timeout_ms,
            backoff,
        }
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self::new(default_stop_timeout_ms(), BackoffStrategy::default())
    }
}

/// Result of one health check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthCheckOutcome {
    /// Connections probed, including the one that failed
    pub probed: usize,
    /// Whether a failed probe triggered the recovery hook
    pub recovered: bool,
    /// Slowest successful round trip this cycle
    pub max_latency: Option<Duration>,
}

/// Probe each available connection until one fails, then hand the pool to
/// `recovery`. Reserved connections are never touched.
pub(crate) async fn check_available(
    state: &mut PoolState,
    connector: &Connector,
    recovery: &dyn RecoveryHook,
) -> Result<HealthCheckOutcome> {
    let mut outcome = HealthCheckOutcome::default();

    for connection in state.available() {
        outcome.probed += 1;
        let probe = ping(connection.as_ref()).await;

        if !connection.is_auto_commit() {
            if let Err(e) = connection.rollback().await {
                tracing::warn!(error = %e, "rollback after health probe failed");
            }
        }

        match probe {
            Ok(latency) => {
                outcome.max_latency = outcome.max_latency.max(Some(latency));
            }
            Err(e) => {
                tracing::warn!(error = %e, "health probe failed, running recovery");
                outcome.recovered = true;
                let mut ctx = RecoveryContext::new(state, connector);
                recovery.recover(&mut ctx).await?;
                break;
            }
        }
    }

    tracing::debug!(
        probed = outcome.probed,
        recovered = outcome.recovered,
        "health check cycle finished"
    );
    Ok(outcome)
}

/// Handle to a running background health check loop
pub(crate) struct HealthTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl HealthTask {
    pub(crate) fn spawn(pool: Weak<PoolInner>, interval: Duration, backoff: BackoffStrategy) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(pool, interval, backoff, cancel.clone()));
        Self { cancel, handle }
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop without waiting for it
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Signal the loop and wait up to `timeout` for it to exit; abort it
    /// if it does not.
    ///
    /// An abort can land inside a recovery hook. `DefaultRecovery` opens
    /// replacements before dropping stale connections, so the pool keeps
    /// at least its old connections; a custom hook gets no such guarantee.
    pub(crate) async fn stop(self, timeout: Duration) {
        self.cancel.cancel();
        let abort = self.handle.abort_handle();
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(_) => tracing::debug!("health check task stopped"),
            Err(_) => {
                tracing::warn!(?timeout, "health check task did not stop in time, aborting");
                abort.abort();
            }
        }
    }
}

async fn run_loop(
    pool: Weak<PoolInner>,
    interval: Duration,
    backoff: BackoffStrategy,
    cancel: CancellationToken,
) {
    let mut consecutive_failures: u32 = 0;

    loop {
        let delay = match consecutive_failures {
            0 => interval,
            n => interval + backoff.calculate_delay(n - 1),
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        let Some(inner) = pool.upgrade() else {
            break;
        };

        match inner.health_check().await {
            Ok(_) => consecutive_failures = 0,
            Err(e) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                tracing::error!(
                    error = %e,
                    consecutive_failures,
                    "health check recovery failed, backing off"
                );
            }
        }
    }

    tracing::debug!("health check loop exited");
}
