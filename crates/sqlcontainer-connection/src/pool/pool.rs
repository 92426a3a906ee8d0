//! Connection pool implementation

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex as SyncMutex;
use sqlcontainer_core::{Connection, ConnectionFactory, Result, SqlContainerError};
use tokio::sync::Mutex;

use super::config::PoolConfig;
use super::connector::{Connector, close_quietly};
use super::state::{PoolState, SlotStatus};
use super::stats::PoolStats;
use crate::health::checker::{HealthCheckOutcome, HealthTask, check_available};
use crate::health::{DefaultRecovery, HealthCheckConfig, RecoveryHook};

/// Shared pool internals; the background health task holds a weak
/// reference so a dropped pool stops it.
pub(crate) struct PoolInner {
    config: PoolConfig,
    connector: Connector,
    recovery: Arc<dyn RecoveryHook>,
    health_config: HealthCheckConfig,
    /// Pool-wide lock over membership; held across connection I/O
    state: Mutex<PoolState>,
    health_task: SyncMutex<Option<HealthTask>>,
}

impl PoolInner {
    pub(crate) async fn health_check(&self) -> Result<HealthCheckOutcome> {
        let mut state = self.state.lock().await;
        check_available(&mut state, &self.connector, self.recovery.as_ref()).await
    }

    async fn stop_health_task(&self) {
        let task = self.health_task.lock().take();
        if let Some(task) = task {
            task.stop(self.health_config.stop_timeout()).await;
        }
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        if let Some(task) = self.health_task.get_mut().take() {
            task.cancel();
        }
    }
}

/// Builder for a `ConnectionPool` with a non-default recovery policy or
/// health check settings
pub struct ConnectionPoolBuilder {
    config: PoolConfig,
    factory: Arc<dyn ConnectionFactory>,
    recovery: Arc<dyn RecoveryHook>,
    health_config: HealthCheckConfig,
}

impl ConnectionPoolBuilder {
    /// Replace the default "recreate all available connections" recovery
    pub fn recovery_hook(mut self, hook: impl RecoveryHook) -> Self {
        self.recovery = Arc::new(hook);
        self
    }

    pub fn health_check_config(mut self, config: HealthCheckConfig) -> Self {
        self.health_config = config;
        self
    }

    pub fn build(self) -> ConnectionPool {
        let connector = Connector::new(self.factory, &self.config);
        ConnectionPool {
            inner: Arc::new(PoolInner {
                config: self.config,
                connector,
                recovery: self.recovery,
                health_config: self.health_config,
                state: Mutex::new(PoolState::default()),
                health_task: SyncMutex::new(None),
            }),
        }
    }
}

/// A bounded pool of database connections
///
/// Connections are opened lazily: the first `reserve` opens
/// `initial_size` of them, and the pool grows one at a time up to
/// `max_size` reserved connections. Callers hand connections back with
/// `release`. Reservation, release and health checks all run under one
/// pool-wide lock.
///
/// # Example
///
/// ```ignore
/// use sqlcontainer_connection::{ConnectionPool, PoolConfig};
///
/// let config = PoolConfig::new("postgresql", "postgres://localhost/people", "SA", "secret")?
///     .with_sizes(2, 5)?;
/// let pool = ConnectionPool::new(config, driver);
///
/// let conn = pool.reserve().await?;
/// conn.query(&sql, &params).await?;
/// pool.release(&conn).await;
/// ```
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Create an uninitialized pool; no connection is opened until the
    /// first reservation
    pub fn new<F: ConnectionFactory>(config: PoolConfig, factory: F) -> Self {
        Self::builder(config, factory).build()
    }

    pub fn builder<F: ConnectionFactory>(config: PoolConfig, factory: F) -> ConnectionPoolBuilder {
        ConnectionPoolBuilder {
            config,
            factory: Arc::new(factory),
            recovery: Arc::new(DefaultRecovery),
            health_config: HealthCheckConfig::default(),
        }
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Hand out a connection.
    ///
    /// This will:
    /// 1. Populate the pool with `initial_size` connections on first use
    /// 2. Return an available connection if there is one
    /// 3. Otherwise open a new one while fewer than `max_size` are reserved
    /// 4. Otherwise fail with `PoolExhausted`
    ///
    /// Opening a connection is not bounded by any timeout here.
    pub async fn reserve(&self) -> Result<Arc<dyn Connection>> {
        let mut state = self.inner.state.lock().await;

        if !state.initialized {
            let initial = self.inner.config.initial_size();
            let connections = self.inner.connector.open_many(initial).await?;
            for connection in connections {
                state.push(connection, SlotStatus::Available);
            }
            state.initialized = true;
            tracing::debug!(initial, "connection pool initialized");
        }

        if let Some(connection) = state.take_available() {
            tracing::trace!(
                reserved = state.count(SlotStatus::Reserved),
                "reserved pooled connection"
            );
            return Ok(connection);
        }

        let max_size = self.inner.config.max_size();
        if state.count(SlotStatus::Reserved) >= max_size {
            tracing::debug!(max_size, "connection pool exhausted");
            return Err(SqlContainerError::PoolExhausted { max_size });
        }

        let connection = self.inner.connector.open().await?;
        state.push(Arc::clone(&connection), SlotStatus::Reserved);
        tracing::debug!(
            reserved = state.count(SlotStatus::Reserved),
            "grew connection pool"
        );
        Ok(connection)
    }

    /// Give a reserved connection back.
    ///
    /// Unknown connections are ignored. An open transaction is rolled back
    /// first; if that fails the connection is closed and dropped from the
    /// pool instead of becoming available again. Never fails.
    pub async fn release(&self, connection: &Arc<dyn Connection>) {
        let mut state = self.inner.state.lock().await;
        if !state.initialized {
            return;
        }
        let Some(index) = state.position(connection, SlotStatus::Reserved) else {
            tracing::debug!("release of a connection the pool does not own, ignoring");
            return;
        };

        if !connection.is_auto_commit() {
            if let Err(e) = connection.rollback().await {
                tracing::warn!(error = %e, "rollback on release failed, discarding connection");
                state.slots.remove(index);
                close_quietly(connection).await;
                return;
            }
        }

        state.slots[index].status = SlotStatus::Available;
    }

    /// Stop the health check task and close every connection the pool owns.
    ///
    /// Close failures are ignored. The pool must not be used afterwards.
    pub async fn destroy(&self) {
        self.inner.stop_health_task().await;

        let state = self.inner.state.lock().await;
        for slot in &state.slots {
            close_quietly(&slot.connection).await;
        }
        tracing::debug!(connections = state.slots.len(), "connection pool destroyed");
    }

    /// Start, replace or stop the background health check.
    ///
    /// Any running task is stopped first. With `seconds > 0` a new task
    /// sleeps that long and then checks the available connections, until
    /// cancelled; `0` leaves monitoring off.
    pub async fn set_health_check_interval(&self, seconds: u64) {
        self.inner.stop_health_task().await;
        if seconds == 0 {
            return;
        }

        let task = HealthTask::spawn(
            Arc::downgrade(&self.inner),
            Duration::from_secs(seconds),
            self.inner.health_config.backoff().clone(),
        );
        // Concurrent callers race to install a task; stop whichever loses.
        let replaced = self.inner.health_task.lock().replace(task);
        if let Some(replaced) = replaced {
            replaced.stop(self.inner.health_config.stop_timeout()).await;
        }
        tracing::debug!(seconds, "health check task started");
    }

    /// Probe every available connection once.
    ///
    /// A failed probe runs the recovery hook and ends the cycle; an error
    /// from the hook is returned.
    pub async fn health_check(&self) -> Result<HealthCheckOutcome> {
        self.inner.health_check().await
    }

    /// Forget every connection without closing it and stop monitoring, as
    /// after crossing a process boundary. The next `reserve` rebuilds the
    /// pool from its configuration.
    pub async fn reopen(&self) {
        self.inner.stop_health_task().await;
        let mut state = self.inner.state.lock().await;
        state.slots.clear();
        state.initialized = false;
        tracing::debug!("connection pool reset, will reinitialize on next reserve");
    }

    /// Get current pool statistics
    pub async fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock().await;
        let running = self
            .inner
            .health_task
            .lock()
            .as_ref()
            .is_some_and(HealthTask::is_running);
        PoolStats::new(
            state.count(SlotStatus::Available),
            state.count(SlotStatus::Reserved),
            state.initialized,
            running,
        )
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.state.lock().await.initialized
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.inner.config)
            .finish()
    }
}
