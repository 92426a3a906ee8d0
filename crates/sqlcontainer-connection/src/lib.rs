//! SQLContainer Connection - connection pooling and health monitoring
//!
//! This crate hands out database connections to a data container from a
//! bounded pool and keeps the idle ones alive with a periodic probe.

pub mod health;
pub mod pool;

#[cfg(test)]
pub(crate) mod mock;

pub use health::{
    BackoffStrategy, DefaultRecovery, HealthCheckConfig, HealthCheckOutcome, PingError,
    PingResult, RecoveryContext, RecoveryHook, ping,
};
pub use pool::{ConnectionPool, ConnectionPoolBuilder, PoolConfig, PoolStats};
