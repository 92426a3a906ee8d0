//! Health checking for idle pooled connections
//!
//! A health check probes every available connection with a trivial query.
//! The first failure hands the pool to a `RecoveryHook`, by default one
//! that replaces all available connections with fresh ones.
//!
//! # Example
//!
//! ```ignore
//! use sqlcontainer_connection::health::{ping, HealthCheckConfig, BackoffStrategy};
//!
//! // One-time probe
//! let latency = ping(connection.as_ref()).await?;
//!
//! // Periodic checking every 30 seconds
//! pool.set_health_check_interval(30).await;
//! ```

mod backoff;
pub(crate) mod checker;
mod ping;
mod recovery;


pub use backoff::BackoffStrategy;
pub use checker::{HealthCheckConfig, HealthCheckOutcome};
pub use ping::{PING_QUERY, PingError, PingResult, ping};
pub use recovery::{DefaultRecovery, RecoveryContext, RecoveryHook};
