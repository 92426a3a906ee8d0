//! Connection pooling
//!
//! A bounded pool that opens connections lazily, tracks which ones are
//! available and which are reserved by callers, and rolls back or discards
//! connections as they come back.
//!
//! # Example
//!
//! ```ignore
//! use sqlcontainer_connection::pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new("mysql", "mysql://localhost/people", "SA", "secret")?;
//! let pool = ConnectionPool::new(config, connection_factory);
//! pool.set_health_check_interval(60).await;
//!
//! let conn = pool.reserve().await?;
//! // Use connection...
//! pool.release(&conn).await;
//! ```

mod config;
pub(crate) mod connector;
#[allow(clippy::module_inception)]
mod pool;
pub(crate) mod state;
mod stats;


pub use config::{DEFAULT_INITIAL_SIZE, DEFAULT_MAX_SIZE, PoolConfig};
pub use connector::MYSQL_SETUP_STATEMENT;
pub(crate) use pool::PoolInner;
pub use pool::{ConnectionPool, ConnectionPoolBuilder};
pub use stats::PoolStats;
