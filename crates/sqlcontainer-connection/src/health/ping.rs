//! Connection liveness probe

use std::time::{Duration, Instant};

use sqlcontainer_core::Connection;
use thiserror::Error;

/// The round-trip query every driver understands
pub const PING_QUERY: &str = "SELECT 1";

/// Result of a ping operation
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur during a ping operation
#[derive(Debug, Clone, Error)]
pub enum PingError {
    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Ping query failed: {0}")]
    QueryFailed(String),
}

/// Run a trivial query on `conn` and return the round-trip time.
pub async fn ping(conn: &dyn Connection) -> PingResult {
    if conn.is_closed() {
        return Err(PingError::ConnectionClosed);
    }

    let start = Instant::now();
    match conn.query(PING_QUERY, &[]).await {
        Ok(_) => Ok(start.elapsed()),
        Err(e) => Err(PingError::QueryFailed(e.to_string())),
    }
}
