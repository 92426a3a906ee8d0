//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Snapshot of a connection pool's membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Connections idle in the pool
    available: usize,
    /// Connections handed out to callers
    reserved: usize,
    /// Whether the first reservation has populated the pool
    initialized: bool,
    /// Whether a background health check task is running
    health_check_running: bool,
}

impl PoolStats {
    pub fn new(
        available: usize,
        reserved: usize,
        initialized: bool,
        health_check_running: bool,
    ) -> Self {
        Self {
            available,
            reserved,
            initialized,
            health_check_running,
        }
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Every live connection the pool owns
    pub fn total(&self) -> usize {
        self.available + self.reserved
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn health_check_running(&self) -> bool {
        self.health_check_running
    }

    /// Share of owned connections currently reserved (0.0 to 1.0)
    ///
    /// Returns 0.0 if the pool owns no connections.
    pub fn utilization(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.reserved as f64 / self.total() as f64
        }
    }
}
