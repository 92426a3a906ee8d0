//! Exponential backoff for failed health check cycles

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff strategy.
///
/// Calculates delays that grow exponentially with each consecutive
/// failure, up to a configurable maximum.
///
/// # Example
///
/// ```
/// use sqlcontainer_connection::health::BackoffStrategy;
/// use std::time::Duration;
///
/// let backoff = BackoffStrategy::new(100, 30_000);
///
/// assert_eq!(backoff.calculate_delay(0), Duration::from_millis(100));
/// assert_eq!(backoff.calculate_delay(1), Duration::from_millis(200));
/// assert!(backoff.calculate_delay(20) <= Duration::from_millis(30_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffStrategy {
    /// Delay in milliseconds after the first failure
    initial_ms: u64,
    /// Cap for exponential growth in milliseconds
    max_ms: u64,
    /// Growth factor per attempt
    multiplier: f64,
}

impl BackoffStrategy {
    /// Create a backoff strategy with a 2x multiplier.
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        Self {
            initial_ms: initial_ms.max(1),
            max_ms: max_ms.max(initial_ms),
            multiplier: 2.0,
        }
    }

    /// Set the multiplier for exponential growth (at least 1.0).
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Delay before retrying after `attempt` prior consecutive failures
    /// (0 = first retry).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        // Past 64 doublings the cap has long been reached.
        let exponent = attempt.min(64) as i32;
        let delay_ms = (self.initial_ms as f64) * self.multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_ms as f64) as u64;
        Duration::from_millis(capped_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Default for BackoffStrategy {
    /// 1 second initial, 5 minutes max, 2x multiplier
    fn default() -> Self {
        Self::new(1_000, 300_000)
    }
}
