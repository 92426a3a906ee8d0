//! Recovery after a failed health probe

use std::sync::Arc;

use async_trait::async_trait;
use sqlcontainer_core::{Connection, Result};

use crate::pool::connector::{Connector, close_quietly};
use crate::pool::state::{PoolState, SlotStatus};

/// Access to the pool's available connections while a recovery runs.
///
/// Handed to a `RecoveryHook` with the pool lock held, so reservations and
/// releases wait until the hook returns. Reserved connections belong to
/// callers and are out of reach here.
pub struct RecoveryContext<'a> {
    state: &'a mut PoolState,
    connector: &'a Connector,
}

impl<'a> RecoveryContext<'a> {
    pub(crate) fn new(state: &'a mut PoolState, connector: &'a Connector) -> Self {
        Self { state, connector }
    }

    pub fn available_count(&self) -> usize {
        self.state.count(SlotStatus::Available)
    }

    pub fn reserved_count(&self) -> usize {
        self.state.count(SlotStatus::Reserved)
    }

    /// Snapshot of the connections currently available
    pub fn available_connections(&self) -> Vec<Arc<dyn Connection>> {
        self.state.available()
    }

    /// Drop each of `connections` that is still available from the pool,
    /// then close it. Close failures are ignored. Returns how many were
    /// dropped.
    pub async fn discard(&mut self, connections: &[Arc<dyn Connection>]) -> usize {
        let mut dropped = 0;
        for connection in connections {
            if let Some(index) = self.state.position(connection, SlotStatus::Available) {
                self.state.slots.remove(index);
                close_quietly(connection).await;
                dropped += 1;
            }
        }
        dropped
    }

    /// Open `count` new connections into the available set.
    ///
    /// Stops at the first failure; connections opened before it stay in
    /// the pool.
    pub async fn open_available(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let connection = self.connector.open().await?;
            self.state.push(connection, SlotStatus::Available);
        }
        Ok(())
    }
}

/// What the pool does when a health probe fails
#[async_trait]
pub trait RecoveryHook: Send + Sync + 'static {
    async fn recover(&self, ctx: &mut RecoveryContext<'_>) -> Result<()>;
}

/// Replace every available connection with a fresh one
///
/// Replacements are opened before the stale connections are dropped, so a
/// recovery cut short leaves the pool with its old connections rather
/// than none. The stale ones are dropped even when opening fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecovery;

#[async_trait]
impl RecoveryHook for DefaultRecovery {
    async fn recover(&self, ctx: &mut RecoveryContext<'_>) -> Result<()> {
        let stale = ctx.available_connections();
        tracing::info!(count = stale.len(), "recreating available connections");
        let opened = ctx.open_available(stale.len()).await;
        ctx.discard(&stale).await;
        opened
    }
}
