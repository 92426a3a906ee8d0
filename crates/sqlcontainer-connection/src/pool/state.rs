//! Membership bookkeeping for pooled connections
//!
//! Every connection the pool owns sits in exactly one slot, and each slot
//! is either available or reserved. Slots are removed only when a
//! connection is discarded.

use std::sync::Arc;

use sqlcontainer_core::{Connection, connection_eq};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotStatus {
    Available,
    Reserved,
}

pub(crate) struct Slot {
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) status: SlotStatus,
}

#[derive(Default)]
pub(crate) struct PoolState {
    pub(crate) slots: Vec<Slot>,
    pub(crate) initialized: bool,
}

impl PoolState {
    pub(crate) fn count(&self, status: SlotStatus) -> usize {
        self.slots.iter().filter(|s| s.status == status).count()
    }

    pub(crate) fn available(&self) -> Vec<Arc<dyn Connection>> {
        self.connections(SlotStatus::Available)
    }

    pub(crate) fn connections(&self, status: SlotStatus) -> Vec<Arc<dyn Connection>> {
        self.slots
            .iter()
            .filter(|s| s.status == status)
            .map(|s| Arc::clone(&s.connection))
            .collect()
    }

    pub(crate) fn push(&mut self, connection: Arc<dyn Connection>, status: SlotStatus) {
        self.slots.push(Slot { connection, status });
    }

    /// Move the first available connection to reserved
    pub(crate) fn take_available(&mut self) -> Option<Arc<dyn Connection>> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.status == SlotStatus::Available)?;
        slot.status = SlotStatus::Reserved;
        Some(Arc::clone(&slot.connection))
    }

    pub(crate) fn position(
        &self,
        connection: &Arc<dyn Connection>,
        status: SlotStatus,
    ) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.status == status && connection_eq(&s.connection, connection))
    }
}
