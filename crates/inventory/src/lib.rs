#![warn(missing_docs)]
//! Host layer for slot inventories.
//!
//! [`SlotInventory`] wraps a [`Content`](slotinv_core::Content) with the
//! bookkeeping a game host needs: a stack size catalog, a dirty index set and
//! coalesced change notifications flushed once per update cycle.

pub mod config;
mod inventory;
pub mod replication;

pub use config::InventoryConfig;
pub use inventory::SlotInventory;
pub use replication::{ReplicationMessage, ReplicationSink};
