//! Boundary errors.
//!
//! Transactions themselves report failure through `bool` results and overflow
//! maps; these errors only come from validating host input.

use thiserror::Error;

use crate::item::ItemId;

/// Errors raised while validating host-provided inventory input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// A stack size of zero was supplied.
    #[error("max stack size must be positive (item: {})", display_item(.item))]
    ZeroStackSize {
        /// Item the size was supplied for, if any.
        item: Option<ItemId>,
    },
    /// A slot index outside `[0, capacity)` was supplied.
    #[error("slot index {index} out of range (capacity {capacity})")]
    InvalidIndex {
        /// Offending index.
        index: usize,
        /// Capacity of the content at the time of the call.
        capacity: usize,
    },
    /// A capacity above the accepted limit was supplied.
    #[error("capacity {capacity} exceeds limit {max}")]
    CapacityTooLarge {
        /// Requested capacity.
        capacity: usize,
        /// Largest accepted capacity.
        max: usize,
    },
    /// A batch carried more slot updates than the content can hold.
    #[error("{count} slot updates exceed limit {max}")]
    TooManySlotUpdates {
        /// Number of updates in the batch.
        count: usize,
        /// Largest accepted batch.
        max: usize,
    },
}

fn display_item(item: &Option<ItemId>) -> String {
    match item {
        Some(item) => item.to_string(),
        None => "<default>".to_string(),
    }
}
