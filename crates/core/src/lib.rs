#![warn(missing_docs)]
//! Slot-based inventory content engine.
//!
//! A [`Content`] is a fixed-capacity array of [`Slot`]s. Each slot holds a
//! quantity of one item plus an ordered list of [`Modifier`]s. Quantities
//! move between slots and between contents under per-item stack limits
//! supplied by a [`StackSizeProvider`], following the [`SlotRule`] and
//! [`ContentRule`] of each call.
//!
//! The engine is synchronous and holds no locks; the host serializes access
//! and flushes change notifications from the reported dirty indices.

pub mod changes;
pub mod content;
pub mod error;
pub mod item;
pub mod modifier;
pub mod quantities;
pub mod slot;

pub use changes::{ChangeSink, ContentChanges, SlotChange};
pub use content::{Content, ContentRule, ModificationResult};
pub use error::InventoryError;
pub use item::{FixedStackSize, ItemId, StackSizeProvider, StackSizeTable, DEFAULT_MAX_STACK_SIZE};
pub use modifier::{Modifier, ModifierData, ModifierType};
pub use quantities::ItemQuantities;
pub use slot::{Slot, SlotRule};
