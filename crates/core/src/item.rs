//! Item identity and stack-size lookup.
//!
//! The engine never owns an item catalog. Hosts answer "how many of this item
//! fit in one slot" through [`StackSizeProvider`]; everything else only needs
//! the [`ItemId`] to compare stacks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;

use crate::error::InventoryError;

/// Maximum stack size used when the host does not say otherwise.
pub const DEFAULT_MAX_STACK_SIZE: u32 = 255;

/// Identifier of an item type (e.g. `wood`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Answers the maximum stack size of an item.
///
/// Sizes are `NonZeroU32`; zero is rejected where the table is built.
pub trait StackSizeProvider {
    /// Maximum quantity of `item` a single slot may hold.
    fn max_stack_size(&self, item: &ItemId) -> NonZeroU32;

    /// Resolve sizes for several items at once.
    fn max_stack_sizes<'a, I>(&self, items: I) -> BTreeMap<ItemId, NonZeroU32>
    where
        I: IntoIterator<Item = &'a ItemId>,
        Self: Sized,
    {
        items
            .into_iter()
            .map(|item| (item.clone(), self.max_stack_size(item)))
            .collect()
    }
}

/// Same stack size for every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStackSize(pub NonZeroU32);

impl FixedStackSize {
    /// Build a fixed provider, rejecting zero.
    pub fn new(size: u32) -> Result<Self, InventoryError> {
        NonZeroU32::new(size)
            .map(Self)
            .ok_or(InventoryError::ZeroStackSize { item: None })
    }
}

impl Default for FixedStackSize {
    fn default() -> Self {
        Self(default_stack_size())
    }
}

impl StackSizeProvider for FixedStackSize {
    fn max_stack_size(&self, _item: &ItemId) -> NonZeroU32 {
        self.0
    }
}

/// Default size plus per-item overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSizeTable {
    default: NonZeroU32,
    overrides: BTreeMap<ItemId, NonZeroU32>,
}

impl Default for StackSizeTable {
    fn default() -> Self {
        Self {
            default: default_stack_size(),
            overrides: BTreeMap::new(),
        }
    }
}

impl StackSizeTable {
    /// Create a table whose unknown items use `default`.
    pub fn new(default: u32) -> Result<Self, InventoryError> {
        let default =
            NonZeroU32::new(default).ok_or(InventoryError::ZeroStackSize { item: None })?;
        Ok(Self {
            default,
            overrides: BTreeMap::new(),
        })
    }

    /// Set the stack size of one item.
    pub fn set(&mut self, item: impl Into<ItemId>, size: u32) -> Result<(), InventoryError> {
        let item = item.into();
        let size = NonZeroU32::new(size).ok_or_else(|| InventoryError::ZeroStackSize {
            item: Some(item.clone()),
        })?;
        self.overrides.insert(item, size);
        Ok(())
    }

    /// Builder form of [`StackSizeTable::set`].
    pub fn with(mut self, item: impl Into<ItemId>, size: u32) -> Result<Self, InventoryError> {
        self.set(item, size)?;
        Ok(self)
    }

    /// Size used for items without an override.
    pub fn default_size(&self) -> NonZeroU32 {
        self.default
    }

    /// Number of per-item overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Whether the table only carries the default size.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl StackSizeProvider for StackSizeTable {
    fn max_stack_size(&self, item: &ItemId) -> NonZeroU32 {
        self.overrides.get(item).copied().unwrap_or(self.default)
    }
}

fn default_stack_size() -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(DEFAULT_MAX_STACK_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_255() {
        let table = StackSizeTable::default();
        assert_eq!(table.max_stack_size(&ItemId::new("wood")).get(), 255);
        assert_eq!(FixedStackSize::default().0.get(), DEFAULT_MAX_STACK_SIZE);
    }

    #[test]
    fn overrides_take_precedence() {
        let table = StackSizeTable::new(64)
            .unwrap()
            .with("sword", 1)
            .unwrap();
        assert_eq!(table.max_stack_size(&"sword".into()).get(), 1);
        assert_eq!(table.max_stack_size(&"dirt".into()).get(), 64);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(StackSizeTable::new(0).is_err());
        assert!(FixedStackSize::new(0).is_err());

        let mut table = StackSizeTable::default();
        let err = table.set("ghost", 0).unwrap_err();
        assert_eq!(
            err,
            InventoryError::ZeroStackSize {
                item: Some(ItemId::new("ghost"))
            }
        );
        assert!(table.is_empty());
    }

    #[test]
    fn bulk_lookup_resolves_every_item() {
        let table = StackSizeTable::default().with("egg", 16).unwrap();
        let items = [ItemId::new("egg"), ItemId::new("wood")];
        let sizes = table.max_stack_sizes(items.iter());
        assert_eq!(sizes[&ItemId::new("egg")].get(), 16);
        assert_eq!(sizes[&ItemId::new("wood")].get(), 255);
    }
}
