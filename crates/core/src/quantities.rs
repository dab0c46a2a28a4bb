//! Insertion-ordered item → quantity batches.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// Signed quantities per item, iterated in insertion order.
///
/// Batch transactions process items in this order, so the same batch always
/// produces the same slot layout. Positive values add, negative values
/// withdraw.
///
/// Adding to an item accumulates into its entry. When the sum no longer fits
/// in an `i32` the excess opens a further entry for the same item, so no
/// quantity is ever clamped away; [`ItemQuantities::get`] reports the exact
/// total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(ItemId, i32)>", into = "Vec<(ItemId, i32)>")]
pub struct ItemQuantities {
    entries: Vec<(ItemId, i32)>,
}

impl ItemQuantities {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to `item`, keeping the item's first position.
    pub fn add(&mut self, item: impl Into<ItemId>, quantity: i32) {
        let item = item.into();
        if let Some(position) = self.entries.iter().rposition(|(id, _)| *id == item) {
            if let Some(sum) = self.entries[position].1.checked_add(quantity) {
                self.entries[position].1 = sum;
                return;
            }
        }
        self.entries.push((item, quantity));
    }

    /// Builder form of [`ItemQuantities::add`].
    pub fn with(mut self, item: impl Into<ItemId>, quantity: i32) -> Self {
        self.add(item, quantity);
        self
    }

    /// Total quantity recorded for `item`.
    pub fn get(&self, item: &ItemId) -> Option<i64> {
        self.entries
            .iter()
            .filter(|(id, _)| id == item)
            .map(|(_, quantity)| i64::from(*quantity))
            .reduce(|total, quantity| total + quantity)
    }

    /// Whether `item` has an entry.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.get(item).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, i32)> + '_ {
        self.entries.iter().map(|(item, quantity)| (item, *quantity))
    }

    /// Iterate item ids in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.entries.iter().map(|(item, _)| item)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of absolute quantities.
    pub fn total_magnitude(&self) -> u64 {
        self.entries
            .iter()
            .map(|(_, quantity)| u64::from(quantity.unsigned_abs()))
            .sum()
    }
}

impl From<Vec<(ItemId, i32)>> for ItemQuantities {
    fn from(entries: Vec<(ItemId, i32)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ItemQuantities> for Vec<(ItemId, i32)> {
    fn from(batch: ItemQuantities) -> Self {
        batch.entries
    }
}

impl<I: Into<ItemId>> FromIterator<(I, i32)> for ItemQuantities {
    fn from_iter<T: IntoIterator<Item = (I, i32)>>(iter: T) -> Self {
        let mut batch = Self::new();
        for (item, quantity) in iter {
            batch.add(item, quantity);
        }
        batch
    }
}

impl<I: Into<ItemId>> Extend<(I, i32)> for ItemQuantities {
    fn extend<T: IntoIterator<Item = (I, i32)>>(&mut self, iter: T) {
        for (item, quantity) in iter {
            self.add(item, quantity);
        }
    }
}
