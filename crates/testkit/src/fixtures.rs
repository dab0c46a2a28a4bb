//! Builders for test contents and catalogs.

use slotinv_core::{Content, InventoryError, ItemId, Slot, StackSizeTable};

/// Build a content from `(item, quantity)` pairs; `None` is an empty slot.
pub fn content_of(slots: &[Option<(&str, u32)>]) -> Content {
    Content::from_slots(
        slots
            .iter()
            .map(|slot| match slot {
                Some((item, quantity)) => Slot::new(*item, *quantity),
                None => Slot::default(),
            })
            .collect(),
    )
}

/// Build a stack size table from a default plus overrides.
pub fn stack_table(default: u32, overrides: &[(&str, u32)]) -> Result<StackSizeTable, InventoryError> {
    overrides
        .iter()
        .try_fold(StackSizeTable::new(default)?, |table, (item, size)| {
            table.with(*item, *size)
        })
}

/// Total quantity of `item` across several contents.
pub fn total_quantity<'a, I>(contents: I, item: &str) -> u64
where
    I: IntoIterator<Item = &'a Content>,
{
    let item = ItemId::new(item);
    contents
        .into_iter()
        .map(|content| content.item_quantity(&item))
        .sum()
}
