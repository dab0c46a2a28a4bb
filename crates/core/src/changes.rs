//! Change notifications handed to the host.
//!
//! Transactions only report which indices changed. Hosts accumulate those
//! indices and, once per update cycle, turn them into a [`ContentChanges`]
//! batch for a [`ChangeSink`] (network replication, UI refresh...).

use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::slot::Slot;

/// New value of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChange {
    /// Slot index.
    pub index: usize,
    /// Slot value after the change.
    pub slot: Slot,
}

/// Batch of slot values changed since the last flush.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChanges {
    /// Capacity of the content when the batch was built.
    pub capacity: usize,
    /// Changed slots in ascending index order.
    pub slots: Vec<SlotChange>,
}

impl ContentChanges {
    /// Collect the current values of `indices`, skipping out-of-range ones.
    pub fn collect<I>(content: &Content, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let slots = indices
            .into_iter()
            .filter_map(|index| {
                content.slot(index).map(|slot| SlotChange {
                    index,
                    slot: slot.clone(),
                })
            })
            .collect();
        Self {
            capacity: content.capacity(),
            slots,
        }
    }

    /// Every slot of `content`.
    pub fn full(content: &Content) -> Self {
        Self::collect(content, 0..content.capacity())
    }

    /// Changed indices.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map(|change| change.index)
    }

    /// Whether the batch carries no slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Receives flushed notifications.
pub trait ChangeSink {
    /// The content was resized.
    fn capacity_changed(&mut self, capacity: usize) {
        let _ = capacity;
    }

    /// Slots changed since the previous flush.
    fn slots_changed(&mut self, changes: &ContentChanges);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_skips_out_of_range_indices() {
        let content = Content::from_slots(vec![Slot::new("wood", 1), Slot::default()]);
        let changes = ContentChanges::collect(&content, [1, 0, 7]);
        assert_eq!(changes.capacity, 2);
        assert_eq!(changes.indices().collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(changes.slots[1].slot, Slot::new("wood", 1));
    }

    #[test]
    fn full_covers_every_slot() {
        let content = Content::new(3);
        let changes = ContentChanges::full(&content);
        assert_eq!(changes.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(!changes.is_empty());
        assert!(ContentChanges::default().is_empty());
    }
}
