//! Slot inventory with dirty tracking.

use std::collections::BTreeSet;

use slotinv_core::{
    ChangeSink, Content, ContentChanges, ContentRule, InventoryError, ItemId, ItemQuantities,
    ModificationResult, Modifier, Slot, SlotRule, StackSizeProvider, StackSizeTable,
};
use tracing::{debug, trace};

use crate::config::InventoryConfig;

/// A content plus the host-side bookkeeping around it.
///
/// Every mutating call records the indices it touched. Nothing is published
/// until [`SlotInventory::flush`] runs, so a burst of operations in one update
/// cycle produces a single batch of notifications.
#[derive(Debug, Clone, Default)]
pub struct SlotInventory {
    content: Content,
    stack_sizes: StackSizeTable,
    dirty: BTreeSet<usize>,
    pending_capacity: Option<usize>,
}

impl SlotInventory {
    /// Create an inventory of `capacity` empty slots.
    pub fn new(capacity: usize, stack_sizes: StackSizeTable) -> Self {
        Self {
            content: Content::new(capacity),
            stack_sizes,
            dirty: BTreeSet::new(),
            pending_capacity: None,
        }
    }

    /// Build an empty inventory from a config file's values.
    pub fn from_config(config: &InventoryConfig) -> Result<Self, InventoryError> {
        Ok(Self::new(config.capacity, config.stack_size_table()?))
    }

    /// Current slot values.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Replace every slot, resizing first when the capacity differs.
    pub fn set_content(&mut self, content: Content) {
        self.set_capacity(content.capacity());
        self.content = content;
        self.dirty.extend(0..self.content.capacity());
    }

    /// Stack size catalog.
    pub fn stack_sizes(&self) -> &StackSizeTable {
        &self.stack_sizes
    }

    /// Maximum stack size of `item` in this inventory.
    pub fn max_stack_size(&self, item: &ItemId) -> u32 {
        self.stack_sizes.max_stack_size(item).get()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.content.capacity()
    }

    /// Resize the inventory.
    ///
    /// The new capacity and every added slot are announced on the next flush.
    /// Pending changes for removed slots are dropped.
    pub fn set_capacity(&mut self, capacity: usize) {
        let current = self.content.capacity();
        if capacity == current {
            return;
        }
        debug!(from = current, to = capacity, "resizing inventory");
        self.content.set_capacity(capacity);
        self.dirty.retain(|index| *index < capacity);
        self.dirty.extend(current..capacity);
        self.pending_capacity = Some(capacity);
    }

    /// Slot at `index`.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.content.slot(index)
    }

    /// Overwrite the slot at `index`.
    pub fn set_slot(&mut self, index: usize, slot: Slot) -> bool {
        let Some(target) = self.content.slot_mut(index) else {
            return false;
        };
        *target = slot;
        self.dirty.insert(index);
        true
    }

    /// Whether `index` addresses an empty slot.
    pub fn is_empty_slot(&self, index: usize) -> bool {
        self.content.slot(index).is_some_and(Slot::is_empty)
    }

    /// Empty the slot at `index`. Returns `false` if it was already empty.
    pub fn clear_slot(&mut self, index: usize) -> bool {
        match self.content.slot_mut(index) {
            Some(slot) if !slot.is_empty() => {
                slot.reset();
                self.dirty.insert(index);
                true
            }
            _ => false,
        }
    }

    /// Number of empty slots.
    pub fn empty_slot_count(&self) -> usize {
        self.content.empty_slot_count()
    }

    /// Whether every slot is empty.
    pub fn contains_only_empty_slots(&self) -> bool {
        self.content.contains_only_empty_slots()
    }

    /// Total quantity of `item`.
    pub fn item_quantity(&self, item: &ItemId) -> u64 {
        self.content.item_quantity(item)
    }

    /// Add `delta` to the stack at `index`, returning what did not apply.
    ///
    /// Empty and modifier-bearing slots apply nothing.
    pub fn modify_slot_quantity(&mut self, index: usize, delta: i32, atomic: bool) -> i32 {
        let Some(item) = self.content.slot(index).and_then(Slot::stack_item).cloned() else {
            return delta;
        };
        let max_stack_size = self.max_stack_size(&item);
        let mut remaining = delta;
        let changed = self
            .content
            .slot_mut(index)
            .is_some_and(|slot| slot.modify_quantity(&mut remaining, atomic, max_stack_size));
        if changed {
            self.dirty.insert(index);
        }
        remaining
    }

    /// Attach `modifier` to the slot at `index`.
    ///
    /// An empty slot becomes anchored: it holds no stack but stays occupied
    /// until cleared. Returns `false` only for an out-of-range index.
    pub fn add_modifier(&mut self, index: usize, modifier: Modifier) -> bool {
        match self.content.slot_mut(index) {
            Some(slot) => {
                slot.add_modifier(modifier);
                self.dirty.insert(index);
                true
            }
            None => false,
        }
    }

    /// Apply a batch with the default rule, returning the overflow.
    pub fn receive_stacks(&mut self, items: &ItemQuantities) -> ItemQuantities {
        self.receive_stacks_with(items, &ContentRule::default()).overflow
    }

    /// Apply a batch with an explicit rule.
    pub fn receive_stacks_with(
        &mut self,
        items: &ItemQuantities,
        rule: &ContentRule,
    ) -> ModificationResult {
        let mut result = ModificationResult::new();
        self.content.receive_stacks(items, rule, &self.stack_sizes, &mut result);
        self.mark_dirty(&result);
        if !result.overflow.is_empty() {
            debug!(
                items = items.len(),
                overflow = result.overflow.total_magnitude(),
                "batch did not fully apply"
            );
        }
        result
    }

    /// Apply a batch only if every item fits.
    pub fn try_receive_stacks_exact(&mut self, items: &ItemQuantities) -> bool {
        let mut result = ModificationResult::new();
        let applied = self
            .content
            .try_receive_stacks_exact(items, &self.stack_sizes, &mut result);
        self.mark_dirty(&result);
        applied
    }

    /// Pull matching stacks into the slot at `index`.
    pub fn regroup_similar_items_at(&mut self, index: usize) -> bool {
        let Some(item) = self.content.slot(index).and_then(Slot::stack_item).cloned() else {
            return false;
        };
        let max_stack_size = self.max_stack_size(&item);
        let mut result = ModificationResult::new();
        let changed = self
            .content
            .regroup_similar_items_at_index(index, &mut result, max_stack_size);
        self.mark_dirty(&result);
        changed
    }

    /// Move the slot at `source_index` onto `dest_index` within this inventory.
    pub fn move_slot(&mut self, source_index: usize, dest_index: usize, rule: &SlotRule) -> bool {
        let Some(item) = self.content.slot(source_index).and_then(Slot::stack_item).cloned() else {
            return false;
        };
        let max_stack_size = self.max_stack_size(&item);
        let moved = self
            .content
            .move_slot(source_index, dest_index, rule, max_stack_size);
        if moved {
            self.dirty.extend([source_index, dest_index]);
        }
        moved
    }

    /// Split `amount` units off the slot at `index` into the first empty slot.
    ///
    /// Returns the index that received the split stack.
    pub fn split_slot(&mut self, index: usize, amount: u32) -> Option<usize> {
        let target = self.content.first_empty_slot_index()?;
        let split = self.content.slot_mut(index)?.split_off(amount)?;
        *self.content.slot_mut(target)? = split;
        self.dirty.extend([index, target]);
        Some(target)
    }

    /// Drop the slot at `source_index` onto slot `dest_index` of `dest`.
    ///
    /// Uses the destination's stack size; merges, or swaps when merging does
    /// not apply. `max_amount` caps the transfer (`0` means unlimited).
    pub fn drop_slot_at(
        &mut self,
        source_index: usize,
        dest: &mut SlotInventory,
        dest_index: usize,
        max_amount: u32,
    ) -> bool {
        let Some(item) = self.content.slot(source_index).and_then(Slot::stack_item).cloned() else {
            return false;
        };
        let max_stack_size = dest.max_stack_size(&item);
        let rule = SlotRule::swap_allowed().with_max_transfer(max_amount);
        let moved = self.content.transfer_slot_at_index(
            source_index,
            &mut dest.content,
            dest_index,
            &rule,
            max_stack_size,
        );
        if moved {
            self.dirty.insert(source_index);
            dest.dirty.insert(dest_index);
            trace!(source_index, dest_index, item = %item, "dropped slot at index");
        }
        moved
    }

    /// Drop the slot at `source_index` into whatever slots of `dest` take it.
    ///
    /// Modifier-bearing stacks move whole into the first empty slot. Plain
    /// stacks merge then fill empty slots, leaving the exact remainder in the
    /// source. Returns `false` when nothing moved.
    pub fn drop_slot(&mut self, source_index: usize, dest: &mut SlotInventory) -> bool {
        let Some(item) = self.content.slot(source_index).and_then(Slot::stack_item).cloned() else {
            return false;
        };
        let max_stack_size = dest.max_stack_size(&item);
        let mut result = ModificationResult::new();
        let moved = self.content.transfer_slot(
            source_index,
            &mut dest.content,
            &ContentRule::default(),
            max_stack_size,
            &mut result,
        );
        if moved {
            self.dirty.insert(source_index);
            dest.mark_dirty(&result);
            trace!(source_index, item = %item, slots = result.modified_slots.len(), "dropped slot");
        }
        moved
    }

    /// Whether a flush would deliver anything.
    pub fn has_pending_changes(&self) -> bool {
        self.pending_capacity.is_some() || !self.dirty.is_empty()
    }

    /// Indices changed since the last flush.
    pub fn dirty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter().copied()
    }

    /// Deliver pending notifications to `sink` and clear them.
    ///
    /// The capacity change, if any, comes first. Returns whether anything
    /// was delivered.
    pub fn flush(&mut self, sink: &mut dyn ChangeSink) -> bool {
        let mut delivered = false;
        if let Some(capacity) = self.pending_capacity.take() {
            sink.capacity_changed(capacity);
            delivered = true;
        }
        if !self.dirty.is_empty() {
            let dirty = std::mem::take(&mut self.dirty);
            let changes = ContentChanges::collect(&self.content, dirty);
            trace!(slots = changes.slots.len(), "flushing slot changes");
            if !changes.is_empty() {
                sink.slots_changed(&changes);
                delivered = true;
            }
        }
        delivered
    }

    /// Every slot, for a peer that needs the full state.
    pub fn full_snapshot(&self) -> ContentChanges {
        ContentChanges::full(&self.content)
    }

    fn mark_dirty(&mut self, result: &ModificationResult) {
        self.dirty.extend(result.modified_slots.iter().copied());
    }
}
