//! Fixed-capacity slot arrays and multi-slot transactions.
//!
//! [`Content`] owns the ordered slots of one inventory. Every operation here
//! is a bounded in-memory computation: slots are visited in index order,
//! batch items in caller order, and every touched index is reported through a
//! [`ModificationResult`] so the host can flush change notifications.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

use crate::item::{ItemId, StackSizeProvider};
use crate::quantities::ItemQuantities;
use crate::slot::{Slot, SlotRule};

/// Rules for content-level transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRule {
    /// All-or-nothing: either the whole request applies or nothing changes.
    pub atomic: bool,
    /// Top up existing partial stacks before claiming empty slots.
    pub prefer_merge: bool,
    /// Allow incoming quantity to merge into occupied slots at all.
    pub allow_auto_stacking: bool,
}

impl Default for ContentRule {
    fn default() -> Self {
        Self {
            atomic: false,
            prefer_merge: true,
            allow_auto_stacking: true,
        }
    }
}

impl ContentRule {
    /// Default rule with all-or-nothing semantics.
    pub fn atomic() -> Self {
        Self {
            atomic: true,
            ..Self::default()
        }
    }

    fn relaxed(&self) -> Self {
        Self {
            atomic: false,
            ..*self
        }
    }
}

/// What a content transaction touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationResult {
    /// Indices whose slot value changed.
    pub modified_slots: BTreeSet<usize>,
    /// Whether any slot changed.
    pub modified_something: bool,
    /// Whether a visited slot was drained to empty.
    pub created_empty_slot: bool,
    /// Quantity per item that could not be applied.
    pub overflow: ItemQuantities,
}

impl ModificationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, index: usize, emptied: bool) {
        self.modified_slots.insert(index);
        self.modified_something = true;
        if emptied {
            self.created_empty_slot = true;
        }
    }

    fn absorb(&mut self, other: ModificationResult) {
        self.modified_slots.extend(other.modified_slots);
        self.modified_something |= other.modified_something;
        self.created_empty_slot |= other.created_empty_slot;
        self.overflow = other.overflow;
    }
}

#[derive(Debug, Default)]
struct PassOutcome {
    modified: bool,
    created_empty_slot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackPass {
    /// Occupied slots holding the item only.
    MergeOnly,
    /// Matching and empty slots.
    Open,
}

/// Ordered, indexable slots of one inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content {
    slots: Vec<Slot>,
}

impl Content {
    /// Create `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::default(); capacity],
        }
    }

    /// Wrap existing slot values.
    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Consume the content, returning its slots.
    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Resize to `capacity` slots.
    ///
    /// Surviving slots keep their values and added slots start empty.
    /// Shrinking discards the removed slots' contents.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.slots.resize_with(capacity, Slot::default);
    }

    /// Whether `index` addresses a slot.
    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.slots.len()
    }

    /// Slot at `index`.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Mutable slot at `index`.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Iterate slots in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    /// Total quantity of `item` across non-empty slots.
    pub fn item_quantity(&self, item: &ItemId) -> u64 {
        self.slots
            .iter()
            .filter(|slot| slot.stack_item() == Some(item))
            .map(|slot| u64::from(slot.quantity))
            .sum()
    }

    /// Number of empty slots.
    pub fn empty_slot_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_empty()).count()
    }

    /// Whether every slot is empty.
    pub fn contains_only_empty_slots(&self) -> bool {
        self.slots.iter().all(Slot::is_empty)
    }

    /// Index of the first empty slot.
    pub fn first_empty_slot_index(&self) -> Option<usize> {
        self.slots.iter().position(Slot::is_empty)
    }

    /// Apply a batch of signed item quantities across the content.
    ///
    /// Per item, a merge-only pass tops up matching stacks (when
    /// `prefer_merge`), then an open pass may claim empty slots. Leftovers are
    /// reported in `result.overflow`. If the batch drained a slot while
    /// something is still left over, the leftover is retried: each retry
    /// strictly shrinks the leftover, so the loop is bounded.
    ///
    /// Returns whether any slot changed.
    pub fn receive_stacks<P>(
        &mut self,
        items: &ItemQuantities,
        rule: &ContentRule,
        stack_sizes: &P,
        result: &mut ModificationResult,
    ) -> bool
    where
        P: StackSizeProvider + ?Sized,
    {
        if rule.atomic {
            return self.receive_stacks_exact_with(items, rule, stack_sizes, result);
        }

        let mut pending = items.clone();
        let mut modified = false;
        loop {
            let mut pass = PassOutcome::default();
            let mut leftover = ItemQuantities::new();

            for (item, quantity) in pending.iter() {
                if quantity == 0 {
                    continue;
                }
                let max_stack_size = stack_sizes.max_stack_size(item).get();
                let mut remaining = quantity;

                if rule.prefer_merge {
                    self.receive_stack_pass(
                        item,
                        &mut remaining,
                        max_stack_size,
                        StackPass::MergeOnly,
                        rule,
                        result,
                        &mut pass,
                    );
                }
                self.receive_stack_pass(
                    item,
                    &mut remaining,
                    max_stack_size,
                    StackPass::Open,
                    rule,
                    result,
                    &mut pass,
                );

                if remaining != 0 {
                    leftover.add(item.clone(), remaining);
                }
            }

            modified |= pass.modified;
            if !(pass.modified && pass.created_empty_slot && !leftover.is_empty()) {
                result.overflow = leftover;
                break;
            }

            debug_assert!(
                leftover.total_magnitude() < pending.total_magnitude(),
                "batch retry must consume quantity"
            );
            trace!(
                leftover_items = leftover.len(),
                leftover_total = leftover.total_magnitude(),
                "retrying batch after a slot was emptied"
            );
            pending = leftover;
        }

        modified
    }

    /// All-or-nothing batch receive.
    ///
    /// Runs the batch on a scratch copy and commits it only when every item
    /// was fully applied. On failure the content is untouched and
    /// `result.overflow` holds what would not fit.
    pub fn try_receive_stacks_exact<P>(
        &mut self,
        items: &ItemQuantities,
        stack_sizes: &P,
        result: &mut ModificationResult,
    ) -> bool
    where
        P: StackSizeProvider + ?Sized,
    {
        self.receive_stacks_exact_with(items, &ContentRule::default(), stack_sizes, result)
    }

    fn receive_stacks_exact_with<P>(
        &mut self,
        items: &ItemQuantities,
        rule: &ContentRule,
        stack_sizes: &P,
        result: &mut ModificationResult,
    ) -> bool
    where
        P: StackSizeProvider + ?Sized,
    {
        let mut scratch = self.clone();
        let mut scratch_result = ModificationResult::new();
        scratch.receive_stacks(items, &rule.relaxed(), stack_sizes, &mut scratch_result);

        if !scratch_result.overflow.is_empty() {
            result.overflow = scratch_result.overflow;
            return false;
        }

        *self = scratch;
        result.absorb(scratch_result);
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn receive_stack_pass(
        &mut self,
        item: &ItemId,
        remaining: &mut i32,
        max_stack_size: u32,
        pass_kind: StackPass,
        rule: &ContentRule,
        result: &mut ModificationResult,
        pass: &mut PassOutcome,
    ) {
        let slot_rule = match pass_kind {
            StackPass::MergeOnly => SlotRule::merge_only(),
            StackPass::Open => SlotRule::default(),
        };

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if *remaining == 0 {
                break;
            }
            // Without auto-stacking, incoming stacks only claim empty slots.
            if !rule.allow_auto_stacking && *remaining > 0 && !slot.is_empty() {
                continue;
            }
            if slot.receive_stack(item, remaining, &slot_rule, max_stack_size) {
                let emptied = slot.is_empty();
                result.record(index, emptied);
                pass.modified = true;
                pass.created_empty_slot |= emptied;
            }
        }
    }

    /// Let the slot at `index` receive `source`.
    pub fn receive_slot_at_index(
        &mut self,
        source: &mut Slot,
        index: usize,
        rule: &SlotRule,
        max_stack_size: u32,
    ) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => slot.receive_slot(source, rule, max_stack_size),
            None => false,
        }
    }

    /// Drop `source` into whatever slots can take it.
    ///
    /// Unmodified stacks first merge into matching slots (when
    /// `prefer_merge`), then the remainder lands in empty slots. Modifier
    /// slots move whole into the first empty slot. Every touched index is
    /// recorded in `result`.
    pub fn receive_slot(
        &mut self,
        source: &mut Slot,
        rule: &ContentRule,
        max_stack_size: u32,
        result: &mut ModificationResult,
    ) -> bool {
        if source.is_empty() {
            return false;
        }

        if rule.atomic {
            let mut scratch = self.clone();
            let mut scratch_source = source.clone();
            let mut scratch_result = ModificationResult::new();
            scratch.receive_slot(&mut scratch_source, &rule.relaxed(), max_stack_size, &mut scratch_result);
            if !scratch_source.is_empty() {
                return false;
            }
            *self = scratch;
            *source = scratch_source;
            result.absorb(scratch_result);
            return true;
        }

        let mut received = false;
        let can_stack = rule.allow_auto_stacking && !source.has_modifiers();

        if rule.prefer_merge && can_stack {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if source.is_empty() {
                    break;
                }
                if slot.receive_slot(source, &SlotRule::merge_only(), max_stack_size) {
                    result.record(index, false);
                    received = true;
                }
            }
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if source.is_empty() {
                break;
            }
            let slot_rule = if slot.is_empty() {
                SlotRule::swap_allowed()
            } else if can_stack && !rule.prefer_merge {
                SlotRule::merge_only()
            } else {
                continue;
            };
            if slot.receive_slot(source, &slot_rule, max_stack_size) {
                result.record(index, false);
                received = true;
            }
        }

        received
    }

    /// Move the slot at `source_index` onto the slot at `dest_index`.
    ///
    /// Fails on invalid indices and when both indices are the same slot.
    pub fn move_slot(
        &mut self,
        source_index: usize,
        dest_index: usize,
        rule: &SlotRule,
        max_stack_size: u32,
    ) -> bool {
        match self.pair_mut(source_index, dest_index) {
            Some((source, dest)) => dest.receive_slot(source, rule, max_stack_size),
            None => false,
        }
    }

    /// Pull every unmodified stack of the same item into the slot at `index`.
    ///
    /// Donors are visited in index order until the target is full. Every
    /// donor that changed is recorded; the target is recorded when at least
    /// one donor changed. Returns whether anything moved.
    pub fn regroup_similar_items_at_index(
        &mut self,
        index: usize,
        result: &mut ModificationResult,
        max_stack_size: u32,
    ) -> bool {
        let item = match self.slot(index) {
            Some(target) if !target.has_modifiers() => match target.stack_item() {
                Some(item) => item.clone(),
                None => return false,
            },
            _ => return false,
        };

        let mut changed = false;
        for donor_index in 0..self.slots.len() {
            let Some((donor, target)) = self.pair_mut(donor_index, index) else {
                continue;
            };
            if target.quantity >= max_stack_size {
                break;
            }
            if !donor.can_merge(&item) {
                continue;
            }
            if target.receive_slot(donor, &SlotRule::merge_only(), max_stack_size) {
                let emptied = donor.is_empty();
                result.record(donor_index, emptied);
                changed = true;
            }
        }

        if changed {
            result.record(index, false);
        }
        changed
    }

    /// Move the slot at `source_index` into slot `dest_index` of another content.
    ///
    /// Not atomic across the two contents: whatever the destination does not
    /// accept is left in the source slot, exactly.
    pub fn transfer_slot_at_index(
        &mut self,
        source_index: usize,
        dest: &mut Content,
        dest_index: usize,
        rule: &SlotRule,
        max_stack_size: u32,
    ) -> bool {
        match self.slots.get_mut(source_index) {
            Some(source) => dest.receive_slot_at_index(source, dest_index, rule, max_stack_size),
            None => false,
        }
    }

    /// Move the slot at `source_index` into any available slots of another content.
    pub fn transfer_slot(
        &mut self,
        source_index: usize,
        dest: &mut Content,
        rule: &ContentRule,
        max_stack_size: u32,
        result: &mut ModificationResult,
    ) -> bool {
        match self.slots.get_mut(source_index) {
            Some(source) => dest.receive_slot(source, rule, max_stack_size, result),
            None => false,
        }
    }

    /// Two distinct mutable slots, `(first, second)` in argument order.
    fn pair_mut(&mut self, first: usize, second: usize) -> Option<(&mut Slot, &mut Slot)> {
        if first == second || first >= self.slots.len() || second >= self.slots.len() {
            return None;
        }
        if first < second {
            let (head, tail) = self.slots.split_at_mut(second);
            Some((&mut head[first], &mut tail[0]))
        } else {
            let (head, tail) = self.slots.split_at_mut(first);
            Some((&mut tail[0], &mut head[second]))
        }
    }
}

impl<'a> IntoIterator for &'a Content {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{FixedStackSize, StackSizeTable};
    use crate::modifier::Modifier;

    fn content(slots: &[Option<(&str, u32)>]) -> Content {
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

    fn batch(items: &[(&str, i32)]) -> ItemQuantities {
        items.iter().map(|(item, quantity)| (*item, *quantity)).collect()
    }

    #[test]
    fn index_validation() {
        let mut content = Content::new(2);
        assert!(content.is_valid_index(1));
        assert!(!content.is_valid_index(2));
        assert!(content.slot(2).is_none());
        assert!(content.slot_mut(5).is_none());
    }

    #[test]
    fn capacity_changes_preserve_prefix() {
        let mut content = content(&[Some(("wood", 3)), Some(("stone", 4))]);
        content.set_capacity(4);
        assert_eq!(content.capacity(), 4);
        assert_eq!(content.slot(0), Some(&Slot::new("wood", 3)));
        assert!(content.slot(3).unwrap().is_empty());

        content.set_capacity(1);
        assert_eq!(content.slots(), &[Slot::new("wood", 3)]);
        assert_eq!(content.into_slots(), vec![Slot::new("wood", 3)]);
    }

    #[test]
    fn partial_stacks_fill_before_empty_slots() {
        let mut content = content(&[None, Some(("wood", 250))]);
        let mut result = ModificationResult::new();
        let sizes = FixedStackSize::default();

        assert!(content.receive_stacks(&batch(&[("wood", 10)]), &ContentRule::default(), &sizes, &mut result));
        assert_eq!(content.slot(1).unwrap().quantity, 255);
        assert_eq!(content.slot(0), Some(&Slot::new("wood", 5)));
        assert_eq!(result.modified_slots, BTreeSet::from([0, 1]));
        assert!(result.overflow.is_empty());
    }

    #[test]
    fn without_merge_preference_first_slot_wins() {
        let mut content = content(&[None, Some(("wood", 250))]);
        let mut result = ModificationResult::new();
        let rule = ContentRule {
            prefer_merge: false,
            ..ContentRule::default()
        };

        content.receive_stacks(&batch(&[("wood", 10)]), &rule, &FixedStackSize::default(), &mut result);
        assert_eq!(content.slot(0), Some(&Slot::new("wood", 10)));
        assert_eq!(content.slot(1).unwrap().quantity, 250);
    }

    #[test]
    fn without_auto_stacking_new_stacks_claim_empty_slots() {
        let mut content = content(&[Some(("wood", 10)), None]);
        let mut result = ModificationResult::new();
        let rule = ContentRule {
            allow_auto_stacking: false,
            ..ContentRule::default()
        };

        content.receive_stacks(&batch(&[("wood", 5)]), &rule, &FixedStackSize::default(), &mut result);
        assert_eq!(content.slot(0).unwrap().quantity, 10);
        assert_eq!(content.slot(1), Some(&Slot::new("wood", 5)));

        // Withdrawals still draw from existing stacks.
        content.receive_stacks(&batch(&[("wood", -12)]), &rule, &FixedStackSize::default(), &mut result);
        assert_eq!(content.item_quantity(&"wood".into()), 3);
    }

    #[test]
    fn withdrawals_drain_in_index_order() {
        let mut content = content(&[Some(("wood", 5)), Some(("stone", 1)), Some(("wood", 5))]);
        let mut result = ModificationResult::new();

        content.receive_stacks(&batch(&[("wood", -7)]), &ContentRule::default(), &FixedStackSize::default(), &mut result);
        assert!(content.slot(0).unwrap().is_empty());
        assert_eq!(content.slot(2).unwrap().quantity, 3);
        assert!(result.created_empty_slot);
        assert!(result.overflow.is_empty());
    }

    #[test]
    fn over_withdrawal_reports_negative_overflow() {
        let mut content = content(&[Some(("wood", 5))]);
        let mut result = ModificationResult::new();

        content.receive_stacks(&batch(&[("wood", -8)]), &ContentRule::default(), &FixedStackSize::default(), &mut result);
        assert!(content.contains_only_empty_slots());
        assert_eq!(result.overflow.get(&"wood".into()), Some(-3));
    }

    #[test]
    fn emptied_slot_is_reused_by_retry() {
        // "stone" overflows on the first pass; withdrawing "wood" frees slot 0
        // which the retry then hands to the stone leftover.
        let mut content = content(&[Some(("wood", 4)), Some(("stone", 255))]);
        let mut result = ModificationResult::new();

        let changed = content.receive_stacks(
            &batch(&[("stone", 20), ("wood", -4)]),
            &ContentRule::default(),
            &FixedStackSize::default(),
            &mut result,
        );
        assert!(changed);
        assert_eq!(content.slot(0), Some(&Slot::new("stone", 20)));
        assert!(result.overflow.is_empty());
        assert_eq!(result.modified_slots, BTreeSet::from([0]));
    }

    #[test]
    fn mixed_batch_uses_per_item_stack_sizes() {
        let sizes = StackSizeTable::new(64).unwrap().with("egg", 16).unwrap();
        let mut content = Content::new(3);
        let mut result = ModificationResult::new();

        content.receive_stacks(&batch(&[("egg", 20), ("dirt", 70)]), &ContentRule::default(), &sizes, &mut result);
        assert_eq!(content.slot(0), Some(&Slot::new("egg", 16)));
        assert_eq!(content.slot(1), Some(&Slot::new("egg", 4)));
        assert_eq!(content.slot(2), Some(&Slot::new("dirt", 64)));
        assert_eq!(result.overflow, batch(&[("dirt", 6)]));
    }

    #[test]
    fn exact_batch_is_all_or_nothing() {
        let mut content = content(&[Some(("wood", 250)), None]);
        let before = content.clone();
        let mut result = ModificationResult::new();
        let sizes = FixedStackSize::default();

        assert!(!content.try_receive_stacks_exact(&batch(&[("wood", 300)]), &sizes, &mut result));
        assert_eq!(content, before);
        assert!(result.modified_slots.is_empty());
        assert_eq!(result.overflow.get(&"wood".into()), Some(40));

        let mut result = ModificationResult::new();
        assert!(content.try_receive_stacks_exact(&batch(&[("wood", 100)]), &sizes, &mut result));
        assert_eq!(content.item_quantity(&"wood".into()), 350);
        assert_eq!(result.modified_slots, BTreeSet::from([0, 1]));
    }

    #[test]
    fn atomic_rule_routes_through_exact_batch() {
        let mut content = Content::new(1);
        let mut result = ModificationResult::new();
        let changed = content.receive_stacks(
            &batch(&[("wood", 256)]),
            &ContentRule::atomic(),
            &FixedStackSize::default(),
            &mut result,
        );
        assert!(!changed);
        assert!(content.contains_only_empty_slots());
    }

    #[test]
    fn modifier_slots_are_skipped_by_batches() {
        let mut content = Content::from_slots(vec![
            Slot::with_modifiers("wood", 5, vec![Modifier::tag("bound")]),
            Slot::default(),
        ]);
        let mut result = ModificationResult::new();

        content.receive_stacks(&batch(&[("wood", 10)]), &ContentRule::default(), &FixedStackSize::default(), &mut result);
        assert_eq!(content.slot(0).unwrap().quantity, 5);
        assert_eq!(content.slot(1), Some(&Slot::new("wood", 10)));

        content.receive_stacks(&batch(&[("wood", -15)]), &ContentRule::default(), &FixedStackSize::default(), &mut result);
        assert_eq!(content.slot(0).unwrap().quantity, 5);
        assert_eq!(result.overflow.get(&"wood".into()), Some(-5));
    }

    #[test]
    fn receive_slot_merges_then_claims_empty() {
        let mut content = content(&[None, Some(("wood", 250)), Some(("stone", 1))]);
        let mut source = Slot::new("wood", 20);
        let mut result = ModificationResult::new();

        assert!(content.receive_slot(&mut source, &ContentRule::default(), 255, &mut result));
        assert!(source.is_empty());
        assert_eq!(content.slot(1).unwrap().quantity, 255);
        assert_eq!(content.slot(0), Some(&Slot::new("wood", 15)));
        assert_eq!(result.modified_slots, BTreeSet::from([0, 1]));
    }

    #[test]
    fn receive_slot_places_modifier_slot_whole() {
        let mut content = content(&[Some(("stone", 3)), None]);
        let mut source = Slot::with_modifiers("stone", 2, vec![Modifier::tag("x")]);
        let mut result = ModificationResult::new();

        assert!(content.receive_slot(&mut source, &ContentRule::default(), 255, &mut result));
        assert!(source.is_empty());
        assert_eq!(content.slot(0).unwrap().quantity, 3);
        assert!(content.slot(1).unwrap().has_modifiers());
        assert_eq!(result.modified_slots, BTreeSet::from([1]));
    }

    #[test]
    fn receive_slot_reports_remainder_when_full() {
        let mut content = content(&[Some(("wood", 250))]);
        let mut source = Slot::new("wood", 20);
        let mut result = ModificationResult::new();

        assert!(content.receive_slot(&mut source, &ContentRule::default(), 255, &mut result));
        assert_eq!(source.quantity, 15);

        let mut atomic_source = Slot::new("wood", 5);
        assert!(!content.receive_slot(&mut atomic_source, &ContentRule::atomic(), 255, &mut result));
        assert_eq!(atomic_source.quantity, 5);
    }

    #[test]
    fn move_slot_rejects_self_and_invalid_indices() {
        let mut content = content(&[Some(("wood", 3)), None]);
        assert!(!content.move_slot(0, 0, &SlotRule::swap_allowed(), 255));
        assert!(!content.move_slot(0, 5, &SlotRule::swap_allowed(), 255));
        assert!(!content.move_slot(7, 0, &SlotRule::swap_allowed(), 255));

        assert!(content.move_slot(0, 1, &SlotRule::swap_allowed(), 255));
        assert!(content.slot(0).unwrap().is_empty());
        assert_eq!(content.slot(1), Some(&Slot::new("wood", 3)));

        assert!(content.move_slot(1, 0, &SlotRule::default(), 255));
        assert_eq!(content.slot(0), Some(&Slot::new("wood", 3)));
    }

    #[test]
    fn regroup_stops_when_target_is_full() {
        let mut content = content(&[Some(("wood", 5)), Some(("wood", 200)), Some(("wood", 100))]);
        let mut result = ModificationResult::new();

        assert!(content.regroup_similar_items_at_index(0, &mut result, 255));
        assert_eq!(content.slot(0).unwrap().quantity, 255);
        assert!(content.slot(1).unwrap().is_empty());
        assert_eq!(content.slot(2).unwrap().quantity, 50);
        assert_eq!(result.modified_slots, BTreeSet::from([0, 1, 2]));
        assert!(result.created_empty_slot);
    }

    #[test]
    fn regroup_ignores_modifier_slots_and_other_items() {
        let mut content = Content::from_slots(vec![
            Slot::new("wood", 5),
            Slot::with_modifiers("wood", 10, vec![Modifier::tag("x")]),
            Slot::new("stone", 10),
        ]);
        let mut result = ModificationResult::new();

        assert!(!content.regroup_similar_items_at_index(0, &mut result, 255));
        assert!(result.modified_slots.is_empty());
        assert!(!content.regroup_similar_items_at_index(1, &mut result, 255));
        assert!(!content.regroup_similar_items_at_index(9, &mut result, 255));
    }

    #[test]
    fn cross_content_transfer_writes_back_exact_remainder() {
        let mut source = content(&[Some(("wood", 100))]);
        let mut dest = content(&[Some(("wood", 200))]);

        assert!(source.transfer_slot_at_index(0, &mut dest, 0, &SlotRule::default(), 255));
        assert_eq!(dest.slot(0).unwrap().quantity, 255);
        assert_eq!(source.slot(0), Some(&Slot::new("wood", 45)));

        assert!(!source.transfer_slot_at_index(0, &mut dest, 0, &SlotRule::default(), 255));
        assert_eq!(source.slot(0).unwrap().quantity, 45);
        assert!(!source.transfer_slot_at_index(3, &mut dest, 0, &SlotRule::default(), 255));
    }

    #[test]
    fn cross_content_drop_anywhere() {
        let mut source = content(&[Some(("wood", 300))]);
        let mut dest = content(&[Some(("wood", 250)), None, None]);
        let mut result = ModificationResult::new();

        assert!(source.transfer_slot(0, &mut dest, &ContentRule::default(), 255, &mut result));
        assert!(source.slot(0).unwrap().is_empty());
        assert_eq!(dest.item_quantity(&"wood".into()), 550);
        assert_eq!(result.modified_slots, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn queries() {
        let content = content(&[Some(("wood", 5)), None, Some(("wood", 7)), Some(("stone", 1))]);
        assert_eq!(content.item_quantity(&"wood".into()), 12);
        assert_eq!(content.empty_slot_count(), 1);
        assert_eq!(content.first_empty_slot_index(), Some(1));
        assert!(!content.contains_only_empty_slots());
        assert_eq!((&content).into_iter().count(), 4);
    }
}
