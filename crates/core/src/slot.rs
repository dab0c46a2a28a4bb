//! Single-slot storage and its stacking rules.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::modifier::{Modifier, ModifierData, ModifierType};

/// Rules applied when one slot receives quantity from a stack or another slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRule {
    /// Reject the transfer unless the full (capped) quantity fits.
    pub atomic: bool,
    /// Exchange full slot contents when merging does not apply.
    pub allow_swap: bool,
    /// Only top up a slot already holding the same item.
    pub only_merge: bool,
    /// Per-call cap on the transferred magnitude; `0` means unlimited.
    pub max_transfer_quantity: u32,
}

impl SlotRule {
    /// Merge into matching stacks only; never claim an empty slot.
    pub fn merge_only() -> Self {
        Self {
            only_merge: true,
            ..Self::default()
        }
    }

    /// Merge when possible, otherwise swap slot contents.
    pub fn swap_allowed() -> Self {
        Self {
            allow_swap: true,
            ..Self::default()
        }
    }

    /// Builder: cap the transferred quantity.
    pub fn with_max_transfer(mut self, max_transfer_quantity: u32) -> Self {
        self.max_transfer_quantity = max_transfer_quantity;
        self
    }

    /// Builder: require all-or-nothing transfers.
    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    /// Apply the transfer cap (by magnitude) to a signed delta.
    fn cap(&self, delta: i64) -> i64 {
        if self.max_transfer_quantity == 0 {
            return delta;
        }
        let cap = i64::from(self.max_transfer_quantity);
        delta.clamp(-cap, cap)
    }
}

/// One unit of inventory storage: a stack of one item plus modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Item held by the slot; only meaningful while the slot is non-empty.
    pub item: Option<ItemId>,
    /// Stack quantity.
    pub quantity: u32,
    /// Ordered modifiers; any modifier excludes the slot from auto-stacking.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl Slot {
    /// Create a plain stack.
    pub fn new(item: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item: Some(item.into()),
            quantity,
            modifiers: Vec::new(),
        }
    }

    /// Create a stack carrying modifiers.
    pub fn with_modifiers(item: impl Into<ItemId>, quantity: u32, modifiers: Vec<Modifier>) -> Self {
        Self {
            item: Some(item.into()),
            quantity,
            modifiers,
        }
    }

    /// A slot is empty when it holds no stack and no modifiers.
    ///
    /// Modifiers anchor a slot: it stays non-empty even at zero quantity.
    pub fn is_empty(&self) -> bool {
        (self.item.is_none() || self.quantity == 0) && self.modifiers.is_empty()
    }

    /// Whether any modifier is attached.
    pub fn has_modifiers(&self) -> bool {
        !self.modifiers.is_empty()
    }

    /// Item id of a non-empty stack.
    pub fn stack_item(&self) -> Option<&ItemId> {
        if self.is_empty() {
            None
        } else {
            self.item.as_ref()
        }
    }

    /// Clear item, quantity and modifiers.
    pub fn reset(&mut self) {
        self.item = None;
        self.quantity = 0;
        self.modifiers.clear();
    }

    /// Whether `item` could be merged into this slot as it stands.
    pub fn can_merge(&self, item: &ItemId) -> bool {
        !self.has_modifiers() && self.stack_item() == Some(item)
    }

    /// Add (positive) or withdraw (negative) `quantity` units of `item`.
    ///
    /// On success the transferred amount is subtracted from `quantity` and the
    /// slot is updated; a slot drained to zero is reset so it no longer claims
    /// the item. On failure neither the slot nor `quantity` change.
    pub fn receive_stack(
        &mut self,
        item: &ItemId,
        quantity: &mut i32,
        rule: &SlotRule,
        max_stack_size: u32,
    ) -> bool {
        if self.has_modifiers() {
            return false;
        }

        let empty = self.is_empty();
        if rule.only_merge && !self.can_merge(item) {
            return false;
        }
        if !empty && self.item.as_ref() != Some(item) {
            return false;
        }

        let current = if empty { 0 } else { i64::from(self.quantity) };
        let proposed = rule.cap(i64::from(*quantity));
        let mut bounded = (current + proposed).clamp(0, i64::from(max_stack_size)) - current;
        // An over-full stack (e.g. from a catalog with a larger size) must not
        // flip the direction of the transfer.
        bounded = if proposed >= 0 {
            bounded.clamp(0, proposed)
        } else {
            bounded.clamp(proposed, 0)
        };

        if rule.atomic && bounded != proposed {
            return false;
        }
        if bounded == 0 {
            return false;
        }

        // |bounded| <= |quantity|, so the narrowing below cannot fail.
        *quantity -= bounded as i32;
        self.item = Some(item.clone());
        self.quantity = (current + bounded) as u32;
        if self.quantity == 0 {
            self.reset();
        }
        true
    }

    /// Apply a signed delta to the stack's own item.
    ///
    /// Empty and modifier-bearing slots refuse every change.
    pub fn modify_quantity(&mut self, quantity: &mut i32, atomic: bool, max_stack_size: u32) -> bool {
        let Some(item) = self.stack_item().cloned() else {
            return false;
        };
        let rule = SlotRule {
            atomic,
            only_merge: true,
            ..SlotRule::default()
        };
        self.receive_stack(&item, quantity, &rule, max_stack_size)
    }

    /// Receive the contents of `source`.
    ///
    /// Unmodified stacks merge into an empty or matching slot, leaving the
    /// exact remainder in `source`. When merging does not apply and the rule
    /// allows it, the full contents (modifiers included) are swapped instead.
    /// Matching unmodified stacks never swap.
    pub fn receive_slot(&mut self, source: &mut Slot, rule: &SlotRule, max_stack_size: u32) -> bool {
        if source.is_empty() {
            return false;
        }

        if !source.has_modifiers() {
            if let Some(item) = source.stack_item().cloned() {
                let Ok(mut remaining) = i32::try_from(source.quantity) else {
                    return false;
                };
                if self.receive_stack(&item, &mut remaining, rule, max_stack_size) {
                    source.quantity = remaining as u32;
                    if source.quantity == 0 {
                        source.reset();
                    }
                    return true;
                }
                if self.can_merge(&item) {
                    return false;
                }
            }
        }

        if !rule.allow_swap || rule.only_merge {
            return false;
        }
        if source.quantity > max_stack_size {
            return false;
        }
        if rule.max_transfer_quantity != 0 && source.quantity > rule.max_transfer_quantity {
            return false;
        }

        std::mem::swap(self, source);
        true
    }

    /// Detach `amount` units into a new slot.
    ///
    /// Only unmodified stacks split; modifiers cannot be duplicated.
    pub fn split_off(&mut self, amount: u32) -> Option<Slot> {
        if amount == 0 || self.has_modifiers() || amount > self.quantity {
            return None;
        }
        let item = self.stack_item()?.clone();

        self.quantity -= amount;
        if self.quantity == 0 {
            self.reset();
        }
        Some(Slot::new(item, amount))
    }

    /// First modifier of the given type.
    pub fn modifier_by_type(&self, kind: &ModifierType) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| &m.kind == kind)
    }

    /// Mutable access to the first modifier of the given type.
    pub fn modifier_by_type_mut(&mut self, kind: &ModifierType) -> Option<&mut Modifier> {
        self.modifiers.iter_mut().find(|m| &m.kind == kind)
    }

    /// Every modifier of the given type, in slot order.
    pub fn modifiers_by_type<'a>(
        &'a self,
        kind: &'a ModifierType,
    ) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.modifiers.iter().filter(move |m| &m.kind == kind)
    }

    /// Whether a modifier of the given type is attached.
    pub fn has_modifier(&self, kind: &ModifierType) -> bool {
        self.modifier_by_type(kind).is_some()
    }

    /// Append a modifier.
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Return the first modifier of `kind`, appending one with `data` if missing.
    pub fn get_or_insert_modifier(&mut self, kind: ModifierType, data: ModifierData) -> &mut Modifier {
        let position = match self.modifiers.iter().position(|m| m.kind == kind) {
            Some(position) => position,
            None => {
                self.modifiers.push(Modifier { kind, data });
                self.modifiers.len() - 1
            }
        };
        &mut self.modifiers[position]
    }

    /// Remove every modifier of `kind`, returning how many were removed.
    pub fn remove_modifiers_by_type(&mut self, kind: &ModifierType) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| &m.kind != kind);
        before - self.modifiers.len()
    }
}
