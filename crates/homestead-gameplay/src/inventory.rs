//! Inventory system.
//!
//! An inventory is a fixed number of slots, each empty or holding one
//! [`ItemQuantity`]. The slot count never changes after construction, so the
//! number of occupied slots can never exceed it.

use std::fmt;

use homestead_common::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, trace, warn};

use crate::stack::ItemQuantity;

/// Inventory error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// No empty slot for a new stack
    #[error("Inventory full: cannot add {stack} to {capacity} slots")]
    Full {
        /// Number of slots in the inventory
        capacity: usize,
        /// Stack that did not fit
        stack: ItemQuantity,
    },
    /// Removing or taking an amount that is not available, or a non-positive amount
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Slot index past the end of the inventory
    #[error("Slot {index} out of range for {capacity} slots")]
    SlotOutOfRange {
        /// Requested slot
        index: usize,
        /// Number of slots in the inventory
        capacity: usize,
    },
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// New contents for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChange {
    /// Slot index
    pub index: usize,
    /// What the slot holds afterwards (`None` = empty)
    pub contents: Option<ItemQuantity>,
}

impl SlotChange {
    /// Creates a slot change.
    #[must_use]
    pub const fn new(index: usize, contents: Option<ItemQuantity>) -> Self {
        Self { index, contents }
    }

    /// Creates a change that empties a slot.
    #[must_use]
    pub const fn cleared(index: usize) -> Self {
        Self {
            index,
            contents: None,
        }
    }
}

/// Ordered list of slot changes produced by one operation.
pub type SlotDiff = Vec<SlotChange>;

/// A fixed-capacity container of item stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// One entry per slot
    slots: Vec<Option<ItemQuantity>>,
}

impl Inventory {
    /// Creates an empty inventory with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Creates an inventory and adds each stack strictly.
    pub fn with_contents(
        capacity: usize,
        contents: impl IntoIterator<Item = ItemQuantity>,
    ) -> InventoryResult<Self> {
        let mut inv = Self::new(capacity);
        for stack in contents {
            inv.add(stack, true)?;
        }
        Ok(inv)
    }

    /// Number of slots. This is a count of stacks, not of items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// All slots in order.
    #[must_use]
    pub fn slots(&self) -> &[Option<ItemQuantity>] {
        &self.slots
    }

    /// Contents of a slot. Indices past the capacity read as empty.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ItemQuantity> {
        self.slots.get(index).copied().flatten()
    }

    /// Index of the first slot holding `item`.
    #[must_use]
    pub fn index_of(&self, item: ItemId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|stack| stack.item() == item))
    }

    /// Whether any slot holds `item`.
    #[must_use]
    pub fn contains_item(&self, item: ItemId) -> bool {
        self.index_of(item).is_some()
    }

    /// Whether a new stack would fit.
    #[must_use]
    pub fn has_empty_space(&self) -> bool {
        self.size() < self.capacity()
    }

    /// Whether the slot holding this item has at least the stack's quantity.
    #[must_use]
    pub fn has_at_least(&self, stack: &ItemQuantity) -> bool {
        self.index_of(stack.item())
            .and_then(|idx| self.get(idx))
            .is_some_and(|held| held.quantity() >= stack.quantity())
    }

    /// Total number of `item` across all slots.
    #[must_use]
    pub fn total_quantity(&self, item: ItemId) -> u64 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item() == item)
            .map(|s| u64::from(s.quantity()))
            .sum()
    }

    /// Iterates over occupied slots as `(index, stack)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ItemQuantity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|stack| (i, stack)))
    }

    /// Adds a stack to the inventory.
    ///
    /// If a slot already holds the item, its quantity grows by the stack's
    /// quantity. Otherwise the stack goes into the first empty slot. Returns
    /// the slot index used, or `Ok(None)` when the inventory is full and
    /// `strict` is false.
    pub fn add(&mut self, stack: ItemQuantity, strict: bool) -> InventoryResult<Option<usize>> {
        if let Some(idx) = self.index_of(stack.item()) {
            if let Some(existing) = self.slots[idx].as_mut() {
                existing.grow(stack.quantity());
                trace!("Added {} to slot {}, now {}", stack, idx, existing);
            }
            return Ok(Some(idx));
        }

        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(stack);
                trace!("Placed new stack {} in slot {}", stack, idx);
                Ok(Some(idx))
            },
            None => {
                if strict {
                    Err(InventoryError::Full {
                        capacity: self.capacity(),
                        stack,
                    })
                } else {
                    info!("Cannot add new stack {} to inventory. It is full!", stack);
                    Ok(None)
                }
            },
        }
    }

    /// Removes a stack's quantity of its item.
    ///
    /// With `strict`, a missing item or a quantity larger than what is held
    /// is an error. Without it, a missing item is ignored and an oversized
    /// request empties the slot; both are logged as warnings.
    pub fn remove(&mut self, stack: ItemQuantity, strict: bool) -> InventoryResult<()> {
        let Some(idx) = self.index_of(stack.item()) else {
            let msg = format!("requested to remove {stack} but the item is not in the inventory");
            if strict {
                return Err(InventoryError::InvalidQuantity(msg));
            }
            warn!("{}", msg);
            return Ok(());
        };

        let Some(held) = self.slots[idx] else {
            return Ok(());
        };

        if stack.quantity() > held.quantity() {
            let msg = format!(
                "requested to remove {} of {} but there is only {}",
                stack.quantity(),
                stack.item(),
                held.quantity()
            );
            if strict {
                return Err(InventoryError::InvalidQuantity(msg));
            }
            warn!("{}; clearing slot {}", msg, idx);
            self.slots[idx] = None;
            return Ok(());
        }

        self.slots[idx] = held.shrink(stack.quantity())?;
        Ok(())
    }

    /// Applies a batch of slot overwrites.
    ///
    /// Every index is checked before anything is written, so either the whole
    /// batch applies or nothing changes.
    pub fn make_changes(&mut self, changes: &[SlotChange]) -> InventoryResult<()> {
        let capacity = self.capacity();
        if let Some(bad) = changes.iter().find(|c| c.index >= capacity) {
            return Err(InventoryError::SlotOutOfRange {
                index: bad.index,
                capacity,
            });
        }
        for change in changes {
            self.slots[change.index] = change.contents;
        }
        Ok(())
    }

    /// Merges stacks of the same item and moves all stacks to the front.
    ///
    /// Stacks keep the order in which their item first appears. Returns the
    /// diff describing every slot that changed.
    pub fn organize(&mut self) -> SlotDiff {
        let mut merged: Vec<ItemQuantity> = Vec::with_capacity(self.size());
        for stack in self.slots.iter().flatten() {
            match merged.iter_mut().find(|m| m.same_item(stack)) {
                Some(existing) => existing.grow(stack.quantity()),
                None => merged.push(*stack),
            }
        }

        let mut diff = SlotDiff::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let new = merged.get(idx).copied();
            if *slot != new {
                *slot = new;
                diff.push(SlotChange::new(idx, new));
            }
        }
        diff
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for slot in &self.slots {
            match slot {
                Some(stack) => write!(f, "{stack}, ")?,
                None => write!(f, "null, ")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WOOD: ItemId = ItemId::new(1);
    const STONE: ItemId = ItemId::new(2);

    fn stack(item: ItemId, quantity: u32) -> ItemQuantity {
        ItemQuantity::new(item, quantity).expect("valid stack")
    }

    #[test]
    fn test_new_inventory_is_empty() {
        let inv = Inventory::new(3);
        assert_eq!(inv.capacity(), 3);
        assert_eq!(inv.size(), 0);
        assert!(inv.has_empty_space());
    }

    #[test]
    fn test_get_past_capacity_is_empty() {
        let inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        assert_eq!(inv.get(0), Some(stack(WOOD, 1)));
        assert_eq!(inv.get(1), None);
        assert_eq!(inv.get(2), None);
    }

    #[test]
    fn test_index_of() {
        let inv = Inventory::with_contents(2, [stack(WOOD, 1), stack(STONE, 1)]).expect("fits");
        assert_eq!(inv.index_of(STONE), Some(1));
        assert_eq!(inv.index_of(ItemId::new(9)), None);
        assert!(inv.contains_item(WOOD));
        assert!(!inv.contains_item(ItemId::new(9)));
    }

    #[test]
    fn test_add_merges_into_existing_stack() {
        let mut inv = Inventory::with_contents(3, [stack(WOOD, 5)]).expect("fits");
        let idx = inv.add(stack(WOOD, 3), true).expect("merge never fails");
        assert_eq!(idx, Some(0));
        assert_eq!(inv.get(0), Some(stack(WOOD, 8)));
        assert_eq!(inv.size(), 1);
    }

    #[test]
    fn test_add_uses_first_empty_slot() {
        let mut inv = Inventory::new(2);
        inv.make_changes(&[SlotChange::new(1, Some(stack(WOOD, 1)))])
            .expect("in range");
        let idx = inv.add(stack(STONE, 1), false).expect("has space");
        assert_eq!(idx, Some(0));
        assert_eq!(inv.size(), 2);
    }

    #[test]
    fn test_add_strict_when_full_fails() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        let result = inv.add(stack(STONE, 1), true);
        assert!(matches!(result, Err(InventoryError::Full { capacity: 1, .. })));
        assert_eq!(inv.size(), 1);
    }

    #[test]
    fn test_add_lenient_when_full_is_noop() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        let result = inv.add(stack(STONE, 100), false).expect("lenient");
        assert_eq!(result, None);
        assert_eq!(inv.size(), 1);
        assert!(!inv.contains_item(STONE));
    }

    #[test]
    fn test_remove_exact_clears_slot() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        inv.remove(stack(WOOD, 1), true).expect("present");
        assert_eq!(inv.size(), 0);
        assert_eq!(inv.capacity(), 1);
    }

    #[test]
    fn test_remove_partial() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 7)]).expect("fits");
        inv.remove(stack(WOOD, 3), true).expect("present");
        assert_eq!(inv.get(0), Some(stack(WOOD, 4)));
    }

    #[test]
    fn test_remove_too_many_strict_fails() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        let result = inv.remove(stack(WOOD, 100), true);
        assert!(matches!(result, Err(InventoryError::InvalidQuantity(_))));
        assert_eq!(inv.get(0), Some(stack(WOOD, 1)));
    }

    #[test]
    fn test_remove_too_many_lenient_clears_slot() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 2)]).expect("fits");
        inv.remove(stack(WOOD, 5), false).expect("lenient");
        assert_eq!(inv.size(), 0);
    }

    #[test]
    fn test_remove_missing_strict_fails() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        let result = inv.remove(stack(STONE, 1), true);
        assert!(matches!(result, Err(InventoryError::InvalidQuantity(_))));
    }

    #[test]
    fn test_remove_missing_lenient_is_noop() {
        let mut inv = Inventory::with_contents(1, [stack(WOOD, 1)]).expect("fits");
        inv.remove(stack(STONE, 1), false).expect("lenient");
        assert_eq!(inv.size(), 1);
    }

    #[test]
    fn test_has_at_least() {
        let inv = Inventory::with_contents(2, [stack(WOOD, 5)]).expect("fits");
        assert!(inv.has_at_least(&stack(WOOD, 2)));
        assert!(inv.has_at_least(&stack(WOOD, 5)));
        assert!(!inv.has_at_least(&stack(WOOD, 6)));
        assert!(!inv.has_at_least(&stack(STONE, 1)));
    }

    #[test]
    fn test_has_empty_space() {
        let full = Inventory::with_contents(1, [stack(WOOD, 2)]).expect("fits");
        assert!(!full.has_empty_space());
        assert!(Inventory::new(10).has_empty_space());
    }

    #[test]
    fn test_make_changes_is_all_or_nothing() {
        let mut inv = Inventory::with_contents(2, [stack(WOOD, 2)]).expect("fits");
        let result = inv.make_changes(&[
            SlotChange::cleared(0),
            SlotChange::new(5, Some(stack(STONE, 1))),
        ]);
        assert!(matches!(
            result,
            Err(InventoryError::SlotOutOfRange { index: 5, capacity: 2 })
        ));
        assert_eq!(inv.get(0), Some(stack(WOOD, 2)));

        inv.make_changes(&[SlotChange::cleared(0), SlotChange::new(1, Some(stack(STONE, 1)))])
            .expect("in range");
        assert_eq!(inv.get(0), None);
        assert_eq!(inv.get(1), Some(stack(STONE, 1)));
    }

    #[test]
    fn test_organize_merges_and_compacts() {
        let mut inv = Inventory::new(4);
        inv.make_changes(&[
            SlotChange::new(1, Some(stack(WOOD, 2))),
            SlotChange::new(2, Some(stack(STONE, 1))),
            SlotChange::new(3, Some(stack(WOOD, 3))),
        ])
        .expect("in range");

        let diff = inv.organize();

        assert_eq!(inv.get(0), Some(stack(WOOD, 5)));
        assert_eq!(inv.get(1), Some(stack(STONE, 1)));
        assert_eq!(inv.get(2), None);
        assert_eq!(inv.get(3), None);
        assert_eq!(diff.len(), 4);
    }

    #[test]
    fn test_display() {
        let inv = Inventory::with_contents(2, [stack(WOOD, 5)]).expect("fits");
        assert_eq!(inv.to_string(), "[(item#1,5), null, ]");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32, u32, bool),
        Remove(u32, u32, bool),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u32..5, 1u32..50, any::<bool>()).prop_map(|(i, q, s)| Op::Add(i, q, s)),
            (1u32..5, 1u32..50, any::<bool>()).prop_map(|(i, q, s)| Op::Remove(i, q, s)),
        ]
    }

    proptest! {
        #[test]
        fn prop_size_never_exceeds_capacity(
            capacity in 1usize..4,
            ops in proptest::collection::vec(op_strategy(), 0..40),
        ) {
            let mut inv = Inventory::new(capacity);
            for op in ops {
                let _ = match op {
                    Op::Add(i, q, strict) => inv.add(stack(ItemId::new(i), q), strict).map(|_| ()),
                    Op::Remove(i, q, strict) => inv.remove(stack(ItemId::new(i), q), strict),
                };
                prop_assert!(inv.size() <= inv.capacity());
                prop_assert_eq!(inv.capacity(), capacity);
                for slot in inv.slots().iter().flatten() {
                    prop_assert!(slot.quantity() >= 1);
                }
            }
        }
    }
}
