//! Item stacks: an item plus a positive quantity.
//!
//! An empty slot is represented by `Option::None`, never by a stack holding
//! zero items. Every operation that could bring a quantity to zero consumes
//! the stack and hands back `None` instead.

use std::fmt;

use homestead_common::ItemId;
use serde::{Deserialize, Serialize};

use crate::inventory::{InventoryError, InventoryResult};

/// Smallest quantity a stack may be created with.
pub const MIN_STACK_QUANTITY: u32 = 1;

/// Largest quantity a stack may be created with.
///
/// This bounds what callers may ask for. Merging stacks through
/// [`crate::Inventory::add`] or rearrangement is not clamped to it.
pub const MAX_STACK_QUANTITY: u32 = 999;

/// An item and how many of it, occupying one inventory slot.
///
/// Deserialization goes through [`ItemQuantity::new`], so stacks read from
/// data files obey the same quantity range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawItemQuantity")]
pub struct ItemQuantity {
    item: ItemId,
    quantity: u32,
}

#[derive(Deserialize)]
struct RawItemQuantity {
    item: ItemId,
    quantity: u32,
}

impl TryFrom<RawItemQuantity> for ItemQuantity {
    type Error = InventoryError;

    fn try_from(raw: RawItemQuantity) -> InventoryResult<Self> {
        Self::new(raw.item, raw.quantity)
    }
}

impl ItemQuantity {
    /// Creates a new stack, validating the quantity range.
    pub fn new(item: ItemId, quantity: u32) -> InventoryResult<Self> {
        if !(MIN_STACK_QUANTITY..=MAX_STACK_QUANTITY).contains(&quantity) {
            return Err(InventoryError::InvalidQuantity(format!(
                "stack of {item} must hold {MIN_STACK_QUANTITY}..={MAX_STACK_QUANTITY} items, got {quantity}"
            )));
        }
        Ok(Self { item, quantity })
    }

    /// Creates a stack of exactly one item.
    #[must_use]
    pub const fn one(item: ItemId) -> Self {
        Self { item, quantity: 1 }
    }

    /// The item in this stack.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// Number of items in this stack (always at least 1).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Checks whether two stacks hold the same item.
    #[must_use]
    pub fn same_item(&self, other: &Self) -> bool {
        self.item == other.item
    }

    /// Returns a stack of the same item with `quantity` items, or `None` for zero.
    #[must_use]
    pub const fn with_quantity(&self, quantity: u32) -> Option<Self> {
        if quantity == 0 {
            None
        } else {
            Some(Self {
                item: self.item,
                quantity,
            })
        }
    }

    /// Adds `amount` items to this stack.
    pub fn grow(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_add(amount);
    }

    /// Takes `amount` items out of this stack.
    ///
    /// Returns the remainder, `None` when exactly everything was taken, or an
    /// error when `amount` is zero or more than the stack holds.
    pub fn shrink(self, amount: u32) -> InventoryResult<Option<Self>> {
        if amount == 0 {
            return Err(InventoryError::InvalidQuantity(format!(
                "cannot take 0 of {}",
                self.item
            )));
        }
        if amount > self.quantity {
            return Err(InventoryError::InvalidQuantity(format!(
                "cannot take {amount} of {} from a stack of {}",
                self.item, self.quantity
            )));
        }
        Ok(self.with_quantity(self.quantity - amount))
    }
}

impl fmt::Display for ItemQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.item, self.quantity)
    }
}
