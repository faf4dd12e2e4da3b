//! Slot rearrangement: picking stacks up into the hand and putting them down.
//!
//! The [`Rearranger`] is a two-state machine (empty-handed or holding a
//! stack). Each click reads the inventory, updates the hand and returns the
//! list of slot changes the click implies. The inventory itself is only
//! touched by applying that diff with [`Inventory::make_changes`], so the
//! items in the slots plus the item in the hand stay constant.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::inventory::{Inventory, InventoryError, SlotChange, SlotDiff};
use crate::stack::ItemQuantity;

/// Rearrangement error types.
///
/// These all indicate a caller bug, not a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RearrangeError {
    /// Asked to move zero items or more than available
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Operation not allowed in the current hand state
    #[error("Invalid state: {0}")]
    State(String),
    /// Clicked slot does not exist
    #[error("Slot {index} out of range for {capacity} slots")]
    SlotOutOfRange {
        /// Clicked slot
        index: usize,
        /// Number of slots in the inventory
        capacity: usize,
    },
    /// Applying the diff failed
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Result type for rearrangement operations.
pub type RearrangeResult<T> = Result<T, RearrangeError>;

/// How a slot was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickKind {
    /// Move the whole stack
    Primary,
    /// Move half the stack, rounded up
    PrimaryWithModifier,
    /// Move a single item
    Secondary,
}

impl ClickKind {
    /// How many of `quantity` items this click moves.
    #[must_use]
    pub const fn amount_of(self, quantity: u32) -> u32 {
        match self {
            Self::Primary => quantity,
            Self::PrimaryWithModifier => quantity.div_ceil(2),
            Self::Secondary => 1,
        }
    }
}

/// A stack picked up from a slot and not yet put down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// What is held (quantity always at least 1)
    pub stack: ItemQuantity,
    /// Slot the stack was picked from
    pub origin: usize,
}

/// Pick/place state machine for one player.
#[derive(Debug, Clone, Default)]
pub struct Rearranger {
    held: Option<Hand>,
}

impl Rearranger {
    /// Creates an empty-handed rearranger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What is currently held, if anything.
    #[must_use]
    pub fn held(&self) -> Option<&Hand> {
        self.held.as_ref()
    }

    /// Whether something is in the hand.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Handles a click on `slot` and returns the resulting slot changes.
    ///
    /// The inventory is only read. Apply the returned diff to it (or use
    /// [`Rearranger::click_and_apply`]) to keep the two consistent.
    pub fn click(
        &mut self,
        inventory: &Inventory,
        slot: usize,
        kind: ClickKind,
    ) -> RearrangeResult<SlotDiff> {
        if slot >= inventory.capacity() {
            return Err(RearrangeError::SlotOutOfRange {
                index: slot,
                capacity: inventory.capacity(),
            });
        }

        let target = inventory.get(slot);
        match (self.held, target) {
            (None, None) => Ok(SlotDiff::new()),
            (None, Some(stack)) => self.pick(slot, stack, kind.amount_of(stack.quantity())),
            (Some(hand), None) => self.place(slot, hand, kind.amount_of(hand.stack.quantity())),
            (Some(hand), Some(stack)) => {
                if kind != ClickKind::Primary {
                    trace!("Ignoring {:?} click on occupied slot {} while holding", kind, slot);
                    return Ok(SlotDiff::new());
                }
                if hand.stack.same_item(&stack) {
                    Ok(self.merge(slot, hand, stack))
                } else {
                    Ok(self.swap(slot, hand, stack))
                }
            },
        }
    }

    /// Handles a click and applies the resulting diff to the inventory.
    pub fn click_and_apply(
        &mut self,
        inventory: &mut Inventory,
        slot: usize,
        kind: ClickKind,
    ) -> RearrangeResult<SlotDiff> {
        let diff = self.click(inventory, slot, kind)?;
        inventory.make_changes(&diff)?;
        Ok(diff)
    }

    /// Picks `amount` items from the stack in `slot` into the empty hand.
    pub fn pick(
        &mut self,
        slot: usize,
        stack: ItemQuantity,
        amount: u32,
    ) -> RearrangeResult<SlotDiff> {
        if self.held.is_some() {
            return Err(RearrangeError::State(format!(
                "cannot pick from slot {slot} while already holding a stack"
            )));
        }
        if amount == 0 || amount > stack.quantity() {
            return Err(RearrangeError::InvalidQuantity(format!(
                "cannot pick {amount} from {stack} in slot {slot}"
            )));
        }

        let remaining = stack.shrink(amount)?;
        let picked = stack
            .with_quantity(amount)
            .ok_or_else(|| RearrangeError::InvalidQuantity("picked nothing".into()))?;
        debug!("Picked {} from slot {}", picked, slot);
        self.held = Some(Hand {
            stack: picked,
            origin: slot,
        });
        Ok(vec![SlotChange::new(slot, remaining)])
    }

    /// Puts `amount` held items into the empty `slot`.
    ///
    /// Any residue stays in the hand with its original origin.
    fn place(&mut self, slot: usize, hand: Hand, amount: u32) -> RearrangeResult<SlotDiff> {
        if amount == 0 || amount > hand.stack.quantity() {
            return Err(RearrangeError::InvalidQuantity(format!(
                "cannot place {amount} of held {}",
                hand.stack
            )));
        }
        let placed = hand.stack.with_quantity(amount);
        let residue = hand.stack.shrink(amount)?;
        debug!("Placed {:?} into slot {}", placed, slot);
        self.held = residue.map(|stack| Hand {
            stack,
            origin: hand.origin,
        });
        Ok(vec![SlotChange::new(slot, placed)])
    }

    fn merge(&mut self, slot: usize, hand: Hand, mut target: ItemQuantity) -> SlotDiff {
        target.grow(hand.stack.quantity());
        debug!("Merged held {} into slot {}, now {}", hand.stack, slot, target);
        self.held = None;
        vec![SlotChange::new(slot, Some(target))]
    }

    fn swap(&mut self, slot: usize, hand: Hand, target: ItemQuantity) -> SlotDiff {
        debug!("Swapped held {} with {} in slot {}", hand.stack, target, slot);
        self.held = Some(Hand {
            stack: target,
            origin: slot,
        });
        vec![SlotChange::new(slot, Some(hand.stack))]
    }

    /// Puts the held stack back into the inventory.
    ///
    /// Tries the origin slot first, then any slot with the same item, then
    /// the first empty slot. With nowhere to go the hand is kept and an error
    /// returned. Returns an empty diff when nothing is held.
    pub fn release(&mut self, inventory: &Inventory) -> RearrangeResult<SlotDiff> {
        let Some(hand) = self.held else {
            return Ok(SlotDiff::new());
        };

        let origin_fits = hand.origin < inventory.capacity()
            && inventory
                .get(hand.origin)
                .map_or(true, |s| s.same_item(&hand.stack));
        let slot = if origin_fits {
            Some(hand.origin)
        } else {
            inventory
                .index_of(hand.stack.item())
                .or_else(|| inventory.slots().iter().position(Option::is_none))
        };

        let Some(slot) = slot else {
            return Err(RearrangeError::State(format!(
                "no room to return held {}",
                hand.stack
            )));
        };

        let contents = match inventory.get(slot) {
            Some(mut existing) => {
                existing.grow(hand.stack.quantity());
                existing
            },
            None => hand.stack,
        };
        self.held = None;
        debug!("Returned held {} to slot {}", hand.stack, slot);
        Ok(vec![SlotChange::new(slot, Some(contents))])
    }
}
