//! Item pickups lying in the world.

use homestead_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inventory::Inventory;
use crate::stack::ItemQuantity;

/// A stack lying in the world waiting to be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickUp {
    /// World entity
    pub id: EntityId,
    /// What is collected
    pub stack: ItemQuantity,
    /// Collected on contact when there is room
    pub automatic: bool,
}

impl PickUp {
    /// Creates a manual pickup.
    #[must_use]
    pub fn new(stack: ItemQuantity) -> Self {
        Self {
            id: EntityId::new(),
            stack,
            automatic: false,
        }
    }

    /// Marks the pickup as automatic.
    #[must_use]
    pub const fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }

    /// Tries to move this pickup into `inventory`.
    ///
    /// Returns the slot used. A full inventory leaves the pickup in the world
    /// and returns `None`.
    #[must_use]
    pub fn collect_into(&self, inventory: &mut Inventory) -> Option<usize> {
        match inventory.add(self.stack, false) {
            Ok(Some(slot)) => Some(slot),
            _ => {
                info!("Cannot pick up {}. No room in backpack!", self.stack);
                None
            },
        }
    }
}
