//! Event bus between the gameplay core and its collaborators.
//!
//! The core publishes [`GameEvent`]s; a UI or world layer drains them once
//! per tick. Nothing in the core knows who listens.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use homestead_common::{EntityId, GridBounds, InventoryOwner, ItemId};

use crate::inventory::SlotDiff;
use crate::placement::Facing;
use crate::stack::ItemQuantity;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Slots of an inventory changed
    InventoryChanged {
        /// Whose inventory
        owner: InventoryOwner,
        /// Changed slots
        diff: SlotDiff,
    },
    /// The Build Mode candidate became valid or invalid
    PlacementValidityChanged(bool),
    /// An object was committed to the world
    ObjectPlaced {
        /// New world entity
        entity_id: EntityId,
        /// Item it was made from
        item: ItemId,
        /// Anchor tile
        position: IVec2,
        /// Occupied tiles
        footprint: GridBounds,
        /// Facing when placed
        facing: Facing,
    },
    /// A placed object was removed and returned to the inventory
    ObjectPickedUp {
        /// Removed entity
        entity_id: EntityId,
        /// Item returned
        item: ItemId,
    },
    /// Build Mode turned on
    BuildModeEnabled,
    /// Build Mode turned off
    BuildModeDisabled,
    /// A pickup was collected
    ItemPickedUp {
        /// Inventory it went into
        owner: InventoryOwner,
        /// What was collected
        stack: ItemQuantity,
    },
    /// A stack with nowhere to go was left in the world as a pickup
    ItemDropped {
        /// The new pickup
        entity_id: EntityId,
        /// What was dropped
        stack: ItemQuantity,
    },
    /// A chest was opened
    ChestOpened {
        /// Chest entity
        entity_id: EntityId,
    },
    /// A chest was closed
    ChestClosed {
        /// Chest entity
        entity_id: EntityId,
    },
    /// The inventory menu was shown or hidden
    InventoryMenuToggled {
        /// Whether it is now open
        open: bool,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event. If the bus is full the event is dropped and logged.
    pub fn publish(&self, event: GameEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            warn!("Event bus full ({}), dropping {:?}", self.capacity, event);
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Drains all pending events into a handler, returning how many were handled.
    pub fn dispatch(&self, handler: &mut dyn EventHandler) -> usize {
        let mut count = 0;
        for event in self.receiver.try_iter() {
            handler.handle(&event);
            count += 1;
        }
        count
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Subscriber for drained events.
pub trait EventHandler {
    /// Handles an event.
    fn handle(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventHandler for F {
    fn handle(&mut self, event: &GameEvent) {
        self(event);
    }
}
