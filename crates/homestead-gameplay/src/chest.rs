//! Chests: world objects owning their own inventory.

use ahash::AHashMap;
use homestead_common::EntityId;
use tracing::{info, warn};

use crate::events::GameEvent;
use crate::inventory::Inventory;
use crate::stack::ItemQuantity;

/// Number of slots in a chest.
pub const CHEST_CAPACITY: usize = 20;

/// A chest in the world.
#[derive(Debug, Clone)]
pub struct Chest {
    id: EntityId,
    name: String,
    inventory: Inventory,
    open: bool,
}

impl Chest {
    /// Creates a closed chest holding `contents`.
    ///
    /// Contents that do not fit are dropped with a warning.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        contents: impl IntoIterator<Item = ItemQuantity>,
    ) -> Self {
        let name = name.into();
        let mut inventory = Inventory::new(capacity);
        for stack in contents {
            match inventory.add(stack, false) {
                Ok(Some(_)) => {},
                Ok(None) => warn!("Chest {} has no room for {}, dropping it", name, stack),
                Err(e) => warn!("Chest {} rejected {}: {}", name, stack, e),
            }
        }
        Self {
            id: EntityId::new(),
            name,
            inventory,
            open: false,
        }
    }

    /// World entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the chest is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// The chest's inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to the chest's inventory.
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Opens a closed chest or closes an open one.
    pub fn interact(&mut self) -> GameEvent {
        if self.open {
            self.open = false;
            info!("Closed {}.", self.name);
            GameEvent::ChestClosed { entity_id: self.id }
        } else {
            self.open = true;
            info!("Opened {}: {}", self.name, self.inventory);
            GameEvent::ChestOpened { entity_id: self.id }
        }
    }
}

/// All chests in the world, by entity.
#[derive(Debug, Clone, Default)]
pub struct Chests {
    chests: AHashMap<EntityId, Chest>,
}

impl Chests {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chest, returning its ID.
    pub fn insert(&mut self, chest: Chest) -> EntityId {
        let id = chest.id();
        self.chests.insert(id, chest);
        id
    }

    /// Looks up a chest.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Chest> {
        self.chests.get(&id)
    }

    /// Looks up a chest mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Chest> {
        self.chests.get_mut(&id)
    }

    /// Number of chests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chests.len()
    }

    /// Whether there are no chests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chests.is_empty()
    }
}
