//! Game session: the context object that owns every gameplay system.
//!
//! A [`GameSession`] is built explicitly and passed to whoever drives the
//! frame loop. [`GameSession::tick`] applies one frame of intents in a fixed
//! order:
//! 1. mode toggles (Build Mode, inventory menu, chest interaction)
//! 2. cursor position and placement validity
//! 3. rotation
//! 4. placement, cancel, slot clicks and pickups
//!
//! Only one of these classes changes state per tick: a toggle ends the tick,
//! and a rotation skips placement.

use ahash::AHashMap;
use glam::Vec2;
use homestead_common::{EntityId, HomesteadError, InventoryOwner, ItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::build_mode::{BuildMode, BuildModeError};
use crate::chest::{Chest, Chests, CHEST_CAPACITY};
use crate::events::{EventBus, GameEvent};
use crate::grid_area::{GridArea, GridError};
use crate::input::Intent;
use crate::inventory::{Inventory, InventoryError, SlotChange, SlotDiff};
use crate::inventory_menu::{InventoryMenu, MenuClick};
use crate::item::{CatalogError, ItemCatalog};
use crate::pickup::PickUp;
use crate::placement::{PlacedObjects, RotationDirection, TileGeometry};
use crate::rearrange::{ClickKind, RearrangeError};
use crate::stack::ItemQuantity;

/// Session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Inventory error
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    /// Rearrangement error
    #[error(transparent)]
    Rearrange(#[from] RearrangeError),
    /// Build Mode error
    #[error(transparent)]
    BuildMode(#[from] BuildModeError),
    /// Grid error
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// No chest with this ID
    #[error("Unknown chest {0:?}")]
    UnknownChest(EntityId),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl From<SessionError> for HomesteadError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Inventory(e) => Self::Inventory(e.to_string()),
            SessionError::Rearrange(e) => Self::State(e.to_string()),
            SessionError::BuildMode(e) => Self::State(e.to_string()),
            SessionError::Grid(e) => Self::Grid(e.to_string()),
            SessionError::Catalog(e) => Self::Content(e.to_string()),
            SessionError::UnknownChest(id) => Self::State(format!("unknown chest {id:?}")),
        }
    }
}

/// Settings a session is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Player inventory slots
    pub player_capacity: usize,
    /// Slots in newly spawned chests
    pub chest_capacity: usize,
    /// Inventory menu columns
    pub menu_columns: usize,
    /// Top-left corner of the buildable area
    pub grid_origin: Vec2,
    /// Buildable area rows
    pub grid_rows: usize,
    /// Buildable area columns
    pub grid_cols: usize,
    /// Buildable area cell size in world units
    pub grid_cell_size: f32,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_capacity: 10,
            chest_capacity: CHEST_CAPACITY,
            menu_columns: 5,
            grid_origin: Vec2::new(0.0, 8.0),
            grid_rows: 8,
            grid_cols: 8,
            grid_cell_size: 1.0,
            event_capacity: 1024,
        }
    }
}

/// Everything one player's game needs, owned in one place.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    catalog: ItemCatalog,
    player: Inventory,
    chests: Chests,
    open_chest: Option<EntityId>,
    nearby_chest: Option<EntityId>,
    pickups: AHashMap<EntityId, PickUp>,
    nearby_pickup: Option<EntityId>,
    menu: InventoryMenu,
    build_mode: BuildMode,
    /// Inventory and slot the positioned unit was taken from
    selection: Option<(InventoryOwner, usize)>,
    placed: PlacedObjects,
    area: GridArea,
    events: EventBus,
}

fn inventory_for<'a>(
    player: &'a mut Inventory,
    chests: &'a mut Chests,
    owner: InventoryOwner,
) -> SessionResult<&'a mut Inventory> {
    match owner {
        InventoryOwner::Player => Ok(player),
        InventoryOwner::Chest(id) => chests
            .get_mut(id)
            .map(Chest::inventory_mut)
            .ok_or(SessionError::UnknownChest(id)),
    }
}

/// Puts `unit` back into `slot` when that slot is empty or holds the same
/// item, otherwise anywhere it fits. Returns the slot used.
fn restore_unit(
    inventory: &mut Inventory,
    slot: Option<usize>,
    unit: ItemQuantity,
) -> Option<usize> {
    if let Some(slot) = slot {
        let restored = match inventory.get(slot) {
            None => Some(unit),
            Some(mut held) if held.same_item(&unit) => {
                held.grow(unit.quantity());
                Some(held)
            },
            Some(_) => None,
        };
        if let Some(stack) = restored {
            if inventory
                .make_changes(&[SlotChange::new(slot, Some(stack))])
                .is_ok()
            {
                return Some(slot);
            }
        }
    }
    inventory.add(unit, false).ok().flatten()
}

impl GameSession {
    /// Builds a session with an empty player inventory.
    pub fn new(catalog: ItemCatalog, config: SessionConfig) -> SessionResult<Self> {
        let area = GridArea::try_new(
            config.grid_origin,
            config.grid_rows,
            config.grid_cols,
            config.grid_cell_size,
        )?;
        info!(
            "Session created: {} catalog items, {} player slots, build area {}",
            catalog.len(),
            config.player_capacity,
            area.bounds()
        );
        Ok(Self {
            player: Inventory::new(config.player_capacity),
            menu: InventoryMenu::for_capacity("Backpack", config.player_capacity, config.menu_columns),
            events: EventBus::new(config.event_capacity),
            chests: Chests::new(),
            open_chest: None,
            nearby_chest: None,
            pickups: AHashMap::new(),
            nearby_pickup: None,
            build_mode: BuildMode::new(),
            selection: None,
            placed: PlacedObjects::new(),
            catalog,
            area,
            config,
        })
    }

    /// The item catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// The player's inventory.
    #[must_use]
    pub const fn player_inventory(&self) -> &Inventory {
        &self.player
    }

    /// All chests.
    #[must_use]
    pub const fn chests(&self) -> &Chests {
        &self.chests
    }

    /// The inventory menu.
    #[must_use]
    pub const fn menu(&self) -> &InventoryMenu {
        &self.menu
    }

    /// The Build Mode controller.
    #[must_use]
    pub const fn build_mode(&self) -> &BuildMode {
        &self.build_mode
    }

    /// Objects placed in the world.
    #[must_use]
    pub const fn placed_objects(&self) -> &PlacedObjects {
        &self.placed
    }

    /// The buildable area.
    #[must_use]
    pub const fn grid_area(&self) -> &GridArea {
        &self.area
    }

    /// The event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Takes every event published so far.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Inventory the menu acts on: the open chest, else the player's.
    #[must_use]
    pub fn active_owner(&self) -> InventoryOwner {
        self.open_chest
            .map_or(InventoryOwner::Player, InventoryOwner::Chest)
    }

    /// Adds a stack to the player inventory strictly.
    pub fn give_player(&mut self, stack: ItemQuantity) -> SessionResult<usize> {
        let slot = self.player.add(stack, true)?.ok_or(InventoryError::Full {
            capacity: self.player.capacity(),
            stack,
        })?;
        self.publish_slots(InventoryOwner::Player, &[slot]);
        self.redraw_menu();
        Ok(slot)
    }

    /// Puts a chest in the world.
    pub fn spawn_chest(
        &mut self,
        name: impl Into<String>,
        contents: impl IntoIterator<Item = ItemQuantity>,
    ) -> EntityId {
        let chest = Chest::new(name, self.config.chest_capacity, contents);
        debug!("Spawned chest {:?}", chest.id());
        self.chests.insert(chest)
    }

    /// Puts a pickup in the world.
    pub fn spawn_pickup(&mut self, pickup: PickUp) -> EntityId {
        self.pickups.insert(pickup.id, pickup);
        pickup.id
    }

    /// Pickups still in the world.
    pub fn pickups(&self) -> impl Iterator<Item = &PickUp> + '_ {
        self.pickups.values()
    }

    /// Sets the chest the player can interact with.
    pub fn set_nearby_chest(&mut self, chest: Option<EntityId>) {
        self.nearby_chest = chest;
    }

    /// Sets the pickup the player is touching. Automatic pickups are
    /// collected straight away.
    pub fn set_nearby_pickup(&mut self, pickup: Option<EntityId>) {
        self.nearby_pickup = pickup;
        let automatic = pickup
            .and_then(|id| self.pickups.get(&id))
            .is_some_and(|p| p.automatic);
        if automatic {
            self.collect_nearby_pickup();
        }
    }

    /// Applies one frame of intents.
    pub fn tick(&mut self, intents: &[Intent]) -> SessionResult<()> {
        if self.apply_toggles(intents)? {
            return Ok(());
        }

        for intent in intents {
            if let Intent::MoveCursor(cursor) = intent {
                self.move_cursor(*cursor);
            }
        }

        let mut rotated = false;
        for intent in intents {
            if let Intent::Rotate(direction) = intent {
                rotated |= self.rotate(*direction)?;
            }
        }
        if rotated {
            return Ok(());
        }

        for intent in intents {
            match *intent {
                Intent::Place => self.place()?,
                Intent::Cancel => self.cancel_placement(),
                Intent::SlotClick { slot, kind } => self.click_slot(slot, kind)?,
                Intent::PickUp => self.collect_nearby_pickup(),
                Intent::PickUpObject => self.pick_up_object(),
                _ => {},
            }
        }
        Ok(())
    }

    fn apply_toggles(&mut self, intents: &[Intent]) -> SessionResult<bool> {
        let mut toggled = false;
        for intent in intents {
            match intent {
                Intent::ToggleBuildMode => self.toggle_build_mode()?,
                Intent::ToggleInventoryMenu => self.toggle_menu()?,
                Intent::Interact => self.interact()?,
                _ => continue,
            }
            toggled = true;
        }
        Ok(toggled)
    }

    fn toggle_build_mode(&mut self) -> SessionResult<()> {
        if self.build_mode.is_enabled() {
            if let Some(candidate) = self.build_mode.disable() {
                let origin = self.selection.take();
                self.return_unit(origin, candidate.item());
            }
            self.events.publish(GameEvent::BuildModeDisabled);
        } else {
            // Rearranging and selecting for Build Mode are exclusive.
            let owner = self.active_owner();
            let inventory = inventory_for(&mut self.player, &mut self.chests, owner)?;
            let diff = self.menu.close(inventory)?;
            if !diff.is_empty() {
                self.events
                    .publish(GameEvent::InventoryChanged { owner, diff });
            }
            self.menu.open(owner, inventory, &self.catalog);
            self.build_mode.enable();
            self.events.publish(GameEvent::BuildModeEnabled);
        }
        let enabled = self.build_mode.is_enabled();
        let owner = self.active_owner();
        let inventory = inventory_for(&mut self.player, &mut self.chests, owner)?;
        self.menu.set_build_mode(enabled, inventory, &self.catalog);
        Ok(())
    }

    fn toggle_menu(&mut self) -> SessionResult<()> {
        let owner = self.active_owner();
        let inventory = inventory_for(&mut self.player, &mut self.chests, owner)?;
        let diff = self.menu.toggle(owner, inventory, &self.catalog)?;
        if !diff.is_empty() {
            self.events
                .publish(GameEvent::InventoryChanged { owner, diff });
        }
        self.events.publish(GameEvent::InventoryMenuToggled {
            open: self.menu.is_open(),
        });
        Ok(())
    }

    fn interact(&mut self) -> SessionResult<()> {
        let Some(id) = self.nearby_chest else {
            trace!("Nothing to interact with");
            return Ok(());
        };
        if self.chests.get(id).is_none() {
            return Err(SessionError::UnknownChest(id));
        }

        if self.menu.is_open() {
            let previous = self.active_owner();
            let inventory = inventory_for(&mut self.player, &mut self.chests, previous)?;
            let diff = self.menu.close(inventory)?;
            if !diff.is_empty() {
                self.events.publish(GameEvent::InventoryChanged {
                    owner: previous,
                    diff,
                });
            }
        }
        if let Some(other) = self.open_chest.filter(|&other| other != id) {
            if let Some(chest) = self.chests.get_mut(other) {
                self.events.publish(chest.interact());
            }
            self.open_chest = None;
        }

        let chest = self
            .chests
            .get_mut(id)
            .ok_or(SessionError::UnknownChest(id))?;
        let event = chest.interact();
        if chest.is_open() {
            self.open_chest = Some(id);
            self.menu
                .open(InventoryOwner::Chest(id), chest.inventory(), &self.catalog);
        } else {
            self.open_chest = None;
        }
        self.events.publish(event);
        Ok(())
    }

    fn move_cursor(&mut self, cursor: Vec2) {
        let geometry = TileGeometry::new(&self.area, &self.placed);
        if let Some(valid) = self.build_mode.update_position(cursor, &geometry) {
            self.events
                .publish(GameEvent::PlacementValidityChanged(valid));
        }
    }

    fn rotate(&mut self, direction: RotationDirection) -> SessionResult<bool> {
        if !self.build_mode.is_positioning() {
            trace!("Ignoring rotation with nothing to rotate");
            return Ok(false);
        }
        let geometry = TileGeometry::new(&self.area, &self.placed);
        let (_, validity) = self.build_mode.rotate(direction, &geometry)?;
        if let Some(valid) = validity {
            self.events
                .publish(GameEvent::PlacementValidityChanged(valid));
        }
        Ok(true)
    }

    fn place(&mut self) -> SessionResult<()> {
        if !self.build_mode.is_positioning() {
            return Ok(());
        }
        let geometry = TileGeometry::new(&self.area, &self.placed);
        let Some(candidate) = self.build_mode.place(&geometry)? else {
            self.events
                .publish(GameEvent::PlacementValidityChanged(false));
            return Ok(());
        };
        self.selection = None;
        let placed = self.placed.commit(&candidate);
        self.events.publish(GameEvent::ObjectPlaced {
            entity_id: placed.id,
            item: placed.item,
            position: placed.anchor,
            footprint: placed.footprint,
            facing: placed.facing,
        });
        Ok(())
    }

    fn cancel_placement(&mut self) {
        if let Some(candidate) = self.build_mode.cancel() {
            let origin = self.selection.take();
            self.return_unit(origin, candidate.item());
        }
    }

    /// Returns one unit of `item` to the inventory it was taken from.
    ///
    /// Without an origin the unit goes to the player. The origin slot is
    /// preferred, then any slot of the same inventory. A unit that fits
    /// nowhere is left in the world as a pickup.
    fn return_unit(&mut self, origin: Option<(InventoryOwner, usize)>, item: ItemId) {
        let (owner, slot) = match origin {
            Some((InventoryOwner::Chest(id), _)) if self.chests.get(id).is_none() => {
                warn!("Chest {:?} is gone, returning {} to the player", id, item);
                (InventoryOwner::Player, None)
            },
            Some((owner, slot)) => (owner, Some(slot)),
            None => (InventoryOwner::Player, None),
        };

        let unit = ItemQuantity::one(item);
        let restored = inventory_for(&mut self.player, &mut self.chests, owner)
            .ok()
            .and_then(|inventory| restore_unit(inventory, slot, unit));
        match restored {
            Some(slot) => {
                self.publish_slots(owner, &[slot]);
                self.redraw_menu();
            },
            None => {
                let entity_id = self.spawn_pickup(PickUp::new(unit));
                warn!("No room to return {} to {:?}, dropped it as a pickup", item, owner);
                self.events
                    .publish(GameEvent::ItemDropped { entity_id, stack: unit });
            },
        }
    }

    fn click_slot(&mut self, slot: usize, kind: ClickKind) -> SessionResult<()> {
        let owner = self.active_owner();
        let inventory = inventory_for(&mut self.player, &mut self.chests, owner)?;
        match self.menu.click(slot, kind, inventory, &self.catalog)? {
            MenuClick::Ignored => {},
            MenuClick::Rearranged(diff) => {
                self.events
                    .publish(GameEvent::InventoryChanged { owner, diff });
            },
            MenuClick::BuildObjectSelected { slot, item } => {
                self.select_build_object(owner, slot, item)?;
            },
        }
        Ok(())
    }

    /// Takes one unit out of `slot` and starts positioning it.
    fn select_build_object(
        &mut self,
        owner: InventoryOwner,
        slot: usize,
        item: ItemId,
    ) -> SessionResult<()> {
        if self.build_mode.is_positioning() {
            debug!("Already positioning, ignoring selection of {}", item);
            return Ok(());
        }

        let inventory = inventory_for(&mut self.player, &mut self.chests, owner)?;
        let stack = inventory
            .get(slot)
            .filter(|s| s.item() == item)
            .ok_or_else(|| InventoryError::InvalidQuantity(format!("slot {slot} does not hold {item}")))?;
        let diff = vec![SlotChange::new(slot, stack.shrink(1)?)];

        let prefab = self.catalog.get(item).and_then(|i| i.prefab.as_ref());
        let geometry = TileGeometry::new(&self.area, &self.placed);
        let valid = self.build_mode.begin_positioning(item, prefab, &geometry)?;
        inventory.make_changes(&diff)?;
        self.menu.draw(inventory, &self.catalog);
        self.selection = Some((owner, slot));

        self.events
            .publish(GameEvent::InventoryChanged { owner, diff });
        self.events
            .publish(GameEvent::PlacementValidityChanged(valid));
        Ok(())
    }

    fn collect_nearby_pickup(&mut self) {
        let Some(id) = self.nearby_pickup else {
            return;
        };
        let Some(pickup) = self.pickups.get(&id).copied() else {
            self.nearby_pickup = None;
            return;
        };
        let Some(slot) = pickup.collect_into(&mut self.player) else {
            return;
        };

        self.pickups.remove(&id);
        self.nearby_pickup = None;
        info!("Picked up {}", pickup.stack);
        self.events.publish(GameEvent::ItemPickedUp {
            owner: InventoryOwner::Player,
            stack: pickup.stack,
        });
        self.publish_slots(InventoryOwner::Player, &[slot]);
        self.redraw_menu();
    }

    /// Returns the placed object under the cursor to the player.
    fn pick_up_object(&mut self) {
        if !self.build_mode.is_enabled() || self.build_mode.is_positioning() {
            return;
        }
        let cell = self.area.world_to_grid(self.build_mode.cursor());
        let Some(object) = self.placed.at_cell(cell).copied() else {
            trace!("No placed object at {}", cell);
            return;
        };
        if !self.player.contains_item(object.item) && !self.player.has_empty_space() {
            info!("Cannot pick up {}. No room in backpack!", object.item);
            return;
        }

        self.placed.remove(object.id);
        self.events.publish(GameEvent::ObjectPickedUp {
            entity_id: object.id,
            item: object.item,
        });
        self.return_unit(None, object.item);
    }

    fn redraw_menu(&mut self) {
        let owner = self.active_owner();
        if let Ok(inventory) = inventory_for(&mut self.player, &mut self.chests, owner) {
            self.menu.draw(inventory, &self.catalog);
        }
    }

    fn publish_slots(&self, owner: InventoryOwner, slots: &[usize]) {
        let inventory = match owner {
            InventoryOwner::Player => Some(&self.player),
            InventoryOwner::Chest(id) => self.chests.get(id).map(Chest::inventory),
        };
        let Some(inventory) = inventory else {
            return;
        };
        let diff: SlotDiff = slots
            .iter()
            .map(|&i| SlotChange::new(i, inventory.get(i)))
            .collect();
        self.events
            .publish(GameEvent::InventoryChanged { owner, diff });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_mode::BuildModeState;
    use crate::item::Item;
    use crate::placement::{FacingMesh, PlaceablePrefab};
    use glam::IVec2;

    const WOOD: ItemId = ItemId::new(1);
    const STONE: ItemId = ItemId::new(2);
    const BENCH: ItemId = ItemId::new(10);

    fn stack(item: ItemId, quantity: u32) -> ItemQuantity {
        ItemQuantity::new(item, quantity).expect("valid stack")
    }

    fn session() -> GameSession {
        session_with(SessionConfig::default())
    }

    fn session_with(config: SessionConfig) -> GameSession {
        let catalog = ItemCatalog::from_items([
            Item::new(WOOD, "Wood"),
            Item::new(STONE, "Stone"),
            Item::new(BENCH, "Bench").with_prefab(PlaceablePrefab::uniform(FacingMesh::new(
                "bench",
                IVec2::new(2, 1),
            ))),
        ])
        .expect("valid catalog");
        GameSession::new(catalog, config).expect("valid config")
    }

    /// Session positioning a bench taken from slot 0 of an open chest.
    fn chest_positioning_session() -> (GameSession, EntityId) {
        let mut s = session();
        let chest = s.spawn_chest("Chest", [stack(BENCH, 1)]);
        s.set_nearby_chest(Some(chest));
        s.tick(&[Intent::Interact]).expect("open chest");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        s.tick(&[Intent::MoveCursor(Vec2::new(1.5, 1.5))])
            .expect("move");
        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Primary,
        }])
        .expect("select");
        s.drain_events();
        (s, chest)
    }

    /// Units of `item` held by the player, one chest and world pickups.
    fn held_total(s: &GameSession, chest: Option<EntityId>, item: ItemId) -> u64 {
        let in_chest = chest
            .and_then(|id| s.chests().get(id))
            .map_or(0, |c| c.inventory().total_quantity(item));
        let on_ground: u64 = s
            .pickups()
            .filter(|p| p.stack.item() == item)
            .map(|p| u64::from(p.stack.quantity()))
            .sum();
        s.player_inventory().total_quantity(item) + in_chest + on_ground
    }

    /// Session in Build Mode positioning a bench at tile (1, 1).
    fn positioning_session() -> GameSession {
        let mut s = session();
        s.give_player(stack(BENCH, 2)).expect("space");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        s.tick(&[Intent::MoveCursor(Vec2::new(1.5, 1.5))])
            .expect("move");
        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Primary,
        }])
        .expect("select");
        s.drain_events();
        s
    }

    #[test]
    fn test_invalid_grid_config_rejected() {
        let config = SessionConfig {
            grid_cell_size: 0.0,
            ..SessionConfig::default()
        };
        let result = GameSession::new(ItemCatalog::new(), config);
        assert!(matches!(result, Err(SessionError::Grid(_))));
    }

    #[test]
    fn test_toggle_ends_tick() {
        let mut s = session();
        s.tick(&[Intent::ToggleBuildMode, Intent::MoveCursor(Vec2::new(3.0, 3.0))])
            .expect("tick");
        assert!(s.build_mode().is_enabled());
        assert_eq!(s.build_mode().cursor(), Vec2::ZERO);
        assert!(s.drain_events().contains(&GameEvent::BuildModeEnabled));
        assert!(s.menu().is_open());
    }

    #[test]
    fn test_select_and_place() {
        let mut s = positioning_session();
        assert!(s.build_mode().is_positioning());
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 1)));

        s.tick(&[Intent::Place]).expect("place");

        assert_eq!(s.placed_objects().len(), 1);
        assert_eq!(s.build_mode().state(), &BuildModeState::Selecting);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ObjectPlaced { item, position, .. }
                if *item == BENCH && *position == IVec2::new(1, 1)
        )));
    }

    #[test]
    fn test_rotation_skips_placement() {
        let mut s = positioning_session();
        s.tick(&[Intent::Rotate(RotationDirection::Left), Intent::Place])
            .expect("tick");
        assert!(s.build_mode().is_positioning());
        assert!(s.placed_objects().is_empty());
    }

    #[test]
    fn test_invalid_move_reports_validity_and_blocks_place() {
        let mut s = positioning_session();
        s.tick(&[Intent::MoveCursor(Vec2::new(7.5, 7.5)), Intent::Place])
            .expect("tick");

        let events = s.drain_events();
        assert_eq!(events.first(), Some(&GameEvent::PlacementValidityChanged(false)));
        assert!(s.placed_objects().is_empty());
        assert!(s.build_mode().is_positioning());
    }

    #[test]
    fn test_cancel_refunds_unit() {
        let mut s = positioning_session();
        s.tick(&[Intent::Cancel]).expect("cancel");
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 2)));
        assert_eq!(s.build_mode().state(), &BuildModeState::Selecting);
    }

    #[test]
    fn test_leaving_build_mode_refunds_unit() {
        let mut s = positioning_session();
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        assert!(!s.build_mode().is_enabled());
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 2)));
        assert!(s.drain_events().contains(&GameEvent::BuildModeDisabled));
    }

    #[test]
    fn test_cancel_with_full_inventory_drops_unit() {
        let mut s = session_with(SessionConfig {
            player_capacity: 1,
            ..SessionConfig::default()
        });
        s.give_player(stack(BENCH, 1)).expect("space");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Primary,
        }])
        .expect("select");
        assert_eq!(s.player_inventory().get(0), None);

        let wood = s.spawn_pickup(PickUp::new(stack(WOOD, 1)).automatic());
        s.set_nearby_pickup(Some(wood));
        assert_eq!(s.player_inventory().get(0), Some(stack(WOOD, 1)));
        s.drain_events();

        s.tick(&[Intent::Cancel]).expect("cancel");

        assert!(!s.player_inventory().contains_item(BENCH));
        assert_eq!(held_total(&s, None, BENCH), 1);
        let dropped: Vec<_> = s.pickups().filter(|p| p.stack.item() == BENCH).collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].stack, stack(BENCH, 1));
        let entity_id = dropped[0].id;
        assert!(s.drain_events().contains(&GameEvent::ItemDropped {
            entity_id,
            stack: stack(BENCH, 1),
        }));
    }

    #[test]
    fn test_leaving_build_mode_with_full_inventory_drops_unit() {
        let mut s = session_with(SessionConfig {
            player_capacity: 1,
            ..SessionConfig::default()
        });
        s.give_player(stack(BENCH, 1)).expect("space");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Primary,
        }])
        .expect("select");
        let stone = s.spawn_pickup(PickUp::new(stack(STONE, 3)).automatic());
        s.set_nearby_pickup(Some(stone));

        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");

        assert!(!s.build_mode().is_enabled());
        assert_eq!(s.player_inventory().get(0), Some(stack(STONE, 3)));
        assert_eq!(held_total(&s, None, BENCH), 1);
        assert_eq!(held_total(&s, None, STONE), 3);
    }

    #[test]
    fn test_cancel_uses_another_slot_when_origin_taken() {
        let mut s = session();
        s.give_player(stack(BENCH, 1)).expect("space");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");
        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Primary,
        }])
        .expect("select");
        let wood = s.spawn_pickup(PickUp::new(stack(WOOD, 2)).automatic());
        s.set_nearby_pickup(Some(wood));
        assert_eq!(s.player_inventory().get(0), Some(stack(WOOD, 2)));
        s.drain_events();

        s.tick(&[Intent::Cancel]).expect("cancel");

        assert_eq!(s.player_inventory().get(1), Some(stack(BENCH, 1)));
        assert_eq!(s.pickups().count(), 0);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::InventoryChanged {
                owner: InventoryOwner::Player,
                diff: vec![SlotChange::new(1, Some(stack(BENCH, 1)))],
            }]
        );
    }

    #[test]
    fn test_cancel_merges_into_origin_slot() {
        let mut s = positioning_session();
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 1)));
        s.give_player(stack(WOOD, 1)).expect("space");
        s.drain_events();

        s.tick(&[Intent::Cancel]).expect("cancel");

        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 2)));
        assert_eq!(s.player_inventory().get(1), Some(stack(WOOD, 1)));
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::InventoryChanged {
                owner: InventoryOwner::Player,
                diff: vec![SlotChange::new(0, Some(stack(BENCH, 2)))],
            }]
        );
    }

    #[test]
    fn test_selecting_from_open_chest_takes_from_chest() {
        let (s, chest) = chest_positioning_session();
        assert!(s.build_mode().is_positioning());
        assert_eq!(s.active_owner(), InventoryOwner::Chest(chest));
        let inventory = s.chests().get(chest).expect("chest").inventory();
        assert_eq!(inventory.get(0), None);
        assert!(!s.player_inventory().contains_item(BENCH));
    }

    #[test]
    fn test_cancel_over_open_chest_returns_unit_to_chest() {
        let (mut s, chest) = chest_positioning_session();
        assert_eq!(held_total(&s, Some(chest), BENCH), 0);

        s.tick(&[Intent::Cancel]).expect("cancel");

        let inventory = s.chests().get(chest).expect("chest").inventory();
        assert_eq!(inventory.get(0), Some(stack(BENCH, 1)));
        assert!(!s.player_inventory().contains_item(BENCH));
        assert_eq!(held_total(&s, Some(chest), BENCH), 1);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::InventoryChanged {
                owner: InventoryOwner::Chest(chest),
                diff: vec![SlotChange::new(0, Some(stack(BENCH, 1)))],
            }]
        );
    }

    #[test]
    fn test_leaving_build_mode_over_open_chest_returns_unit_to_chest() {
        let (mut s, chest) = chest_positioning_session();

        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");

        assert!(!s.build_mode().is_enabled());
        let inventory = s.chests().get(chest).expect("chest").inventory();
        assert_eq!(inventory.get(0), Some(stack(BENCH, 1)));
        assert!(!s.player_inventory().contains_item(BENCH));
        assert_eq!(held_total(&s, Some(chest), BENCH), 1);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::InventoryChanged {
            owner: InventoryOwner::Chest(chest),
            diff: vec![SlotChange::new(0, Some(stack(BENCH, 1)))],
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::InventoryChanged { owner: InventoryOwner::Player, .. })));
    }

    #[test]
    fn test_placing_from_chest_clears_origin() {
        let (mut s, chest) = chest_positioning_session();
        s.tick(&[Intent::Place]).expect("place");
        assert_eq!(s.placed_objects().len(), 1);

        s.tick(&[Intent::Cancel]).expect("nothing to cancel");
        s.tick(&[Intent::ToggleBuildMode]).expect("toggle");

        assert_eq!(held_total(&s, Some(chest), BENCH), 0);
        assert_eq!(s.pickups().count(), 0);
    }

    #[test]
    fn test_slot_clicks_rearrange_player_inventory() {
        let mut s = session();
        s.give_player(stack(WOOD, 10)).expect("space");
        s.tick(&[Intent::ToggleInventoryMenu]).expect("open");
        s.drain_events();

        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::PrimaryWithModifier,
        }])
        .expect("pick");
        s.tick(&[Intent::SlotClick {
            slot: 3,
            kind: ClickKind::Primary,
        }])
        .expect("place");

        assert_eq!(s.player_inventory().get(0), Some(stack(WOOD, 5)));
        assert_eq!(s.player_inventory().get(3), Some(stack(WOOD, 5)));
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::InventoryChanged {
                    owner: InventoryOwner::Player,
                    diff: vec![SlotChange::new(0, Some(stack(WOOD, 5)))],
                },
                GameEvent::InventoryChanged {
                    owner: InventoryOwner::Player,
                    diff: vec![SlotChange::new(3, Some(stack(WOOD, 5)))],
                },
            ]
        );
    }

    #[test]
    fn test_chest_interaction() {
        let mut s = session();
        let chest = s.spawn_chest("Chest", [stack(STONE, 4)]);
        s.set_nearby_chest(Some(chest));

        s.tick(&[Intent::Interact]).expect("open");
        assert_eq!(s.active_owner(), InventoryOwner::Chest(chest));
        assert_eq!(s.menu().owner(), Some(InventoryOwner::Chest(chest)));
        assert!(s
            .drain_events()
            .contains(&GameEvent::ChestOpened { entity_id: chest }));

        s.tick(&[Intent::SlotClick {
            slot: 0,
            kind: ClickKind::Secondary,
        }])
        .expect("pick");
        s.tick(&[Intent::SlotClick {
            slot: 1,
            kind: ClickKind::Primary,
        }])
        .expect("place");
        let inventory = s.chests().get(chest).expect("chest").inventory();
        assert_eq!(inventory.get(0), Some(stack(STONE, 3)));
        assert_eq!(inventory.get(1), Some(stack(STONE, 1)));

        s.tick(&[Intent::Interact]).expect("close");
        assert_eq!(s.active_owner(), InventoryOwner::Player);
        assert!(!s.menu().is_open());
        assert!(s
            .drain_events()
            .contains(&GameEvent::ChestClosed { entity_id: chest }));
    }

    #[test]
    fn test_unknown_chest_is_error() {
        let mut s = session();
        s.set_nearby_chest(Some(EntityId::from_raw(u64::MAX)));
        assert!(matches!(
            s.tick(&[Intent::Interact]),
            Err(SessionError::UnknownChest(_))
        ));
    }

    #[test]
    fn test_pickup_collects_into_player() {
        let mut s = session();
        let id = s.spawn_pickup(PickUp::new(stack(WOOD, 3)));
        s.tick(&[Intent::PickUp]).expect("nothing nearby");
        assert_eq!(s.pickups().count(), 1);

        s.set_nearby_pickup(Some(id));
        s.tick(&[Intent::PickUp]).expect("collect");

        assert_eq!(s.pickups().count(), 0);
        assert_eq!(s.player_inventory().get(0), Some(stack(WOOD, 3)));
        assert!(s.drain_events().contains(&GameEvent::ItemPickedUp {
            owner: InventoryOwner::Player,
            stack: stack(WOOD, 3),
        }));
    }

    #[test]
    fn test_pickup_left_in_world_when_full() {
        let catalog = ItemCatalog::from_items([Item::new(WOOD, "Wood"), Item::new(STONE, "Stone")])
            .expect("valid catalog");
        let config = SessionConfig {
            player_capacity: 1,
            ..SessionConfig::default()
        };
        let mut s = GameSession::new(catalog, config).expect("valid config");
        s.give_player(stack(WOOD, 1)).expect("space");

        let id = s.spawn_pickup(PickUp::new(stack(STONE, 1)));
        s.set_nearby_pickup(Some(id));
        s.tick(&[Intent::PickUp]).expect("lenient");

        assert_eq!(s.pickups().count(), 1);
        assert!(!s.player_inventory().contains_item(STONE));
    }

    #[test]
    fn test_automatic_pickup_on_contact() {
        let mut s = session();
        let id = s.spawn_pickup(PickUp::new(stack(STONE, 2)).automatic());
        s.set_nearby_pickup(Some(id));
        assert_eq!(s.pickups().count(), 0);
        assert!(s.player_inventory().contains_item(STONE));
    }

    #[test]
    fn test_pick_up_placed_object() {
        let mut s = positioning_session();
        s.tick(&[Intent::Place]).expect("place");
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 1)));
        s.drain_events();

        s.tick(&[Intent::MoveCursor(Vec2::new(2.5, 1.5)), Intent::PickUpObject])
            .expect("pick up");

        assert!(s.placed_objects().is_empty());
        assert_eq!(s.player_inventory().get(0), Some(stack(BENCH, 2)));
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::ObjectPickedUp { item, .. } if *item == BENCH)));
    }

    #[test]
    fn test_session_error_converts_to_common_error() {
        let err: HomesteadError = SessionError::UnknownChest(EntityId::from_raw(9)).into();
        assert!(matches!(err, HomesteadError::State(_)));
    }
}
