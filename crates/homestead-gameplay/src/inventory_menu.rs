//! Inventory menu model.
//!
//! The menu is a rows × cols grid of cells projected from whichever
//! inventory is active. Cells are a view only: clicks go through the
//! [`Rearranger`] and come back as a slot diff that is applied to the
//! inventory with [`Inventory::make_changes`], then redrawn.

use homestead_common::{Coordinate, InventoryOwner, ItemId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::inventory::{Inventory, SlotDiff};
use crate::item::ItemCatalog;
use crate::rearrange::{ClickKind, Hand, RearrangeError, RearrangeResult, Rearranger};
use crate::stack::ItemQuantity;

/// Extra styling applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStyle {
    /// Build Mode is on and this item can be placed
    BuildModeOk,
    /// Build Mode is on and this item cannot be placed
    BuildModeNotOk,
}

/// What one menu cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    /// Position in the menu grid
    pub coordinate: Coordinate,
    /// Slot contents
    pub contents: Option<ItemQuantity>,
    /// Quantity label text (empty for an empty slot)
    pub label: String,
    /// Whether the cell maps to a real slot
    pub enabled: bool,
    /// Styles layered over the default look
    pub styles: Vec<CellStyle>,
}

impl CellData {
    fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            contents: None,
            label: String::new(),
            enabled: false,
            styles: Vec::new(),
        }
    }
}

/// Tooltip following the cursor while a stack is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandTooltip {
    /// Held item name
    pub item_name: String,
    /// Held quantity
    pub quantity: u32,
    /// Sprite to draw
    pub sprite: String,
}

/// Result of clicking a menu cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuClick {
    /// Nothing happened
    Ignored,
    /// Slots changed and were applied to the inventory
    Rearranged(SlotDiff),
    /// A placeable item was chosen for Build Mode
    BuildObjectSelected {
        /// Slot holding it
        slot: usize,
        /// The item
        item: ItemId,
    },
}

/// Grid view of an inventory plus the player's hand.
#[derive(Debug, Clone)]
pub struct InventoryMenu {
    title: String,
    rows: usize,
    cols: usize,
    cells: Vec<CellData>,
    open: bool,
    owner: Option<InventoryOwner>,
    build_mode: bool,
    rearranger: Rearranger,
}

impl InventoryMenu {
    /// Creates a closed menu with a fixed grid. A zero column count is treated as one.
    #[must_use]
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        let cells = (0..rows * cols)
            .map(|i| CellData::new(Coordinate::from_index(i, cols)))
            .collect();
        Self {
            title: title.into(),
            rows,
            cols,
            cells,
            open: false,
            owner: None,
            build_mode: false,
            rearranger: Rearranger::new(),
        }
    }

    /// Creates a menu with enough rows for `capacity` slots.
    #[must_use]
    pub fn for_capacity(title: impl Into<String>, capacity: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        Self::new(title, capacity.div_ceil(cols), cols)
    }

    /// Menu title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Grid position of an inventory slot.
    #[must_use]
    pub const fn inventory_to_grid_index(&self, index: usize) -> Coordinate {
        Coordinate::from_index(index, self.cols)
    }

    /// Inventory slot behind a grid position.
    #[must_use]
    pub fn grid_to_inventory_index(&self, coord: Coordinate) -> Option<usize> {
        coord
            .to_index(self.cols)
            .filter(|&i| i < self.rows * self.cols)
    }

    /// Whether the menu is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Whose inventory is shown.
    #[must_use]
    pub const fn owner(&self) -> Option<InventoryOwner> {
        self.owner
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[CellData] {
        &self.cells
    }

    /// Cell at a grid position.
    #[must_use]
    pub fn cell(&self, coord: Coordinate) -> Option<&CellData> {
        self.grid_to_inventory_index(coord)
            .and_then(|i| self.cells.get(i))
    }

    /// The held stack, if any.
    #[must_use]
    pub fn held(&self) -> Option<&Hand> {
        self.rearranger.held()
    }

    /// Tooltip for the held stack.
    #[must_use]
    pub fn hand_tooltip(&self, catalog: &ItemCatalog) -> Option<HandTooltip> {
        let hand = self.rearranger.held()?;
        let item = hand.stack.item();
        Some(HandTooltip {
            item_name: catalog.name(item),
            quantity: hand.stack.quantity(),
            sprite: catalog
                .get(item)
                .map(|i| i.sprites.front.clone())
                .unwrap_or_default(),
        })
    }

    /// Shows an inventory.
    ///
    /// Adds rows if `inventory` has more slots than the grid.
    pub fn open(&mut self, owner: InventoryOwner, inventory: &Inventory, catalog: &ItemCatalog) {
        let cols = self.cols;
        let rows = inventory.capacity().div_ceil(cols);
        if rows > self.rows {
            self.cells.extend(
                (self.rows * cols..rows * cols)
                    .map(|i| CellData::new(Coordinate::from_index(i, cols))),
            );
            self.rows = rows;
        }
        self.open = true;
        self.owner = Some(owner);
        debug!("Opened {} menu for {}", self.title, owner);
        self.draw(inventory, catalog);
    }

    /// Hides the menu, putting any held stack back into the inventory.
    pub fn close(&mut self, inventory: &mut Inventory) -> RearrangeResult<SlotDiff> {
        let diff = self.rearranger.release(inventory)?;
        inventory.make_changes(&diff)?;
        self.open = false;
        debug!("Closed {} menu", self.title);
        Ok(diff)
    }

    /// Opens if closed, closes if open. Returns the diff from returning the
    /// hand on close.
    pub fn toggle(
        &mut self,
        owner: InventoryOwner,
        inventory: &mut Inventory,
        catalog: &ItemCatalog,
    ) -> RearrangeResult<SlotDiff> {
        if self.open {
            self.close(inventory)
        } else {
            self.open(owner, inventory, catalog);
            Ok(SlotDiff::new())
        }
    }

    /// Redraws every cell from the inventory.
    pub fn draw(&mut self, inventory: &Inventory, catalog: &ItemCatalog) {
        let capacity = inventory.capacity();
        let build_mode = self.build_mode;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.enabled = index < capacity;
            cell.contents = inventory.get(index);
            cell.label = cell
                .contents
                .map(|s| s.quantity().to_string())
                .unwrap_or_default();
            cell.styles.clear();
            if build_mode {
                if let Some(stack) = cell.contents {
                    cell.styles.push(if catalog.is_placeable(stack.item()) {
                        CellStyle::BuildModeOk
                    } else {
                        CellStyle::BuildModeNotOk
                    });
                }
            }
        }
        trace!("Redrew {} cells", self.cells.len());
    }

    /// Turns Build Mode styling on or off and redraws.
    pub fn set_build_mode(&mut self, enabled: bool, inventory: &Inventory, catalog: &ItemCatalog) {
        self.build_mode = enabled;
        self.draw(inventory, catalog);
    }

    /// Handles a click on the cell behind inventory slot `slot`.
    ///
    /// In Build Mode a click on a placeable item selects it for placement
    /// and everything else is ignored. Otherwise the click drives the
    /// rearrangement state machine and the diff is applied to `inventory`.
    pub fn click(
        &mut self,
        slot: usize,
        kind: ClickKind,
        inventory: &mut Inventory,
        catalog: &ItemCatalog,
    ) -> RearrangeResult<MenuClick> {
        if !self.open {
            return Ok(MenuClick::Ignored);
        }

        if self.build_mode {
            let Some(stack) = inventory.get(slot) else {
                return Ok(MenuClick::Ignored);
            };
            if !catalog.is_placeable(stack.item()) {
                return Ok(MenuClick::Ignored);
            }
            if self.rearranger.is_holding() {
                return Err(RearrangeError::State(format!(
                    "selected {} for Build Mode while holding a stack",
                    stack.item()
                )));
            }
            debug!("Selected {} in slot {} for Build Mode", stack.item(), slot);
            return Ok(MenuClick::BuildObjectSelected {
                slot,
                item: stack.item(),
            });
        }

        let diff = self.rearranger.click_and_apply(inventory, slot, kind)?;
        if diff.is_empty() {
            return Ok(MenuClick::Ignored);
        }
        self.draw(inventory, catalog);
        Ok(MenuClick::Rearranged(diff))
    }

    /// Handles a click on a grid position.
    pub fn click_cell(
        &mut self,
        coord: Coordinate,
        kind: ClickKind,
        inventory: &mut Inventory,
        catalog: &ItemCatalog,
    ) -> RearrangeResult<MenuClick> {
        match self.grid_to_inventory_index(coord) {
            Some(slot) => self.click(slot, kind, inventory, catalog),
            None => Ok(MenuClick::Ignored),
        }
    }
}
