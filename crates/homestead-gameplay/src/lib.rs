//! # Homestead Gameplay
//!
//! Gameplay systems for Homestead.
//!
//! This crate holds the engine-independent core of the game:
//! - Item stacks, the item catalog and slot inventories
//! - The slot rearrangement engine (pick, place, merge, swap)
//! - The inventory menu model
//! - Grid areas, placeable objects and the placement validator
//! - The Build Mode controller
//! - Chests and item pickups
//! - Input mapping to per-frame intents
//! - The game session that owns all of the above
//! - Event bus for inter-system communication

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod build_mode;
pub mod chest;
pub mod events;
pub mod grid_area;
pub mod input;
pub mod inventory;
pub mod inventory_menu;
pub mod item;
pub mod pickup;
pub mod placement;
pub mod rearrange;
pub mod session;
pub mod stack;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::build_mode::*;
    pub use crate::chest::*;
    pub use crate::events::*;
    pub use crate::grid_area::*;
    pub use crate::input::*;
    pub use crate::inventory::*;
    pub use crate::inventory_menu::*;
    pub use crate::item::*;
    pub use crate::pickup::*;
    pub use crate::placement::*;
    pub use crate::rearrange::*;
    pub use crate::session::*;
    pub use crate::stack::*;
}

pub use prelude::*;
