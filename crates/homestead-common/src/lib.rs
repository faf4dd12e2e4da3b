//! # Homestead Common
//!
//! Common types, utilities, and shared abstractions for Homestead.
//!
//! This crate provides foundational types used across all Homestead crates:
//! - Coordinate types and world-grid snapping
//! - Integer bounding boxes for grid areas and footprints
//! - ID types (EntityId, ItemId, InventoryOwner)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod bounds;
pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bounds::*;
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_item_id_raw() {
        let id = ItemId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.to_string(), "item#7");
    }

    #[test]
    fn test_owner_display() {
        assert_eq!(InventoryOwner::Player.to_string(), "player");
        let chest = InventoryOwner::Chest(EntityId::from_raw(3));
        assert_eq!(chest.to_string(), "chest#3");
    }
}
