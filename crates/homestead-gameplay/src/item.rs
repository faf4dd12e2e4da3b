//! Item definitions and the read-only item catalog.

use ahash::AHashMap;
use homestead_common::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::placement::{Facing, PlaceablePrefab};

/// Errors raised while building an item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two items share an ID
    #[error("Duplicate item ID: {0}")]
    DuplicateId(ItemId),
    /// Item is marked placeable but has nothing to place
    #[error("Item {0} is placeable but has no prefab")]
    MissingPrefab(ItemId),
    /// Item has an empty display name
    #[error("Item {0} has an empty name")]
    EmptyName(ItemId),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Sprite names for each facing of an item.
///
/// Only the front sprite is required; missing facings fall back to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalSprites {
    /// Sprite shown when facing the viewer
    pub front: String,
    /// Sprite shown from behind
    #[serde(default)]
    pub back: Option<String>,
    /// Sprite shown facing left
    #[serde(default)]
    pub left: Option<String>,
    /// Sprite shown facing right
    #[serde(default)]
    pub right: Option<String>,
}

impl DirectionalSprites {
    /// Creates sprites with only a front image.
    #[must_use]
    pub fn front_only(front: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            ..Self::default()
        }
    }

    /// Sprite for a facing, falling back to the front sprite.
    #[must_use]
    pub fn for_facing(&self, facing: Facing) -> &str {
        let specific = match facing {
            Facing::Front => None,
            Facing::Back => self.back.as_deref(),
            Facing::Left => self.left.as_deref(),
            Facing::Right => self.right.as_deref(),
        };
        specific.unwrap_or(&self.front)
    }
}

/// Immutable catalog entry describing an item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Description shown in tooltips
    #[serde(default)]
    pub description: String,
    /// Inventory sprites
    #[serde(default)]
    pub sprites: DirectionalSprites,
    /// Whether the player can place this item in Build Mode
    #[serde(default)]
    pub placeable: bool,
    /// What gets placed in the world, one mesh per facing
    #[serde(default)]
    pub prefab: Option<PlaceablePrefab>,
}

impl Item {
    /// Creates a plain, non-placeable item.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            sprites: DirectionalSprites::front_only(name.to_lowercase()),
            name,
            description: String::new(),
            placeable: false,
            prefab: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the item placeable with the given prefab.
    #[must_use]
    pub fn with_prefab(mut self, prefab: PlaceablePrefab) -> Self {
        self.placeable = true;
        self.prefab = Some(prefab);
        self
    }

    /// Checks the entry is internally consistent.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName(self.id));
        }
        if self.placeable && self.prefab.is_none() {
            return Err(CatalogError::MissingPrefab(self.id));
        }
        Ok(())
    }
}

/// Read-only registry of every item type, looked up by ID.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: AHashMap<ItemId, Item>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of items, rejecting invalid or duplicate entries.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for item in items {
            catalog.register(item)?;
        }
        Ok(catalog)
    }

    /// Adds an item definition.
    pub fn register(&mut self, item: Item) -> CatalogResult<()> {
        item.validate()?;
        if self.items.contains_key(&item.id) {
            return Err(CatalogError::DuplicateId(item.id));
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Looks up an item by ID.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Looks up several items, skipping unknown IDs.
    #[must_use]
    pub fn get_many(&self, ids: &[ItemId]) -> Vec<&Item> {
        ids.iter().filter_map(|id| self.items.get(id)).collect()
    }

    /// Display name for an item, with a fallback for unknown IDs.
    #[must_use]
    pub fn name(&self, id: ItemId) -> String {
        self.items
            .get(&id)
            .map_or_else(|| format!("Item #{}", id.raw()), |item| item.name.clone())
    }

    /// Whether the item can be placed in Build Mode.
    #[must_use]
    pub fn is_placeable(&self, id: ItemId) -> bool {
        self.items.get(&id).is_some_and(|item| item.placeable)
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over all items in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.values()
    }
}
