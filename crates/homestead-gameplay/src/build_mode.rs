//! Build Mode controller.
//!
//! States: `Disabled` → `Selecting` (no object) → `Positioning` (object
//! follows the cursor, tinted by validity). Placing commits the object and
//! returns to `Selecting`; cancelling discards it and returns to
//! `Selecting`; rotating stays in `Positioning` and swaps the facing mesh.

use glam::Vec2;
use homestead_common::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::placement::{
    validate_candidate, Facing, PlaceableObject, PlaceablePrefab, PlacementGeometry,
    RotationDirection,
};

/// Build Mode error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildModeError {
    /// Operation needs Build Mode to be on
    #[error("Build Mode is not enabled")]
    NotEnabled,
    /// An object is already being positioned
    #[error("Already positioning {0}")]
    AlreadyPositioning(ItemId),
    /// Operation needs an object being positioned
    #[error("No object is being positioned")]
    NotPositioning,
    /// Item has no prefab to place
    #[error("Item {0} is not placeable")]
    NotPlaceable(ItemId),
}

/// Result type for Build Mode operations.
pub type BuildModeResult<T> = Result<T, BuildModeError>;

/// Colour applied to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tint {
    /// Placement allowed
    Valid,
    /// Placement blocked (red)
    Invalid,
}

impl From<bool> for Tint {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BuildModeState {
    /// Build Mode is off
    #[default]
    Disabled,
    /// On, waiting for an object to be chosen
    Selecting,
    /// On, an object follows the cursor
    Positioning(PlaceableObject),
}

/// Build Mode controller.
#[derive(Debug, Clone, Default)]
pub struct BuildMode {
    state: BuildModeState,
    cursor: Vec2,
    validity: Option<bool>,
}

impl BuildMode {
    /// Creates a disabled controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &BuildModeState {
        &self.state
    }

    /// Whether Build Mode is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self.state, BuildModeState::Disabled)
    }

    /// Whether an object is being positioned.
    #[must_use]
    pub const fn is_positioning(&self) -> bool {
        matches!(self.state, BuildModeState::Positioning(_))
    }

    /// The object being positioned.
    #[must_use]
    pub const fn candidate(&self) -> Option<&PlaceableObject> {
        match &self.state {
            BuildModeState::Positioning(obj) => Some(obj),
            _ => None,
        }
    }

    /// Last known cursor position.
    #[must_use]
    pub const fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Tint for the candidate, if one is being positioned.
    #[must_use]
    pub fn tint(&self) -> Option<Tint> {
        self.candidate()?;
        self.validity.map(Tint::from)
    }

    /// Turns Build Mode on or off.
    ///
    /// Turning it off discards any candidate, which is returned so the
    /// caller can give the item back.
    pub fn toggle(&mut self) -> Option<PlaceableObject> {
        if self.is_enabled() {
            self.disable()
        } else {
            self.enable();
            None
        }
    }

    /// Turns Build Mode on.
    pub fn enable(&mut self) {
        if !self.is_enabled() {
            self.state = BuildModeState::Selecting;
            info!("Build Mode enabled.");
        }
    }

    /// Turns Build Mode off, returning a discarded candidate.
    pub fn disable(&mut self) -> Option<PlaceableObject> {
        let previous = std::mem::take(&mut self.state);
        self.validity = None;
        if !matches!(previous, BuildModeState::Disabled) {
            info!("Build Mode disabled.");
        }
        match previous {
            BuildModeState::Positioning(obj) => Some(obj),
            _ => None,
        }
    }

    /// Starts positioning an object made from `item`.
    ///
    /// Returns the initial validity.
    pub fn begin_positioning(
        &mut self,
        item: ItemId,
        prefab: Option<&PlaceablePrefab>,
        geometry: &impl PlacementGeometry,
    ) -> BuildModeResult<bool> {
        match &self.state {
            BuildModeState::Disabled => return Err(BuildModeError::NotEnabled),
            BuildModeState::Positioning(obj) => {
                return Err(BuildModeError::AlreadyPositioning(obj.item()))
            },
            BuildModeState::Selecting => {},
        }
        let prefab = prefab.ok_or(BuildModeError::NotPlaceable(item))?;

        let mut obj = PlaceableObject::new(item, prefab.clone());
        obj.set_anchor(geometry.world_to_grid(self.cursor));
        let valid = validate_candidate(geometry, &obj);
        debug!("Positioning {} at {}", item, obj.anchor());
        self.state = BuildModeState::Positioning(obj);
        self.validity = Some(valid);
        Ok(valid)
    }

    /// Moves the cursor and re-validates the candidate.
    ///
    /// Returns the new validity only when it changed.
    pub fn update_position(
        &mut self,
        cursor: Vec2,
        geometry: &impl PlacementGeometry,
    ) -> Option<bool> {
        self.cursor = cursor;
        let anchor = geometry.world_to_grid(cursor);
        match &mut self.state {
            BuildModeState::Positioning(obj) => obj.set_anchor(anchor),
            _ => return None,
        }
        self.refresh_validity(geometry)
    }

    /// Re-validates the candidate in place. Returns the new validity only
    /// when it changed.
    pub fn refresh_validity(&mut self, geometry: &impl PlacementGeometry) -> Option<bool> {
        let valid = validate_candidate(geometry, self.candidate()?);
        if self.validity == Some(valid) {
            return None;
        }
        self.validity = Some(valid);
        Some(valid)
    }

    /// Rotates the candidate. Returns the new facing and, if it changed,
    /// the new validity.
    pub fn rotate(
        &mut self,
        direction: RotationDirection,
        geometry: &impl PlacementGeometry,
    ) -> BuildModeResult<(Facing, Option<bool>)> {
        let facing = match &mut self.state {
            BuildModeState::Disabled => return Err(BuildModeError::NotEnabled),
            BuildModeState::Selecting => return Err(BuildModeError::NotPositioning),
            BuildModeState::Positioning(obj) => obj.rotate(direction),
        };
        Ok((facing, self.refresh_validity(geometry)))
    }

    /// Finishes positioning if the placement is valid, returning the object
    /// to commit to the world.
    ///
    /// Returns `Ok(None)` when the placement is blocked; the candidate stays.
    pub fn place(
        &mut self,
        geometry: &impl PlacementGeometry,
    ) -> BuildModeResult<Option<PlaceableObject>> {
        let obj = match &self.state {
            BuildModeState::Disabled => return Err(BuildModeError::NotEnabled),
            BuildModeState::Selecting => return Err(BuildModeError::NotPositioning),
            BuildModeState::Positioning(obj) => obj,
        };
        if !validate_candidate(geometry, obj) {
            debug!("Placement of {} blocked at {}", obj.item(), obj.footprint());
            self.validity = Some(false);
            return Ok(None);
        }

        self.validity = None;
        match std::mem::replace(&mut self.state, BuildModeState::Selecting) {
            BuildModeState::Positioning(obj) => {
                info!(
                    "Placed {} facing {} at {}",
                    obj.item(),
                    obj.facing(),
                    obj.footprint()
                );
                Ok(Some(obj))
            },
            _ => Ok(None),
        }
    }

    /// Discards the candidate and returns to `Selecting`.
    pub fn cancel(&mut self) -> Option<PlaceableObject> {
        if !self.is_positioning() {
            return None;
        }
        self.validity = None;
        match std::mem::replace(&mut self.state, BuildModeState::Selecting) {
            BuildModeState::Positioning(obj) => {
                debug!("Cancelled placement of {}", obj.item());
                Some(obj)
            },
            _ => None,
        }
    }
}
