//! Placement validation for Build Mode.
//!
//! A candidate is valid when its footprint lies inside the buildable area
//! and does not overlap any object already placed. Each facing carries its
//! own mesh (sprite + footprint), so rotating swaps meshes instead of
//! rotating a box.

use std::fmt;

use ahash::AHashMap;
use glam::{IVec2, Vec2};
use homestead_common::{EntityId, GridBounds, ItemId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::grid_area::GridArea;

/// One of four cardinal facings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    /// Facing the viewer
    #[default]
    Front = 0,
    /// Facing left
    Left = 1,
    /// Facing away
    Back = 2,
    /// Facing right
    Right = 3,
}

impl Facing {
    /// All facings in index order.
    pub const ALL: [Self; 4] = [Self::Front, Self::Left, Self::Back, Self::Right];

    /// Numeric index (front=0, left=1, back=2, right=3).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Facing for an index, wrapping any integer into 0..4.
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Self::Front,
            1 => Self::Left,
            2 => Self::Back,
            _ => Self::Right,
        }
    }

    /// Facing after one rotation step.
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        Self::from_index(self.index() as i32 + direction.step())
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Front => "front",
            Self::Left => "left",
            Self::Back => "back",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// Rotation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    /// One step down the facing index
    Left,
    /// One step up the facing index
    Right,
}

impl RotationDirection {
    /// Signed index step.
    #[must_use]
    pub const fn step(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Sprite and footprint for one facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingMesh {
    /// Sprite name
    pub sprite: String,
    /// Footprint size in tiles
    pub size: IVec2,
    /// Footprint offset from the anchor tile
    #[serde(default)]
    pub offset: IVec2,
}

impl FacingMesh {
    /// Creates a mesh whose footprint starts at the anchor.
    #[must_use]
    pub fn new(sprite: impl Into<String>, size: IVec2) -> Self {
        Self {
            sprite: sprite.into(),
            size,
            offset: IVec2::ZERO,
        }
    }

    /// Sets the footprint offset.
    #[must_use]
    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset = offset;
        self
    }

    /// Footprint when anchored at `anchor`.
    #[must_use]
    pub fn footprint_at(&self, anchor: IVec2) -> GridBounds {
        GridBounds::from_position_size(anchor + self.offset, self.size)
    }
}

/// The set of meshes for a placeable item.
///
/// Facings without their own mesh use the front one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceablePrefab {
    /// Front mesh
    pub front: FacingMesh,
    /// Left mesh
    #[serde(default)]
    pub left: Option<FacingMesh>,
    /// Back mesh
    #[serde(default)]
    pub back: Option<FacingMesh>,
    /// Right mesh
    #[serde(default)]
    pub right: Option<FacingMesh>,
}

impl PlaceablePrefab {
    /// Prefab using the same mesh for every facing.
    #[must_use]
    pub fn uniform(mesh: FacingMesh) -> Self {
        Self {
            front: mesh,
            left: None,
            back: None,
            right: None,
        }
    }

    /// Sets the mesh for one facing.
    #[must_use]
    pub fn with_mesh(mut self, facing: Facing, mesh: FacingMesh) -> Self {
        match facing {
            Facing::Front => self.front = mesh,
            Facing::Left => self.left = Some(mesh),
            Facing::Back => self.back = Some(mesh),
            Facing::Right => self.right = Some(mesh),
        }
        self
    }

    /// Mesh for a facing.
    #[must_use]
    pub fn mesh(&self, facing: Facing) -> &FacingMesh {
        let specific = match facing {
            Facing::Front => None,
            Facing::Left => self.left.as_ref(),
            Facing::Back => self.back.as_ref(),
            Facing::Right => self.right.as_ref(),
        };
        specific.unwrap_or(&self.front)
    }
}

/// The object being positioned in Build Mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceableObject {
    item: ItemId,
    prefab: PlaceablePrefab,
    facing: Facing,
    anchor: IVec2,
}

impl PlaceableObject {
    /// Creates a front-facing candidate anchored at the origin.
    #[must_use]
    pub fn new(item: ItemId, prefab: PlaceablePrefab) -> Self {
        Self {
            item,
            prefab,
            facing: Facing::Front,
            anchor: IVec2::ZERO,
        }
    }

    /// Item this object was made from.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// Current facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Anchor tile.
    #[must_use]
    pub const fn anchor(&self) -> IVec2 {
        self.anchor
    }

    /// Moves the anchor tile.
    pub fn set_anchor(&mut self, anchor: IVec2) {
        self.anchor = anchor;
    }

    /// Rotates one step and swaps to the new facing's mesh.
    pub fn rotate(&mut self, direction: RotationDirection) -> Facing {
        self.facing = self.facing.rotated(direction);
        trace!(
            "Rotated {} to {} (mesh '{}')",
            self.item,
            self.facing,
            self.active_mesh().sprite
        );
        self.facing
    }

    /// Mesh for the current facing.
    #[must_use]
    pub fn active_mesh(&self) -> &FacingMesh {
        self.prefab.mesh(self.facing)
    }

    /// Footprint at the current anchor and facing.
    #[must_use]
    pub fn footprint(&self) -> GridBounds {
        self.active_mesh().footprint_at(self.anchor)
    }
}

/// An object committed to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// World entity
    pub id: EntityId,
    /// Item it was made from
    pub item: ItemId,
    /// Facing when placed
    pub facing: Facing,
    /// Anchor tile
    pub anchor: IVec2,
    /// Occupied tiles
    pub footprint: GridBounds,
}

/// Registry of objects placed in the world.
#[derive(Debug, Clone, Default)]
pub struct PlacedObjects {
    objects: AHashMap<EntityId, PlacedObject>,
}

impl PlacedObjects {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a candidate and returns the new object.
    pub fn commit(&mut self, candidate: &PlaceableObject) -> PlacedObject {
        let placed = PlacedObject {
            id: EntityId::new(),
            item: candidate.item(),
            facing: candidate.facing(),
            anchor: candidate.anchor(),
            footprint: candidate.footprint(),
        };
        self.objects.insert(placed.id, placed);
        placed
    }

    /// Removes an object.
    pub fn remove(&mut self, id: EntityId) -> Option<PlacedObject> {
        self.objects.remove(&id)
    }

    /// Looks up an object.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    /// Object covering a tile, if any.
    #[must_use]
    pub fn at_cell(&self, cell: IVec2) -> Option<&PlacedObject> {
        let tile = GridBounds::from_position_size(cell, IVec2::ONE);
        self.objects.values().find(|o| o.footprint.intersects(&tile))
    }

    /// Footprints of every placed object.
    pub fn footprints(&self) -> impl Iterator<Item = GridBounds> + '_ {
        self.objects.values().map(|o| o.footprint)
    }

    /// Iterates over placed objects in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedObject> + '_ {
        self.objects.values()
    }

    /// Number of placed objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Scene queries the validator needs.
pub trait PlacementGeometry {
    /// Converts a world position to a tile.
    fn world_to_grid(&self, world: Vec2) -> IVec2;

    /// Bounds of the buildable area in tile space.
    fn area_bounds(&self) -> GridBounds;

    /// Footprints of objects already placed.
    fn placed_footprints(&self) -> Vec<GridBounds>;

    /// Footprint of a candidate at its current anchor and facing.
    fn footprint(&self, candidate: &PlaceableObject) -> GridBounds {
        candidate.footprint()
    }
}

/// Geometry backed by a [`GridArea`] and the [`PlacedObjects`] registry.
#[derive(Debug, Clone, Copy)]
pub struct TileGeometry<'a> {
    /// Buildable region
    pub area: &'a GridArea,
    /// Objects already in the world
    pub placed: &'a PlacedObjects,
}

impl<'a> TileGeometry<'a> {
    /// Creates geometry over an area and a registry.
    #[must_use]
    pub const fn new(area: &'a GridArea, placed: &'a PlacedObjects) -> Self {
        Self { area, placed }
    }
}

impl PlacementGeometry for TileGeometry<'_> {
    fn world_to_grid(&self, world: Vec2) -> IVec2 {
        self.area.world_to_grid(world)
    }

    fn area_bounds(&self) -> GridBounds {
        self.area.bounds()
    }

    fn placed_footprints(&self) -> Vec<GridBounds> {
        self.placed.footprints().collect()
    }
}

/// Checks a footprint against the buildable area and placed footprints.
#[must_use]
pub fn is_valid(
    candidate: &GridBounds,
    area: &GridBounds,
    placed: impl IntoIterator<Item = GridBounds>,
) -> bool {
    area.contains_bounds(candidate) && !placed.into_iter().any(|p| p.intersects(candidate))
}

/// Checks a candidate using scene geometry.
#[must_use]
pub fn validate_candidate(geometry: &impl PlacementGeometry, candidate: &PlaceableObject) -> bool {
    let footprint = geometry.footprint(candidate);
    let valid = is_valid(
        &footprint,
        &geometry.area_bounds(),
        geometry.placed_footprints(),
    );
    trace!("Candidate {} at {} valid={}", candidate.item(), footprint, valid);
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(x0: i32, y0: i32, x1: i32, y1: i32) -> GridBounds {
        GridBounds::from_corners(IVec2::new(x0, y0), IVec2::new(x1, y1))
    }

    const NO_PLACED: [GridBounds; 0] = [];

    fn chair() -> PlaceablePrefab {
        PlaceablePrefab::uniform(FacingMesh::new("chair_front", IVec2::new(1, 1)))
            .with_mesh(Facing::Left, FacingMesh::new("chair_left", IVec2::new(1, 2)))
            .with_mesh(Facing::Right, FacingMesh::new("chair_right", IVec2::new(2, 1)))
    }

    #[test]
    fn test_containment() {
        let area = bounds(0, 0, 4, 4);
        assert!(is_valid(&bounds(0, 0, 2, 2), &area, NO_PLACED));
        assert!(!is_valid(&bounds(3, 3, 6, 6), &area, NO_PLACED));
    }

    #[test]
    fn test_degenerate_candidate_is_contained() {
        let area = bounds(0, 0, 4, 4);
        assert!(is_valid(&bounds(1, 2, 3, 2), &area, NO_PLACED));
        assert!(!is_valid(&bounds(1, 5, 3, 5), &area, NO_PLACED));
    }

    #[test]
    fn test_overlap_rejects() {
        let area = bounds(0, 0, 10, 10);
        let placed = [bounds(2, 2, 4, 4)];
        assert!(!is_valid(&bounds(3, 3, 5, 5), &area, placed));
        assert!(is_valid(&bounds(4, 2, 6, 4), &area, placed));
    }

    #[test]
    fn test_rotate_left_from_front_wraps_to_right() {
        assert_eq!(Facing::Front.rotated(RotationDirection::Left), Facing::Right);
        assert_eq!(Facing::Right.rotated(RotationDirection::Right), Facing::Front);
        assert_eq!(Facing::Front.rotated(RotationDirection::Right), Facing::Left);
    }

    #[test]
    fn test_rotation_swaps_mesh() {
        let mut obj = PlaceableObject::new(ItemId::new(3), chair());
        obj.set_anchor(IVec2::new(5, 5));
        assert_eq!(obj.footprint(), bounds(5, 5, 6, 6));

        assert_eq!(obj.rotate(RotationDirection::Right), Facing::Left);
        assert_eq!(obj.active_mesh().sprite, "chair_left");
        assert_eq!(obj.footprint(), bounds(5, 5, 6, 7));

        obj.rotate(RotationDirection::Right);
        assert_eq!(obj.facing(), Facing::Back);
        assert_eq!(obj.active_mesh().sprite, "chair_front");
    }

    #[test]
    fn test_mesh_offset() {
        let mesh = FacingMesh::new("bed", IVec2::new(2, 1)).with_offset(IVec2::new(-1, 0));
        assert_eq!(mesh.footprint_at(IVec2::new(3, 3)), bounds(2, 3, 4, 4));
    }

    #[test]
    fn test_validate_candidate_with_tile_geometry() {
        let area = GridArea::new(Vec2::new(0.0, 4.0), 4, 4, 1.0);
        let mut placed = PlacedObjects::new();

        let mut first = PlaceableObject::new(ItemId::new(3), chair());
        first.set_anchor(IVec2::new(1, 1));
        assert!(validate_candidate(&TileGeometry::new(&area, &placed), &first));
        placed.commit(&first);

        assert!(!validate_candidate(&TileGeometry::new(&area, &placed), &first));

        let mut second = PlaceableObject::new(ItemId::new(3), chair());
        second.set_anchor(IVec2::new(2, 1));
        assert!(validate_candidate(&TileGeometry::new(&area, &placed), &second));

        second.set_anchor(IVec2::new(4, 1));
        assert!(!validate_candidate(&TileGeometry::new(&area, &placed), &second));
    }

    #[test]
    fn test_placed_objects_registry() {
        let mut placed = PlacedObjects::new();
        let mut obj = PlaceableObject::new(ItemId::new(3), chair());
        obj.set_anchor(IVec2::new(2, 2));
        let committed = placed.commit(&obj);

        assert_eq!(placed.len(), 1);
        assert_eq!(placed.at_cell(IVec2::new(2, 2)).map(|o| o.id), Some(committed.id));
        assert!(placed.at_cell(IVec2::new(3, 2)).is_none());

        assert_eq!(placed.remove(committed.id).map(|o| o.item), Some(ItemId::new(3)));
        assert!(placed.is_empty());
    }

    fn facing() -> impl Strategy<Value = Facing> {
        (0i32..4).prop_map(Facing::from_index)
    }

    proptest! {
        #[test]
        fn prop_four_rotations_return_to_start(start in facing(), left in any::<bool>()) {
            let dir = if left { RotationDirection::Left } else { RotationDirection::Right };
            let mut f = start;
            for _ in 0..4 {
                f = f.rotated(dir);
            }
            prop_assert_eq!(f, start);
        }

        #[test]
        fn prop_is_valid_is_pure(x in -5i32..5, y in -5i32..5, w in 0i32..4, h in 0i32..4) {
            let area = bounds(0, 0, 4, 4);
            let candidate = GridBounds::from_position_size(IVec2::new(x, y), IVec2::new(w, h));
            prop_assert_eq!(is_valid(&candidate, &area, NO_PLACED), is_valid(&candidate, &area, NO_PLACED));
        }
    }
}
