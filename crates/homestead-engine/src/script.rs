//! Scripted intent replay for the headless host.
//!
//! A script seeds the world, then feeds one list of intents per frame into
//! [`GameSession::tick`]:
//!
//! ```toml
//! [setup]
//! give = [{ item = 10, quantity = 2 }]
//! chests = [{ name = "Chest", contents = [{ item = 1, quantity = 5 }] }]
//!
//! [[frames]]
//! intents = ["ToggleBuildMode"]
//!
//! [[frames]]
//! intents = [{ MoveCursor = [1.5, 1.5] }, { SlotClick = { slot = 0, kind = "Primary" } }]
//!
//! [[frames]]
//! near_chest = 0
//! intents = ["Interact"]
//! ```
//!
//! Frames may also carry raw device input, which goes through an
//! [`InputManager`] with the default bindings. Its intents follow the
//! frame's own `intents`. Keys and buttons stay down until released:
//!
//! ```toml
//! [[frames]]
//! input = [{ KeyDown = "B" }, { Cursor = [1.5, 1.5] }]
//!
//! [[frames]]
//! input = [{ KeyUp = "B" }, { HoverSlot = 0 }, { ButtonDown = "Left" }]
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use homestead_common::{EntityId, HomesteadError, ItemId};
use homestead_gameplay::{
    EventHandler, GameEvent, GameSession, InputManager, Intent, InventoryError, ItemQuantity,
    KeyCode, MouseButton, PickUp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while loading or seeding a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Failed to read file.
    #[error("Failed to read script: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse script TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A stack in the setup has an invalid quantity.
    #[error("Invalid stack in script setup: {0}")]
    Stack(#[from] InventoryError),

    /// A frame refers to a chest or pickup the setup did not create.
    #[error("Frame {frame} refers to unknown {kind} #{index}")]
    UnknownReference {
        /// Frame number
        frame: usize,
        /// "chest" or "pickup"
        kind: &'static str,
        /// Index into the setup list
        index: usize,
    },
}

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

impl From<ScriptError> for HomesteadError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::ReadError(e) => Self::Io(e),
            ScriptError::ParseError(e) => Self::Content(format!("script: {e}")),
            ScriptError::Stack(e) => Self::Inventory(e.to_string()),
            e @ ScriptError::UnknownReference { .. } => Self::State(e.to_string()),
        }
    }
}

/// A stack written as `{ item, quantity }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDef {
    /// Item ID
    pub item: u32,
    /// Count
    pub quantity: u32,
}

impl StackDef {
    fn to_stack(self) -> ScriptResult<ItemQuantity> {
        Ok(ItemQuantity::new(ItemId::new(self.item), self.quantity)?)
    }
}

/// A chest to spawn before the first frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestDef {
    /// Display name
    #[serde(default = "default_chest_name")]
    pub name: String,
    /// Initial contents
    #[serde(default)]
    pub contents: Vec<StackDef>,
}

fn default_chest_name() -> String {
    "Chest".to_string()
}

/// A pickup to spawn before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickUpDef {
    /// What lies on the ground
    #[serde(flatten)]
    pub stack: StackDef,
    /// Collected on contact
    #[serde(default)]
    pub automatic: bool,
}

/// World state to create before replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSetup {
    /// Stacks given to the player
    pub give: Vec<StackDef>,
    /// Chests to spawn
    pub chests: Vec<ChestDef>,
    /// Pickups to spawn
    pub pickups: Vec<PickUpDef>,
}

/// A raw device change fed to the [`InputManager`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeviceInput {
    /// Key pressed
    KeyDown(KeyCode),
    /// Key released
    KeyUp(KeyCode),
    /// Mouse button pressed
    ButtonDown(MouseButton),
    /// Mouse button released
    ButtonUp(MouseButton),
    /// Cursor moved to a world position
    Cursor(Vec2),
    /// Cursor is over an inventory slot
    HoverSlot(usize),
    /// Cursor is over the world
    HoverWorld,
}

impl DeviceInput {
    fn apply(self, input: &mut InputManager) {
        match self {
            Self::KeyDown(key) => input.update_key(key, true),
            Self::KeyUp(key) => input.update_key(key, false),
            Self::ButtonDown(button) => input.update_mouse_button(button, true),
            Self::ButtonUp(button) => input.update_mouse_button(button, false),
            Self::Cursor(world) => input.update_cursor(world),
            Self::HoverSlot(slot) => input.set_hovered_slot(Some(slot)),
            Self::HoverWorld => input.set_hovered_slot(None),
        }
    }
}

/// One frame of input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Chest (index into `setup.chests`) the player stands next to from
    /// this frame on
    pub near_chest: Option<usize>,
    /// Pickup (index into `setup.pickups`) the player touches from this
    /// frame on
    pub near_pickup: Option<usize>,
    /// Intents in the order they arrived
    pub intents: Vec<Intent>,
    /// Device changes applied before the frame is ticked
    pub input: Vec<DeviceInput>,
}

/// A replayable script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// World seeding
    pub setup: ScriptSetup,
    /// Frames in order
    pub frames: Vec<Frame>,
}

impl Script {
    /// Parses a script from TOML text.
    pub fn from_toml(content: &str) -> ScriptResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a script file.
    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let path = path.as_ref();
        debug!("Loading script: {:?}", path);
        Self::from_toml(&fs::read_to_string(path)?)
    }
}

/// Outcome of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    /// Frames ticked
    pub frames: usize,
    /// Frames whose tick returned an error
    pub failed_frames: usize,
    /// Events dispatched to the handler
    pub events: usize,
}

/// Writes every event as a JSON line at `info`.
#[derive(Debug, Default)]
pub struct EventLogger {
    logged: usize,
}

impl EventLogger {
    /// Creates a logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged so far.
    #[must_use]
    pub const fn logged(&self) -> usize {
        self.logged
    }
}

impl EventHandler for EventLogger {
    fn handle(&mut self, event: &GameEvent) {
        self.logged += 1;
        match serde_json::to_string(event) {
            Ok(json) => info!(target: "homestead::events", "{json}"),
            Err(e) => warn!("Failed to serialize {:?}: {}", event, e),
        }
    }
}

/// Drives a session through a script.
pub struct ScriptRunner<'a> {
    session: &'a mut GameSession,
    input: InputManager,
    chests: Vec<EntityId>,
    pickups: Vec<EntityId>,
}

impl<'a> ScriptRunner<'a> {
    /// Seeds `session` from the script's setup.
    ///
    /// Stacks that do not fit the player inventory are logged and dropped.
    pub fn new(session: &'a mut GameSession, setup: &ScriptSetup) -> ScriptResult<Self> {
        for def in &setup.give {
            let stack = def.to_stack()?;
            if let Err(e) = session.give_player(stack) {
                warn!("Could not give {}: {}", stack, e);
            }
        }

        let mut chests = Vec::with_capacity(setup.chests.len());
        for def in &setup.chests {
            let contents = def
                .contents
                .iter()
                .map(|s| s.to_stack())
                .collect::<ScriptResult<Vec<_>>>()?;
            chests.push(session.spawn_chest(def.name.clone(), contents));
        }

        let mut pickups = Vec::with_capacity(setup.pickups.len());
        for def in &setup.pickups {
            let mut pickup = PickUp::new(def.stack.to_stack()?);
            if def.automatic {
                pickup = pickup.automatic();
            }
            pickups.push(session.spawn_pickup(pickup));
        }

        debug!(
            "Seeded {} chests and {} pickups",
            chests.len(),
            pickups.len()
        );
        Ok(Self {
            session,
            input: InputManager::new(),
            chests,
            pickups,
        })
    }

    /// Ticks every frame, dispatching events to `handler` after each one.
    ///
    /// A failing tick is logged and replay continues with the next frame.
    pub fn run(
        &mut self,
        frames: &[Frame],
        handler: &mut dyn EventHandler,
    ) -> ScriptResult<ReplayReport> {
        let mut report = ReplayReport::default();
        // Setup events go out before the first frame.
        report.events += self.session.events().dispatch(handler);

        for (number, frame) in frames.iter().enumerate() {
            if let Some(index) = frame.near_chest {
                let id = Self::reference(number, "chest", &self.chests, index)?;
                self.session.set_nearby_chest(Some(id));
            }
            if let Some(index) = frame.near_pickup {
                let id = Self::reference(number, "pickup", &self.pickups, index)?;
                self.session.set_nearby_pickup(Some(id));
            }

            for device in &frame.input {
                device.apply(&mut self.input);
            }
            let mut intents = frame.intents.clone();
            intents.extend(self.input.intents());
            if let Err(e) = self.session.tick(&intents) {
                warn!("Frame {} failed: {}", number, e);
                report.failed_frames += 1;
            }
            self.input.end_frame();
            report.frames += 1;
            report.events += self.session.events().dispatch(handler);
        }

        info!(
            "Replayed {} frames ({} failed), {} events",
            report.frames, report.failed_frames, report.events
        );
        Ok(report)
    }

    fn reference(
        frame: usize,
        kind: &'static str,
        ids: &[EntityId],
        index: usize,
    ) -> ScriptResult<EntityId> {
        ids.get(index)
            .copied()
            .ok_or(ScriptError::UnknownReference { frame, kind, index })
    }
}
