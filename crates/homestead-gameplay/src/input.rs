//! Input handling: raw key and mouse state mapped to gameplay intents.
//!
//! The host feeds device state into an [`InputManager`] each frame and
//! collects a list of [`Intent`]s, which is all the gameplay core consumes.

use ahash::AHashMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::placement::RotationDirection;
use crate::rearrange::ClickKind;

/// Key codes used by the default bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// B key
    B,
    /// E key
    E,
    /// F key
    F,
    /// I key
    I,
    /// Q key
    Q,
    /// R key
    R,
    /// X key
    X,
    /// Tab
    Tab,
    /// Escape
    Escape,
    /// Left Shift
    LShift,
    /// Right Shift
    RShift,
}

/// Mouse button codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button was just pressed this frame
    pub just_pressed: bool,
    /// Whether the button was just released this frame
    pub just_released: bool,
}

impl ButtonState {
    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the frame-specific state (just_pressed, just_released).
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Game actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Enter or leave Build Mode
    ToggleBuildMode,
    /// Rotate the candidate counter-clockwise
    RotateLeft,
    /// Rotate the candidate clockwise
    RotateRight,
    /// Drop the candidate
    Cancel,
    /// Use the nearby interactable (chest)
    Interact,
    /// Collect the nearby pickup
    PickUpItem,
    /// Take back the placed object under the cursor
    PickUpObject,
    /// Show or hide the inventory menu
    ToggleInventory,
    /// Held to turn a primary click into a half-stack click
    Modifier,
}

/// One discrete thing the player asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Enter or leave Build Mode
    ToggleBuildMode,
    /// The cursor moved to a world position
    MoveCursor(Vec2),
    /// Rotate the candidate
    Rotate(RotationDirection),
    /// Commit the candidate
    Place,
    /// Drop the candidate
    Cancel,
    /// An inventory menu cell was clicked
    SlotClick {
        /// Inventory slot behind the cell
        slot: usize,
        /// How it was clicked
        kind: ClickKind,
    },
    /// Use the nearby interactable
    Interact,
    /// Collect the nearby pickup
    PickUp,
    /// Take back the placed object under the cursor
    PickUpObject,
    /// Show or hide the inventory menu
    ToggleInventoryMenu,
}

/// Maps a mouse button and modifier state to a slot click.
///
/// The middle button does not click slots.
#[must_use]
pub const fn click_kind(button: MouseButton, modifier: bool) -> Option<ClickKind> {
    match (button, modifier) {
        (MouseButton::Left, false) => Some(ClickKind::Primary),
        (MouseButton::Left, true) => Some(ClickKind::PrimaryWithModifier),
        (MouseButton::Right, _) => Some(ClickKind::Secondary),
        (MouseButton::Middle, _) => None,
    }
}

/// Key binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Primary key for this action
    pub primary: KeyCode,
    /// Optional secondary key
    pub secondary: Option<KeyCode>,
}

impl KeyBinding {
    /// Create a new key binding with only a primary key.
    #[must_use]
    pub const fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Create a new key binding with primary and secondary keys.
    #[must_use]
    pub const fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }
}

/// Turns raw device state into intents.
#[derive(Debug)]
pub struct InputManager {
    key_states: AHashMap<KeyCode, ButtonState>,
    mouse_states: AHashMap<MouseButton, ButtonState>,
    bindings: AHashMap<Action, KeyBinding>,
    cursor_world_pos: Vec2,
    cursor_moved: bool,
    /// Inventory slot under the cursor, as reported by the UI layer
    hovered_slot: Option<usize>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Create a new input manager with default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut manager = Self {
            key_states: AHashMap::new(),
            mouse_states: AHashMap::new(),
            bindings: AHashMap::new(),
            cursor_world_pos: Vec2::ZERO,
            cursor_moved: false,
            hovered_slot: None,
        };
        manager.set_default_bindings();
        manager
    }

    /// Set default key bindings.
    pub fn set_default_bindings(&mut self) {
        self.bindings.clear();
        self.bindings
            .insert(Action::ToggleBuildMode, KeyBinding::new(KeyCode::B));
        self.bindings
            .insert(Action::RotateLeft, KeyBinding::new(KeyCode::Q));
        self.bindings
            .insert(Action::RotateRight, KeyBinding::new(KeyCode::R));
        self.bindings
            .insert(Action::Cancel, KeyBinding::new(KeyCode::Escape));
        self.bindings
            .insert(Action::Interact, KeyBinding::new(KeyCode::F));
        self.bindings
            .insert(Action::PickUpItem, KeyBinding::new(KeyCode::E));
        self.bindings
            .insert(Action::PickUpObject, KeyBinding::new(KeyCode::X));
        self.bindings.insert(
            Action::ToggleInventory,
            KeyBinding::with_secondary(KeyCode::Tab, KeyCode::I),
        );
        self.bindings.insert(
            Action::Modifier,
            KeyBinding::with_secondary(KeyCode::LShift, KeyCode::RShift),
        );
    }

    /// Rebind an action to a new key.
    pub fn rebind(&mut self, action: Action, binding: KeyBinding) {
        self.bindings.insert(action, binding);
    }

    /// Update a key state.
    pub fn update_key(&mut self, key: KeyCode, is_pressed: bool) {
        self.key_states.entry(key).or_default().update(is_pressed);
    }

    /// Update a mouse button state.
    pub fn update_mouse_button(&mut self, button: MouseButton, is_pressed: bool) {
        self.mouse_states
            .entry(button)
            .or_default()
            .update(is_pressed);
    }

    /// Update the cursor's world position.
    pub fn update_cursor(&mut self, world: Vec2) {
        if world != self.cursor_world_pos {
            self.cursor_world_pos = world;
            self.cursor_moved = true;
        }
    }

    /// Set the inventory slot under the cursor (`None` when over the world).
    pub fn set_hovered_slot(&mut self, slot: Option<usize>) {
        self.hovered_slot = slot;
    }

    /// Clear frame-specific state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        for state in self.key_states.values_mut() {
            state.clear_frame();
        }
        for state in self.mouse_states.values_mut() {
            state.clear_frame();
        }
        self.cursor_moved = false;
    }

    fn key(&self, key: KeyCode) -> ButtonState {
        self.key_states.get(&key).copied().unwrap_or_default()
    }

    fn mouse_just_pressed(&self, button: MouseButton) -> bool {
        self.mouse_states
            .get(&button)
            .is_some_and(|state| state.just_pressed)
    }

    /// Check if an action's key is held.
    #[must_use]
    pub fn is_action_pressed(&self, action: Action) -> bool {
        self.bindings.get(&action).is_some_and(|binding| {
            self.key(binding.primary).pressed
                || binding.secondary.is_some_and(|key| self.key(key).pressed)
        })
    }

    /// Check if an action's key went down this frame.
    #[must_use]
    pub fn is_action_just_pressed(&self, action: Action) -> bool {
        self.bindings.get(&action).is_some_and(|binding| {
            self.key(binding.primary).just_pressed
                || binding
                    .secondary
                    .is_some_and(|key| self.key(key).just_pressed)
        })
    }

    /// Intents for the current frame, in tick order.
    #[must_use]
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = Vec::new();
        if self.is_action_just_pressed(Action::ToggleBuildMode) {
            intents.push(Intent::ToggleBuildMode);
        }
        if self.is_action_just_pressed(Action::ToggleInventory) {
            intents.push(Intent::ToggleInventoryMenu);
        }
        if self.cursor_moved {
            intents.push(Intent::MoveCursor(self.cursor_world_pos));
        }
        if self.is_action_just_pressed(Action::RotateLeft) {
            intents.push(Intent::Rotate(RotationDirection::Left));
        }
        if self.is_action_just_pressed(Action::RotateRight) {
            intents.push(Intent::Rotate(RotationDirection::Right));
        }
        if self.is_action_just_pressed(Action::Cancel) {
            intents.push(Intent::Cancel);
        }

        let modifier = self.is_action_pressed(Action::Modifier);
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            if !self.mouse_just_pressed(button) {
                continue;
            }
            match (self.hovered_slot, click_kind(button, modifier)) {
                (Some(slot), Some(kind)) => intents.push(Intent::SlotClick { slot, kind }),
                (None, _) if button == MouseButton::Left => intents.push(Intent::Place),
                _ => {},
            }
        }

        if self.is_action_just_pressed(Action::Interact) {
            intents.push(Intent::Interact);
        }
        if self.is_action_just_pressed(Action::PickUpItem) {
            intents.push(Intent::PickUp);
        }
        if self.is_action_just_pressed(Action::PickUpObject) {
            intents.push(Intent::PickUpObject);
        }
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_state_edges() {
        let mut state = ButtonState::default();
        state.update(true);
        assert!(state.pressed && state.just_pressed);
        state.update(true);
        assert!(state.pressed && !state.just_pressed);
        state.update(false);
        assert!(!state.pressed && state.just_released);
    }

    #[test]
    fn test_click_kind_mapping() {
        assert_eq!(click_kind(MouseButton::Left, false), Some(ClickKind::Primary));
        assert_eq!(
            click_kind(MouseButton::Left, true),
            Some(ClickKind::PrimaryWithModifier)
        );
        assert_eq!(click_kind(MouseButton::Right, true), Some(ClickKind::Secondary));
        assert_eq!(click_kind(MouseButton::Middle, false), None);
    }

    #[test]
    fn test_toggle_and_rotate_intents() {
        let mut input = InputManager::new();
        input.update_key(KeyCode::B, true);
        input.update_key(KeyCode::Q, true);
        assert_eq!(
            input.intents(),
            vec![
                Intent::ToggleBuildMode,
                Intent::Rotate(RotationDirection::Left)
            ]
        );

        input.end_frame();
        assert!(input.intents().is_empty());
    }

    #[test]
    fn test_cursor_move_reported_once() {
        let mut input = InputManager::new();
        input.update_cursor(Vec2::new(2.0, 3.0));
        assert_eq!(input.intents(), vec![Intent::MoveCursor(Vec2::new(2.0, 3.0))]);
        input.end_frame();
        input.update_cursor(Vec2::new(2.0, 3.0));
        assert!(input.intents().is_empty());
    }

    #[test]
    fn test_shift_click_on_slot() {
        let mut input = InputManager::new();
        input.set_hovered_slot(Some(4));
        input.update_key(KeyCode::LShift, true);
        input.update_mouse_button(MouseButton::Left, true);
        assert_eq!(
            input.intents(),
            vec![Intent::SlotClick {
                slot: 4,
                kind: ClickKind::PrimaryWithModifier
            }]
        );
    }

    #[test]
    fn test_left_click_in_world_places() {
        let mut input = InputManager::new();
        input.update_mouse_button(MouseButton::Left, true);
        input.update_mouse_button(MouseButton::Right, true);
        assert_eq!(input.intents(), vec![Intent::Place]);
    }

    #[test]
    fn test_rebind() {
        let mut input = InputManager::new();
        input.rebind(Action::Interact, KeyBinding::new(KeyCode::E));
        input.update_key(KeyCode::E, true);
        assert_eq!(input.intents(), vec![Intent::Interact, Intent::PickUp]);
    }
}
