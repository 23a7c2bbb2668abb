//! Input events for chart interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// A pointer (mouse/pen/touch) event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Position in screen (display) coordinates.
    pub position: Point,
    /// Modifier keys held during the event.
    pub modifiers: KeyModifiers,
}

impl PointerEvent {
    /// Create a pointer event without modifiers.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
            modifiers: KeyModifiers::default(),
        }
    }

    /// Attach modifier state.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value")]
pub enum Key {
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// A printable character.
    Char(char),
    /// Anything else, by name.
    Named(String),
}

/// A key press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Which key.
    pub key: Key,
    /// Active modifier keys.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    /// Key press with modifiers.
    #[must_use]
    pub fn with(key: Key, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }

    /// Whether Ctrl or Meta (Cmd) is held.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.meta
    }
}

/// All input events the chart session can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Raw pointer event.
    Pointer(PointerEvent),

    /// Double click / double tap at a screen position.
    DoubleClick {
        /// Screen position.
        position: Point,
    },

    /// Keyboard event.
    Key(KeyEvent),

    /// New contents of the active inline text input.
    TextInput(String),

    /// The inline text input lost focus.
    Blur,

    /// An animation frame boundary; coalesced transform updates commit here.
    Frame,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Ctrl held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };
}
