//! Input events delivered by the host event loop.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Keys the transform session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    G,
    R,
    S,
    X,
    Y,
    A,
    Enter,
    Escape,
    Ctrl,
    Shift,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelDirection {
    Up,
    Down,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    PointerMove,
    Key { key: Key, pressed: bool },
    Button { button: PointerButton, pressed: bool },
    Wheel(WheelDirection),
}

/// One host event with the pointer and modifier state at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    /// Pointer position in region coordinates.
    pub mouse: Vec2,
    /// Snap modifier.
    pub ctrl: bool,
    /// Precision modifier.
    pub shift: bool,
}

impl InputEvent {
    pub fn pointer_move(mouse: Vec2) -> Self {
        Self {
            kind: InputKind::PointerMove,
            mouse,
            ctrl: false,
            shift: false,
        }
    }

    pub fn key_press(key: Key, mouse: Vec2) -> Self {
        Self {
            kind: InputKind::Key { key, pressed: true },
            mouse,
            ctrl: false,
            shift: false,
        }
    }

    pub fn key_release(key: Key, mouse: Vec2) -> Self {
        Self {
            kind: InputKind::Key {
                key,
                pressed: false,
            },
            mouse,
            ctrl: false,
            shift: false,
        }
    }

    pub fn button_press(button: PointerButton, mouse: Vec2) -> Self {
        Self {
            kind: InputKind::Button {
                button,
                pressed: true,
            },
            mouse,
            ctrl: false,
            shift: false,
        }
    }

    pub fn wheel(direction: WheelDirection, mouse: Vec2) -> Self {
        Self {
            kind: InputKind::Wheel(direction),
            mouse,
            ctrl: false,
            shift: false,
        }
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

/// Session-level meaning of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Recompute,
    Translate,
    Rotate,
    Scale,
    ConstrainX,
    ConstrainY,
    ToggleTransformAll,
    NextImage,
    PreviousImage,
    Confirm,
    Cancel,
    Ignore,
}

impl InputKind {
    /// Keymap of the modal transform.
    pub(crate) fn action(self) -> Action {
        match self {
            InputKind::PointerMove => Action::Recompute,
            // Modifier changes refresh the preview on press and release.
            InputKind::Key {
                key: Key::Ctrl | Key::Shift,
                ..
            } => Action::Recompute,
            InputKind::Key { pressed: false, .. } => Action::Ignore,
            InputKind::Key { key, pressed: true } => match key {
                Key::G => Action::Translate,
                Key::R => Action::Rotate,
                Key::S => Action::Scale,
                Key::X => Action::ConstrainX,
                Key::Y => Action::ConstrainY,
                Key::A => Action::ToggleTransformAll,
                Key::Enter => Action::Confirm,
                Key::Escape => Action::Cancel,
                Key::Ctrl | Key::Shift | Key::Other => Action::Ignore,
            },
            InputKind::Button {
                button: PointerButton::Left,
                pressed: true,
            } => Action::Confirm,
            InputKind::Button {
                button: PointerButton::Right,
                pressed: true,
            } => Action::Cancel,
            InputKind::Button { .. } => Action::Ignore,
            InputKind::Wheel(WheelDirection::Up) => Action::NextImage,
            InputKind::Wheel(WheelDirection::Down) => Action::PreviousImage,
        }
    }
}
