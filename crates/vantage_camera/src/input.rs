//! Pointer input handling

use serde::{Deserialize, Serialize};

/// What happened to the pointer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// A button went down
    Press,
    /// A button went up
    Release,
    /// The pointer moved
    #[default]
    Move,
    /// Only the wheel turned
    Wheel,
}

/// Held mouse buttons
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

/// Held keyboard modifiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

/// Raw pointer event in viewport pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: i32,
    pub y: i32,
    pub last_x: i32,
    pub last_y: i32,
    pub buttons: Buttons,
    pub modifiers: Modifiers,
    /// Wheel delta in the platform's native units (120 per notch on most systems)
    pub wheel_delta: i32,
}

impl PointerEvent {
    /// Button press at `(x, y)`
    pub fn press(x: i32, y: i32, buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Press,
            x,
            y,
            last_x: x,
            last_y: y,
            buttons,
            ..Default::default()
        }
    }

    /// Button release at `(x, y)`
    pub fn release(x: i32, y: i32, buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Release,
            ..Self::press(x, y, buttons)
        }
    }

    /// Move from `from` to `to` with `buttons` held
    pub fn drag(from: (i32, i32), to: (i32, i32), buttons: Buttons) -> Self {
        Self {
            kind: PointerKind::Move,
            x: to.0,
            y: to.1,
            last_x: from.0,
            last_y: from.1,
            buttons,
            ..Default::default()
        }
    }

    /// Wheel turn without movement
    pub fn wheel(delta: i32) -> Self {
        Self {
            kind: PointerKind::Wheel,
            wheel_delta: delta,
            ..Default::default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Pixel movement since the previous event
    pub fn delta(&self) -> (i32, i32) {
        (self.x - self.last_x, self.y - self.last_y)
    }
}

impl Buttons {
    pub const LEFT: Buttons = Buttons {
        left: true,
        middle: false,
        right: false,
    };
    pub const MIDDLE: Buttons = Buttons {
        left: false,
        middle: true,
        right: false,
    };
    pub const RIGHT: Buttons = Buttons {
        left: false,
        middle: false,
        right: true,
    };
}
