//! The wire protocol spoken to the external HID driver: one ASCII
//! command per line, consumed in arrival order.

use std::fmt;

/// Gamepad buttons the driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Start,
    Select,
}

impl Button {
    pub fn as_str(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Lb => "LB",
            Button::Rb => "RB",
            Button::Start => "START",
            Button::Select => "SELECT",
        }
    }
}

/// One discrete actuation. `Display` renders the driver line (without
/// the trailing newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MouseMove { x: i32, y: i32 },
    MouseLeftClick,
    MouseRightClick,
    MouseScroll { delta: i32 },
    GamepadButton { button: Button, pressed: bool },
    GamepadStick { x: i16, y: i16 },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::MouseMove { x, y } => write!(f, "MOUSE_MOVE {x} {y}"),
            Command::MouseLeftClick => write!(f, "MOUSE_LEFT"),
            Command::MouseRightClick => write!(f, "MOUSE_RIGHT"),
            Command::MouseScroll { delta } => write!(f, "MOUSE_SCROLL {delta}"),
            Command::GamepadButton { button, pressed } => {
                write!(f, "GAMEPAD_BTN {} {}", button.as_str(), pressed as u8)
            }
            Command::GamepadStick { x, y } => write!(f, "GAMEPAD_STICK {x} {y}"),
        }
    }
}

/// Host-level shutdown sentinel for a spawned driver process.
pub const QUIT: &str = "QUIT";
