//! Portable input-event model for the producing side.
//!
//! Platform capture (event taps, accessibility permissions) lives outside this
//! crate; whatever captures events converts them into [`HidEvent`] and calls
//! [`HidEvent::to_message`] to get the OSC message to send.
//!
//! Address = prefix + lowercase event name, e.g. `/hid/left_down`,
//! `/hid/move`, `/hid/button4_up`, `/hid/key_down`.
//!
//! Argument layout:
//! - mouse buttons: `[device_id, x, y, pressure:f, clicks:i]`
//! - move / drag:   `[device_id, x, y, dx:f, dy:f]`
//! - scroll:        `[device_id, x, y, dx:f, dy:f, dz:f]`
//! - keyboard:      `[device_id, key_name:s, key_code:i]`

use crate::protocol::osc::{OscArg, OscMessage};

/// Default address prefix used by the capture apps.
pub const DEFAULT_PREFIX: &str = "/hid/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Any other button, by platform button number.
    Other(u8),
}

impl MouseButton {
    fn name(self) -> String {
        match self {
            MouseButton::Left => "left".into(),
            MouseButton::Right => "right".into(),
            MouseButton::Middle => "middle".into(),
            MouseButton::Other(n) => format!("button{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MouseAction {
    Down { button: MouseButton, pressure: f32, clicks: i32 },
    Up { button: MouseButton, pressure: f32, clicks: i32 },
    Drag { button: MouseButton, dx: f32, dy: f32 },
    Move { dx: f32, dy: f32 },
    Scroll { dx: f32, dy: f32, dz: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
    FlagsChanged,
}

/// One captured input event.
#[derive(Debug, Clone, PartialEq)]
pub enum HidEvent {
    Mouse {
        device_id: i64,
        x: i32,
        y: i32,
        action: MouseAction,
    },
    Key {
        device_id: i64,
        action: KeyAction,
        key_name: String,
        key_code: i32,
    },
}

impl HidEvent {
    /// Event name used as the last address segment.
    pub fn name(&self) -> String {
        match self {
            HidEvent::Mouse { action, .. } => match action {
                MouseAction::Down { button, .. } => format!("{}_down", button.name()),
                MouseAction::Up { button, .. } => format!("{}_up", button.name()),
                // Only left/right have dedicated drag names; every other button drags as middle.
                MouseAction::Drag { button, .. } => match button {
                    MouseButton::Left | MouseButton::Right => format!("{}_drag", button.name()),
                    _ => "middle_drag".into(),
                },
                MouseAction::Move { .. } => "move".into(),
                MouseAction::Scroll { .. } => "scroll".into(),
            },
            HidEvent::Key { action, .. } => match action {
                KeyAction::Down => "key_down".into(),
                KeyAction::Up => "key_up".into(),
                KeyAction::FlagsChanged => "flags_changed".into(),
            },
        }
    }

    /// Build the OSC message for this event under `prefix`.
    pub fn to_message(&self, prefix: &str) -> OscMessage {
        let address = format!("{}{}", normalize_prefix(prefix), self.name());

        let args = match self {
            HidEvent::Mouse {
                device_id,
                x,
                y,
                action,
            } => {
                let mut args = vec![OscArg::from_i64(*device_id), OscArg::Int(*x), OscArg::Int(*y)];
                match action {
                    MouseAction::Down {
                        pressure, clicks, ..
                    }
                    | MouseAction::Up {
                        pressure, clicks, ..
                    } => {
                        args.push(OscArg::Float(*pressure));
                        args.push(OscArg::Int(*clicks));
                    }
                    MouseAction::Drag { dx, dy, .. } | MouseAction::Move { dx, dy } => {
                        args.push(OscArg::Float(*dx));
                        args.push(OscArg::Float(*dy));
                    }
                    MouseAction::Scroll { dx, dy, dz } => {
                        args.push(OscArg::Float(*dx));
                        args.push(OscArg::Float(*dy));
                        args.push(OscArg::Float(*dz));
                    }
                }
                args
            }
            HidEvent::Key {
                device_id,
                key_name,
                key_code,
                ..
            } => vec![
                OscArg::from_i64(*device_id),
                OscArg::Str(key_name.clone()),
                OscArg::Int(*key_code),
            ],
        };

        OscMessage::new(&address, args)
    }
}

/// Which event kinds are sent. Everything is sent by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidSendFilter {
    pub buttons: bool,
    pub scroll: bool,
    /// Moves and drags.
    pub moves: bool,
    pub key_down: bool,
    pub key_up: bool,
    /// Modifier changes (`flags_changed`).
    pub modifiers: bool,
}

impl Default for HidSendFilter {
    fn default() -> Self {
        Self {
            buttons: true,
            scroll: true,
            moves: true,
            key_down: true,
            key_up: true,
            modifiers: true,
        }
    }
}

impl HidSendFilter {
    pub fn allows(&self, event: &HidEvent) -> bool {
        match event {
            HidEvent::Mouse { action, .. } => match action {
                MouseAction::Down { .. } | MouseAction::Up { .. } => self.buttons,
                MouseAction::Scroll { .. } => self.scroll,
                MouseAction::Move { .. } | MouseAction::Drag { .. } => self.moves,
            },
            HidEvent::Key { action, .. } => match action {
                KeyAction::Down => self.key_down,
                KeyAction::Up => self.key_up,
                KeyAction::FlagsChanged => self.modifiers,
            },
        }
    }
}

/// Prefix with a leading and a trailing `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut p = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    };
    if !p.ends_with('/') {
        p.push('/');
    }
    p
}
