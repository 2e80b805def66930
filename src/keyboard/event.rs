//! Events decoded from the keyboard channel

use std::fmt;

use super::function_key::FunctionKey;
use crate::protocol::codes::SEP;

/// Input typed on the terminal keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEvent {
    Character(char),
    FunctionKey(FunctionKey),
}

impl KeyboardEvent {
    /// Bytes the terminal sent for this event
    pub fn raw(&self) -> Vec<u8> {
        match self {
            KeyboardEvent::Character(c) => u8::try_from(*c).map(|b| vec![b]).unwrap_or_default(),
            KeyboardEvent::FunctionKey(key) => vec![SEP, key.code()],
        }
    }
}

impl fmt::Display for KeyboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyboardEvent::Character(c) => write!(f, "{} ({:02x})", c.escape_debug(), u32::from(*c)),
            KeyboardEvent::FunctionKey(key) => write!(f, "{key}"),
        }
    }
}

/// Events about the terminal itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEvent {
    /// The terminal was switched on or reset. Every mode it had is back to
    /// its default.
    TurnedOn,
}

impl fmt::Display for SystemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemEvent::TurnedOn => f.write_str("TurnedOn"),
        }
    }
}

/// Anything the decoder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Keyboard(KeyboardEvent),
    System(SystemEvent),
}
