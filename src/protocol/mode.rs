//! Attributes that are switched on and off.

use super::codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    CursorVisible,
    LocalEcho,
    Scroll,
    Blink,
    Underline,
    Inverse,
    Graphics,
}

impl Mode {
    /// Byte sequence switching the attribute on or off.
    pub fn encode(self, on: bool) -> &'static [u8] {
        match (self, on) {
            (Mode::CursorVisible, true) => &[codes::SHOW_CURSOR],
            (Mode::CursorVisible, false) => &[codes::HIDE_CURSOR],
            (Mode::LocalEcho, true) => &codes::LOCAL_ECHO_ON,
            (Mode::LocalEcho, false) => &codes::LOCAL_ECHO_OFF,
            (Mode::Scroll, true) => &codes::SCROLL_ON,
            (Mode::Scroll, false) => &codes::SCROLL_OFF,
            (Mode::Blink, true) => &codes::BLINK_ON,
            (Mode::Blink, false) => &codes::BLINK_OFF,
            (Mode::Underline, true) => &codes::UNDERLINE_ON,
            (Mode::Underline, false) => &codes::UNDERLINE_OFF,
            (Mode::Inverse, true) => &codes::INVERSE_ON,
            (Mode::Inverse, false) => &codes::INVERSE_OFF,
            (Mode::Graphics, true) => &[codes::GRAPHICS_MODE_ON],
            (Mode::Graphics, false) => &[codes::GRAPHICS_MODE_OFF],
        }
    }

    /// Number of bytes the terminal echoes back after a change of this
    /// attribute, while acknowledgements are enabled.
    pub fn acknowledgement_len(self) -> usize {
        match self {
            Mode::LocalEcho => codes::LOCAL_ECHO_ACK_LEN,
            Mode::Scroll => codes::SCROLL_ACK_LEN,
            _ => 0,
        }
    }
}
