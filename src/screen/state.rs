//! What the encoder last told the terminal.

use crate::protocol::Mode;

/// Last value sent for each two-state attribute. `None` means the value is
/// unknown, either because nothing was sent yet or because the terminal was
/// switched on since.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderState {
    pub cursor_visible: Option<bool>,
    pub local_echo: Option<bool>,
    pub scroll: Option<bool>,
    pub blink: Option<bool>,
    pub underline: Option<bool>,
    pub acknowledgements: Option<bool>,
}

impl EncoderState {
    /// Cache slot for `mode`, for the attributes that are de-duplicated.
    pub fn slot(&mut self, mode: Mode) -> Option<&mut Option<bool>> {
        match mode {
            Mode::CursorVisible => Some(&mut self.cursor_visible),
            Mode::LocalEcho => Some(&mut self.local_echo),
            Mode::Scroll => Some(&mut self.scroll),
            Mode::Blink => Some(&mut self.blink),
            Mode::Underline => Some(&mut self.underline),
            Mode::Inverse | Mode::Graphics => None,
        }
    }

    /// A freshly reset terminal acknowledges routing changes.
    pub fn acknowledgements_enabled(&self) -> bool {
        self.acknowledgements != Some(false)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
