//! Character sizes and screen geometry

use unicode_width::UnicodeWidthChar;

use super::codes::ESC;

const PARAM_SIZE_NORMAL: u8 = 0x4C;
const PARAM_SIZE_TALL: u8 = 0x4D;
const PARAM_SIZE_WIDE: u8 = 0x4E;
const PARAM_SIZE_DOUBLE: u8 = 0x4F;

/// Columns of the screen in normal size
pub const SCREEN_WIDTH_NORMAL: u16 = 40;
/// Rows of the screen in normal size, status row excluded
pub const SCREEN_HEIGHT_NORMAL: u16 = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CharacterSize {
    #[default]
    Normal,
    Tall,
    Wide,
    Double,
}

impl CharacterSize {
    pub fn encode(self) -> [u8; 2] {
        [ESC, self.param()]
    }

    fn param(self) -> u8 {
        match self {
            CharacterSize::Normal => PARAM_SIZE_NORMAL,
            CharacterSize::Tall => PARAM_SIZE_TALL,
            CharacterSize::Wide => PARAM_SIZE_WIDE,
            CharacterSize::Double => PARAM_SIZE_DOUBLE,
        }
    }

    fn from_param(param: u8) -> Option<Self> {
        match param {
            PARAM_SIZE_NORMAL => Some(CharacterSize::Normal),
            PARAM_SIZE_TALL => Some(CharacterSize::Tall),
            PARAM_SIZE_WIDE => Some(CharacterSize::Wide),
            PARAM_SIZE_DOUBLE => Some(CharacterSize::Double),
            _ => None,
        }
    }

    /// Horizontal scale of a glyph, in cells
    pub fn glyph_width(self) -> u16 {
        match self {
            CharacterSize::Normal | CharacterSize::Tall => 1,
            CharacterSize::Wide | CharacterSize::Double => 2,
        }
    }

    /// Vertical scale of a glyph, in cells
    pub fn glyph_height(self) -> u16 {
        match self {
            CharacterSize::Normal | CharacterSize::Wide => 1,
            CharacterSize::Tall | CharacterSize::Double => 2,
        }
    }

    /// Characters that fit on one row
    pub fn columns(self) -> u16 {
        SCREEN_WIDTH_NORMAL / self.glyph_width()
    }

    /// Rows of characters that fit on the screen
    pub fn rows(self) -> u16 {
        SCREEN_HEIGHT_NORMAL / self.glyph_height()
    }

    /// Width in cells of `text` once printed, starting in size `base`.
    ///
    /// `text` may carry inline size changes (`ESC L`..`ESC O`) and SS2
    /// sequences as produced by the text encoder; other control characters
    /// take no room.
    pub fn text_width(text: &str, base: CharacterSize) -> usize {
        let mut width = 0;
        let mut glyph = usize::from(base.glyph_width());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\u{1B}' => {
                    let param = chars.next().and_then(|p| u8::try_from(p).ok());
                    if let Some(size) = param.and_then(CharacterSize::from_param) {
                        glyph = usize::from(size.glyph_width());
                    }
                }
                '\u{19}' => {
                    // SS2 + diacritic + letter, or SS2 + symbol: one cell
                    if let Some(code) = chars.next() {
                        if ('\u{41}'..='\u{4F}').contains(&code) {
                            chars.next();
                        }
                    }
                    width += glyph;
                }
                _ => {
                    width += glyph * c.width().unwrap_or(0);
                }
            }
        }
        width
    }
}
