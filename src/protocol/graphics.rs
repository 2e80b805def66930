//! Semigraphic mosaic glyphs (§2.2.1.2.3.3)
//!
//! A glyph is a 2×3 grid of blocks. Callers describe it row by row, top to
//! bottom and left to right, most significant bit first:
//!
//! ```text
//! Bit 5   Bit 4
//! Bit 3   Bit 2
//! Bit 1   Bit 0
//! ```
//!
//! The terminal numbers the blocks the other way around:
//!
//! ```text
//! Bit 0   Bit 1
//! Bit 2   Bit 3
//! Bit 4   Bit 5
//! ```

use bitflags::bitflags;

bitflags! {
    /// Lit blocks of a mosaic glyph, in reading order.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Sextant: u8 {
        const TOP_LEFT      = 0b10_00_00;
        const TOP_RIGHT     = 0b01_00_00;
        const MIDDLE_LEFT   = 0b00_10_00;
        const MIDDLE_RIGHT  = 0b00_01_00;
        const BOTTOM_LEFT   = 0b00_00_10;
        const BOTTOM_RIGHT  = 0b00_00_01;
    }
}

/// First code of the mosaic set
pub const GLYPH_BASE: u8 = 0x20;

impl Sextant {
    /// Block bits in the terminal's numbering.
    pub fn wire_bits(self) -> u8 {
        // The two layouts mirror each other: bit i moves to bit 5 - i.
        let v = self.bits();
        (0..6).fold(0, |acc, i| acc | (((v >> i) & 1) << (5 - i)))
    }

    /// Byte to print, in graphics mode, to display this glyph.
    pub fn encode(self) -> u8 {
        GLYPH_BASE + self.wire_bits()
    }
}
