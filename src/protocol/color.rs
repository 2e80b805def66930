//! Colors (§2.2.1.2.4.2)
//!
//! The Minitel has 8 colors, rendered as grey levels on monochrome models.
//! The index of a [`Color`] follows that grey scale, from darkest (0) to
//! lightest (7), which is not the order of the wire codes.

use super::codes::ESC;

/// One of the 8 terminal colors, indexed by perceived lightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Blue,
    Red,
    Magenta,
    Green,
    Cyan,
    Yellow,
    White,
}

/// Which part of the cell a color applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Foreground,
    Background,
}

const BY_INDEX: [Color; 8] = [
    Color::Black,
    Color::Blue,
    Color::Red,
    Color::Magenta,
    Color::Green,
    Color::Cyan,
    Color::Yellow,
    Color::White,
];

impl Color {
    /// Color for a 0..=7 lightness index. Larger indexes clamp to white.
    pub fn from_index(index: u8) -> Self {
        BY_INDEX[usize::from(index.min(7))]
    }

    /// Lightness index, 0 (black) to 7 (white).
    pub fn index(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Blue => 1,
            Color::Red => 2,
            Color::Magenta => 3,
            Color::Green => 4,
            Color::Cyan => 5,
            Color::Yellow => 6,
            Color::White => 7,
        }
    }

    /// Buckets a 0.0..=1.0 lightness into 8 equal bands.
    pub fn from_lightness(lightness: f32) -> Self {
        let mut index = 0;
        for k in 1..8u8 {
            if lightness >= f32::from(k) / 8.0 {
                index = k;
            }
        }
        Self::from_index(index)
    }

    /// Closest grey level of an RGB color, through its HSL lightness.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (_, _, lightness) = rgb_to_hsl(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        );
        Self::from_lightness(lightness)
    }

    /// Position of the color in the wire code table
    fn wire_offset(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
        }
    }

    /// The 2-byte attribute selecting this color for `layer`.
    pub fn encode(self, layer: Layer) -> [u8; 2] {
        let base = match layer {
            Layer::Foreground => 0x40,
            Layer::Background => 0x50,
        };
        [ESC, base + self.wire_offset()]
    }
}

/// RGB components in 0.0..=1.0 to (hue in degrees, saturation, lightness).
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let sector = if chroma == 0.0 {
        0.0
    } else if max == r {
        let h = (g - b) / chroma;
        if h < 0.0 {
            h + 6.0
        } else {
            h
        }
    } else if max == g {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    let lightness = (max + min) * 0.5;
    let saturation = if chroma == 0.0 {
        0.0
    } else {
        chroma / (1.0 - (2.0 * lightness - 1.0).abs())
    };

    (60.0 * sector, saturation, lightness)
}
