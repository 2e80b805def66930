//! Symbol tables of the Minitel wire protocol.
//!
//! - **codes**: raw escape sequences for the screen side
//! - **color**: the 8 colors and their attribute codes
//! - **mode**: attributes switched on and off
//! - **graphics**: semigraphic mosaic glyphs
//! - **size**: character sizes and screen geometry
//! - **charset**: accents and special characters
//!
//! Nothing here holds state; every function is a pure lookup.

pub mod charset;
pub mod codes;
pub mod color;
pub mod graphics;
pub mod mode;
pub mod size;

pub use color::{Color, Layer};
pub use graphics::Sextant;
pub use mode::Mode;
pub use size::CharacterSize;
