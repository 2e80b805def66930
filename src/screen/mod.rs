//! Screen side of the terminal.
//!
//! - **encoder**: `Screen`, one method per screen intent
//! - **state**: attributes cached to avoid re-sending them

pub mod encoder;
pub mod state;

pub use encoder::Screen;
pub use state::EncoderState;
