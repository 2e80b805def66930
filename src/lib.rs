//! minitel - drive a Minitel videotex terminal over a byte channel
//!
//! The terminal is seen as two byte streams: keystrokes coming in, screen
//! commands going out. This crate turns the former into events and the
//! latter into method calls.
//!
//! # Modules
//!
//! - **keyboard**: decoder turning keyboard bytes into events
//! - **screen**: encoder turning screen intents into bytes
//! - **link**: state the decoder and encoder share
//! - **protocol**: raw codes, colors, character sizes and the character set
//! - **session**: binds both sides to one channel
//!
//! # Quick Start
//!
//! ```no_run
//! use minitel::{Config, KeyboardEvent, Session};
//!
//! # fn main() -> minitel::Result<()> {
//! let mut session = Session::open("/dev/ttyUSB0", &Config::default())?;
//! session.screen().clear_screen_and_home()?;
//! session.screen().print("Bonjour, tapez ENVOI")?;
//!
//! for event in session.keyboard().iter() {
//!     if let KeyboardEvent::FunctionKey(key) = event {
//!         println!("{}", key);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod keyboard;
pub mod link;
pub mod protocol;
pub mod screen;
pub mod session;

pub use config::{Config, StartupConfig};
pub use error::{MinitelError, Result};
pub use keyboard::{Event, FunctionKey, KeyboardDecoder, KeyboardEvent, SystemEvent};
pub use link::{CursorPosition, Link};
pub use protocol::{CharacterSize, Color, Mode, Sextant};
pub use screen::{EncoderState, Screen};
pub use session::Session;
