//! Keyboard side of the terminal.
//!
//! - **function_key**: codes of the named keys
//! - **event**: what the decoder produces
//! - **decoder**: byte stream to events state machine
//!
//! # States
//!
//! ```text
//! Normal ──SEP──▶ Escaped ──code──▶ FunctionKey event
//!   │                │
//!   │                └──0x59──▶ AwaitTurnOn ──SEP 0x53 SEP 0x54──▶ TurnedOn
//!   │                               │
//!   │                               └──timeout / mismatch──▶ CONNEXION_FIN + replay
//!   └──query pending──▶ CursorReply ──row, column──▶ mailbox
//! ```

pub mod decoder;
pub mod event;
pub mod function_key;

pub use decoder::KeyboardDecoder;
pub use event::{Event, KeyboardEvent, SystemEvent};
pub use function_key::FunctionKey;
