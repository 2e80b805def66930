//! Keyboard decoder
//!
//! Turns the raw keyboard byte stream into [`Event`]s. The decoder is total:
//! every byte sequence decodes to something, and every state consumes a known
//! number of bytes before going back to `Normal`.
//!
//! The power-on sequence `SEP 0x59 SEP 0x53 SEP 0x54` starts like the
//! CONNEXION_FIN key (`SEP 0x59`). After CONNEXION_FIN the decoder waits for
//! the rest of the sequence. The caller bounds that wait: it checks
//! [`KeyboardDecoder::is_awaiting_continuation`] and calls
//! [`KeyboardDecoder::expire`] once the wait is over. On a timeout or a
//! mismatch, CONNEXION_FIN is emitted and the bytes read while waiting are
//! decoded again from `Normal`, in order.

use std::sync::Arc;

use tracing::{debug, trace};

use super::event::{Event, KeyboardEvent, SystemEvent};
use super::function_key::FunctionKey;
use crate::link::{CursorPosition, Link};
use crate::protocol::codes::{POSITION_OFFSET, SEP, US};

/// What follows CONNEXION_FIN when the terminal is switched on
const TURN_ON_CONTINUATION: [u8; 4] = [
    SEP,
    FunctionKey::TurnOn2.code(),
    SEP,
    FunctionKey::TurnOn3.code(),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum DecoderState {
    #[default]
    Normal,
    /// SEP received, waiting for the key code
    Escaped,
    /// CONNEXION_FIN received; holds the continuation bytes matched so far
    AwaitTurnOn(Vec<u8>),
    /// Reading the reply to a cursor position query; holds the row once read
    CursorReply(Option<u8>),
}

#[derive(Debug)]
pub struct KeyboardDecoder {
    state: DecoderState,
    link: Arc<Link>,
}

impl KeyboardDecoder {
    pub fn new(link: Arc<Link>) -> Self {
        Self {
            state: DecoderState::Normal,
            link,
        }
    }

    /// Whether the decoder is inside the bounded wait after CONNEXION_FIN.
    pub fn is_awaiting_continuation(&self) -> bool {
        matches!(self.state, DecoderState::AwaitTurnOn(_))
    }

    /// Feed a single byte to the decoder
    pub fn feed(&mut self, byte: u8, out: &mut Vec<Event>) {
        if self.link.consume_acknowledgement() {
            trace!("Dropped acknowledgement byte {:02x}", byte);
            return;
        }
        self.step(byte, out);
    }

    /// The wait after CONNEXION_FIN elapsed without the power-on sequence.
    pub fn expire(&mut self, out: &mut Vec<Event>) {
        if !self.is_awaiting_continuation() {
            return;
        }
        if let DecoderState::AwaitTurnOn(consumed) = std::mem::take(&mut self.state) {
            debug!("Power-on continuation timed out after {} byte(s)", consumed.len());
            self.abandon_turn_on(consumed, out);
        }
    }

    fn step(&mut self, byte: u8, out: &mut Vec<Event>) {
        match std::mem::take(&mut self.state) {
            DecoderState::Normal => self.normal(byte, out),
            DecoderState::Escaped => self.escaped(byte, out),
            DecoderState::AwaitTurnOn(consumed) => self.await_turn_on(consumed, byte, out),
            DecoderState::CursorReply(row) => self.cursor_reply(row, byte),
        }
    }

    fn normal(&mut self, byte: u8, out: &mut Vec<Event>) {
        if self.link.is_cursor_query_pending() {
            // The reply is `US row column`; US may already be consumed.
            self.state = if byte == US {
                DecoderState::CursorReply(None)
            } else {
                DecoderState::CursorReply(Some(byte))
            };
            return;
        }

        // A query given up on may still be answered. Only the very next
        // byte can open that reply, and only with US.
        if self.link.take_late_reply() && byte == US {
            debug!("Discarding a late cursor position reply");
            self.state = DecoderState::CursorReply(None);
            return;
        }

        if byte == SEP {
            self.state = DecoderState::Escaped;
        } else {
            out.push(Event::Keyboard(KeyboardEvent::Character(char::from(byte))));
        }
    }

    fn escaped(&mut self, byte: u8, out: &mut Vec<Event>) {
        if byte == FunctionKey::ConnexionFin.code() {
            self.state = DecoderState::AwaitTurnOn(Vec::with_capacity(TURN_ON_CONTINUATION.len()));
        } else {
            let key = FunctionKey::from_code(byte);
            out.push(Event::Keyboard(KeyboardEvent::FunctionKey(key)));
        }
    }

    fn await_turn_on(&mut self, mut consumed: Vec<u8>, byte: u8, out: &mut Vec<Event>) {
        consumed.push(byte);
        if !TURN_ON_CONTINUATION.starts_with(&consumed) {
            debug!("Not a power-on sequence: {:02x?}", consumed);
            self.abandon_turn_on(consumed, out);
        } else if consumed.len() == TURN_ON_CONTINUATION.len() {
            debug!("Terminal turned on");
            self.link.request_reset();
            out.push(Event::System(SystemEvent::TurnedOn));
        } else {
            self.state = DecoderState::AwaitTurnOn(consumed);
        }
    }

    fn abandon_turn_on(&mut self, consumed: Vec<u8>, out: &mut Vec<Event>) {
        out.push(Event::Keyboard(KeyboardEvent::FunctionKey(
            FunctionKey::ConnexionFin,
        )));
        for byte in consumed {
            self.step(byte, out);
        }
    }

    fn cursor_reply(&mut self, row: Option<u8>, byte: u8) {
        match row {
            None => self.state = DecoderState::CursorReply(Some(byte)),
            Some(row) => {
                let position = CursorPosition {
                    x: byte.saturating_sub(POSITION_OFFSET),
                    y: row.saturating_sub(POSITION_OFFSET),
                };
                self.link.take_late_reply();
                if !self.link.deliver_cursor_position(position) {
                    debug!("Cursor position {:?} arrived with no query waiting", position);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decoder() -> (KeyboardDecoder, Arc<Link>) {
        let link = Arc::new(Link::new());
        (KeyboardDecoder::new(link.clone()), link)
    }

    fn feed_all(decoder: &mut KeyboardDecoder, bytes: &[u8]) -> Vec<Event> {
        let mut out = Vec::new();
        for &byte in bytes {
            decoder.feed(byte, &mut out);
        }
        out
    }

    fn key(key: FunctionKey) -> Event {
        Event::Keyboard(KeyboardEvent::FunctionKey(key))
    }

    fn character(c: char) -> Event {
        Event::Keyboard(KeyboardEvent::Character(c))
    }

    #[test]
    fn test_plain_bytes_are_characters() {
        let (mut decoder, _) = decoder();
        for byte in (0..=0xFFu8).filter(|&b| b != SEP) {
            let events = feed_all(&mut decoder, &[byte]);
            assert_eq!(events, vec![character(char::from(byte))]);
        }
    }

    #[test]
    fn test_function_keys() {
        let (mut decoder, _) = decoder();
        assert_eq!(feed_all(&mut decoder, &[0x13, 0x41]), vec![key(FunctionKey::Envoi)]);
        assert_eq!(
            feed_all(&mut decoder, &[0x13, 0x47, b'x', 0x13, 0x30]),
            vec![
                key(FunctionKey::Correction),
                character('x'),
                key(FunctionKey::Unknown(0x30)),
            ]
        );
    }

    #[test]
    fn test_connexion_fin_waits_then_expires() {
        let (mut decoder, _) = decoder();
        assert_eq!(feed_all(&mut decoder, &[0x13, 0x59]), vec![]);
        assert!(decoder.is_awaiting_continuation());

        let mut out = Vec::new();
        decoder.expire(&mut out);
        assert_eq!(out, vec![key(FunctionKey::ConnexionFin)]);
        assert!(!decoder.is_awaiting_continuation());
    }

    #[test]
    fn test_power_on_sequence() {
        let (mut decoder, link) = decoder();
        let events = feed_all(&mut decoder, &[0x13, 0x59, 0x13, 0x53, 0x13, 0x54]);
        assert_eq!(events, vec![Event::System(SystemEvent::TurnedOn)]);
        assert!(link.take_reset());
        assert!(!decoder.is_awaiting_continuation());
    }

    #[test]
    fn test_mismatch_replays_consumed_bytes() {
        let (mut decoder, _) = decoder();
        // CONNEXION_FIN then ENVOI
        assert_eq!(
            feed_all(&mut decoder, &[0x13, 0x59, 0x13, 0x41]),
            vec![key(FunctionKey::ConnexionFin), key(FunctionKey::Envoi)]
        );
        // CONNEXION_FIN then a character
        assert_eq!(
            feed_all(&mut decoder, &[0x13, 0x59, b'a']),
            vec![key(FunctionKey::ConnexionFin), character('a')]
        );
        // Fails on the last byte: SEP 0x53 decodes as an unknown key
        assert_eq!(
            feed_all(&mut decoder, &[0x13, 0x59, 0x13, 0x53, b'b']),
            vec![
                key(FunctionKey::ConnexionFin),
                key(FunctionKey::Unknown(0x53)),
                character('b'),
            ]
        );
    }

    #[test]
    fn test_expire_replays_partial_continuation() {
        let (mut decoder, _) = decoder();
        assert_eq!(feed_all(&mut decoder, &[0x13, 0x59, 0x13, 0x53]), vec![]);

        let mut out = Vec::new();
        decoder.expire(&mut out);
        assert_eq!(
            out,
            vec![key(FunctionKey::ConnexionFin), key(FunctionKey::Unknown(0x53))]
        );
    }

    #[test]
    fn test_double_connexion_fin_keeps_waiting() {
        let (mut decoder, _) = decoder();
        assert_eq!(
            feed_all(&mut decoder, &[0x13, 0x59, 0x13, 0x59]),
            vec![key(FunctionKey::ConnexionFin)]
        );
        assert!(decoder.is_awaiting_continuation());
    }

    #[test]
    fn test_expire_outside_wait_is_noop() {
        let (mut decoder, _) = decoder();
        feed_all(&mut decoder, &[0x13]);
        let mut out = Vec::new();
        decoder.expire(&mut out);
        assert_eq!(out, vec![]);
        assert_eq!(feed_all(&mut decoder, &[0x42]), vec![key(FunctionKey::Retour)]);
    }

    #[test]
    fn test_acknowledgement_bytes_are_dropped() {
        let (mut decoder, link) = decoder();
        link.expect_acknowledgement(5);
        let events = feed_all(&mut decoder, &[0x13, 0x5E, 0x01, 0x02, 0x13, b'A']);
        assert_eq!(events, vec![character('A')]);
    }

    #[test]
    fn test_cursor_reply() {
        let (mut decoder, link) = decoder();
        let rx = link.begin_cursor_query().unwrap();
        assert_eq!(feed_all(&mut decoder, &[0x41 + 5, 0x41 + 12]), vec![]);
        assert_eq!(rx.try_recv().unwrap(), CursorPosition { x: 12, y: 5 });

        // Back to normal afterwards
        assert_eq!(feed_all(&mut decoder, &[0x13]), vec![]);
        assert_eq!(feed_all(&mut decoder, &[0x41]), vec![key(FunctionKey::Envoi)]);
    }

    #[test]
    fn test_cursor_reply_with_separator() {
        let (mut decoder, link) = decoder();
        let rx = link.begin_cursor_query().unwrap();
        assert_eq!(feed_all(&mut decoder, &[0x1F, 0x41, 0x41 + 39]), vec![]);
        assert_eq!(rx.try_recv().unwrap(), CursorPosition { x: 39, y: 0 });
    }

    #[test]
    fn test_cursor_reply_bytes_are_never_keys() {
        let (mut decoder, link) = decoder();
        let rx = link.begin_cursor_query().unwrap();
        assert_eq!(feed_all(&mut decoder, &[0x13, 0x59, b'z']), vec![character('z')]);
        assert_eq!(
            rx.try_recv().unwrap(),
            CursorPosition { x: 0x59 - 0x41, y: 0 }
        );
    }

    #[test]
    fn test_late_cursor_reply_is_discarded() {
        let (mut decoder, link) = decoder();
        let _rx = link.begin_cursor_query().unwrap();
        link.abandon_cursor_query();

        assert_eq!(
            feed_all(&mut decoder, &[0x1F, 0x44, 0x52, b'h']),
            vec![character('h')]
        );
        // Only one reply is discarded
        assert_eq!(feed_all(&mut decoder, &[0x1F]), vec![character('\u{1f}')]);
    }

    #[test]
    fn test_abandoned_query_without_reply() {
        let (mut decoder, link) = decoder();
        let _rx = link.begin_cursor_query().unwrap();
        link.abandon_cursor_query();

        assert_eq!(
            feed_all(&mut decoder, &[b'h', 0x1F]),
            vec![character('h'), character('\u{1f}')]
        );
    }

    #[test]
    fn test_query_abandoned_mid_reply() {
        let (mut decoder, link) = decoder();
        let _rx = link.begin_cursor_query().unwrap();
        assert_eq!(feed_all(&mut decoder, &[0x1F, 0x44]), vec![]);
        link.abandon_cursor_query();

        assert_eq!(feed_all(&mut decoder, &[0x52, b'h']), vec![character('h')]);
        assert!(!link.take_late_reply());
    }
}
