//! Screen encoder
//!
//! One method per screen intent. Every call writes its bytes and flushes:
//! on a 1200 baud link ordering and latency matter more than throughput.

use std::io::Write;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::state::EncoderState;
use crate::error::{MinitelError, Result};
use crate::link::{CursorPosition, Link};
use crate::protocol::{charset, codes, CharacterSize, Color, Layer, Mode, Sextant};

pub struct Screen<W: Write> {
    writer: W,
    state: EncoderState,
    link: Arc<Link>,
    query_timeout: Option<Duration>,
}

impl<W: Write> Screen<W> {
    pub fn new(writer: W, link: Arc<Link>) -> Self {
        Self {
            writer,
            state: EncoderState::default(),
            link,
            query_timeout: None,
        }
    }

    /// Bounds the wait in [`Screen::cursor_position`]. `None` waits forever.
    pub fn set_query_timeout(&mut self, timeout: Option<Duration>) {
        self.query_timeout = timeout;
    }

    /// What the encoder believes the terminal state to be, forgetting it
    /// first if the terminal was switched on since the last call.
    pub fn state(&mut self) -> &EncoderState {
        self.sync_with_terminal();
        &self.state
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Drops the cached attributes if the terminal was switched on since the
    /// last call.
    fn sync_with_terminal(&mut self) {
        if self.link.take_reset() {
            debug!("Terminal was reset, forgetting cached attributes");
            self.state.reset();
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.sync_with_terminal();
        self.writer.write_all(bytes).map_err(MinitelError::Write)?;
        self.writer.flush().map_err(MinitelError::Write)
    }

    /// Writes a de-duplicated attribute, arming the decoder for the
    /// acknowledgement it provokes. The cache only changes once the write
    /// went through.
    fn set_mode(&mut self, mode: Mode, on: bool) -> Result<()> {
        self.sync_with_terminal();
        if self.state.slot(mode).map_or(false, |slot| *slot == Some(on)) {
            return Ok(());
        }

        // Armed before writing: the answer can beat the return of `write`
        let ack_len = match mode.acknowledgement_len() {
            len if len > 0 && self.state.acknowledgements_enabled() => len,
            _ => 0,
        };
        if ack_len > 0 {
            debug!("{:?} change, expecting {} acknowledgement byte(s)", mode, ack_len);
            self.link.expect_acknowledgement(ack_len);
        }
        if let Err(e) = self.write(mode.encode(on)) {
            self.link.withdraw_acknowledgement(ack_len);
            return Err(e);
        }

        if let Some(slot) = self.state.slot(mode) {
            *slot = Some(on);
        }
        Ok(())
    }

    pub fn raw(&mut self, bytes: &[u8]) -> Result<usize> {
        self.write(bytes)?;
        Ok(bytes.len())
    }

    /// Prints `text`, with accents and special characters translated.
    /// Returns the number of bytes written.
    pub fn print(&mut self, text: &str) -> Result<usize> {
        let encoded = charset::encode(text);
        self.write(&encoded)?;
        Ok(encoded.len())
    }

    pub fn print_char(&mut self, c: char) -> Result<usize> {
        let mut encoded = Vec::with_capacity(3);
        charset::encode_char(c, &mut encoded);
        self.write(&encoded)?;
        Ok(encoded.len())
    }

    pub fn clear_screen_and_home(&mut self) -> Result<()> {
        self.write(&[codes::CLEAR_SCREEN_AND_HOME])
    }

    pub fn clear_end_of_line(&mut self) -> Result<()> {
        self.write(&[codes::CLEAR_END_OF_LINE])
    }

    pub fn clear_bottom_of_screen(&mut self) -> Result<()> {
        self.write(&codes::CLEAR_BOTTOM_OF_SCREEN)
    }

    /// Moves the cursor to column `x`, row `y` (both 0-based).
    pub fn move_cursor(&mut self, x: u8, y: u8) -> Result<()> {
        self.write(&codes::move_cursor(x, y))
    }

    pub fn move_cursor_left(&mut self) -> Result<()> {
        self.write(&[codes::MOVE_CURSOR_LEFT])
    }

    pub fn move_cursor_right(&mut self) -> Result<()> {
        self.write(&[codes::MOVE_CURSOR_RIGHT])
    }

    pub fn move_cursor_up(&mut self) -> Result<()> {
        self.write(&[codes::MOVE_CURSOR_UP])
    }

    pub fn move_cursor_down(&mut self) -> Result<()> {
        self.write(&[codes::MOVE_CURSOR_DOWN])
    }

    pub fn color_foreground(&mut self, color: Color) -> Result<()> {
        self.write(&color.encode(Layer::Foreground))
    }

    /// Note: the background only shows on cells painted afterwards, so print
    /// at least a space after this.
    pub fn color_background(&mut self, color: Color) -> Result<()> {
        self.write(&color.encode(Layer::Background))
    }

    pub fn color(&mut self, background: Color, foreground: Color) -> Result<()> {
        self.color_background(background)?;
        self.color_foreground(foreground)
    }

    pub fn inverse(&mut self, inverse: bool) -> Result<()> {
        self.set_mode(Mode::Inverse, inverse)
    }

    /// Fills the following cells with `fill` through inverse video, which
    /// does not need a space to be painted first like a background color.
    pub fn inverse_color(&mut self, fill: Color) -> Result<()> {
        self.color_foreground(fill)?;
        self.inverse(true)
    }

    pub fn blink(&mut self, blink: bool) -> Result<()> {
        self.set_mode(Mode::Blink, blink)
    }

    pub fn underline(&mut self, underline: bool) -> Result<()> {
        self.set_mode(Mode::Underline, underline)
    }

    pub fn character_size(&mut self, size: CharacterSize) -> Result<()> {
        self.write(&size.encode())
    }

    pub fn graphics_mode(&mut self, graphics: bool) -> Result<()> {
        self.set_mode(Mode::Graphics, graphics)
    }

    /// Prints one mosaic glyph. The terminal must be in graphics mode.
    ///
    /// For example `0b00_11_00` displays ⠒ and `0b11_11_10` displays ⠟.
    pub fn graphics_character(&mut self, glyph: Sextant) -> Result<()> {
        self.write(&[glyph.encode()])
    }

    pub fn repeat_character(&mut self, c: char, times: usize) -> Result<()> {
        let mut encoded = Vec::with_capacity(3);
        charset::encode_char(c, &mut encoded);
        match encoded.as_slice() {
            &[byte] => self.write(&codes::repeat_character(byte, times)),
            // Multi-byte characters cannot go through REP
            _ => {
                let mut out = Vec::with_capacity(encoded.len() * times);
                for _ in 0..times {
                    out.extend_from_slice(&encoded);
                }
                self.write(&out)
            }
        }
    }

    pub fn repeat_last_character(&mut self, times: usize) -> Result<()> {
        self.write(&codes::repeat_last_character(times))
    }

    pub fn show_cursor(&mut self, visible: bool) -> Result<()> {
        self.set_mode(Mode::CursorVisible, visible)
    }

    pub fn local_echo(&mut self, local_echo: bool) -> Result<()> {
        self.set_mode(Mode::LocalEcho, local_echo)
    }

    pub fn scroll(&mut self, scroll: bool) -> Result<()> {
        self.set_mode(Mode::Scroll, scroll)
    }

    /// Stops the terminal from acknowledging routing and mode changes.
    pub fn disable_acknowledgement(&mut self) -> Result<()> {
        self.sync_with_terminal();
        if self.state.acknowledgements == Some(false) {
            return Ok(());
        }
        self.write(&codes::ACKNOWLEDGE_OFF)?;
        self.state.acknowledgements = Some(false);
        Ok(())
    }

    pub fn beep(&mut self) -> Result<()> {
        self.write(&codes::BEEP)
    }

    /// Asks the terminal where its cursor is and waits for the answer.
    ///
    /// The answer comes back on the keyboard channel, so this needs a running
    /// decoder sharing this screen's link.
    pub fn cursor_position(&mut self) -> Result<CursorPosition> {
        let rx = self.link.begin_cursor_query()?;
        if let Err(e) = self.write(&codes::GET_CURSOR_POSITION) {
            self.link.cancel_cursor_query();
            return Err(e);
        }

        match self.query_timeout {
            None => rx.recv().map_err(|_| MinitelError::Disconnected),
            Some(timeout) => rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => {
                    self.link.abandon_cursor_query();
                    MinitelError::QueryTimeout(timeout)
                }
                RecvTimeoutError::Disconnected => MinitelError::Disconnected,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn screen() -> (Screen<Vec<u8>>, Arc<Link>) {
        let link = Arc::new(Link::new());
        (Screen::new(Vec::new(), link.clone()), link)
    }

    fn written(screen: &mut Screen<Vec<u8>>) -> Vec<u8> {
        std::mem::take(&mut screen.writer)
    }

    /// Fails the first `failures` writes, then records like a `Vec`.
    #[derive(Default)]
    struct FlakyWriter {
        failures: usize,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn flaky_screen(failures: usize) -> (Screen<FlakyWriter>, Arc<Link>) {
        let link = Arc::new(Link::new());
        let writer = FlakyWriter {
            failures,
            ..FlakyWriter::default()
        };
        (Screen::new(writer, link.clone()), link)
    }

    #[test]
    fn test_show_cursor_is_deduplicated() {
        let (mut screen, _) = screen();
        screen.show_cursor(true).unwrap();
        screen.show_cursor(true).unwrap();
        assert_eq!(written(&mut screen), vec![0x11]);

        screen.show_cursor(false).unwrap();
        screen.show_cursor(false).unwrap();
        assert_eq!(written(&mut screen), vec![0x14]);
    }

    #[test]
    fn test_blink_and_underline_are_deduplicated() {
        let (mut screen, _) = screen();
        screen.blink(true).unwrap();
        screen.blink(true).unwrap();
        screen.underline(false).unwrap();
        screen.underline(false).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x48, 0x1B, 0x59]);
    }

    #[test]
    fn test_inverse_is_always_written() {
        let (mut screen, _) = screen();
        screen.inverse(true).unwrap();
        screen.inverse(true).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x5D, 0x1B, 0x5D]);
    }

    #[test]
    fn test_local_echo_arms_acknowledgement() {
        let (mut screen, link) = screen();
        screen.local_echo(true).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x3B, 0x61, 0x58, 0x52]);
        assert_eq!(link.pending_acknowledgement(), 5);

        // Unchanged: nothing written, nothing armed
        screen.local_echo(true).unwrap();
        assert!(written(&mut screen).is_empty());
        assert_eq!(link.pending_acknowledgement(), 5);
    }

    #[test]
    fn test_scroll_arms_acknowledgement() {
        let (mut screen, link) = screen();
        screen.scroll(false).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x3A, 0x6A, 0x43]);
        assert_eq!(link.pending_acknowledgement(), 4);
    }

    #[test]
    fn test_no_acknowledgement_once_disabled() {
        let (mut screen, link) = screen();
        screen.disable_acknowledgement().unwrap();
        assert_eq!(
            written(&mut screen),
            vec![0x1B, 0x3A, 0x64, 0x50, 0x1B, 0x3A, 0x64, 0x53]
        );
        screen.disable_acknowledgement().unwrap();
        assert!(written(&mut screen).is_empty());

        screen.local_echo(false).unwrap();
        screen.scroll(true).unwrap();
        assert_eq!(link.pending_acknowledgement(), 0);
    }

    #[test]
    fn test_reset_forgets_cached_attributes() {
        let (mut screen, link) = screen();
        screen.disable_acknowledgement().unwrap();
        screen.local_echo(false).unwrap();
        written(&mut screen);

        link.request_reset();
        screen.local_echo(false).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x3B, 0x60, 0x58, 0x52]);
        assert_eq!(screen.state().acknowledgements, None);
        // Acknowledgements are back on after a power-on
        assert_eq!(link.pending_acknowledgement(), 5);
    }

    #[test]
    fn test_graphics_character() {
        let (mut screen, _) = screen();
        screen.graphics_mode(true).unwrap();
        screen
            .graphics_character(Sextant::from_bits_truncate(0b00_11_00))
            .unwrap();
        screen
            .graphics_character(Sextant::from_bits_truncate(0b11_11_10))
            .unwrap();
        screen.graphics_mode(false).unwrap();
        assert_eq!(written(&mut screen), vec![0x0E, 0x2C, 0x3F, 0x0F]);
    }

    #[test]
    fn test_print() {
        let (mut screen, _) = screen();
        assert_eq!(screen.print("Ça va").unwrap(), 7);
        assert_eq!(written(&mut screen), b"\x19\x4bCa va".to_vec());
        assert_eq!(screen.print_char('x').unwrap(), 1);
    }

    #[test]
    fn test_cursor_and_screen_commands() {
        let (mut screen, _) = screen();
        screen.clear_screen_and_home().unwrap();
        screen.move_cursor(2, 1).unwrap();
        screen.move_cursor_left().unwrap();
        screen.move_cursor_right().unwrap();
        screen.move_cursor_up().unwrap();
        screen.move_cursor_down().unwrap();
        screen.clear_end_of_line().unwrap();
        screen.clear_bottom_of_screen().unwrap();
        assert_eq!(
            written(&mut screen),
            vec![0x0C, 0x1F, 0x42, 0x43, 0x08, 0x09, 0x0B, 0x0A, 0x18, 0x1B, 0x5B, 0x4A]
        );
    }

    #[test]
    fn test_colors() {
        let (mut screen, _) = screen();
        screen.color(Color::Blue, Color::Yellow).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x54, 0x1B, 0x43]);

        screen.inverse_color(Color::Red).unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x41, 0x1B, 0x5D]);
    }

    #[test]
    fn test_character_size_and_beep() {
        let (mut screen, _) = screen();
        screen.character_size(CharacterSize::Tall).unwrap();
        screen.beep().unwrap();
        assert_eq!(written(&mut screen), vec![0x1B, 0x4D, 0x1B, 0x07]);
    }

    #[test]
    fn test_repeat() {
        let (mut screen, _) = screen();
        screen.repeat_character('-', 10).unwrap();
        assert_eq!(written(&mut screen), vec![b'-', 0x12, 0x49]);

        screen.repeat_character('é', 2).unwrap();
        assert_eq!(written(&mut screen), vec![0x19, 0x42, b'e', 0x19, 0x42, b'e']);

        screen.repeat_last_character(3).unwrap();
        assert_eq!(written(&mut screen), vec![0x12, 0x43]);
    }

    #[test]
    fn test_cursor_position() {
        let (mut screen, link) = screen();
        let decoder_link = link.clone();
        let answer = std::thread::spawn(move || {
            while !decoder_link.is_cursor_query_pending() {
                std::thread::yield_now();
            }
            decoder_link.deliver_cursor_position(CursorPosition { x: 4, y: 9 })
        });

        assert_eq!(screen.cursor_position().unwrap(), CursorPosition { x: 4, y: 9 });
        assert!(answer.join().unwrap());
        assert_eq!(written(&mut screen), vec![0x1B, 0x61]);
    }

    #[test]
    fn test_cursor_position_timeout() {
        let (mut screen, link) = screen();
        screen.set_query_timeout(Some(Duration::from_millis(20)));
        assert!(matches!(
            screen.cursor_position(),
            Err(MinitelError::QueryTimeout(_))
        ));
        assert!(!link.is_cursor_query_pending());
        // A reply may still be on its way
        assert!(link.take_late_reply());
    }

    #[test]
    fn test_cursor_position_after_close() {
        let (mut screen, link) = screen();
        link.close();
        assert!(matches!(
            screen.cursor_position(),
            Err(MinitelError::Disconnected)
        ));
        assert!(written(&mut screen).is_empty());
    }

    #[test]
    fn test_failed_write_leaves_nothing_armed() {
        let (mut screen, link) = flaky_screen(1);
        assert!(matches!(screen.local_echo(true), Err(MinitelError::Write(_))));
        assert_eq!(link.pending_acknowledgement(), 0);
        assert_eq!(screen.state().local_echo, None);

        // The retry reaches the terminal
        screen.local_echo(true).unwrap();
        assert_eq!(screen.writer().written, vec![0x1B, 0x3B, 0x61, 0x58, 0x52]);
        assert_eq!(link.pending_acknowledgement(), 5);
    }

    #[test]
    fn test_failed_write_keeps_typed_keys() {
        let (mut screen, link) = flaky_screen(1);
        let mut decoder = crate::keyboard::KeyboardDecoder::new(link.clone());
        assert!(screen.scroll(true).is_err());

        let mut events = Vec::new();
        for &byte in b"HELLO" {
            decoder.feed(byte, &mut events);
        }
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_failed_disable_acknowledgement_is_retried() {
        let (mut screen, _) = flaky_screen(1);
        assert!(screen.disable_acknowledgement().is_err());
        assert_eq!(screen.state().acknowledgements, None);

        screen.disable_acknowledgement().unwrap();
        assert_eq!(screen.writer().written, codes::ACKNOWLEDGE_OFF.to_vec());
        assert_eq!(screen.state().acknowledgements, Some(false));
    }

    #[test]
    fn test_state_reflects_power_on_without_write() {
        let (mut screen, link) = screen();
        screen.show_cursor(false).unwrap();
        screen.scroll(true).unwrap();
        assert_eq!(screen.state().cursor_visible, Some(false));

        link.request_reset();
        assert_eq!(*screen.state(), EncoderState::default());
    }
}
