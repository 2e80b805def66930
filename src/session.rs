//! Session management
//!
//! Binds a keyboard decoder and a screen encoder to one duplex byte channel.
//!
//! ```text
//! reader thread ──bytes──▶ decode thread ──▶ keyboard / system receivers
//!                               │
//!                             Link (acknowledgements, cursor mailbox, reset)
//!                               │
//! consumer ──────────────▶ Screen ──bytes──▶ writer
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{MinitelError, Result};
use crate::keyboard::{Event, KeyboardDecoder, KeyboardEvent, SystemEvent};
use crate::link::Link;
use crate::screen::Screen;

/// What the reader thread hands to the decode thread
#[derive(Debug)]
enum Input {
    Bytes(Vec<u8>),
    Eof,
    Failed(io::Error),
    Shutdown,
}

/// A connected terminal
pub struct Session<W: Write> {
    screen: Screen<W>,
    keyboard: Receiver<KeyboardEvent>,
    system: Receiver<SystemEvent>,
    link: Arc<Link>,
    input_tx: Sender<Input>,
    decode_thread: Option<JoinHandle<Result<()>>>,
    /// Blocked in `read` until the channel yields; never joined
    #[allow(dead_code)]
    reader_thread: JoinHandle<()>,
}

impl Session<File> {
    /// Opens a terminal exposed as a device file, e.g. a serial port.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source: io::Error| MinitelError::Open {
            path: path.to_path_buf(),
            source,
        };
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(open_error)?;
        let reader = device.try_clone().map_err(open_error)?;
        Self::connect(reader, device, config)
    }

    /// Opens a terminal whose keyboard and screen are separate files.
    pub fn open_split(
        keyboard_path: impl AsRef<Path>,
        screen_path: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Self> {
        let keyboard_path = keyboard_path.as_ref();
        let reader = File::open(keyboard_path).map_err(|source| MinitelError::Open {
            path: keyboard_path.to_path_buf(),
            source,
        })?;
        let screen_path = screen_path.as_ref();
        let writer = OpenOptions::new()
            .write(true)
            .open(screen_path)
            .map_err(|source| MinitelError::Open {
                path: screen_path.to_path_buf(),
                source,
            })?;
        Self::connect(reader, writer, config)
    }
}

impl<W: Write> Session<W> {
    /// Starts decoding `reader` and applies the startup configuration.
    pub fn connect<R: Read + Send + 'static>(reader: R, writer: W, config: &Config) -> Result<Self> {
        let link = Arc::new(Link::new());
        let (input_tx, input_rx) = mpsc::channel::<Input>();
        let (keyboard_tx, keyboard) = mpsc::channel();
        let (system_tx, system) = mpsc::channel();

        let reader_tx = input_tx.clone();
        let reader_thread = thread::Builder::new()
            .name("minitel-read".to_string())
            .spawn(move || read_loop(reader, reader_tx))
            .map_err(MinitelError::Read)?;

        let decoder = KeyboardDecoder::new(link.clone());
        let turn_on_timeout = config.turn_on_timeout();
        let decode_link = link.clone();
        let decode_thread = thread::Builder::new()
            .name("minitel-decode".to_string())
            .spawn(move || {
                let result = decode_loop(input_rx, decoder, keyboard_tx, system_tx, turn_on_timeout);
                decode_link.close();
                result
            })
            .map_err(MinitelError::Read)?;

        let mut screen = Screen::new(writer, link.clone());
        screen.set_query_timeout(config.cursor_query_timeout());

        let mut session = Self {
            screen,
            keyboard,
            system,
            link,
            input_tx,
            decode_thread: Some(decode_thread),
            reader_thread,
        };
        session.apply_startup(config)?;
        Ok(session)
    }

    fn apply_startup(&mut self, config: &Config) -> Result<()> {
        let startup = &config.startup;
        if startup.disable_acknowledgement {
            self.screen.disable_acknowledgement()?;
        }
        if let Some(local_echo) = startup.local_echo {
            self.screen.local_echo(local_echo)?;
        }
        if let Some(visible) = startup.show_cursor {
            self.screen.show_cursor(visible)?;
        }
        if startup.clear_screen {
            self.screen.clear_screen_and_home()?;
        }
        Ok(())
    }

    pub fn screen(&mut self) -> &mut Screen<W> {
        &mut self.screen
    }

    pub fn keyboard(&self) -> &Receiver<KeyboardEvent> {
        &self.keyboard
    }

    pub fn system(&self) -> &Receiver<SystemEvent> {
        &self.system
    }

    /// Check if the decode loop is still running
    pub fn is_running(&self) -> bool {
        !self.link.is_closed()
    }

    fn shutdown(&mut self) -> Result<()> {
        let _ = self.input_tx.send(Input::Shutdown);
        match self.decode_thread.take() {
            Some(handle) => handle.join().unwrap_or(Err(MinitelError::Disconnected)),
            None => Ok(()),
        }
    }

    /// Stops the decode loop. Returns the transport error that ended it, if
    /// any. Writes still in flight are not waited for.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn read_loop<R: Read>(mut reader: R, tx: Sender<Input>) {
    let mut buffer = [0u8; 64];
    loop {
        let input = match reader.read(&mut buffer) {
            Ok(0) => Input::Eof,
            Ok(n) => Input::Bytes(buffer[..n].to_vec()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Input::Failed(e),
        };
        let done = !matches!(input, Input::Bytes(_));
        if tx.send(input).is_err() || done {
            break;
        }
    }
}

fn decode_loop(
    rx: Receiver<Input>,
    mut decoder: KeyboardDecoder,
    keyboard_tx: Sender<KeyboardEvent>,
    system_tx: Sender<SystemEvent>,
    turn_on_timeout: Duration,
) -> Result<()> {
    let mut events = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let input = match deadline {
            None => rx.recv().unwrap_or(Input::Eof),
            Some(at) => {
                match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                    Ok(input) => input,
                    Err(RecvTimeoutError::Timeout) => {
                        decoder.expire(&mut events);
                        dispatch(&mut events, &keyboard_tx, &system_tx);
                        deadline = next_deadline(&decoder, turn_on_timeout);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => Input::Eof,
                }
            }
        };

        match input {
            Input::Bytes(bytes) => {
                for byte in bytes {
                    decoder.feed(byte, &mut events);
                }
                dispatch(&mut events, &keyboard_tx, &system_tx);
                deadline = next_deadline(&decoder, turn_on_timeout);
            }
            Input::Eof => {
                debug!("Keyboard channel closed");
                return Ok(());
            }
            Input::Failed(e) => {
                warn!("Keyboard channel failed: {}", e);
                return Err(MinitelError::Read(e));
            }
            Input::Shutdown => {
                debug!("Decode loop cancelled");
                return Ok(());
            }
        }
    }
}

fn next_deadline(decoder: &KeyboardDecoder, timeout: Duration) -> Option<Instant> {
    decoder
        .is_awaiting_continuation()
        .then(|| Instant::now() + timeout)
}

fn dispatch(
    events: &mut Vec<Event>,
    keyboard_tx: &Sender<KeyboardEvent>,
    system_tx: &Sender<SystemEvent>,
) {
    // A dropped receiver only means nobody listens to that category
    for event in events.drain(..) {
        match event {
            Event::Keyboard(e) => {
                let _ = keyboard_tx.send(e);
            }
            Event::System(e) => {
                let _ = system_tx.send(e);
            }
        }
    }
}
