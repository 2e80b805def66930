//! minitel-debug - watch what a Minitel sends
//!
//! Connects to a terminal, prints a greeting on it and reports every key
//! pressed on the host terminal.
//!
//! # Quick Start
//!
//! ```text
//! minitel-debug /dev/ttyUSB0                   # Serial port or socket device
//! minitel-debug -k keyboard.fifo -s screen.fifo
//! RUST_LOG=minitel=trace minitel-debug /dev/ttyUSB0
//! ```
//!
//! | Key | Action |
//! |-----|--------|
//! | ENVOI | Report the cursor position |
//! | SOMMAIRE | Clear the screen and greet again |
//! | CONNEXION/FIN | Quit |

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::Context;
use crossterm::style::Stylize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use minitel::{
    Color, Config, FunctionKey, KeyboardEvent, MinitelError, Screen, Session, SystemEvent,
};

/// Where the terminal is reached
enum Target {
    /// One duplex device
    Device(PathBuf),
    /// Separate keyboard and screen files
    Split { keyboard: PathBuf, screen: PathBuf },
}

/// Command line options
struct Options {
    target: Target,
    config: Option<PathBuf>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long the main loop sleeps between two looks at the system events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default cursor query timeout when the configuration sets none
const CURSOR_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

fn print_version() {
    eprintln!("minitel-debug {}", VERSION);
}

fn print_help() {
    eprintln!("minitel-debug {} - Watch what a Minitel sends", VERSION);
    eprintln!();
    eprintln!("Usage: minitel-debug [OPTIONS] <DEVICE>");
    eprintln!("       minitel-debug [OPTIONS] -k <KEYBOARD> -s <SCREEN>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -k, --keyboard <PATH>  Read keystrokes from PATH");
    eprintln!("  -s, --screen <PATH>    Write screen commands to PATH");
    eprintln!("  -c, --config <PATH>    Configuration file");
    eprintln!("  -v, --version          Show version");
    eprintln!("  -h, --help             Show this help");
    eprintln!();
    eprintln!("Keys on the Minitel:");
    eprintln!("  ENVOI                  Report the cursor position");
    eprintln!("  SOMMAIRE               Clear the screen and greet again");
    eprintln!("  CONNEXION/FIN          Quit");
    eprintln!();
    eprintln!("Configuration: ~/.minitel/config.toml");
    eprintln!("Logging: RUST_LOG (default: minitel=debug)");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut device = None;
    let mut keyboard = None;
    let mut screen = None;
    let mut config = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-k" | "--keyboard" => {
                i += 1;
                keyboard = Some(PathBuf::from(
                    args.get(i).ok_or("Missing keyboard path")?,
                ));
            }
            "-s" | "--screen" => {
                i += 1;
                screen = Some(PathBuf::from(args.get(i).ok_or("Missing screen path")?));
            }
            "-c" | "--config" => {
                i += 1;
                config = Some(PathBuf::from(args.get(i).ok_or("Missing config path")?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if device.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                device = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    let target = match (device, keyboard, screen) {
        (Some(device), None, None) => Target::Device(device),
        (None, Some(keyboard), Some(screen)) => Target::Split { keyboard, screen },
        (None, None, None) => return Err("Missing device".to_string()),
        (Some(_), _, _) => return Err("A device excludes -k and -s".to_string()),
        _ => return Err("-k and -s go together".to_string()),
    };

    Ok(Options { target, config })
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load(),
    };
    if config.cursor_query_timeout_ms.is_none() {
        config.cursor_query_timeout_ms = Some(CURSOR_QUERY_TIMEOUT.as_millis() as u64);
    }
    Ok(config)
}

/// Puts the terminal in a known state. Runs again after every power-on.
fn setup(screen: &mut Screen<File>) -> minitel::Result<()> {
    screen.disable_acknowledgement()?;
    screen.local_echo(false)?;
    screen.show_cursor(true)?;
    greet(screen)
}

fn greet(screen: &mut Screen<File>) -> minitel::Result<()> {
    screen.clear_screen_and_home()?;
    screen.inverse_color(Color::Blue)?;
    screen.print(" minitel-debug ")?;
    screen.inverse(false)?;
    screen.move_cursor(0, 2)?;
    screen.print("Tapez au clavier, les touches")?;
    screen.move_cursor(0, 3)?;
    screen.print("s'affichent côté hôte.")?;
    screen.move_cursor(0, 5)?;
    screen.print("ENVOI: position du curseur")?;
    screen.move_cursor(0, 6)?;
    screen.print("SOMMAIRE: effacer")?;
    screen.move_cursor(0, 7)?;
    screen.print("CONNEXION/FIN: quitter")?;
    screen.move_cursor(0, 9)?;
    Ok(())
}

fn report_cursor(screen: &mut Screen<File>) -> minitel::Result<()> {
    match screen.cursor_position() {
        Ok(position) => {
            println!("{} x={} y={}", "cursor".yellow(), position.x, position.y);
            Ok(())
        }
        Err(MinitelError::QueryTimeout(timeout)) => {
            warn!("No cursor position after {:?}", timeout);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn run(mut session: Session<File>) -> anyhow::Result<()> {
    setup(session.screen()).context("Failed to set the terminal up")?;

    loop {
        if let Ok(event) = session.system().try_recv() {
            info!("System event: {}", event);
            println!("{} {}", "system".magenta().bold(), event);
            if event == SystemEvent::TurnedOn {
                setup(session.screen())?;
            }
        }

        let event = match session.keyboard().recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Terminal disconnected");
                break;
            }
        };

        info!("Keyboard event: {} {:02x?}", event, event.raw());
        match event {
            KeyboardEvent::Character(_) => {
                println!("{} {}", "char".green(), event);
            }
            KeyboardEvent::FunctionKey(key) => {
                println!("{} {}", "key".cyan().bold(), key);
                match key {
                    FunctionKey::Envoi => report_cursor(session.screen())?,
                    FunctionKey::Sommaire => greet(session.screen())?,
                    FunctionKey::ConnexionFin => break,
                    _ => {}
                }
            }
        }
    }

    session.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minitel=debug"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = load_config(options.config.as_ref())?;
    info!("minitel-debug {} starting...", VERSION);

    let session = match &options.target {
        Target::Device(device) => Session::open(device, &config)?,
        Target::Split { keyboard, screen } => Session::open_split(keyboard, screen, &config)?,
    };
    run(session)
}
