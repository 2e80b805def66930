//! Error type shared by the decoder, the encoder and the session.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinitelError {
    #[error("Failed to open terminal device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Terminal connection is closed")]
    Disconnected,

    #[error("A cursor position query is already in flight")]
    QueryInProgress,

    #[error("Cursor position query timed out after {0:?}")]
    QueryTimeout(Duration),

    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[source] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MinitelError>;
