//! Error types for opsrelay.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SSH error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Store(String),

    #[error("Telegram error: {0}")]
    Telegram(String),
}
