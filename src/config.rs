//! Environment-sourced configuration for opsrelay.
//!
//! All options come from the process environment (a `.env` file is honored
//! via `dotenvy` in `main`, but real environment variables win).

use crate::error::{Error, Result};

/// Credentials for the remote host reached over SSH.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Connection parameters for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// opsrelay settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub telegram_token: String,
    pub remote: RemoteSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_token: require("TOKEN")?,
            remote: RemoteSettings {
                host: require("RM_HOST")?,
                port: port_var("RM_PORT", 22)?,
                user: require("RM_USER")?,
                password: require("RM_PASSWORD")?,
            },
            store: StoreSettings {
                host: require("DB_HOST")?,
                port: port_var("DB_PORT", 5432)?,
                user: require("DB_USER")?,
                password: require("DB_PASSWORD")?,
                database: require("DB_DATABASE")?,
            },
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}

fn port_var(name: &str, default: u16) -> Result<u16> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
