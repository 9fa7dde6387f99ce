//! opsrelay library root.

pub mod cli;
pub mod config;
pub mod dialogue;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod logging;
pub mod remote;
pub mod segment;
pub mod store;
pub mod telegram;

pub use cli::Commands;
pub use config::Settings;
pub use dispatch::{Command, Dispatcher, Messenger};
pub use error::{Error, Result};
pub use remote::RemoteExec;
pub use store::Store;
