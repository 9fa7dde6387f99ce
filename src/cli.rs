//! CLI commands for opsrelay using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::remote::{RemoteExec, SshGateway};
use crate::store::PgStore;
use crate::telegram;

/// opsrelay - Telegram relay for remote Linux host operations.
#[derive(Parser)]
#[command(name = "opsrelay")]
#[command(version = "0.1.0")]
#[command(about = "Telegram relay for remote host operations", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the bot daemon
    Run,

    /// Check connectivity to the remote host and the database
    Doctor,
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Run => cmd_run().await,
            Command::Doctor => cmd_doctor().await,
        }
    }
}

async fn cmd_run() -> Result<()> {
    let settings = Settings::from_env()?;
    telegram::run_bot(settings).await?;
    Ok(())
}

async fn cmd_doctor() -> Result<()> {
    let settings = Settings::from_env()?;

    let ssh = SshGateway::new(settings.remote.clone());
    match ssh.run("uptime").await {
        Ok(output) => println!("ssh: ok ({})", output.trim()),
        Err(e) => println!("ssh: FAILED ({})", e),
    }

    let store = PgStore::new(&settings.store);
    match store.ping().await {
        Ok(()) => println!("database: ok"),
        Err(e) => println!("database: FAILED ({})", e),
    }

    Ok(())
}
