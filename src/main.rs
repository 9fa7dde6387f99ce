//! opsrelay - Telegram relay for remote host operations over SSH and PostgreSQL.

use clap::Parser;
use std::process::ExitCode;

use opsrelay::logging;
use opsrelay::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    // A .env file is a convenience; the real environment wins.
    dotenvy::dotenv().ok();

    // Initialize logging; the guard flushes the file appender on drop.
    let _guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args = Commands::parse();

    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
