//! Telegram front end - polling loop and outbound messenger.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::config::Settings;
use crate::dispatch::{Dispatcher, Messenger};
use crate::error::{Error, Result};
use crate::remote::SshGateway;
use crate::store::PgStore;

struct TelegramMessenger {
    bot: Bot,
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, user_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(user_id), text)
            .await
            .map_err(|e| Error::Telegram(e.to_string()))?;
        Ok(())
    }
}

/// Run the bot using simple polling until shutdown.
pub async fn run_bot(settings: Settings) -> Result<()> {
    tracing::info!("Starting Telegram bot...");

    let bot = Bot::new(settings.telegram_token.clone());

    if let Err(e) = bot.set_my_commands(command_menu()).await {
        tracing::warn!("Failed to set commands: {}", e);
    }

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(SshGateway::new(settings.remote.clone())),
        Arc::new(PgStore::new(&settings.store)),
        Arc::new(TelegramMessenger { bot: bot.clone() }),
    ));

    tracing::info!("Telegram bot commands set, entering polling loop");

    teloxide::repl(bot, move |msg: Message| {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            if let Some(text) = msg.text() {
                dispatcher.dispatch(msg.chat.id.0, text).await;
            }
            respond(())
        }
    })
    .await;

    Ok(())
}

fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Greeting"),
        BotCommand::new("help", "List available commands"),
        BotCommand::new("find_email", "Extract emails from text"),
        BotCommand::new("find_phone_number", "Extract phone numbers from text"),
        BotCommand::new("verify_password", "Check password strength"),
        BotCommand::new("get_repl_logs", "PostgreSQL replication logs"),
        BotCommand::new("get_emails", "List saved emails"),
        BotCommand::new("get_phone_numbers", "List saved phone numbers"),
        BotCommand::new("get_release", "Remote OS release"),
        BotCommand::new("get_uname", "Remote kernel info"),
        BotCommand::new("get_uptime", "Remote uptime"),
        BotCommand::new("get_df", "Remote disk usage"),
        BotCommand::new("get_free", "Remote memory usage"),
        BotCommand::new("get_mpstat", "Remote CPU stats"),
        BotCommand::new("get_w", "Remote active users"),
        BotCommand::new("get_auths", "Remote recent logins"),
        BotCommand::new("get_critical", "Remote critical events"),
        BotCommand::new("get_ps", "Remote processes"),
        BotCommand::new("get_ss", "Remote listening ports"),
        BotCommand::new("get_apt_list", "Remote packages (optional name)"),
        BotCommand::new("get_services", "Remote services"),
    ]
}
