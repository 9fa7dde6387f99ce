//! Command dispatcher: routes inbound messages to handlers and dialogues.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dialogue::{self, Conversation};
use crate::error::{Error, Result};
use crate::remote::RemoteExec;
use crate::segment::{segment, MESSAGE_LIMIT};
use crate::store::{RecordKind, Store};

/// Outbound side of the messaging front end, as seen by the core.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, user_id: i64, text: &str) -> Result<()>;
}

/// Commands that map 1:1 to a fixed shell line on the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    ReplLogs,
    Release,
    Uname,
    Uptime,
    Df,
    Free,
    Mpstat,
    W,
    Auths,
    Critical,
    Ps,
    Ss,
    Services,
}

impl RemoteCommand {
    pub fn shell_line(self) -> &'static str {
        match self {
            RemoteCommand::ReplLogs => {
                "cat /var/log/postgresql/postgresql-15-main.log | grep repl -B 1 -A 1 | tail -n 80"
            }
            RemoteCommand::Release => "lsb_release -a",
            RemoteCommand::Uname => "uname -a",
            RemoteCommand::Uptime => "uptime",
            RemoteCommand::Df => "df",
            RemoteCommand::Free => "free",
            RemoteCommand::Mpstat => "mpstat",
            RemoteCommand::W => "w",
            RemoteCommand::Auths => "last -n 10",
            RemoteCommand::Critical => "tail -n 5 /var/log/syslog",
            RemoteCommand::Ps => "ps aux",
            RemoteCommand::Ss => "ss -tuln",
            RemoteCommand::Services => "service --status-all",
        }
    }
}

/// The closed set of commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    FindEmail,
    FindPhoneNumber,
    VerifyPassword,
    GetEmails,
    GetPhoneNumbers,
    Remote(RemoteCommand),
    AptList(Option<String>),
}

impl Command {
    /// Look up a command by its token. `args` is the free-form trailing
    /// text, only meaningful for `get_apt_list`.
    pub fn parse(token: &str, args: Option<&str>) -> Option<Command> {
        let cmd = match token {
            "start" => Command::Start,
            "help" => Command::Help,
            "find_email" => Command::FindEmail,
            "find_phone_number" => Command::FindPhoneNumber,
            "verify_password" => Command::VerifyPassword,
            "get_emails" => Command::GetEmails,
            "get_phone_numbers" => Command::GetPhoneNumbers,
            "get_repl_logs" => Command::Remote(RemoteCommand::ReplLogs),
            "get_release" => Command::Remote(RemoteCommand::Release),
            "get_uname" => Command::Remote(RemoteCommand::Uname),
            "get_uptime" => Command::Remote(RemoteCommand::Uptime),
            "get_df" => Command::Remote(RemoteCommand::Df),
            "get_free" => Command::Remote(RemoteCommand::Free),
            "get_mpstat" => Command::Remote(RemoteCommand::Mpstat),
            "get_w" => Command::Remote(RemoteCommand::W),
            "get_auths" => Command::Remote(RemoteCommand::Auths),
            "get_critical" => Command::Remote(RemoteCommand::Critical),
            "get_ps" => Command::Remote(RemoteCommand::Ps),
            "get_ss" => Command::Remote(RemoteCommand::Ss),
            "get_services" => Command::Remote(RemoteCommand::Services),
            "get_apt_list" => Command::AptList(args.map(|a| a.to_string())),
            _ => return None,
        };
        Some(cmd)
    }
}

const HELP_TEXT: &str = "Доступные команды:
/start
/help
/find_email
/find_phone_number
/get_repl_logs
/get_emails
/get_phone_numbers
/verify_password
/get_release
/get_uname
/get_uptime
/get_df
/get_free
/get_mpstat
/get_w
/get_auths
/get_critical
/get_ps
/get_ss
/get_apt_list
/get_apt_list <package_name>
/get_services";

type ConversationSlot = Arc<tokio::sync::Mutex<Option<Conversation>>>;

/// Routes each inbound message to the user's active conversation or to a
/// command handler, and owns the per-user conversation map.
pub struct Dispatcher {
    remote: Arc<dyn RemoteExec>,
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
    conversations: Mutex<HashMap<i64, ConversationSlot>>,
}

impl Dispatcher {
    pub fn new(
        remote: Arc<dyn RemoteExec>,
        store: Arc<dyn Store>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            remote,
            store,
            messenger,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound message to completion. Never fails: gateway and
    /// send errors end up in the log or in an error reply, not in the
    /// caller's lap.
    pub async fn dispatch(&self, user_id: i64, text: &str) {
        let slot = self.slot(user_id);
        // Per-user lock: messages from one user are serialized, distinct
        // users proceed independently.
        let mut active = slot.lock().await;

        if let Some(conv) = active.take() {
            let (replies, next) = dialogue::advance(conv, text, self.store.as_ref()).await;
            *active = next;
            self.send_all(user_id, &replies).await;
            return;
        }

        let (token, args) = tokenize(text);
        let Some(command) = Command::parse(&token, args.as_deref()) else {
            tracing::debug!("Unknown command from {}: {}", user_id, text);
            self.send_all(
                user_id,
                &[format!("Unknown command {} !\n\nTry /help", text)],
            )
            .await;
            return;
        };

        match command {
            Command::Start => {
                self.send_all(user_id, &["Привет!\nСписок команд доступен в /help".to_string()])
                    .await;
            }
            Command::Help => {
                tracing::debug!("Answering help command");
                self.send_all(user_id, &[HELP_TEXT.to_string()]).await;
            }
            Command::FindEmail => {
                self.enter_dialogue(user_id, &mut active, Conversation::AwaitingEmailText)
                    .await;
            }
            Command::FindPhoneNumber => {
                self.enter_dialogue(user_id, &mut active, Conversation::AwaitingPhoneText)
                    .await;
            }
            Command::VerifyPassword => {
                self.enter_dialogue(user_id, &mut active, Conversation::AwaitingPassword)
                    .await;
            }
            Command::GetEmails => self.reply_with_records(user_id, RecordKind::Email).await,
            Command::GetPhoneNumbers => self.reply_with_records(user_id, RecordKind::Phone).await,
            Command::Remote(cmd) => self.run_remote(user_id, cmd.shell_line()).await,
            Command::AptList(package) => {
                let line = match package {
                    Some(name) => format!("apt show {}", name),
                    None => "apt list --installed".to_string(),
                };
                self.run_remote(user_id, &line).await;
            }
        }
    }

    async fn enter_dialogue(
        &self,
        user_id: i64,
        active: &mut Option<Conversation>,
        initial: Conversation,
    ) {
        let prompt = initial.entry_prompt();
        *active = Some(initial);
        self.send_all(user_id, &[prompt.to_string()]).await;
    }

    async fn run_remote(&self, user_id: i64, shell_line: &str) {
        match self.remote.run(shell_line).await {
            Ok(output) => {
                tracing::info!("Remote command succeeded: {}", shell_line);
                self.send_all(user_id, &segment(&output, MESSAGE_LIMIT)).await;
            }
            Err(e) => self.report_failure(user_id, &e).await,
        }
    }

    async fn reply_with_records(&self, user_id: i64, kind: RecordKind) {
        match self.store.list(kind).await {
            Ok(records) => {
                let listing = records
                    .iter()
                    .map(|r| format!("{}. {}", r.id, r.value))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.send_all(user_id, &segment(&listing, MESSAGE_LIMIT)).await;
            }
            Err(e) => self.report_failure(user_id, &e).await,
        }
    }

    async fn report_failure(&self, user_id: i64, e: &Error) {
        tracing::error!("Handler failed for {}: {}", user_id, e);
        self.send_all(user_id, &[format!("An error occurred: {}", e)])
            .await;
    }

    /// Send every reply in order; stop at the first send failure so the
    /// receiver never sees a gap inside a chunk sequence.
    async fn send_all<S: AsRef<str>>(&self, user_id: i64, replies: &[S]) {
        for reply in replies {
            if let Err(e) = self.messenger.send(user_id, reply.as_ref()).await {
                tracing::error!("Failed to send reply to {}: {}", user_id, e);
                return;
            }
        }
    }

    fn slot(&self, user_id: i64) -> ConversationSlot {
        let mut map = self
            .conversations
            .lock()
            .expect("conversation map poisoned");
        map.entry(user_id).or_default().clone()
    }
}

/// Split a message into its command token (leading `/` and `@botname`
/// suffix stripped) and optional trailing arguments.
fn tokenize(text: &str) -> (String, Option<String>) {
    let trimmed = text.trim();
    let (head, tail) = match trimmed.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (trimmed, ""),
    };
    let token = head
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();
    let args = if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    };
    (token, args)
}
