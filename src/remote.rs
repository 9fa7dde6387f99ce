//! Remote Execution Gateway: one SSH session, one command, one result.

use async_trait::async_trait;
use ssh2::Session;
use std::io::Read;
use std::net::TcpStream;

use crate::config::RemoteSettings;
use crate::error::{Error, Result};

/// Narrow contract the dispatcher needs from the remote host.
#[async_trait]
pub trait RemoteExec: Send + Sync {
    /// Execute `command` on the remote host and return its captured stdout.
    ///
    /// A session is acquired for this call only and released before the
    /// call returns, on success and on failure alike.
    async fn run(&self, command: &str) -> Result<String>;
}

/// Password-authenticated SSH gateway built on libssh2.
pub struct SshGateway {
    settings: RemoteSettings,
}

impl SshGateway {
    pub fn new(settings: RemoteSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RemoteExec for SshGateway {
    async fn run(&self, command: &str) -> Result<String> {
        let settings = self.settings.clone();
        let command = command.to_string();
        tracing::debug!("Executing SSH command: {}", command);

        // libssh2 is blocking; keep it off the async workers. The session
        // lives entirely inside the closure, so every exit path drops it.
        tokio::task::spawn_blocking(move || exec_once(&settings, &command))
            .await
            .map_err(|e| Error::Transport(format!("ssh task failed: {}", e)))?
    }
}

fn exec_once(settings: &RemoteSettings, command: &str) -> Result<String> {
    let tcp = TcpStream::connect((settings.host.as_str(), settings.port))
        .map_err(|e| Error::Transport(format!("connect {}:{}: {}", settings.host, settings.port, e)))?;

    let mut session = Session::new().map_err(|e| Error::Transport(format!("session init: {}", e)))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| Error::Transport(format!("handshake: {}", e)))?;
    session
        .userauth_password(&settings.user, &settings.password)
        .map_err(|e| Error::Transport(format!("authentication: {}", e)))?;

    let mut channel = session
        .channel_session()
        .map_err(|e| Error::Transport(format!("channel open: {}", e)))?;
    channel
        .exec(command)
        .map_err(|e| Error::Transport(format!("exec: {}", e)))?;

    let mut output = String::new();
    channel
        .read_to_string(&mut output)
        .map_err(|e| Error::Transport(format!("read output: {}", e)))?;

    // Best effort; the session is torn down on drop regardless.
    let _ = channel.wait_close();

    tracing::info!("SSH command completed ({} bytes)", output.len());
    Ok(output)
}
