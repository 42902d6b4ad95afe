// ABOUTME: russh-backed transport: password auth, host key policy, exec and PTY shell channels.
// ABOUTME: Maps low-level connection failures onto TransportError categories.

use super::client::ClientConfig;
use super::error::{Error, Result};
use super::transport::{CommandChannel, ShellChannel, Transport, TransportError, TransportSession};
use async_trait::async_trait;
use futures::FutureExt;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key;
use russh::{Channel, ChannelMsg, Disconnect};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const TERM: &str = "xterm";
const TERM_COLUMNS: u32 = 80;
const TERM_ROWS: u32 = 24;

/// SSH client handler enforcing the host key policy.
pub(crate) struct HostKeyVerifier {
    host: String,
    port: u16,
    accept_unknown: bool,
    known_hosts_path: Option<PathBuf>,
}

impl HostKeyVerifier {
    fn new(host: &str, config: &ClientConfig) -> Self {
        Self {
            host: host.to_string(),
            port: config.port,
            accept_unknown: config.accept_unknown_host_key,
            known_hosts_path: config.known_hosts_path.clone(),
        }
    }
}

impl client::Handler for HostKeyVerifier {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let check_result = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) if self.accept_unknown => {
                tracing::warn!(
                    "accepting unknown host key for {}:{}",
                    self.host,
                    self.port
                );
                let learn_result = match &self.known_hosts_path {
                    Some(path) => {
                        learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => learn_known_hosts(&self.host, self.port, server_public_key),
                };
                if let Err(e) = learn_result {
                    tracing::warn!("failed to save host key to known_hosts: {}", e);
                }
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::error!(
                    "host key for {}:{} does not match known_hosts",
                    self.host,
                    self.port
                );
                Ok(false)
            }
            // Unreadable known_hosts counts as an unknown key.
            Err(_) => Ok(self.accept_unknown),
        }
    }
}

/// Connects with russh using password authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct RusshTransport;

impl RusshTransport {
    async fn establish(
        host: &str,
        config: &ClientConfig,
    ) -> std::result::Result<RusshSession, TransportError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, config.port))
            .await
            .map_err(|e| {
                tracing::debug!("lookup of {} failed: {}", host, e);
                TransportError::UnknownHost
            })?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::UnknownHost);
        }

        let russh_config = Config {
            keepalive_interval: Some(Duration::from_secs(15)),
            ..Default::default()
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            addrs.as_slice(),
            HostKeyVerifier::new(host, config),
        )
        .await
        .map_err(|e| match e {
            russh::Error::UnknownKey => {
                TransportError::Other(format!("host key for {} is not trusted", host))
            }
            russh::Error::IO(ref io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
                TransportError::Other(format!("connection refused to {}:{}", host, config.port))
            }
            other => TransportError::Other(other.to_string()),
        })?;

        let auth = handle
            .authenticate_password(config.user.as_str(), config.password.as_str())
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        if !auth.success() {
            return Err(TransportError::AuthFailure);
        }

        Ok(RusshSession {
            host: host.to_string(),
            handle,
        })
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Session = RusshSession;

    async fn connect(
        &self,
        host: &str,
        config: &ClientConfig,
    ) -> std::result::Result<RusshSession, TransportError> {
        match tokio::time::timeout(config.timeout, Self::establish(host, config)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

/// An authenticated russh connection.
pub struct RusshSession {
    host: String,
    handle: Handle<HostKeyVerifier>,
}

impl std::fmt::Debug for RusshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshSession")
            .field("host", &self.host)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl RusshSession {
    async fn open_channel(&self) -> Result<Channel<Msg>> {
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| Error::Channel(format!("failed to open channel: {}", e)))
    }
}

#[async_trait]
impl TransportSession for RusshSession {
    type Command = RusshCommand;
    type Shell = RusshShell;

    async fn exec(&self, command: &str) -> Result<RusshCommand> {
        let channel = self.open_channel().await?;
        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::Channel(format!("failed to exec command: {}", e)))?;
        Ok(RusshCommand::new(channel))
    }

    async fn open_shell(&self) -> Result<RusshShell> {
        let channel = self.open_channel().await?;
        channel
            .request_pty(false, TERM, TERM_COLUMNS, TERM_ROWS, 0, 0, &[])
            .await
            .map_err(|e| Error::Channel(format!("failed to request pty: {}", e)))?;
        channel
            .request_shell(true)
            .await
            .map_err(|e| Error::Channel(format!("failed to request shell: {}", e)))?;
        Ok(RusshShell::new(channel))
    }

    async fn disconnect(&self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)
    }
}

/// One remote process; stdout and stderr arrive interleaved on the channel.
pub struct RusshCommand {
    channel: Channel<Msg>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
    eof: bool,
    closed: bool,
}

impl RusshCommand {
    fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_status: None,
            eof: false,
            closed: false,
        }
    }

    async fn next_message(&mut self) {
        match self.channel.wait().await {
            Some(ChannelMsg::Data { data }) => self.stdout.extend_from_slice(&data),
            // ext 1 is stderr
            Some(ChannelMsg::ExtendedData { data, ext: 1 }) => {
                self.stderr.extend_from_slice(&data)
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => self.exit_status = Some(exit_status),
            Some(ChannelMsg::Eof) => self.eof = true,
            Some(ChannelMsg::Close) | None => self.closed = true,
            Some(_) => {}
        }
    }

    async fn drain_output(&mut self) {
        while !self.eof && !self.closed {
            self.next_message().await;
        }
    }
}

#[async_trait]
impl CommandChannel for RusshCommand {
    async fn write_stdin(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(|e| Error::Channel(format!("failed to write stdin: {}", e)))
    }

    async fn read_stdout_to_end(&mut self) -> Result<Vec<u8>> {
        self.drain_output().await;
        Ok(std::mem::take(&mut self.stdout))
    }

    async fn read_stderr_to_end(&mut self) -> Result<Vec<u8>> {
        self.drain_output().await;
        Ok(std::mem::take(&mut self.stderr))
    }

    async fn exit_status(&mut self) -> Result<u32> {
        while self.exit_status.is_none() && !self.closed {
            self.next_message().await;
        }
        self.exit_status.ok_or(Error::ChannelClosed)
    }
}

/// A PTY shell channel with a buffer of data received but not yet read.
pub struct RusshShell {
    channel: Channel<Msg>,
    pending: Vec<u8>,
    closed: bool,
}

impl RusshShell {
    fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            pending: Vec::new(),
            closed: false,
        }
    }

    /// Move every message that is already queued into the pending buffer.
    fn absorb_queued(&mut self) {
        while !self.closed {
            match self.channel.wait().now_or_never() {
                Some(Some(ChannelMsg::Data { data })) => self.pending.extend_from_slice(&data),
                Some(Some(ChannelMsg::ExtendedData { data, .. })) => {
                    self.pending.extend_from_slice(&data)
                }
                Some(Some(ChannelMsg::Eof | ChannelMsg::Close)) | Some(None) => {
                    self.closed = true
                }
                Some(Some(_)) => {}
                None => break,
            }
        }
    }
}

#[async_trait]
impl ShellChannel for RusshShell {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(|e| Error::Channel(format!("failed to send to shell: {}", e)))
    }

    async fn data_ready(&mut self) -> Result<bool> {
        self.absorb_queued();
        Ok(!self.pending.is_empty())
    }

    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        self.absorb_queued();
        let n = max_bytes.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel
            .close()
            .await
            .map_err(|e| Error::Channel(format!("failed to close shell: {}", e)))
    }
}
