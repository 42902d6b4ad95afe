// ABOUTME: Transport seam between the executors and the SSH implementation.
// ABOUTME: Connect, one-shot command channels, and interactive shell channels.

use super::client::ClientConfig;
use super::error::Result;
use async_trait::async_trait;

/// Connection failure as reported by a transport, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection attempt timed out")]
    Timeout,

    #[error("hostname could not be resolved")]
    UnknownHost,

    #[error("authentication rejected")]
    AuthFailure,

    #[error("{0}")]
    Other(String),
}

/// Opens authenticated sessions to a host.
#[async_trait]
pub trait Transport: Send + Sync {
    type Session: TransportSession;

    /// Connect to `host` using the credentials and policies in `config`.
    ///
    /// `host` overrides `config.host` so that domain candidates can be tried
    /// with the same settings.
    async fn connect(
        &self,
        host: &str,
        config: &ClientConfig,
    ) -> std::result::Result<Self::Session, TransportError>;
}

/// A live authenticated session.
#[async_trait]
pub trait TransportSession: Send + Sync {
    type Command: CommandChannel;
    type Shell: ShellChannel;

    /// Start `command` on a fresh channel.
    async fn exec(&self, command: &str) -> Result<Self::Command>;

    /// Open a pseudo-terminal shell channel.
    async fn open_shell(&self) -> Result<Self::Shell>;

    /// Release the underlying connection.
    async fn disconnect(&self) -> Result<()>;
}

/// Streams of one remote process.
#[async_trait]
pub trait CommandChannel: Send {
    /// Write to the process's stdin and flush.
    async fn write_stdin(&mut self, data: &[u8]) -> Result<()>;

    /// Read stdout until the remote side closes it.
    async fn read_stdout_to_end(&mut self) -> Result<Vec<u8>>;

    /// Read stderr until the remote side closes it.
    async fn read_stderr_to_end(&mut self) -> Result<Vec<u8>>;

    /// Wait for the exit status of the process.
    async fn exit_status(&mut self) -> Result<u32>;
}

/// A long-lived interactive channel.
#[async_trait]
pub trait ShellChannel: Send {
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Whether data can be read without waiting.
    async fn data_ready(&mut self) -> Result<bool>;

    /// Read up to `max_bytes` of already-available data.
    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>>;

    /// Whether the remote side has closed the channel.
    fn is_closed(&self) -> bool;

    async fn close(&mut self) -> Result<()>;
}
