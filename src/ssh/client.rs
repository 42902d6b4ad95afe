// ABOUTME: Client configuration and the client that owns one SSH session.
// ABOUTME: Connects with domain fallback, runs commands and shell conversations.

use super::connector::connect_any;
use super::criteria::SuccessCriterion;
use super::error::Result;
use super::exec::{ExecOptions, execute};
use super::russh_transport::{RusshSession, RusshTransport};
use super::shell::{ShellOptions, shell_execute};
use super::transport::{Transport, TransportSession};
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Instrument;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Target, credentials and policies for a client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Host to connect to, or the base name when `domains` is set.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for password authentication.
    pub user: String,
    pub password: String,
    /// Accept and remember host keys missing from known_hosts.
    /// A changed key is always rejected.
    pub accept_unknown_host_key: bool,
    /// Limit on connecting and authenticating to one host.
    pub timeout: Duration,
    /// Suffixes appended to `host`, tried in order.
    pub domains: Vec<String>,
    /// Optional known_hosts file; defaults to ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Delay between shell readiness checks.
    pub poll_interval: Duration,
    /// Longest wait for shell output; `None` waits forever.
    pub receive_timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("accept_unknown_host_key", &self.accept_unknown_host_key)
            .field("timeout", &self.timeout)
            .field("domains", &self.domains)
            .field("known_hosts_path", &self.known_hosts_path)
            .field("poll_interval", &self.poll_interval)
            .field("receive_timeout", &self.receive_timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            accept_unknown_host_key: false,
            timeout: DEFAULT_TIMEOUT,
            domains: Vec::new(),
            known_hosts_path: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receive_timeout: Some(DEFAULT_RECEIVE_TIMEOUT),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn accept_unknown_host_key(mut self, accept: bool) -> Self {
        self.accept_unknown_host_key = accept;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            poll_interval: self.poll_interval,
            max_wait: self.receive_timeout,
        }
    }
}

/// A connected client. Holds exactly one session, bound to the hostname
/// that accepted the connection.
pub struct Client<S: TransportSession = RusshSession> {
    config: ClientConfig,
    hostname: String,
    session: S,
    span: tracing::Span,
}

impl<S: TransportSession> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("hostname", &self.hostname)
            .field("session", &"<session>")
            .finish()
    }
}

impl Client<RusshSession> {
    /// Connect over SSH.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with(&RusshTransport, config).await
    }
}

impl<S: TransportSession> Client<S> {
    /// Connect through `transport`.
    pub async fn connect_with<T>(transport: &T, config: ClientConfig) -> Result<Self>
    where
        T: Transport<Session = S>,
    {
        let span = tracing::debug_span!("ssh_client", host = %config.host, user = %config.user);
        let (hostname, session) = connect_any(transport, &config)
            .instrument(span.clone())
            .await?;
        span.record("host", hostname.as_str());
        Ok(Self {
            config,
            hostname,
            session,
            span,
        })
    }

    /// The hostname the session is connected to. With domain fallback this
    /// is the fully qualified candidate that succeeded.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn username(&self) -> &str {
        &self.config.user
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a command to completion. See [`ExecOptions`] for how success is decided.
    pub async fn execute(&self, command: &str, options: &ExecOptions) -> Result<Vec<String>> {
        execute(&self.session, &self.hostname, command, options)
            .instrument(self.span.clone())
            .await
    }

    /// Run a command in an interactive shell, sending each input in turn.
    pub async fn shell_execute<I>(
        &self,
        command: &str,
        inputs: &[I],
        success_criteria: &[SuccessCriterion],
    ) -> Result<Vec<String>>
    where
        I: AsRef<str> + Sync,
    {
        shell_execute(
            &self.session,
            &self.hostname,
            command,
            inputs,
            success_criteria,
            &self.config.shell_options(),
        )
        .instrument(self.span.clone())
        .await
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        tracing::debug!(parent: &self.span, "disconnecting from {}", self.hostname);
        self.session.disconnect().instrument(self.span.clone()).await
    }

    /// Run `body` with this client, then disconnect whether or not it failed.
    ///
    /// The body's error wins over a disconnect error.
    ///
    /// ```no_run
    /// # async fn run(client: sshexec::ssh::Client) -> sshexec::ssh::Result<()> {
    /// use futures::FutureExt;
    /// use sshexec::ssh::ExecOptions;
    ///
    /// let _lines = client
    ///     .scoped(|c| async move { c.execute("uptime", &ExecOptions::new()).await }.boxed())
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<R, F>(self, body: F) -> Result<R>
    where
        F: for<'a> FnOnce(&'a Self) -> BoxFuture<'a, Result<R>>,
    {
        let result = body(&self).await;
        let span = self.span.clone();
        let disconnected = self.disconnect().await;
        match (result, disconnected) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(disconnect_err)) => {
                tracing::warn!(parent: &span, "disconnect after failure also failed: {}", disconnect_err);
                Err(e)
            }
        }
    }
}
