// ABOUTME: SSH client module for remote command execution.
// ABOUTME: Password authentication, domain fallback, exec and interactive shell channels.

mod client;
mod connector;
mod criteria;
mod error;
mod exec;
mod hosts;
mod russh_transport;
mod shell;
mod transport;

pub use client::{
    Client, ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_PORT, DEFAULT_RECEIVE_TIMEOUT,
    DEFAULT_TIMEOUT,
};
pub use connector::{connect, connect_any};
pub use criteria::{Pattern, REGEX_MARKER, SuccessCriterion, check_success};
pub use error::{Error, Result};
pub use exec::{ExecOptions, execute};
pub use hosts::generate_hostnames;
pub use russh_transport::{RusshCommand, RusshSession, RusshShell, RusshTransport};
pub use shell::{
    RECEIVE_CHUNK_SIZE, ShellOptions, ShellState, Transcript, poll_receive, shell_execute,
};
pub use transport::{CommandChannel, ShellChannel, Transport, TransportError, TransportSession};
