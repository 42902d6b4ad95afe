// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection classification, execution outcomes, and channel failures.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error connecting to: {host} timed out after {secs} seconds", secs = .timeout.as_secs())]
    Timeout { host: String, timeout: Duration },

    #[error("error connecting to: {host} host is unknown")]
    UnknownHost { host: String },

    #[error("error connecting to: {host} authentication error for user {user} credentials")]
    NotAuthorized { host: String, user: String },

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Execution(String),

    #[error("no data received from shell within {0:?}")]
    ReceiveTimeout(Duration),

    #[error("invalid success pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("channel error: {0}")]
    Channel(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from establishing a connection.
    ///
    /// The domain fallback loop skips a candidate on these and moves on.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. }
                | Error::UnknownHost { .. }
                | Error::NotAuthorized { .. }
                | Error::Connection(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_host_and_seconds() {
        let err = Error::Timeout {
            host: "db1".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "error connecting to: db1 timed out after 10 seconds"
        );
    }

    #[test]
    fn connect_kinds_are_connect_errors() {
        assert!(Error::UnknownHost { host: "x".into() }.is_connect_error());
        assert!(Error::Connection("refused".into()).is_connect_error());
        assert!(
            Error::NotAuthorized {
                host: "x".into(),
                user: "u".into()
            }
            .is_connect_error()
        );
    }

    #[test]
    fn execution_errors_are_not_connect_errors() {
        assert!(!Error::Execution("exit code: 1".into()).is_connect_error());
        assert!(!Error::ReceiveTimeout(Duration::from_secs(1)).is_connect_error());
        assert!(!Error::ChannelClosed.is_connect_error());
    }
}
