// ABOUTME: Connection establishment with typed failures and domain fallback.
// ABOUTME: Tries each hostname candidate in order and keeps the first that connects.

use super::client::ClientConfig;
use super::error::{Error, Result};
use super::hosts::generate_hostnames;
use super::transport::{Transport, TransportError};

/// Connect to a single host, classifying any failure.
pub async fn connect<T: Transport>(
    transport: &T,
    host: &str,
    config: &ClientConfig,
) -> Result<T::Session> {
    tracing::debug!("attempting to connect to: {}", host);
    match transport.connect(host, config).await {
        Ok(session) => {
            tracing::debug!("successfully connected to: {}", host);
            Ok(session)
        }
        Err(e) => {
            let err = classify(e, host, config);
            tracing::error!("{}", err);
            Err(err)
        }
    }
}

/// Connect to `config.host`, or to the first of its domain candidates that
/// accepts the connection. Returns the hostname the session is bound to.
pub async fn connect_any<T: Transport>(
    transport: &T,
    config: &ClientConfig,
) -> Result<(String, T::Session)> {
    if config.domains.is_empty() {
        let session = connect(transport, &config.host, config).await?;
        return Ok((config.host.clone(), session));
    }

    for candidate in generate_hostnames(&config.host, &config.domains) {
        match connect(transport, &candidate, config).await {
            Ok(session) => return Ok((candidate, session)),
            Err(e) if e.is_connect_error() => {
                tracing::warn!("skipping {}: {}", candidate, e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::Connection(format!(
        "unable to connect to any {} with domains {:?}",
        config.host, config.domains
    )))
}

fn classify(err: TransportError, host: &str, config: &ClientConfig) -> Error {
    match err {
        TransportError::Timeout => Error::Timeout {
            host: host.to_string(),
            timeout: config.timeout,
        },
        TransportError::UnknownHost => Error::UnknownHost {
            host: host.to_string(),
        },
        TransportError::AuthFailure => Error::NotAuthorized {
            host: host.to_string(),
            user: config.user.clone(),
        },
        TransportError::Other(message) => {
            Error::Connection(format!("error connecting to: {} : {}", host, message))
        }
    }
}
