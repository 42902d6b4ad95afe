// ABOUTME: CLI command handlers.
// ABOUTME: Builds the client configuration from flags or a connection file.

mod exec;
mod shell;

pub use exec::exec_command;
pub use shell::shell_command;

use crate::cli::ConnectionArgs;
use sshexec::config::{ConnectionConfig, SecretValue, Target};
use sshexec::error::{Error, Result};
use sshexec::ssh::{ClientConfig, SuccessCriterion};
use std::env;
use std::time::Duration;

/// Environment variable holding the password when --host is used.
pub const PASSWORD_ENV: &str = "SSHEXEC_PASSWORD";

/// Resolve flags and connection file into a client configuration.
pub fn client_config(args: &ConnectionArgs) -> Result<ClientConfig> {
    let mut file = if let Some(host) = &args.host {
        let target = Target::parse(host).map_err(Error::InvalidConfig)?;
        let mut file = ConnectionConfig::new(target);
        file.password = Some(SecretValue::FromEnv {
            var: PASSWORD_ENV.to_string(),
            default: None,
        });
        file
    } else if let Some(path) = &args.config {
        ConnectionConfig::load(path)?
    } else {
        ConnectionConfig::discover(&env::current_dir()?)?
    };

    if let Some(user) = &args.user {
        file.user = Some(user.clone());
    }
    file.domains.extend(args.domains.iter().cloned());
    if let Some(secs) = args.timeout {
        file.timeout = Duration::from_secs(secs);
    }
    if args.accept_unknown_host_key {
        file.accept_unknown_host_key = true;
    }

    file.into_client_config()
}

/// Decode `{regex}`-encoded criteria given on the command line.
pub fn parse_criteria(encoded: &[String]) -> Result<Vec<SuccessCriterion>> {
    encoded
        .iter()
        .map(|s| SuccessCriterion::parse(s).map_err(Error::from))
        .collect()
}
