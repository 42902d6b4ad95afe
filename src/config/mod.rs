// ABOUTME: YAML connection file parsing for sshexec.
// ABOUTME: Turns a connection file into a ClientConfig, resolving secrets from env vars.

mod secret;
mod target;

pub use secret::SecretValue;
pub use target::Target;

use crate::error::{Error, Result};
use crate::ssh::{ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_RECEIVE_TIMEOUT, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "sshexec.yml";
pub const CONFIG_FILENAME_ALT: &str = "sshexec.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(deserialize_with = "deserialize_target")]
    pub host: Target,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<SecretValue>,

    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default)]
    pub accept_unknown_host_key: bool,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_receive_timeout", with = "humantime_serde")]
    pub receive_timeout: Option<Duration>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_receive_timeout() -> Option<Duration> {
    Some(DEFAULT_RECEIVE_TIMEOUT)
}

impl ConnectionConfig {
    /// Connection settings for `host` with every other field at its default.
    pub fn new(host: Target) -> Self {
        Self {
            host,
            user: None,
            password: None,
            domains: Vec::new(),
            timeout: default_timeout(),
            accept_unknown_host_key: false,
            known_hosts: None,
            poll_interval: default_poll_interval(),
            receive_timeout: default_receive_timeout(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the connection file from `dir`, trying each known filename.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Resolve the user and password and build a client configuration.
    ///
    /// A user in `host` (`user@host`) takes precedence over `user`.
    pub fn into_client_config(self) -> Result<ClientConfig> {
        let user = self
            .host
            .user
            .clone()
            .or(self.user)
            .ok_or_else(|| Error::InvalidConfig("user is required".to_string()))?;

        let password = self
            .password
            .ok_or_else(|| Error::InvalidConfig("password is required".to_string()))?
            .resolve()?;

        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".to_string()));
        }

        let mut config = ClientConfig::new(self.host.host, user, password)
            .port(self.host.port)
            .accept_unknown_host_key(self.accept_unknown_host_key)
            .timeout(self.timeout)
            .domains(self.domains)
            .poll_interval(self.poll_interval)
            .receive_timeout(self.receive_timeout);
        if let Some(path) = self.known_hosts {
            config = config.known_hosts_path(path);
        }
        Ok(config)
    }
}

fn deserialize_target<'de, D>(deserializer: D) -> std::result::Result<Target, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Target::parse(&s).map_err(serde::de::Error::custom)
}
