// ABOUTME: Secret values given inline or read from the environment.
// ABOUTME: Keeps passwords out of config files when they come from env vars.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SecretValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl SecretValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            SecretValue::Literal(s) => Ok(s.clone()),
            SecretValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretValue::Literal(_) => f.write_str("Literal(<redacted>)"),
            SecretValue::FromEnv { var, .. } => {
                f.debug_struct("FromEnv").field("var", var).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        let value = SecretValue::Literal("hunter2".to_string());
        assert_eq!(value.resolve().unwrap(), "hunter2");
    }

    #[test]
    fn env_value_reads_variable() {
        temp_env::with_var("SSHEXEC_TEST_SECRET", Some("from-env"), || {
            let value = SecretValue::FromEnv {
                var: "SSHEXEC_TEST_SECRET".to_string(),
                default: None,
            };
            assert_eq!(value.resolve().unwrap(), "from-env");
        });
    }

    #[test]
    fn env_value_falls_back_to_default() {
        temp_env::with_var_unset("SSHEXEC_TEST_UNSET", || {
            let value = SecretValue::FromEnv {
                var: "SSHEXEC_TEST_UNSET".to_string(),
                default: Some("fallback".to_string()),
            };
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }

    #[test]
    fn missing_env_value_is_an_error() {
        temp_env::with_var_unset("SSHEXEC_TEST_UNSET", || {
            let value = SecretValue::FromEnv {
                var: "SSHEXEC_TEST_UNSET".to_string(),
                default: None,
            };
            assert!(matches!(value.resolve(), Err(Error::MissingEnvVar(_))));
        });
    }

    #[test]
    fn debug_hides_literal() {
        let value = SecretValue::Literal("hunter2".to_string());
        assert!(!format!("{:?}", value).contains("hunter2"));
    }
}
