// ABOUTME: Connection target parsing.
// ABOUTME: Accepts "[user@]host[:port]"; IPv6 addresses go in brackets, "[::1]:2222".

use crate::ssh::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
}

impl Target {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("host cannot be empty".to_string());
        }

        let (user_part, rest) = match s.split_once('@') {
            Some((user, rest)) => (Some(user), rest),
            None => (None, s),
        };

        let (host, port_str) = match rest.strip_prefix('[') {
            Some(bracketed) => {
                let (host, after) = bracketed
                    .split_once(']')
                    .ok_or_else(|| format!("unclosed bracket in host: {}", rest))?;
                match after {
                    "" => (host, None),
                    _ => match after.strip_prefix(':') {
                        Some(port_str) => (host, Some(port_str)),
                        None => return Err(format!("unexpected text after host: {}", after)),
                    },
                }
            }
            None if rest.matches(':').count() > 1 => {
                return Err(format!(
                    "IPv6 address must be bracketed, e.g. [{}]:22",
                    rest
                ));
            }
            None => match rest.split_once(':') {
                Some((host, port_str)) => (host, Some(port_str)),
                None => (rest, None),
            },
        };

        let port = match port_str {
            Some(port_str) => port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?,
            None => DEFAULT_PORT,
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }
        if user_part.is_some_and(str::is_empty) {
            return Err("user cannot be empty".to_string());
        }

        Ok(Target {
            host: host.to_string(),
            port,
            user: user_part.map(str::to_string),
        })
    }
}
