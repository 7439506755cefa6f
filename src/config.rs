//! Process configuration, read once at startup from the environment.
//!
//! Components never read the environment themselves; they receive the
//! relevant section of [`Config`] at construction.

use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://events.db";
const DEFAULT_TOKEN_TTL: &str = "7d";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for acquiring a connection and for waiting on a locked database.
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let ttl_raw = lookup("JWT_EXPIRE").unwrap_or_else(|| DEFAULT_TOKEN_TTL.to_string());
        let ttl = parse_duration(&ttl_raw).ok_or(ConfigError::Invalid {
            key: "JWT_EXPIRE",
            value: ttl_raw.clone(),
        })?;

        Ok(Self {
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DB_TIMEOUT_SECS",
                    DEFAULT_DB_TIMEOUT_SECS,
                )?),
            },
            token: TokenConfig { secret, ttl },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
                request_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Parses token lifetimes such as `7d`, `24h`, `30m`, `45s` or bare seconds.
///
/// Lifetimes whose expiry would fall outside the representable calendar are
/// rejected.
pub fn parse_duration(raw: &str) -> Option<chrono::Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c)),
        _ => (raw, None),
    };

    let amount: i64 = digits.parse().ok()?;
    if amount <= 0 {
        return None;
    }

    let ttl = match unit {
        None | Some('s') => chrono::Duration::try_seconds(amount),
        Some('m') => chrono::Duration::try_minutes(amount),
        Some('h') => chrono::Duration::try_hours(amount),
        Some('d') => chrono::Duration::try_days(amount),
        _ => None,
    }?;
    chrono::Utc::now().checked_add_signed(ttl).map(|_| ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    #[case("7d", chrono::Duration::days(7))]
    #[case("24h", chrono::Duration::hours(24))]
    #[case("30m", chrono::Duration::minutes(30))]
    #[case("45s", chrono::Duration::seconds(45))]
    #[case("3600", chrono::Duration::seconds(3600))]
    #[case(" 2d ", chrono::Duration::days(2))]
    fn parses_lifetimes(#[case] raw: &str, #[case] expected: chrono::Duration) {
        assert_eq!(parse_duration(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("d")]
    #[case("7w")]
    #[case("-1h")]
    #[case("0")]
    #[case("seven days")]
    #[case("100000000d")]
    #[case("9223372036854775807")]
    fn rejects_bad_lifetimes(#[case] raw: &str) {
        assert_eq!(parse_duration(raw), None);
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.token.ttl, chrono::Duration::days(7));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.addr(), "0.0.0.0:5000");
        assert_eq!(config.database.url, "sqlite://events.db");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PORT", "http")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "http".into()
            }
        );
    }

    #[test]
    fn oversized_token_lifetime_is_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "x"),
            ("JWT_EXPIRE", "100000000d"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "JWT_EXPIRE",
                value: "100000000d".into()
            }
        );
    }

    #[test]
    fn secret_is_redacted_from_debug_output() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "hunter2")])).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
