//! Process settings read from the environment.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbSettings {
    pub url: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub max_idle_time: Duration,
    /// Upper bound for every statement and transaction step.
    pub query_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub env: String,
    pub db: DbSettings,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?.to_string();
        let log_format = match get("LOG_FORMAT") {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    message: format!("expected text or json, got {other}"),
                })
            }
        };

        Ok(Settings {
            port: parse_or(get("SERVER_PORT"), "SERVER_PORT", 4000)?,
            env: get("APP_ENV").unwrap_or("development").to_string(),
            db: DbSettings {
                url,
                max_open_conns: parse_or(get("DB_MAX_OPEN_CONNS"), "DB_MAX_OPEN_CONNS", 25)?,
                max_idle_conns: parse_or(get("DB_MAX_IDLE_CONNS"), "DB_MAX_IDLE_CONNS", 25)?,
                max_idle_time: match get("DB_MAX_IDLE_TIME") {
                    Some(raw) => parse_duration(raw).ok_or_else(|| ConfigError::Invalid {
                        key: "DB_MAX_IDLE_TIME",
                        message: format!("expected a duration such as 15m, got {raw}"),
                    })?,
                    None => Duration::from_secs(15 * 60),
                },
                query_timeout: Duration::from_millis(parse_or(
                    get("DB_QUERY_TIMEOUT_MS"),
                    "DB_QUERY_TIMEOUT_MS",
                    3000,
                )?),
            },
            log_format,
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

/// `90s`, `15m`, `2h`; a bare number is seconds.
fn parse_duration(raw: &str) -> Option<Duration> {
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(i) => raw.split_at(i),
        None => (raw, "s"),
    };
    let n: u64 = digits.parse().ok()?;
    let secs = match unit {
        "s" => n,
        "m" => n.checked_mul(60)?,
        "h" => n.checked_mul(3600)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults() {
        let s = Settings::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/moods")])).unwrap();
        assert_eq!(s.port, 4000);
        assert_eq!(s.env, "development");
        assert_eq!(s.db.max_open_conns, 25);
        assert_eq!(s.db.max_idle_time, Duration::from_secs(900));
        assert_eq!(s.db.query_timeout, Duration::from_millis(3000));
        assert_eq!(s.log_format, LogFormat::Text);
    }

    #[test]
    fn database_url_is_required() {
        let err = Settings::from_vars(vars(&[("SERVER_PORT", "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn overrides_and_bad_values() {
        let s = Settings::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/moods"),
            ("SERVER_PORT", "8080"),
            ("DB_MAX_IDLE_TIME", "2h"),
            ("DB_QUERY_TIMEOUT_MS", "500"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.db.max_idle_time, Duration::from_secs(7200));
        assert_eq!(s.db.query_timeout, Duration::from_millis(500));
        assert_eq!(s.log_format, LogFormat::Json);

        let err = Settings::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/moods"),
            ("DB_MAX_OPEN_CONNS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_OPEN_CONNS", .. }));
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("3d"), None);
        assert_eq!(parse_duration("m"), None);
    }
}
