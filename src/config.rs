//! Configuration loading and validation.

use crate::error::{ConfigError, Result};
use std::time::Duration;

/// Gemini model the bot queries. Fixed, not operator-tunable.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Base URL of the Gemini REST API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// How many stored turns are submitted to the model per request.
pub const DEFAULT_HISTORY_WINDOW: i64 = 20;

const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

/// Threadbot configuration, loaded once at startup and passed down
/// explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,

    /// Gemini provider configuration.
    pub gemini: GeminiConfig,

    /// MySQL connection parameters.
    pub database: DatabaseConfig,

    /// Conversation window size submitted to the model.
    pub history_window: i64,
}

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// MySQL connection parameters.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup.
    ///
    /// Every missing required variable is collected so the startup error
    /// names the full set at once instead of failing one key at a time.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut missing: Vec<&'static str> = Vec::new();
        let mut require = |key: &'static str| -> String {
            match lookup(key) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let discord_token = require("DISCORD_BOT_TOKEN");
        let gemini_key = require("GEMINI_API_KEY");
        let host = require("MYSQL_HOST");
        let user = require("MYSQL_USER");
        let password = require("MYSQL_PASSWORD");
        let database = require("MYSQL_DATABASE");

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv { keys: missing }.into());
        }

        let port = parse_optional(&lookup, "MYSQL_PORT", DEFAULT_MYSQL_PORT)?;
        let max_connections = parse_optional(&lookup, "MYSQL_POOL_SIZE", DEFAULT_POOL_SIZE)?;

        Ok(Self {
            discord_token,
            gemini: GeminiConfig {
                api_key: gemini_key,
                model: GEMINI_MODEL.to_string(),
                base_url: GEMINI_BASE_URL.to_string(),
                timeout: DEFAULT_GEMINI_TIMEOUT,
            },
            database: DatabaseConfig {
                host,
                port,
                user,
                password,
                database,
                max_connections,
            },
            history_window: DEFAULT_HISTORY_WINDOW,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key).filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|error: T::Err| {
        ConfigError::Invalid {
            key,
            message: error.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_BOT_TOKEN", "discord-token"),
            ("GEMINI_API_KEY", "gemini-key"),
            ("MYSQL_HOST", "localhost"),
            ("MYSQL_USER", "bot"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "threadbot"),
        ])
    }

    fn lookup_in(
        env: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> {
        move |key| env.get(key).map(|value| value.to_string())
    }

    #[test]
    fn reports_every_missing_variable_at_once() {
        let error = Config::load_from(|_| None).expect_err("empty env must fail");
        let Error::Config(ConfigError::MissingEnv { keys }) = error else {
            panic!("expected MissingEnv, got: {error}");
        };
        assert_eq!(
            keys,
            vec![
                "DISCORD_BOT_TOKEN",
                "GEMINI_API_KEY",
                "MYSQL_HOST",
                "MYSQL_USER",
                "MYSQL_PASSWORD",
                "MYSQL_DATABASE",
            ]
        );
    }

    #[test]
    fn loads_with_defaults_for_optional_values() {
        let config = Config::load_from(lookup_in(full_env())).expect("full env should load");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.max_connections, DEFAULT_POOL_SIZE);
        assert_eq!(config.history_window, 20);
        assert_eq!(config.gemini.model, GEMINI_MODEL);
    }

    #[test]
    fn honors_explicit_port() {
        let mut env = full_env();
        env.insert("MYSQL_PORT", "3307");
        let config = Config::load_from(lookup_in(env)).expect("env with port should load");
        assert_eq!(config.database.port, 3307);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut env = full_env();
        env.insert("MYSQL_PORT", "not-a-port");
        let error = Config::load_from(lookup_in(env)).expect_err("bad port must fail");
        assert!(matches!(
            error,
            Error::Config(ConfigError::Invalid { key: "MYSQL_PORT", .. })
        ));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut env = full_env();
        env.insert("GEMINI_API_KEY", "");
        let error = Config::load_from(lookup_in(env)).expect_err("empty key must fail");
        let Error::Config(ConfigError::MissingEnv { keys }) = error else {
            panic!("expected MissingEnv, got: {error}");
        };
        assert_eq!(keys, vec!["GEMINI_API_KEY"]);
    }
}
