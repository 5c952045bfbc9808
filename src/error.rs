//! Top-level error types for threadbot.

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("discord client error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .keys.join(", "))]
    MissingEnv { keys: Vec<&'static str> },

    #[error("invalid value for {key}: {message}")]
    Invalid {
        key: &'static str,
        message: String,
    },
}

/// Database connection and operation errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to connect to MySQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Gemini provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gemini api error [{code}]: {message}")]
    Api { code: String, message: String },
}
