//! MySQL pool construction and schema bootstrap.

use crate::config::DatabaseConfig;
use crate::error::DbError;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

const CREATE_CONVERSATION_THREADS: &str = r#"
CREATE TABLE IF NOT EXISTS conversation_threads (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    discord_thread_id BIGINT UNSIGNED NOT NULL UNIQUE,
    user_id BIGINT UNSIGNED NOT NULL,
    channel_id BIGINT UNSIGNED NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    last_activity_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    thread_db_id BIGINT NOT NULL,
    role VARCHAR(10) NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (thread_db_id) REFERENCES conversation_threads(id) ON DELETE CASCADE
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Build a lazily-connecting pool from the configured parameters.
///
/// Lazy so a store outage at boot does not kill the process; every store
/// call degrades on its own when the database is unreachable.
pub fn connect_lazy(config: &DatabaseConfig) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options)
}

/// Create the two conversation tables if they do not exist yet. Idempotent.
pub async fn init_schema(pool: &MySqlPool) -> Result<(), DbError> {
    sqlx::query(CREATE_CONVERSATION_THREADS)
        .execute(pool)
        .await
        .map_err(DbError::Schema)?;
    sqlx::query(CREATE_MESSAGES)
        .execute(pool)
        .await
        .map_err(DbError::Schema)?;
    Ok(())
}
