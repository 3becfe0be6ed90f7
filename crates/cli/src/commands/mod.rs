//! Subcommand implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use store_ratings_server::{config::ServerConfig, db};

/// Errors shared by commands that need a database connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] store_ratings_server::config::ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect a small pool using the server's database URL resolution.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let database_url: SecretString = ServerConfig::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url, 2).await?)
}
