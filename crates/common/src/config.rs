use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Base URL of the identity provider API
    pub identity_api_url: String,

    /// API key sent to the identity provider (optional in local dev)
    pub identity_api_key: Option<String>,

    /// Batch size for bulk identity lookups (default: 100)
    pub identity_batch_size: usize,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            identity_api_url: std::env::var("IDENTITY_API_URL").map_err(|_| {
                anyhow::anyhow!("IDENTITY_API_URL environment variable is required")
            })?,
            identity_api_key: std::env::var("IDENTITY_API_KEY").ok(),
            identity_batch_size: std::env::var("IDENTITY_BATCH_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("IDENTITY_BATCH_SIZE must be a valid usize"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }
}
