use crate::errors::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

/// Reachability probe for the configured gateway database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Connect and run a trivial query; an error means the database
    /// is unreachable or the credentials are wrong.
    async fn authenticate(&self) -> Result<()>;
}

/// Postgres probe. Connection is deferred until `authenticate` so a
/// bad URL surfaces as a health-check failure, not a bootstrap crash.
pub struct PostgresProbe {
    database_url: String,
    max_connections: u32,
}

impl PostgresProbe {
    pub fn new(database_url: String, max_connections: u32) -> Self {
        PostgresProbe {
            database_url,
            max_connections,
        }
    }
}

#[async_trait]
impl DatabaseProbe for PostgresProbe {
    async fn authenticate(&self) -> Result<()> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&self.database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!("Database authentication succeeded");

        pool.close().await;
        Ok(())
    }
}
