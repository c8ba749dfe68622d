//! Pooled Postgres executors.
//!
//! A [`Table`] holds its executor for its whole life. With a pool, each
//! unit of work checks a client out, wraps it in a [`PgExecutor`] and lets
//! the client go back to the pool when the table is dropped:
//!
//! ```ignore
//! let pool = PoolOptions::new(std::env::var("DATABASE_URL")?).max_size(8).build()?;
//!
//! let users: Table<User, _> = pooled_table(&pool, "users", "id", TableOptions::default()).await?;
//! let mia = users.get_as("*", 1).await?;
//! ```

use crate::config::TableOptions;
use crate::error::{TableError, TableResult};
use crate::pg::PgExecutor;
use crate::table::Table;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use serde::Deserialize;
use tokio_postgres::NoTls;

/// An executor over a client checked out of a deadpool pool.
pub type PooledExecutor = PgExecutor<deadpool_postgres::Client>;

/// Where and how large a pool to build.
///
/// Deserializable from application config:
///
/// ```ignore
/// let opts: PoolOptions = serde_json::from_str(r#"{ "url": "postgres://...", "max_size": 8 }"#)?;
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PoolOptions {
    /// Postgres connection string.
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "PoolOptions::default_max_size")]
    pub max_size: usize,
}

impl PoolOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: Self::default_max_size(),
        }
    }

    fn default_max_size() -> usize {
        16
    }

    /// Override the maximum pool size.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Build the pool. No connection is opened until the first checkout.
    pub fn build(&self) -> TableResult<Pool> {
        let pg_config: tokio_postgres::Config = self
            .url
            .parse()
            .map_err(|e: tokio_postgres::Error| TableError::Connection(e.to_string()))?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        Pool::builder(manager)
            .max_size(self.max_size)
            .build()
            .map_err(|e| TableError::Pool(e.to_string()))
    }
}

/// Check a client out of `pool` and wrap it as an executor.
pub async fn pooled_executor(pool: &Pool) -> TableResult<PooledExecutor> {
    Ok(PgExecutor::new(pool.get().await?))
}

/// A table accessor running on a freshly checked out client.
pub async fn pooled_table<T>(
    pool: &Pool,
    name: impl Into<String>,
    primary_key_name: impl Into<String>,
    options: TableOptions,
) -> TableResult<Table<T, PooledExecutor>> {
    let executor = pooled_executor(pool).await?;
    Ok(Table::with_options(name, primary_key_name, executor, options))
}
