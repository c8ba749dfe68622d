//! tokio-postgres executor.
//!
//! ```ignore
//! let (client, connection) = tokio_postgres::connect(&url, NoTls).await?;
//! tokio::spawn(connection);
//!
//! let users: Table<User, _> = Table::new("users", "id", PgExecutor::new(client));
//! let mia = users.get_as("*", 1).await?;
//! ```
//!
//! Postgres has no `LIMIT` on `UPDATE`/`DELETE`; use `update_all` /
//! `delete_all` with `limit: None` against it.

mod client;
mod numeric;
mod types;

pub use client::GenericClient;
pub use types::row_from_pg;

use crate::error::TableResult;
use crate::executor::Executor;
use crate::row::Row;
use crate::sql::{Placeholder, Statement};
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// Runs statements on anything implementing [`GenericClient`].
///
/// Reads return converted [`Row`]s; writes return the affected row count.
#[derive(Debug, Clone)]
pub struct PgExecutor<C> {
    client: C,
}

impl<C: GenericClient> PgExecutor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

fn params_ref(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl<C: GenericClient> Executor for PgExecutor<C> {
    type Output = u64;

    async fn fetch_all(&self, stmt: Statement) -> TableResult<Vec<Row>> {
        let (sql, values) = stmt.into_parts(Placeholder::Numbered);
        let params = params_ref(&values);
        let rows = self.client.query(&sql, &params).await?;
        rows.iter().map(row_from_pg).collect()
    }

    async fn execute(&self, stmt: Statement) -> TableResult<u64> {
        let (sql, values) = stmt.into_parts(Placeholder::Numbered);
        let params = params_ref(&values);
        self.client.execute(&sql, &params).await
    }
}
