//! # dbtable
//!
//! A typed, parameter-safe accessor over a single SQL table.
//!
//! ## Features
//!
//! - **Parameters, never concatenation**: every value goes through a bound placeholder
//! - **Composable fragments**: `WHERE` clauses are [`Statement`]s that carry their own values
//! - **Pluggable execution**: statements are handed to an [`Executor`]; results come back untouched
//! - **Dialect-aware identifiers**: MySQL-style backtick quoting behind one option
//! - **Postgres out of the box**: [`PgExecutor`] over tokio-postgres and deadpool-postgres
//!
//! ## Example
//!
//! ```ignore
//! use dbtable::{row, sql, PgExecutor, Table};
//!
//! let users: Table<User, _> = Table::new("users", "id", PgExecutor::new(client));
//!
//! users.insert(row! { "name" => "mia", "age" => 5 }, None).await?;
//!
//! let mut adults = sql("age >= ");
//! adults.push_bind(18);
//! let rows = users.select_all(["id", "name"], Some(adults)).await?;
//!
//! let mia: Option<User> = users.get_as("*", 1).await?;
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod pg;
pub mod row;
pub mod sql;
pub mod table;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "tracing")]
pub mod trace;

pub use config::TableOptions;
pub use dialect::{Backticks, IdentFormatter, Verbatim};
pub use error::{TableError, TableResult};
pub use executor::{Executor, FnExecutor, executor_fn};
pub use pg::{GenericClient, PgExecutor, row_from_pg};
pub use row::Row;
pub use sql::{Placeholder, Statement, sql};
pub use table::{Columns, InsertVerb, Table};
pub use value::{FromValue, Number, Value};

#[cfg(feature = "pool")]
pub use pool::{PoolOptions, PooledExecutor, pooled_executor, pooled_table};

#[cfg(feature = "tracing")]
pub use trace::TracingExecutor;

// Re-export tokio_postgres for convenience
pub use tokio_postgres;
