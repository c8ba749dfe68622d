//! The execution seam.
//!
//! A [`crate::Table`] never talks to a database directly. Every operation
//! builds a [`Statement`] and hands it to an [`Executor`]; whatever the
//! executor returns, errors included, is passed back to the caller as-is.

use crate::error::TableResult;
use crate::row::Row;
use crate::sql::Statement;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Runs fully built statements.
pub trait Executor: Send + Sync {
    /// Result of a mutating statement (affected rows, insert id, rows, ...).
    ///
    /// The table forwards this without interpreting it.
    type Output: Send;

    /// Run a row-returning statement.
    fn fetch_all(&self, stmt: Statement) -> impl Future<Output = TableResult<Vec<Row>>> + Send;

    /// Run a mutating statement.
    fn execute(&self, stmt: Statement) -> impl Future<Output = TableResult<Self::Output>> + Send;
}

impl<E: Executor> Executor for &E {
    type Output = E::Output;

    fn fetch_all(&self, stmt: Statement) -> impl Future<Output = TableResult<Vec<Row>>> + Send {
        (**self).fetch_all(stmt)
    }

    fn execute(&self, stmt: Statement) -> impl Future<Output = TableResult<Self::Output>> + Send {
        (**self).execute(stmt)
    }
}

impl<E: Executor> Executor for Arc<E> {
    type Output = E::Output;

    fn fetch_all(&self, stmt: Statement) -> impl Future<Output = TableResult<Vec<Row>>> + Send {
        (**self).fetch_all(stmt)
    }

    fn execute(&self, stmt: Statement) -> impl Future<Output = TableResult<Self::Output>> + Send {
        (**self).execute(stmt)
    }
}

/// An executor backed by a single query function.
///
/// Both reads and writes go through the same function, and mutating
/// statements return whatever rows it produces.
pub struct FnExecutor<F> {
    f: F,
}

/// Wrap a `Statement -> Future<TableResult<Vec<Row>>>` function as an [`Executor`].
///
/// # Example
///
/// ```ignore
/// let exec = dbtable::executor_fn(|stmt: Statement| async move {
///     let (sql, params) = stmt.into_parts(Placeholder::Question);
///     my_driver::query(&sql, &params).await.map_err(TableError::executor)
/// });
/// ```
pub fn executor_fn<F, Fut>(f: F) -> FnExecutor<F>
where
    F: Fn(Statement) -> Fut + Send + Sync,
    Fut: Future<Output = TableResult<Vec<Row>>> + Send,
{
    FnExecutor { f }
}

impl<F, Fut> Executor for FnExecutor<F>
where
    F: Fn(Statement) -> Fut + Send + Sync,
    Fut: Future<Output = TableResult<Vec<Row>>> + Send,
{
    type Output = Vec<Row>;

    fn fetch_all(&self, stmt: Statement) -> impl Future<Output = TableResult<Vec<Row>>> + Send {
        (self.f)(stmt)
    }

    fn execute(&self, stmt: Statement) -> impl Future<Output = TableResult<Vec<Row>>> + Send {
        (self.f)(stmt)
    }
}

impl<F> fmt::Debug for FnExecutor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::sql::sql;

    #[tokio::test]
    async fn fn_executor_sees_the_statement() {
        let exec = executor_fn(|stmt: Statement| async move {
            Ok(vec![Row::new().with("sql", stmt.to_sql())])
        });

        let rows = exec.fetch_all(sql("SELECT 1")).await.unwrap();
        assert_eq!(rows[0].try_get::<String>("sql").unwrap(), "SELECT 1");

        let rows = exec.execute(sql("DELETE FROM t")).await.unwrap();
        assert_eq!(rows[0].try_get::<String>("sql").unwrap(), "DELETE FROM t");
    }

    #[tokio::test]
    async fn errors_pass_through_refs_and_arcs() {
        let exec = Arc::new(executor_fn(|_stmt: Statement| async {
            Err::<Vec<Row>, _>(TableError::Other("boom".into()))
        }));

        let by_ref = &*exec;
        let err = by_ref.fetch_all(sql("SELECT 1")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let err = exec.execute(sql("SELECT 1")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
