//! `tracing` integration.
//!
//! Enable via the crate feature: `dbtable = { features = ["tracing"] }`.

use crate::error::TableResult;
use crate::executor::Executor;
use crate::row::Row;
use crate::sql::Statement;
use std::time::Instant;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// An executor decorator that emits every statement on the `dbtable.sql`
/// target before it runs.
///
/// Failures are logged at `WARN` and returned unchanged.
///
/// ```ignore
/// let exec = TracingExecutor::new(PgExecutor::new(client)).level(Level::INFO);
/// let users: Table<User, _> = Table::new("users", "id", exec);
/// ```
#[derive(Debug, Clone)]
pub struct TracingExecutor<E> {
    inner: E,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl<E> TracingExecutor<E> {
    /// Wrap `inner` with defaults: `DEBUG`, SQL truncated at 200 bytes.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn before(&self, op: &'static str, stmt: &Statement) -> String {
        let tag = stmt.tag_name().unwrap_or("-").to_string();
        let sql = self.truncate_sql(&stmt.to_sql());
        emit_at_level!(
            self.level,
            target: "dbtable.sql",
            op,
            tag = %tag,
            param_count = stmt.params().len(),
            sql = %sql,
        );
        tag
    }

    fn after<T>(&self, op: &'static str, tag: &str, started: Instant, result: &TableResult<T>) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(_) => emit_at_level!(
                self.level,
                target: "dbtable.sql",
                op,
                tag,
                elapsed_ms,
                "statement finished"
            ),
            Err(error) => tracing::warn!(
                target: "dbtable.sql",
                op,
                tag,
                elapsed_ms,
                error = %error,
                "statement failed"
            ),
        }
    }
}

impl<E: Executor> Executor for TracingExecutor<E> {
    type Output = E::Output;

    async fn fetch_all(&self, stmt: Statement) -> TableResult<Vec<Row>> {
        let tag = self.before("fetch_all", &stmt);
        let started = Instant::now();
        let result = self.inner.fetch_all(stmt).await;
        self.after("fetch_all", &tag, started, &result);
        result
    }

    async fn execute(&self, stmt: Statement) -> TableResult<E::Output> {
        let tag = self.before("execute", &stmt);
        let started = Instant::now();
        let result = self.inner.execute(stmt).await;
        self.after("execute", &tag, started, &result);
        result
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::executor::executor_fn;
    use crate::row;
    use crate::sql::sql;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off to the boundary.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn truncate_sql_appends_ellipsis() {
        let exec = TracingExecutor::new(()).max_sql_length(6);
        assert_eq!(exec.truncate_sql("SELECT * FROM users"), "SELECT...");
        let exec = exec.no_truncate();
        assert_eq!(exec.truncate_sql("SELECT * FROM users"), "SELECT * FROM users");
    }

    #[tokio::test]
    async fn results_pass_through_unchanged() {
        let inner = executor_fn(|stmt: Statement| async move {
            assert_eq!(stmt.to_sql(), "SELECT * FROM users WHERE id = $1");
            Ok(vec![row! { "id" => 1 }])
        });
        let exec = TracingExecutor::new(inner).level(Level::INFO);

        let mut stmt = sql("SELECT * FROM users WHERE id = ").tagged("users.get");
        stmt.push_bind(1);
        let rows = exec.fetch_all(stmt).await.unwrap();
        assert_eq!(rows, vec![row! { "id" => 1 }]);
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let inner = executor_fn(|_stmt: Statement| async move {
            Err::<Vec<Row>, _>(TableError::validation("nope"))
        });
        let exec = TracingExecutor::new(inner);

        let err = exec.execute(sql("DELETE FROM users")).await.unwrap_err();
        assert!(matches!(err, TableError::Validation(ref m) if m == "nope"));
    }
}
