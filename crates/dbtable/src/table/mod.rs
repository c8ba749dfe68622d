//! The table accessor.
//!
//! [`Table`] owns a table name, its primary key column, an identifier
//! formatter and an [`Executor`]. Each operation builds a fresh
//! [`Statement`] and passes it to the executor; nothing is cached between
//! calls.
//!
//! # Example
//!
//! ```ignore
//! use dbtable::{row, sql, Table, TableOptions};
//!
//! let users: Table<User, _> = Table::with_options("users", "id", exec, TableOptions::mysql());
//!
//! users.insert(row! { "name" => "mia", "age" => 5 }, None).await?;
//! let mia = users.get(["name", "age"], 1).await?;
//!
//! let mut older = sql("age > ");
//! older.push_bind(30);
//! users.update_all(row! { "status" => "veteran" }, Some(older), None).await?;
//! ```
//!
//! Every `*_all` / `*_one` operation has a `build_*` counterpart returning
//! the statement without running it.

mod columns;


pub use columns::Columns;

use crate::config::TableOptions;
use crate::dialect::IdentFormatter;
use crate::error::TableResult;
use crate::executor::Executor;
use crate::row::Row;
use crate::sql::Statement;
use crate::value::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// `INSERT` or `REPLACE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertVerb {
    #[default]
    Insert,
    Replace,
}

impl InsertVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertVerb::Insert => "INSERT",
            InsertVerb::Replace => "REPLACE",
        }
    }
}

/// Accessor over a single table holding rows of type `T`.
///
/// `T` is only consulted by the typed helpers (`*_as`, `*_model`); the plain
/// operations work on [`Row`]s and accept any subset of columns.
///
/// `name` and `primary_key_name` are public and may be changed after
/// construction; every statement reads them fresh.
pub struct Table<T, E> {
    pub name: String,
    pub primary_key_name: String,
    pub executor: E,
    formatter: Arc<dyn IdentFormatter>,
    _row: PhantomData<fn() -> T>,
}

impl<T, E> Table<T, E> {
    /// Create an accessor with default options (no identifier quoting).
    pub fn new(name: impl Into<String>, primary_key_name: impl Into<String>, executor: E) -> Self {
        Self::with_options(name, primary_key_name, executor, TableOptions::default())
    }

    /// Create an accessor with explicit options.
    pub fn with_options(
        name: impl Into<String>,
        primary_key_name: impl Into<String>,
        executor: E,
        options: TableOptions,
    ) -> Self {
        Self {
            name: name.into(),
            primary_key_name: primary_key_name.into(),
            executor,
            formatter: options.resolve_formatter(),
            _row: PhantomData,
        }
    }

    /// Whether identifiers are quoted by this table's formatter.
    pub fn quotes_identifiers(&self) -> bool {
        self.formatter.quotes()
    }

    /// Format an identifier for interpolation into SQL text.
    pub fn format(&self, ident: &str) -> String {
        self.formatter.format(ident)
    }

    /// The table name as written into SQL.
    pub fn resolved_name(&self) -> String {
        if self.formatter.quotes() {
            self.format(&self.name)
        } else {
            self.name.clone()
        }
    }

    /// `<pk> = <key>`
    pub fn key_clause(&self, key: impl Into<Value>) -> Statement {
        let mut clause = Statement::new(self.format(&self.primary_key_name));
        clause.push(" = ").push_bind(key);
        clause
    }

    /// `SELECT <columns> FROM <table>[ WHERE <where_clause>]`
    pub fn build_select_all(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> Statement {
        let q = self.select_statement(columns.into(), where_clause);
        self.finish(q, "select_all")
    }

    /// `SELECT ...[ WHERE ...] LIMIT 1`
    ///
    /// `LIMIT 1` is applied whether or not a predicate is given.
    pub fn build_select_one(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> Statement {
        let mut q = self.select_statement(columns.into(), where_clause);
        q.push(" LIMIT 1");
        self.finish(q, "select_one")
    }

    /// `SELECT ... WHERE <pk> = <key> LIMIT 1`
    pub fn build_get(&self, columns: impl Into<Columns>, key: impl Into<Value>) -> Statement {
        let mut q = self.select_statement(columns.into(), Some(self.key_clause(key)));
        q.push(" LIMIT 1");
        self.finish(q, "get")
    }

    /// `UPDATE <table> SET c1 = $1, ...[ WHERE ...][ LIMIT <n>]`
    ///
    /// `updates` is expected to be non-empty; an empty row yields an empty
    /// `SET` list which the database will reject.
    pub fn build_update_all(
        &self,
        updates: Row,
        where_clause: Option<Statement>,
        limit: Option<u64>,
    ) -> Statement {
        #[cfg(feature = "tracing")]
        if updates.is_empty() {
            tracing::warn!(
                target: "dbtable.sql",
                table = %self.name,
                "UPDATE built with an empty SET list"
            );
        }

        let mut q = Statement::new("UPDATE ");
        q.push(&self.resolved_name()).push(" SET ");
        for (i, (column, value)) in updates.into_iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push(&self.format(&column)).push(" = ").push_bind(value);
        }
        push_where(&mut q, where_clause);
        push_limit(&mut q, limit);
        self.finish(q, "update_all")
    }

    /// `DELETE FROM <table>[ WHERE ...][ LIMIT <n>]`
    pub fn build_delete_all(
        &self,
        where_clause: Option<Statement>,
        limit: Option<u64>,
    ) -> Statement {
        let mut q = Statement::new("DELETE FROM ");
        q.push(&self.resolved_name());
        push_where(&mut q, where_clause);
        push_limit(&mut q, limit);
        self.finish(q, "delete_all")
    }

    /// `<INSERT|REPLACE> INTO <table> (c1, c2) VALUES($1, $2)[ <extra>]`
    ///
    /// Columns and values are split from the same row, so they always line up
    /// positionally.
    pub fn build_insert(&self, verb: InsertVerb, row: Row, extra: Option<Statement>) -> Statement {
        #[cfg(feature = "tracing")]
        if row.is_empty() {
            tracing::warn!(
                target: "dbtable.sql",
                table = %self.name,
                verb = verb.as_str(),
                "insert built with no columns"
            );
        }

        let (columns, values): (Vec<String>, Vec<Value>) = row.into_iter().unzip();

        let mut q = Statement::new(verb.as_str());
        q.push(" INTO ").push(&self.resolved_name()).push(" (");
        self.push_ident_list(&mut q, columns.iter().map(String::as_str));
        q.push(") VALUES(");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push_bind(value);
        }
        q.push(")");
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            q.push(" ").push_statement(extra);
        }
        let op = match verb {
            InsertVerb::Insert => "insert",
            InsertVerb::Replace => "replace",
        };
        self.finish(q, op)
    }

    fn select_statement(&self, columns: Columns, where_clause: Option<Statement>) -> Statement {
        let mut q = Statement::new("SELECT ");
        match columns {
            Columns::All => {
                q.push("*");
            }
            Columns::List(columns) => {
                self.push_ident_list(&mut q, columns.iter().map(String::as_str));
            }
        }
        q.push(" FROM ").push(&self.resolved_name());
        push_where(&mut q, where_clause);
        q
    }

    fn push_ident_list<'a>(&self, q: &mut Statement, idents: impl Iterator<Item = &'a str>) {
        for (i, ident) in idents.enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push(&self.format(ident));
        }
    }

    // A tag carried in by a caller's fragment wins over the default.
    fn finish(&self, mut q: Statement, op: &str) -> Statement {
        if q.tag_name().is_none() {
            q.tag(format!("{}.{}", self.name, op));
        }
        q
    }
}

impl<T, E: Executor> Table<T, E> {
    /// Select rows matching `where_clause` (all rows if `None`).
    pub async fn select_all(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> TableResult<Vec<Row>> {
        let q = self.build_select_all(columns, where_clause);
        self.executor.fetch_all(q).await
    }

    /// Select the first matching row, if any.
    pub async fn select_one(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> TableResult<Option<Row>> {
        let q = self.build_select_one(columns, where_clause);
        let rows = self.executor.fetch_all(q).await?;
        Ok(rows.into_iter().next())
    }

    /// Look up a row by primary key.
    pub async fn get(
        &self,
        columns: impl Into<Columns>,
        key: impl Into<Value>,
    ) -> TableResult<Option<Row>> {
        let q = self.build_get(columns, key);
        let rows = self.executor.fetch_all(q).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn update_all(
        &self,
        updates: Row,
        where_clause: Option<Statement>,
        limit: Option<u64>,
    ) -> TableResult<E::Output> {
        let q = self.build_update_all(updates, where_clause, limit);
        self.executor.execute(q).await
    }

    pub async fn update_one(
        &self,
        updates: Row,
        where_clause: Option<Statement>,
    ) -> TableResult<E::Output> {
        let q = self.build_update_all(updates, where_clause, Some(1));
        self.executor.execute(q).await
    }

    /// Update the row with the given primary key.
    pub async fn update(&self, key: impl Into<Value>, data: Row) -> TableResult<E::Output> {
        self.update_one(data, Some(self.key_clause(key))).await
    }

    /// Delete matching rows. With no `where_clause` this deletes every row.
    pub async fn delete_all(
        &self,
        where_clause: Option<Statement>,
        limit: Option<u64>,
    ) -> TableResult<E::Output> {
        let q = self.build_delete_all(where_clause, limit);
        self.executor.execute(q).await
    }

    /// Delete at most one matching row. A predicate is required.
    pub async fn delete_one(&self, where_clause: Statement) -> TableResult<E::Output> {
        self.delete_all(Some(where_clause), Some(1)).await
    }

    /// Delete the row with the given primary key.
    pub async fn delete(&self, key: impl Into<Value>) -> TableResult<E::Output> {
        self.delete_one(self.key_clause(key)).await
    }

    /// `INSERT INTO ...`, with an optional trailing clause such as
    /// `ON CONFLICT ...` or `ON DUPLICATE KEY UPDATE ...`.
    pub async fn insert(&self, row: Row, extra: Option<Statement>) -> TableResult<E::Output> {
        self.insert_with(InsertVerb::Insert, row, extra).await
    }

    /// `REPLACE INTO ...`
    pub async fn replace(&self, row: Row, extra: Option<Statement>) -> TableResult<E::Output> {
        self.insert_with(InsertVerb::Replace, row, extra).await
    }

    pub async fn insert_with(
        &self,
        verb: InsertVerb,
        row: Row,
        extra: Option<Statement>,
    ) -> TableResult<E::Output> {
        let q = self.build_insert(verb, row, extra);
        self.executor.execute(q).await
    }

    /// Run an arbitrary mutating statement through this table's executor.
    pub async fn execute(&self, stmt: Statement) -> TableResult<E::Output> {
        self.executor.execute(stmt).await
    }

    /// Run an arbitrary row-returning statement through this table's executor.
    pub async fn fetch(&self, stmt: Statement) -> TableResult<Vec<Row>> {
        self.executor.fetch_all(stmt).await
    }
}

impl<T: DeserializeOwned, E: Executor> Table<T, E> {
    /// [`Table::select_all`], decoding each row into `T`.
    pub async fn select_all_as(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> TableResult<Vec<T>> {
        let rows = self.select_all(columns, where_clause).await?;
        rows.iter().map(Row::decode).collect()
    }

    /// [`Table::select_one`], decoding the row into `T`.
    pub async fn select_one_as(
        &self,
        columns: impl Into<Columns>,
        where_clause: Option<Statement>,
    ) -> TableResult<Option<T>> {
        let row = self.select_one(columns, where_clause).await?;
        row.as_ref().map(Row::decode).transpose()
    }

    /// [`Table::get`], decoding the row into `T`.
    pub async fn get_as(
        &self,
        columns: impl Into<Columns>,
        key: impl Into<Value>,
    ) -> TableResult<Option<T>> {
        let row = self.get(columns, key).await?;
        row.as_ref().map(Row::decode).transpose()
    }
}

impl<T, E: Executor> Table<T, E> {
    /// Insert a (possibly partial) model. See [`Row::from_serialize`].
    pub async fn insert_model<P: Serialize + ?Sized>(
        &self,
        model: &P,
        extra: Option<Statement>,
    ) -> TableResult<E::Output> {
        self.insert(Row::from_serialize(model)?, extra).await
    }

    /// Replace with a (possibly partial) model.
    pub async fn replace_model<P: Serialize + ?Sized>(
        &self,
        model: &P,
        extra: Option<Statement>,
    ) -> TableResult<E::Output> {
        self.replace(Row::from_serialize(model)?, extra).await
    }

    /// Update the row with the given primary key from a partial model.
    pub async fn update_model<P: Serialize + ?Sized>(
        &self,
        key: impl Into<Value>,
        patch: &P,
    ) -> TableResult<E::Output> {
        self.update(key, Row::from_serialize(patch)?).await
    }
}

impl<T, E: Clone> Clone for Table<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            primary_key_name: self.primary_key_name.clone(),
            executor: self.executor.clone(),
            formatter: Arc::clone(&self.formatter),
            _row: PhantomData,
        }
    }
}

impl<T, E> fmt::Debug for Table<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("primary_key_name", &self.primary_key_name)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

// An empty fragment means "no predicate"; its tag, if any, is still kept.
fn push_where(q: &mut Statement, where_clause: Option<Statement>) {
    let Some(clause) = where_clause else {
        return;
    };
    if !clause.is_empty() {
        q.push(" WHERE ");
    }
    q.push_statement(clause);
}

// `LIMIT 0` is treated as no limit.
fn push_limit(q: &mut Statement, limit: Option<u64>) {
    if let Some(n) = limit.filter(|n| *n > 0) {
        q.limit(n);
    }
}
