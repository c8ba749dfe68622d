//! Parameter-safe SQL statements.
//!
//! [`Statement`] is the primitive every table operation is built from: literal
//! SQL text is pushed with [`Statement::push`], values with
//! [`Statement::push_bind`], and whole fragments with
//! [`Statement::push_statement`]. Placeholders are only generated when the
//! statement is rendered, so composition never has to track indices.
//!
//! # Example
//!
//! ```ignore
//! use dbtable::sql;
//!
//! let mut filter = sql("age > ");
//! filter.push_bind(18).push(" AND name LIKE ").push_bind("m%");
//!
//! let adults = users.select_all(["id", "name"], Some(filter)).await?;
//! ```

mod statement;


pub use statement::{Placeholder, Statement};

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Statement {
    Statement::new(initial_sql)
}
