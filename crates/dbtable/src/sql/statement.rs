use crate::error::{TableError, TableResult};
use crate::value::Value;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
enum StatementPart {
    Raw(String),
    Param,
}

/// How bound-parameter placeholders are spelled in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1, $2, ...` (Postgres).
    #[default]
    Numbered,
    /// `?, ?, ...` (MySQL, SQLite).
    Question,
}

/// A parameter-safe, composable SQL statement.
///
/// `Statement` stores literal SQL text and bound values separately and only
/// produces placeholders when rendered, so fragments can be built
/// independently and appended to each other without tracking indices.
///
/// Appending another statement consumes it. A fragment handed to a
/// [`crate::Table`] operation is moved into the resulting statement and can
/// not be reused by accident; call `clone()` first if you need it twice.
#[must_use]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    parts: Vec<StatementPart>,
    params: Vec<Value>,
    tag: Option<String>,
}

impl Statement {
    /// Create a new statement with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial_sql = initial_sql.into();
        let parts = if initial_sql.is_empty() {
            Vec::new()
        } else {
            vec![StatementPart::Raw(initial_sql)]
        };
        Self {
            parts,
            params: Vec::new(),
            tag: None,
        }
    }

    /// Create an empty statement.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Associate a tag for logging/observability.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = Some(tag.into());
        self
    }

    /// Associate a tag (consuming version).
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(StatementPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(StatementPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(StatementPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `NULL` (so `IN (NULL)` is valid SQL).
    pub fn push_bind_list<V: Into<Value>>(
        &mut self,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append another statement, consuming it.
    ///
    /// Text and bound values are concatenated in order, so placeholder
    /// numbering stays consistent after rendering.
    pub fn push_statement(&mut self, mut other: Statement) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        if self.tag.is_none() {
            self.tag = other.tag;
        }
        self
    }

    /// Append a SQL identifier without quoting it.
    ///
    /// Identifiers can not be bound as parameters. To keep dynamic
    /// identifiers from carrying SQL, each `.`-separated segment must match
    /// `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn push_ident(&mut self, ident: &str) -> TableResult<&mut Self> {
        validate_ident(ident)?;
        Ok(self.push(ident))
    }

    /// Append `LIMIT $n` with a bound parameter.
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        self.render(Placeholder::Numbered)
    }

    /// Render SQL with the given placeholder style.
    pub fn render(&self, style: Placeholder) -> String {
        let cap = self
            .parts
            .iter()
            .map(|part| match part {
                StatementPart::Raw(s) => s.len(),
                StatementPart::Param => 4,
            })
            .sum();

        let mut out = String::with_capacity(cap);
        let mut idx: usize = 0;
        for part in &self.parts {
            match part {
                StatementPart::Raw(s) => out.push_str(s),
                StatementPart::Param => {
                    idx += 1;
                    match style {
                        Placeholder::Numbered => {
                            let _ = write!(&mut out, "${idx}");
                        }
                        Placeholder::Question => out.push('?'),
                    }
                }
            }
        }
        out
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Split into rendered SQL and owned bound values.
    pub fn into_parts(self, style: Placeholder) -> (String, Vec<Value>) {
        let sql = self.render(style);
        (sql, self.params)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::new(sql)
    }
}

fn validate_ident(ident: &str) -> TableResult<()> {
    if ident.is_empty() {
        return Err(TableError::validation(
            "Statement::push_ident: empty identifier",
        ));
    }

    let invalid = || {
        TableError::validation(format!(
            "Statement::push_ident: invalid identifier '{ident}'"
        ))
    };

    for seg in ident.split('.') {
        let mut chars = seg.chars();
        let Some(first) = chars.next() else {
            return Err(invalid());
        };
        if !(first == '_' || first.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
    }
    Ok(())
}
