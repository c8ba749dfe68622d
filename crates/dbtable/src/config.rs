use crate::dialect::{Backticks, IdentFormatter, Verbatim};
use serde::Deserialize;
use std::sync::Arc;

/// Configuration for a [`crate::Table`].
///
/// Can be built in code or deserialized from application config:
///
/// ```ignore
/// let opts: TableOptions = serde_json::from_str(r#"{ "mysql": true }"#)?;
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Quote every identifier with backticks (MySQL dialect).
    #[serde(alias = "quote_identifiers")]
    pub mysql: bool,
    /// Custom identifier formatter; takes precedence over `mysql`.
    #[serde(skip)]
    formatter: Option<Arc<dyn IdentFormatter>>,
}

impl TableOptions {
    /// Create options with defaults (no identifier quoting).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the MySQL dialect: every identifier backtick-quoted.
    pub fn mysql() -> Self {
        Self::new().quote_identifiers(true)
    }

    /// Enable or disable backtick quoting of identifiers.
    pub fn quote_identifiers(mut self, enabled: bool) -> Self {
        self.mysql = enabled;
        self
    }

    /// Use a custom identifier formatter.
    pub fn formatter<F: IdentFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub(crate) fn resolve_formatter(&self) -> Arc<dyn IdentFormatter> {
        match &self.formatter {
            Some(f) => Arc::clone(f),
            None if self.mysql => Arc::new(Backticks),
            None => Arc::new(Verbatim),
        }
    }
}
