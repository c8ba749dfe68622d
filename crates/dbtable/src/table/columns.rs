/// The column list of a `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    /// `SELECT *`
    All,
    /// An explicit, ordered list of column names.
    List(Vec<String>),
}

impl Columns {
    pub fn list<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::List(columns.into_iter().map(Into::into).collect())
    }
}

/// `"*"` selects everything; any other string is a single column.
impl From<&str> for Columns {
    fn from(column: &str) -> Self {
        if column == "*" {
            Columns::All
        } else {
            Columns::List(vec![column.to_string()])
        }
    }
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Columns::List(columns)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(columns: Vec<&str>) -> Self {
        Columns::list(columns)
    }
}

impl From<&[&str]> for Columns {
    fn from(columns: &[&str]) -> Self {
        Columns::list(columns.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(columns: [&str; N]) -> Self {
        Columns::list(columns)
    }
}
