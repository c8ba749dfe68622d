//! Rows: ordered column → value maps, and the serde bridge to typed structs.

mod de;

use crate::error::{TableError, TableResult};
use crate::value::{FromValue, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A flat, ordered mapping from column name to [`Value`].
///
/// Insertion order is kept: it is the order columns appear in `SET` and
/// `INSERT` column lists. Setting a column that already exists replaces its
/// value without moving it.
///
/// A row may hold any subset of an entity's columns; nothing checks the keys
/// against a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

/// Build a [`Row`] from `column => value` pairs.
///
/// ```ignore
/// let r = dbtable::row! { "name" => "mia", "age" => 5 };
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($col:expr => $val:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.set($col, $val); )+
        row
    }};
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set a column (consuming version, for chaining).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing any previous value in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Typed access to a single column.
    ///
    /// A missing column and a type mismatch are both reported as
    /// [`TableError::Decode`] naming the column.
    pub fn try_get<T: FromValue>(&self, column: &str) -> TableResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| TableError::decode(column, "column not present in row"))?;
        T::from_value(value).map_err(|message| TableError::decode(column, message))
    }

    /// Convert any serializable struct or map into a row.
    ///
    /// Struct fields keep their declaration order. Fields skipped by serde
    /// (e.g. `#[serde(skip_serializing_if = "Option::is_none")]`) are absent
    /// from the row, which is how partial inserts and updates are expressed.
    pub fn from_serialize<S: Serialize + ?Sized>(value: &S) -> TableResult<Self> {
        let serde_json::Value::Object(map) = serde_json::to_value(value)? else {
            return Err(TableError::Serialization(
                "expected a struct or map to convert into a row".to_string(),
            ));
        };

        let mut row = Row::with_capacity(map.len());
        for (column, json) in map {
            let value = Value::try_from(json)
                .map_err(|message| TableError::Serialization(format!("{column}: {message}")))?;
            row.entries.push((column, value));
        }
        Ok(row)
    }

    /// Decode this row into `T` through serde.
    ///
    /// Columns map to fields by name. `0`/`1` numbers decode into `bool`
    /// fields and text decodes into unit enum variants. A failure names the
    /// offending column, or the missing one.
    pub fn decode<T: DeserializeOwned>(&self) -> TableResult<T> {
        T::deserialize(de::RowDeserializer { row: self }).map_err(|e| {
            TableError::decode(e.column.unwrap_or_else(|| "row".to_string()), e.message)
        })
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Row {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
