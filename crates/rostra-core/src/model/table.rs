use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::Record;

/// An in-memory tabular dataset.
///
/// Columns are kept in their source order; each row is a [`Record`] keyed
/// by column name. A row may omit a column, which reads as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Iterate over one column's values, yielding `None` for missing or
    /// null cells.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(name).filter(|v| !v.is_null()))
    }

    /// Rename a column in place, keeping its position.
    ///
    /// Returns `false` (and changes nothing) if `from` is not a column or
    /// `to` already is one.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if self.has_column(to) {
            return false;
        }
        let Some(slot) = self.columns.iter_mut().find(|c| c.as_str() == from) else {
            return false;
        };
        *slot = to.to_string();

        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
        true
    }

    /// Keep only the rows matching `predicate`.
    #[must_use]
    pub fn filter<F>(mut self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(|row| predicate(row));
        self
    }
}
