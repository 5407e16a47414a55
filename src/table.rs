use std::borrow::Cow;
use std::fmt;

/// A single cell value. CSV gives us text; a field becomes a `Number` only
/// when its text is exactly the canonical rendering of a finite `f64`, so
/// the original field is always recoverable. Anything lossy ("007", "2E4",
/// "3.0") stays `Text` and survives export verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    /// Classify a raw CSV field: empty string → `Empty`, text that
    /// round-trips through `f64` unchanged → `Number`, everything else →
    /// `Text`.
    pub fn parse(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() && n.to_string() == raw {
                return Value::Number(n);
            }
        }
        Value::Text(raw.to_string())
    }

    /// The cell's content as text, for substring matching: the original
    /// field text for both textual and numeric cells. Only empty/missing
    /// cells have none.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Empty => None,
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// An in-memory table: one ordered list of column names shared by every row.
/// Rows hold their cells positionally; `columns.len() == row.len()` is an
/// invariant enforced by `push_row`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row. Panics in debug builds if the width disagrees with the
    /// schema; callers validate widths before constructing rows.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Move all rows of `other` onto the end of this table, preserving their
    /// order. The caller guarantees `other` was built against this table's
    /// schema.
    pub fn append(&mut self, other: Table) {
        self.rows.extend(other.rows);
    }

    /// Keep only the rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}
