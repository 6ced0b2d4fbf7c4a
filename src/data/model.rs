use std::fmt;

use anyhow::{Result, bail};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single scalar cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common tabular dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
///
/// Equality is exact per variant: numbers never compare equal to text, and
/// integers never compare equal to floats. The loader assigns one variant per
/// column, so values drawn from the same column always share a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionError – recoverable rejections at the selection boundary
// ---------------------------------------------------------------------------

/// Selection-time errors: the offending input is rejected, prior state stays
/// intact. These never propagate past the setters into filtering or chart
/// building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown column: '{0}'")]
    UnknownColumn(String),
    #[error("value '{value}' does not occur in column '{column}'")]
    InvalidFilterValue { column: String, value: String },
}

// ---------------------------------------------------------------------------
// ColumnName – a column reference validated against a live schema
// ---------------------------------------------------------------------------

/// A column identifier that is known to exist in the table it was resolved
/// against. All role assignments (axes, grouping, filter target) go through
/// [`ColumnName::resolve`] so dangling names are rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnName(String);

impl ColumnName {
    /// Validate `name` against `table`'s schema.
    pub fn resolve(table: &Table, name: &str) -> Result<Self, SelectionError> {
        if table.has_column(name) {
            Ok(ColumnName(name.to_string()))
        } else {
            Err(SelectionError::UnknownColumn(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full loaded dataset: ordered named columns of uniform length.
/// Built once by the loader and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Table {
    column_names: Vec<String>,
    columns: Vec<Vec<CellValue>>,
    n_rows: usize,
}

impl Table {
    /// Build a table from `(name, values)` pairs, in column order.
    ///
    /// Fails when column names collide or column lengths differ.
    pub fn from_columns(columns: Vec<(String, Vec<CellValue>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);

        let mut column_names = Vec::with_capacity(columns.len());
        let mut column_values = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if column_names.contains(&name) {
                bail!("duplicate column name '{name}'");
            }
            if values.len() != n_rows {
                bail!(
                    "column '{name}' has {} values, expected {n_rows}",
                    values.len()
                );
            }
            column_names.push(name);
            column_values.push(values);
        }

        Ok(Table {
            column_names,
            columns: column_values,
            n_rows,
        })
    }

    /// Ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// All values of a column, in row order.
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        let idx = self.column_names.iter().position(|c| c == name)?;
        Some(&self.columns[idx])
    }

    /// Cell at `(row, column)`.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column)?.get(row)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has zero rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_rejects_duplicate_names() {
        let result = Table::from_columns(vec![
            ("a".into(), vec![CellValue::Integer(1)]),
            ("a".into(), vec![CellValue::Integer(2)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let result = Table::from_columns(vec![
            ("a".into(), vec![CellValue::Integer(1), CellValue::Integer(2)]),
            ("b".into(), vec![CellValue::Integer(3)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn column_lookup_preserves_row_order() {
        let table = Table::from_columns(vec![(
            "x".into(),
            vec![
                CellValue::Integer(3),
                CellValue::Integer(1),
                CellValue::Integer(2),
            ],
        )])
        .unwrap();

        let col = table.column("x").unwrap();
        assert_eq!(
            col,
            &[
                CellValue::Integer(3),
                CellValue::Integer(1),
                CellValue::Integer(2)
            ]
        );
        assert!(table.column("y").is_none());
    }

    #[test]
    fn resolve_rejects_unknown_column() {
        let table =
            Table::from_columns(vec![("x".into(), vec![CellValue::Integer(1)])]).unwrap();
        assert!(ColumnName::resolve(&table, "x").is_ok());
        assert_eq!(
            ColumnName::resolve(&table, "nope"),
            Err(SelectionError::UnknownColumn("nope".into()))
        );
    }

    #[test]
    fn no_cross_type_equality() {
        assert_ne!(CellValue::Integer(1), CellValue::Text("1".into()));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }
}
