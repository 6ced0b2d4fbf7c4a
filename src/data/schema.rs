use std::collections::BTreeSet;

use super::model::{CellValue, SelectionError, Table};

// ---------------------------------------------------------------------------
// Schema introspection
// ---------------------------------------------------------------------------

/// Ordered column names of the table. Never empty for a loaded table; the
/// loader rejects zero-column sources.
pub fn column_names(table: &Table) -> &[String] {
    table.column_names()
}

/// The set of distinct values appearing in `column`.
///
/// Pure function of its inputs, so callers may memoize freely. The returned
/// set iterates in sorted `CellValue` order, which keeps UI listings stable
/// across calls.
pub fn distinct_values(
    table: &Table,
    column: &str,
) -> Result<BTreeSet<CellValue>, SelectionError> {
    let values = table
        .column(column)
        .ok_or_else(|| SelectionError::UnknownColumn(column.to_string()))?;
    Ok(values.iter().cloned().collect())
}
