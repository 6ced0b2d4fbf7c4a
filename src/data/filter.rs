use std::collections::BTreeSet;

use super::model::{CellValue, ColumnName, Table};

// ---------------------------------------------------------------------------
// FilteredSubset – the rows passing the active categorical filter
// ---------------------------------------------------------------------------

/// A transient view of the table: the rows whose filter-column value is a
/// member of the active value set, in original row order. Recomputed after
/// every selection change rather than kept up to date by subscriptions.
#[derive(Debug, Clone)]
pub struct FilteredSubset<'t> {
    table: &'t Table,
    row_indices: Vec<usize>,
}

impl<'t> FilteredSubset<'t> {
    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// Indices into the underlying table, ascending.
    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    /// The subset's values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &'t CellValue> + '_> {
        let values = self.table.column(column)?;
        Some(self.row_indices.iter().map(move |&i| &values[i]))
    }

    /// Number of rows passing the filter.
    pub fn len(&self) -> usize {
        self.row_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_indices.is_empty()
    }
}

/// Apply the categorical filter: row i passes iff its value in
/// `filter_column` is a member of `active_values`.
///
/// Exact `CellValue` equality, no coercion. An empty `active_values` set is
/// valid and yields a zero-row subset.
pub fn apply<'t>(
    table: &'t Table,
    filter_column: &ColumnName,
    active_values: &BTreeSet<CellValue>,
) -> FilteredSubset<'t> {
    // Selection state only hands out validated column names; a miss here
    // means the name was resolved against a different table.
    let Some(values) = table.column(filter_column.as_str()) else {
        debug_assert!(
            false,
            "filter column '{filter_column}' is not in the table schema"
        );
        return FilteredSubset {
            table,
            row_indices: Vec::new(),
        };
    };

    let row_indices = values
        .iter()
        .enumerate()
        .filter(|(_, v)| active_values.contains(v))
        .map(|(i, _)| i)
        .collect();

    FilteredSubset { table, row_indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema;

    fn sample_table() -> Table {
        Table::from_columns(vec![
            (
                "age".into(),
                vec![
                    CellValue::Integer(30),
                    CellValue::Integer(40),
                    CellValue::Integer(50),
                    CellValue::Integer(60),
                ],
            ),
            (
                "city".into(),
                vec![
                    CellValue::Text("NY".into()),
                    CellValue::Text("LA".into()),
                    CellValue::Text("NY".into()),
                    CellValue::Text("SF".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn keeps_exactly_the_matching_rows_in_order() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let active: BTreeSet<_> = [CellValue::Text("NY".into())].into();

        let subset = apply(&table, &city, &active);

        assert_eq!(subset.row_indices(), &[0, 2]);
        assert!(subset.len() <= table.len());
        let ages: Vec<_> = subset.column_values("age").unwrap().cloned().collect();
        assert_eq!(ages, vec![CellValue::Integer(30), CellValue::Integer(50)]);
    }

    #[test]
    fn full_value_set_keeps_every_row() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let all = schema::distinct_values(&table, "city").unwrap();

        let subset = apply(&table, &city, &all);
        assert_eq!(subset.row_indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn empty_value_set_yields_zero_rows() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();

        let subset = apply(&table, &city, &BTreeSet::new());
        assert!(subset.is_empty());
        assert_eq!(subset.len(), 0);
    }

    #[test]
    #[should_panic(expected = "not in the table schema")]
    fn column_resolved_against_another_table_is_a_caller_bug() {
        let table = sample_table();
        let other =
            Table::from_columns(vec![("zip".into(), vec![CellValue::Integer(10001)])]).unwrap();
        let zip = ColumnName::resolve(&other, "zip").unwrap();

        apply(&table, &zip, &BTreeSet::new());
    }

    #[test]
    fn membership_uses_exact_equality() {
        let table = sample_table();
        let age = ColumnName::resolve(&table, "age").unwrap();
        // A float 30.0 must not match the integer 30.
        let active: BTreeSet<_> = [CellValue::Float(30.0)].into();

        let subset = apply(&table, &age, &active);
        assert!(subset.is_empty());
    }
}
