use crate::data::filter::FilteredSubset;
use crate::data::model::{ColumnName, SelectionError};

// ---------------------------------------------------------------------------
// Chart specs – declarative chart descriptions for the renderer
// ---------------------------------------------------------------------------

/// What kind of chart the renderer should draw from a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// How a column's values are distributed, as a histogram.
    Distribution,
    /// A numeric column's spread (quartiles), as a boxplot.
    Spread,
}

/// Which column fills which visual role. `axis` is the x axis for a
/// distribution chart and the y axis for a spread chart; `color` is the
/// grouping column. The two may name the same column, in which case the
/// chart groups a column by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBindings {
    pub axis: ColumnName,
    pub color: ColumnName,
}

/// A declarative chart description handed to the renderer: the filtered rows
/// plus role bindings, nothing aggregated yet. Binning and quartile math
/// happen in the renderer so identical specs always draw identically.
/// Immutable once built; data flows one way, the renderer reports nothing
/// back.
#[derive(Debug, Clone)]
pub struct ChartSpec<'t> {
    pub kind: ChartKind,
    pub rows: FilteredSubset<'t>,
    pub bindings: RoleBindings,
}

/// Describe a histogram of `x_column`, grouped by `color_column`.
///
/// The subset keeps the full table schema (filtering drops rows, never
/// columns), so validation is against the table the subset was drawn from.
/// An empty subset is fine and yields an empty chart.
pub fn build_distribution_spec<'t>(
    rows: FilteredSubset<'t>,
    x_column: &str,
    color_column: &str,
) -> Result<ChartSpec<'t>, SelectionError> {
    let bindings = RoleBindings {
        axis: ColumnName::resolve(rows.table(), x_column)?,
        color: ColumnName::resolve(rows.table(), color_column)?,
    };
    Ok(ChartSpec {
        kind: ChartKind::Distribution,
        rows,
        bindings,
    })
}

/// Describe a boxplot of `y_column`, grouped by `color_column`.
pub fn build_spread_spec<'t>(
    rows: FilteredSubset<'t>,
    y_column: &str,
    color_column: &str,
) -> Result<ChartSpec<'t>, SelectionError> {
    let bindings = RoleBindings {
        axis: ColumnName::resolve(rows.table(), y_column)?,
        color: ColumnName::resolve(rows.table(), color_column)?,
    };
    Ok(ChartSpec {
        kind: ChartKind::Spread,
        rows,
        bindings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter;
    use crate::data::model::{CellValue, Table};
    use crate::state::SelectionState;
    use std::collections::BTreeSet;

    fn sample_table() -> Table {
        Table::from_columns(vec![
            (
                "age".into(),
                vec![
                    CellValue::Integer(30),
                    CellValue::Integer(40),
                    CellValue::Integer(50),
                ],
            ),
            (
                "city".into(),
                vec![
                    CellValue::Text("NY".into()),
                    CellValue::Text("NY".into()),
                    CellValue::Text("LA".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_column_is_rejected() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let all: BTreeSet<_> = [CellValue::Text("NY".into()), CellValue::Text("LA".into())].into();
        let subset = filter::apply(&table, &city, &all);

        let err = build_distribution_spec(subset.clone(), "age", "zip").unwrap_err();
        assert_eq!(err, SelectionError::UnknownColumn("zip".into()));
        let err = build_spread_spec(subset, "zip", "city").unwrap_err();
        assert_eq!(err, SelectionError::UnknownColumn("zip".into()));
    }

    #[test]
    fn axis_and_color_may_name_the_same_column() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let all: BTreeSet<_> = [CellValue::Text("NY".into()), CellValue::Text("LA".into())].into();
        let subset = filter::apply(&table, &city, &all);

        let spec = build_distribution_spec(subset, "city", "city").unwrap();
        assert_eq!(spec.bindings.axis, spec.bindings.color);
    }

    #[test]
    fn empty_subset_builds_an_empty_spec() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let subset = filter::apply(&table, &city, &BTreeSet::new());

        let spec = build_spread_spec(subset, "age", "city").unwrap();
        assert!(spec.rows.is_empty());
        assert_eq!(spec.kind, ChartKind::Spread);
    }

    /// Full pipeline: filter by city=NY, then build a distribution spec
    /// binding age→x and city→color over exactly the two NY rows.
    #[test]
    fn filter_then_distribution_spec_end_to_end() {
        let table = sample_table();
        let mut selection = SelectionState::new(&table).unwrap();

        selection.set_filter_column(&table, "city").unwrap();
        selection
            .set_active_filter_values(&table, [CellValue::Text("NY".into())].into())
            .unwrap();

        let subset = filter::apply(
            &table,
            selection.filter_column(),
            selection.active_filter_values(),
        );
        assert_eq!(subset.len(), 2);
        let ages: Vec<_> = subset.column_values("age").unwrap().cloned().collect();
        assert_eq!(ages, vec![CellValue::Integer(30), CellValue::Integer(40)]);

        let spec = build_distribution_spec(subset, "age", "city").unwrap();
        assert_eq!(spec.kind, ChartKind::Distribution);
        assert_eq!(spec.bindings.axis.as_str(), "age");
        assert_eq!(spec.bindings.color.as_str(), "city");
        assert_eq!(spec.rows.row_indices(), &[0, 1]);
    }
}
