use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::loader;
use crate::data::model::{CellValue, ColumnName, SelectionError, Table};
use crate::data::schema;

// ---------------------------------------------------------------------------
// Selection state – the user's current column roles and filter values
// ---------------------------------------------------------------------------

/// The user's current choices: column roles for the two charts, the filter
/// column, and the active subset of its distinct values.
///
/// Every column field always names a column of the table the state was built
/// for, and `active_filter_values` is always a subset of the filter column's
/// distinct values. Each setter validates before mutating, so a rejected call
/// leaves the prior state untouched.
#[derive(Debug, Clone)]
pub struct SelectionState {
    chart1_x: ColumnName,
    chart1_color: ColumnName,
    chart2_y: ColumnName,
    chart2_color: ColumnName,
    filter_column: ColumnName,
    active_filter_values: BTreeSet<CellValue>,
}

impl SelectionState {
    /// Defaults: every role points at the first column, with all of its
    /// distinct values active. `None` if the table has no columns (the
    /// loader rejects such tables before they get here).
    pub fn new(table: &Table) -> Option<Self> {
        let first = table.column_names().first()?;
        let first = ColumnName::resolve(table, first).ok()?;
        let active_filter_values = schema::distinct_values(table, first.as_str()).ok()?;

        Some(SelectionState {
            chart1_x: first.clone(),
            chart1_color: first.clone(),
            chart2_y: first.clone(),
            chart2_color: first.clone(),
            filter_column: first,
            active_filter_values,
        })
    }

    pub fn chart1_x(&self) -> &ColumnName {
        &self.chart1_x
    }

    pub fn chart1_color(&self) -> &ColumnName {
        &self.chart1_color
    }

    pub fn chart2_y(&self) -> &ColumnName {
        &self.chart2_y
    }

    pub fn chart2_color(&self) -> &ColumnName {
        &self.chart2_color
    }

    pub fn filter_column(&self) -> &ColumnName {
        &self.filter_column
    }

    pub fn active_filter_values(&self) -> &BTreeSet<CellValue> {
        &self.active_filter_values
    }

    pub fn set_chart1_x(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        self.chart1_x = ColumnName::resolve(table, name)?;
        Ok(())
    }

    pub fn set_chart1_color(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        self.chart1_color = ColumnName::resolve(table, name)?;
        Ok(())
    }

    pub fn set_chart2_y(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        self.chart2_y = ColumnName::resolve(table, name)?;
        Ok(())
    }

    pub fn set_chart2_color(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        self.chart2_color = ColumnName::resolve(table, name)?;
        Ok(())
    }

    /// Switch the filter column and reset the active values to the full
    /// distinct set of the new column. The reset is not optional: keeping a
    /// selection that referenced the old column's value domain would filter
    /// by values that may not exist in the new column at all.
    pub fn set_filter_column(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        let column = ColumnName::resolve(table, name)?;
        let full = schema::distinct_values(table, column.as_str())?;
        self.filter_column = column;
        self.active_filter_values = full;
        Ok(())
    }

    /// Replace the active value set. Every value must occur in the current
    /// filter column; the empty set is allowed and means "no rows pass".
    pub fn set_active_filter_values(
        &mut self,
        table: &Table,
        values: BTreeSet<CellValue>,
    ) -> Result<(), SelectionError> {
        let domain = schema::distinct_values(table, self.filter_column.as_str())?;
        if let Some(bad) = values.iter().find(|v| !domain.contains(v)) {
            return Err(SelectionError::InvalidFilterValue {
                column: self.filter_column.to_string(),
                value: bad.to_string(),
            });
        }
        self.active_filter_values = values;
        Ok(())
    }

    /// Toggle a single value in the active set.
    pub fn toggle_filter_value(
        &mut self,
        table: &Table,
        value: &CellValue,
    ) -> Result<(), SelectionError> {
        let mut values = self.active_filter_values.clone();
        if !values.remove(value) {
            values.insert(value.clone());
        }
        self.set_active_filter_values(table, values)
    }

    /// Select all values of the current filter column.
    pub fn select_all_filter_values(&mut self, table: &Table) -> Result<(), SelectionError> {
        self.active_filter_values = schema::distinct_values(table, self.filter_column.as_str())?;
        Ok(())
    }

    /// Deselect every value; no rows pass until something is re-selected.
    pub fn select_no_filter_values(&mut self) {
        self.active_filter_values.clear();
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Explore,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until a file is opened).
    pub table: Option<Arc<Table>>,

    /// Current column roles and filter values, present alongside `table`.
    pub selection: Option<SelectionState>,

    /// Path the table was loaded from.
    pub source_path: Option<PathBuf>,

    /// Active page in the central panel.
    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            selection: None,
            source_path: None,
            page: Page::Home,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a table from `path` and initialise the selection defaults.
    /// Load failures leave any previously loaded table in place.
    pub fn open_path(&mut self, path: &Path) {
        match loader::load(path) {
            Ok(table) => {
                log::info!(
                    "loaded {} rows with columns {:?} from {}",
                    table.len(),
                    table.column_names(),
                    path.display()
                );
                self.selection = SelectionState::new(&table);
                self.table = Some(table);
                self.source_path = Some(path.to_path_buf());
                self.status_message = None;
                self.page = Page::Explore;
            }
            Err(e) => {
                log::error!("failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Report a rejected selection without touching the selection itself.
    pub fn report_selection_error(&mut self, error: SelectionError) {
        log::warn!("selection rejected: {error}");
        self.status_message = Some(format!("Error: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn defaults_point_at_first_column_with_all_values_active() {
        let table = sample_table();
        let state = SelectionState::new(&table).unwrap();

        assert_eq!(state.chart1_x().as_str(), "age");
        assert_eq!(state.chart2_y().as_str(), "age");
        assert_eq!(state.filter_column().as_str(), "age");
        assert_eq!(
            state.active_filter_values(),
            &crate::data::schema::distinct_values(&table, "age").unwrap()
        );
    }

    #[test]
    fn switching_filter_column_resets_active_values() {
        let table = sample_table();
        let mut state = SelectionState::new(&table).unwrap();

        // Narrow the selection on the default column first.
        state
            .set_active_filter_values(&table, [CellValue::Integer(30)].into())
            .unwrap();

        state.set_filter_column(&table, "city").unwrap();

        assert_eq!(state.filter_column().as_str(), "city");
        assert_eq!(
            state.active_filter_values(),
            &crate::data::schema::distinct_values(&table, "city").unwrap()
        );
    }

    #[test]
    fn unknown_column_is_rejected_and_state_unchanged() {
        let table = sample_table();
        let mut state = SelectionState::new(&table).unwrap();

        let err = state.set_chart1_x(&table, "doesNotExist").unwrap_err();
        assert_eq!(err, SelectionError::UnknownColumn("doesNotExist".into()));
        assert_eq!(state.chart1_x().as_str(), "age");

        let err = state.set_filter_column(&table, "doesNotExist").unwrap_err();
        assert_eq!(err, SelectionError::UnknownColumn("doesNotExist".into()));
        assert_eq!(state.filter_column().as_str(), "age");
        assert!(!state.active_filter_values().is_empty());
    }

    #[test]
    fn foreign_filter_values_are_rejected_and_state_unchanged() {
        let table = sample_table();
        let mut state = SelectionState::new(&table).unwrap();
        state.set_filter_column(&table, "city").unwrap();
        let before = state.active_filter_values().clone();

        let err = state
            .set_active_filter_values(&table, [CellValue::Text("Paris".into())].into())
            .unwrap_err();

        assert!(matches!(err, SelectionError::InvalidFilterValue { .. }));
        assert_eq!(state.active_filter_values(), &before);
    }

    #[test]
    fn empty_filter_selection_is_allowed() {
        let table = sample_table();
        let mut state = SelectionState::new(&table).unwrap();

        state
            .set_active_filter_values(&table, BTreeSet::new())
            .unwrap();
        assert!(state.active_filter_values().is_empty());
    }

    #[test]
    fn toggle_round_trips_a_value() {
        let table = sample_table();
        let mut state = SelectionState::new(&table).unwrap();
        state.set_filter_column(&table, "city").unwrap();

        let ny = CellValue::Text("NY".into());
        state.toggle_filter_value(&table, &ny).unwrap();
        assert!(!state.active_filter_values().contains(&ny));
        state.toggle_filter_value(&table, &ny).unwrap();
        assert!(state.active_filter_values().contains(&ny));
    }
}
