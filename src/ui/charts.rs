use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot};
use egui_extras::{Column, TableBuilder};

use crate::chart::{self, ChartSpec};
use crate::color::ColorMap;
use crate::data::filter;
use crate::data::model::{CellValue, Table};
use crate::state::AppState;

const PREVIEW_ROW_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

pub fn home_page(ui: &mut Ui) {
    ui.heading("Welcome to Table Lens");
    ui.add_space(8.0);
    ui.label(
        "Table Lens loads one tabular dataset and lets you explore it \
         interactively: pick columns for axes and grouping, filter rows by \
         the values of any column, and view the result as a histogram and a \
         boxplot.",
    );
    ui.add_space(4.0);
    ui.label("Use the sidebar to switch to the Data Visualization page.");
}

// ---------------------------------------------------------------------------
// Explore page: preview + the two charts
// ---------------------------------------------------------------------------

pub fn explore_page(ui: &mut Ui, state: &AppState) {
    let (Some(table), Some(selection)) = (&state.table, &state.selection) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore it  (File → Open…)");
        });
        return;
    };

    ui.collapsing("Dataset preview", |ui: &mut Ui| {
        dataset_preview(ui, table);
    });
    ui.separator();

    // Pull-based refresh: re-derive the subset and both chart specs from the
    // current selection on every pass.
    let subset = filter::apply(
        table,
        selection.filter_column(),
        selection.active_filter_values(),
    );

    let distribution = chart::build_distribution_spec(
        subset.clone(),
        selection.chart1_x().as_str(),
        selection.chart1_color().as_str(),
    );
    let spread = chart::build_spread_spec(
        subset,
        selection.chart2_y().as_str(),
        selection.chart2_color().as_str(),
    );

    ui.columns(2, |columns: &mut [Ui]| {
        match distribution {
            Ok(spec) => distribution_chart(&mut columns[0], &spec),
            Err(e) => {
                columns[0].label(format!("Chart 1: {e}"));
            }
        }
        match spread {
            Ok(spec) => spread_chart(&mut columns[1], &spec),
            Err(e) => {
                columns[1].label(format!("Chart 2: {e}"));
            }
        }
    });
}

fn dataset_preview(ui: &mut Ui, table: &Table) {
    let names = table.column_names().to_vec();
    let n_rows = table.len().min(PREVIEW_ROW_LIMIT);

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), names.len())
        .header(20.0, |mut header| {
            for name in &names {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, n_rows, |mut row| {
                let i = row.index();
                for name in &names {
                    row.col(|ui: &mut Ui| {
                        if let Some(value) = table.value(i, name) {
                            ui.label(value.to_string());
                        }
                    });
                }
            });
        });

    if table.len() > PREVIEW_ROW_LIMIT {
        ui.label(format!(
            "Showing {PREVIEW_ROW_LIMIT} of {} rows",
            table.len()
        ));
    }
}

// ---------------------------------------------------------------------------
// Distribution chart (histogram of a column, grouped by another)
// ---------------------------------------------------------------------------

/// Count rows per (axis value, color value). All binning happens here, from
/// the spec alone, so the same spec always draws the same chart.
fn distribution_counts(spec: &ChartSpec) -> BTreeMap<CellValue, BTreeMap<CellValue, usize>> {
    let mut counts: BTreeMap<CellValue, BTreeMap<CellValue, usize>> = BTreeMap::new();

    let axis = spec.rows.column_values(spec.bindings.axis.as_str());
    let color = spec.rows.column_values(spec.bindings.color.as_str());
    if let (Some(axis), Some(color)) = (axis, color) {
        for (a, c) in axis.zip(color) {
            *counts
                .entry(a.clone())
                .or_default()
                .entry(c.clone())
                .or_default() += 1;
        }
    }
    counts
}

fn distribution_chart(ui: &mut Ui, spec: &ChartSpec) {
    ui.strong(format!(
        "{} distribution by {}",
        spec.bindings.axis, spec.bindings.color
    ));

    let counts = distribution_counts(spec);
    let categories: Vec<CellValue> = counts.keys().cloned().collect();
    let groups: BTreeSet<CellValue> = counts.values().flat_map(|m| m.keys().cloned()).collect();
    let color_map = ColorMap::new(&groups);

    // One BarChart per color group so the legend lists the groups; bars are
    // stacked per category via explicit base offsets.
    let mut stack_base: Vec<f64> = vec![0.0; categories.len()];
    let mut bar_charts = Vec::new();
    for group in &groups {
        let mut bars = Vec::new();
        for (x, category) in categories.iter().enumerate() {
            let count = counts
                .get(category)
                .and_then(|m| m.get(group))
                .copied()
                .unwrap_or(0);
            if count == 0 {
                continue;
            }
            bars.push(
                Bar::new(x as f64, count as f64)
                    .base_offset(stack_base[x])
                    .width(0.8),
            );
            stack_base[x] += count as f64;
        }
        bar_charts.push(
            BarChart::new(bars)
                .name(group.to_string())
                .color(color_map.color_for(group)),
        );
    }

    let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    Plot::new("distribution_chart")
        .legend(Legend::default())
        .y_axis_label("count")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for chart in bar_charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Spread chart (boxplot of a numeric column per group)
// ---------------------------------------------------------------------------

/// Numeric axis values per color group, sorted ascending. Non-numeric cells
/// are skipped; a group with no numeric values is dropped.
fn spread_groups(spec: &ChartSpec) -> BTreeMap<CellValue, Vec<f64>> {
    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();

    let axis = spec.rows.column_values(spec.bindings.axis.as_str());
    let color = spec.rows.column_values(spec.bindings.color.as_str());
    if let (Some(axis), Some(color)) = (axis, color) {
        for (a, c) in axis.zip(color) {
            if let Some(v) = a.as_f64() {
                groups.entry(c.clone()).or_default().push(v);
            }
        }
    }
    groups.retain(|_, v| !v.is_empty());
    for values in groups.values_mut() {
        values.sort_by(f64::total_cmp);
    }
    groups
}

fn spread_chart(ui: &mut Ui, spec: &ChartSpec) {
    ui.strong(format!(
        "{} spread by {}",
        spec.bindings.axis, spec.bindings.color
    ));

    let groups = spread_groups(spec);
    if groups.is_empty() && !spec.rows.is_empty() {
        ui.label(format!(
            "Column '{}' has no numeric values to plot.",
            spec.bindings.axis
        ));
        return;
    }

    let group_values: BTreeSet<CellValue> = groups.keys().cloned().collect();
    let color_map = ColorMap::new(&group_values);

    let mut box_plots = Vec::new();
    for (x, (group, values)) in groups.iter().enumerate() {
        let (q1, median, q3) = quartiles(values);
        let min = values[0];
        let max = values[values.len() - 1];

        let elem = BoxElem::new(x as f64, BoxSpread::new(min, q1, median, q3, max)).box_width(0.6);
        box_plots.push(
            BoxPlot::new(vec![elem])
                .name(group.to_string())
                .color(color_map.color_for(group)),
        );
    }

    let labels: Vec<String> = groups.keys().map(|g| g.to_string()).collect();
    Plot::new("spread_chart")
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for bp in box_plots {
                plot_ui.box_plot(bp);
            }
        });
}

// ---------------------------------------------------------------------------
// Aggregation helpers
// ---------------------------------------------------------------------------

/// Label for integer category positions, blank elsewhere.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 0.05 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .cloned()
        .unwrap_or_default()
}

/// Quartiles of a non-empty sorted slice, by linear interpolation.
fn quartiles(sorted: &[f64]) -> (f64, f64, f64) {
    (
        percentile(sorted, 0.25),
        percentile(sorted, 0.50),
        percentile(sorted, 0.75),
    )
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build_distribution_spec;
    use crate::data::model::{CellValue, ColumnName, Table};

    fn sample_table() -> Table {
        Table::from_columns(vec![
            (
                "age".into(),
                vec![
                    CellValue::Integer(30),
                    CellValue::Integer(30),
                    CellValue::Integer(40),
                ],
            ),
            (
                "city".into(),
                vec![
                    CellValue::Text("NY".into()),
                    CellValue::Text("LA".into()),
                    CellValue::Text("NY".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn distribution_counts_group_by_axis_then_color() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let all = crate::data::schema::distinct_values(&table, "city").unwrap();
        let subset = filter::apply(&table, &city, &all);
        let spec = build_distribution_spec(subset, "age", "city").unwrap();

        let counts = distribution_counts(&spec);
        let thirty = &counts[&CellValue::Integer(30)];
        assert_eq!(thirty[&CellValue::Text("NY".into())], 1);
        assert_eq!(thirty[&CellValue::Text("LA".into())], 1);
        let forty = &counts[&CellValue::Integer(40)];
        assert_eq!(forty[&CellValue::Text("NY".into())], 1);
        assert_eq!(forty.get(&CellValue::Text("LA".into())), None);
    }

    #[test]
    fn empty_subset_aggregates_to_nothing() {
        let table = sample_table();
        let city = ColumnName::resolve(&table, "city").unwrap();
        let subset = filter::apply(&table, &city, &Default::default());
        let spec = build_distribution_spec(subset, "age", "city").unwrap();

        assert!(distribution_counts(&spec).is_empty());
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let (q1, median, q3) = quartiles(&values);
        assert_eq!(q1, 1.75);
        assert_eq!(median, 2.5);
        assert_eq!(q3, 3.25);

        let single = [5.0];
        assert_eq!(quartiles(&single), (5.0, 5.0, 5.0));
    }
}
