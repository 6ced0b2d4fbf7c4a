use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::filter;
use crate::data::model::{SelectionError, Table};
use crate::data::schema;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and selection widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page navigation plus, on the Explore page, the
/// chart column selectors and the filter multiselect.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.radio_value(&mut state.page, Page::Home, "Home");
    ui.radio_value(&mut state.page, Page::Explore, "Data Visualization");
    ui.separator();

    if state.page != Page::Explore {
        return;
    }

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Run the setters after the widget pass so `state` is borrowed once.
    let mut rejected: Option<SelectionError> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(selection) = state.selection.as_mut() {
                let columns = schema::column_names(&table).to_vec();

                ui.strong("Chart 1 options");
                if let Some(col) =
                    column_combo(ui, "chart1_x", "X-Axis", &columns, selection.chart1_x().as_str())
                {
                    rejected = selection.set_chart1_x(&table, &col).err();
                }
                if let Some(col) = column_combo(
                    ui,
                    "chart1_color",
                    "Color/Grouping",
                    &columns,
                    selection.chart1_color().as_str(),
                ) {
                    rejected = selection.set_chart1_color(&table, &col).err();
                }
                ui.separator();

                ui.strong("Chart 2 options");
                if let Some(col) =
                    column_combo(ui, "chart2_y", "Y-Axis", &columns, selection.chart2_y().as_str())
                {
                    rejected = selection.set_chart2_y(&table, &col).err();
                }
                if let Some(col) = column_combo(
                    ui,
                    "chart2_color",
                    "Color/Grouping",
                    &columns,
                    selection.chart2_color().as_str(),
                ) {
                    rejected = selection.set_chart2_color(&table, &col).err();
                }
                ui.separator();

                ui.strong("Data filtering");
                if let Some(col) = column_combo(
                    ui,
                    "filter_col",
                    "Filter by",
                    &columns,
                    selection.filter_column().as_str(),
                ) {
                    // Switching the filter column re-selects all of its values.
                    rejected = selection.set_filter_column(&table, &col).err();
                }
                filter_values(ui, &table, selection, &mut rejected);
            }
        });

    if let Some(error) = rejected {
        state.report_selection_error(error);
    }
}

/// The filter value multiselect: one checkbox per distinct value of the
/// current filter column, with All/None shortcuts.
fn filter_values(
    ui: &mut Ui,
    table: &Table,
    selection: &mut crate::state::SelectionState,
    rejected: &mut Option<SelectionError>,
) {
    let domain = match schema::distinct_values(table, selection.filter_column().as_str()) {
        Ok(domain) => domain,
        Err(e) => {
            *rejected = Some(e);
            return;
        }
    };

    let n_selected = selection.active_filter_values().len();
    let header = format!(
        "Values in {}  ({n_selected}/{})",
        selection.filter_column(),
        domain.len()
    );

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("filter_values")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *rejected = selection.select_all_filter_values(table).err();
                }
                if ui.small_button("None").clicked() {
                    selection.select_no_filter_values();
                }
            });

            // Tint the value labels when the filter column doubles as a
            // grouping column, so the listing matches the chart legend.
            let color_map = [selection.chart1_color(), selection.chart2_color()]
                .contains(&selection.filter_column())
                .then(|| ColorMap::new(&domain));

            for value in &domain {
                let mut checked = selection.active_filter_values().contains(value);
                let mut text = RichText::new(value.to_string());
                if let Some(cm) = &color_map {
                    text = text.color(cm.color_for(value));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    if let Err(e) = selection.toggle_filter_value(table, value) {
                        *rejected = Some(e);
                    }
                }
            }
        });
}

/// A labelled ComboBox over the column names; `Some(name)` when the user
/// picks a different column.
fn column_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    columns: &[String],
    current: &str,
) -> Option<String> {
    let mut picked = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for col in columns {
                    if ui.selectable_label(current == col, col).clicked() && current != col {
                        picked = Some(col.clone());
                    }
                }
            });
    });
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(selection)) = (&state.table, &state.selection) {
            let passing = filter::apply(
                table,
                selection.filter_column(),
                selection.active_filter_values(),
            )
            .len();
            let source = state
                .source_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}: {} rows loaded, {passing} pass filter",
                table.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
