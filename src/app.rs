use std::path::Path;

use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{charts, panels};

/// The original data source of the app; loaded automatically when present in
/// the working directory.
const DEFAULT_SOURCE: &str = "banking.csv";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TableLensApp {
    pub state: AppState,
}

impl Default for TableLensApp {
    fn default() -> Self {
        let mut state = AppState::default();
        let default_source = Path::new(DEFAULT_SOURCE);
        if default_source.exists() {
            state.open_path(default_source);
            // Land on the welcome page regardless; the sidebar leads on.
            state.page = Page::Home;
        }
        Self { state }
    }
}

impl eframe::App for TableLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and selections ----
        egui::SidePanel::left("selection_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Home => charts::home_page(ui),
            Page::Explore => charts::explore_page(ui, &self.state),
        });
    }
}
