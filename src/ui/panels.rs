use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::cache::CacheState;
use crate::state::AppState;

/// Matches listed in the picker; the search box narrows larger sets.
const MAX_LISTED_MATCHES: usize = 200;

// ---------------------------------------------------------------------------
// Left side panel – query widgets
// ---------------------------------------------------------------------------

/// Render the left query panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Query");
    ui.separator();

    let Some(dataset) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Search boxes ----
            ui.strong("Stock code");
            let code_changed = ui
                .add(
                    egui::TextEdit::singleline(&mut state.code_search)
                        .hint_text("e.g. 600000"),
                )
                .changed();

            ui.strong("Company name");
            let name_changed = ui
                .add(
                    egui::TextEdit::singleline(&mut state.name_search)
                        .hint_text("part of the company name"),
                )
                .changed();

            if code_changed || name_changed {
                state.apply_search();
            }

            ui.label(format!("{} matching companies", state.matches.len()));

            // ---- Match picker ----
            let current = state
                .selection
                .as_ref()
                .map(|s| s.stock_code.clone())
                .unwrap_or_default();
            let mut picked = None;
            egui::ComboBox::from_id_salt("stock_picker")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for code in state.matches.iter().take(MAX_LISTED_MATCHES) {
                        let label = format!("{code}  {}", dataset.company_name(code));
                        if ui.selectable_label(*code == current, label).clicked() {
                            picked = Some(code.clone());
                        }
                    }
                });
            if let Some(code) = picked {
                state.select_stock(code);
            }

            ui.separator();
            if let Some(sel) = &state.selection {
                ui.label(
                    RichText::new(format!(
                        "Selected: {} ({})",
                        sel.stock_code,
                        dataset.company_name(&sel.stock_code)
                    ))
                    .strong(),
                );
            }

            // ---- Year selector ----
            ui.add_space(4.0);
            ui.strong("Year");
            let current_year = state.selection.as_ref().map(|s| s.year);
            let mut picked_year = None;
            egui::ComboBox::from_id_salt("year_picker")
                .selected_text(current_year.map(|y| y.to_string()).unwrap_or_default())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &dataset.years {
                        if ui
                            .selectable_label(current_year == Some(year), year.to_string())
                            .clicked()
                        {
                            picked_year = Some(year);
                        }
                    }
                });
            if let Some(year) = picked_year {
                state.select_year(year);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui
                .add_enabled(state.can_open_file(), egui::Button::new("Open…"))
                .clicked()
            {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        match (state.cache.state(), state.dataset()) {
            (CacheState::Ready, Some(ds)) => {
                ui.label(format!(
                    "{} records, {} companies  ·  {}",
                    ds.len(),
                    ds.stock_codes.len(),
                    state.cache.path().display()
                ));
            }
            (CacheState::Failed, _) => {
                ui.label(format!("Could not load {}", state.cache.path().display()));
            }
            _ => {
                ui.label("No data");
            }
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
        .set_title("Open index data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(path);
    }
}
