use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::LevelColors;
use crate::data::query::RankInfo;
use crate::state::{AppState, DatasetView, SelectionView};
use crate::ui::{charts, panels, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DtExplorerApp {
    pub state: AppState,
    level_colors: LevelColors,
}

impl DtExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            level_colors: LevelColors::default(),
        }
    }
}

impl eframe::App for DtExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: query ----
        egui::SidePanel::left("query_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    report(ui, &self.state, &self.level_colors);
                });
        });
    }
}

// ---------------------------------------------------------------------------
// Central report
// ---------------------------------------------------------------------------

fn report(ui: &mut Ui, state: &AppState, colors: &LevelColors) {
    ui.heading("Digital Transformation Index Explorer");

    let Some(dataset_view) = &state.dataset_view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No dataset loaded  (File → Open…)");
        });
        return;
    };
    let Some(selection) = &state.selection_view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("The loaded file contains no records  (File → Open…)");
        });
        return;
    };

    selection_section(ui, selection, dataset_view);
    ui.separator();
    distribution_section(ui, dataset_view, colors);
}

fn selection_section(ui: &mut Ui, sel: &SelectionView, ds: &DatasetView) {
    let Some(dt_index) = sel.dt_index else {
        ui.label(
            RichText::new(format!(
                "No record for {} in {}.",
                sel.stock_code, sel.year
            ))
            .color(egui::Color32::YELLOW),
        );
        return;
    };

    ui.heading(format!(
        "{} ({}) – {}",
        sel.company_name, sel.stock_code, sel.year
    ));
    tables::records_table(ui, &sel.records);
    ui.label(RichText::new(format!("DT index: {}", tables::fmt_score(dt_index))).strong());

    ui.add_space(8.0);
    ui.heading("Rankings");
    ui.columns(2, |cols| {
        cols[0].strong(format!("Top {} in {}", sel.top.len(), sel.year));
        tables::top_table(&mut cols[0], &sel.top);

        cols[1].strong("Rank by year (records scoring at least as high)");
        tables::history_table(&mut cols[1], &sel.history);
    });

    ui.add_space(8.0);
    ui.heading("Overview");
    ui.columns(2, |cols| {
        let ui = &mut cols[0];
        ui.strong("Dataset");
        match &ds.overview {
            Some(ov) => {
                ui.label(format!("Records: {}", ov.records));
                ui.label(format!("Companies: {}", ov.companies));
                ui.label(format!("Years: {} – {}", ov.first_year, ov.last_year));
                ui.label(format!("Span: {} years", ov.span_years()));
            }
            None => {
                ui.label("Empty dataset.");
            }
        }

        let ui = &mut cols[1];
        ui.strong("Selected company");
        ui.label(format!("Company: {}", sel.company_name));
        ui.label(format!("Stock code: {}", sel.stock_code));
        ui.label(format!("Year: {}", sel.year));
        ui.label(format!("DT index: {}", tables::fmt_score(dt_index)));
        match &sel.rank {
            Some(Ok(RankInfo {
                rank,
                total,
                percentile,
            })) => {
                ui.label(format!("Rank in year: {rank}/{total}"));
                ui.label(format!("Percentile: {percentile:.1}%"));
            }
            Some(Err(e)) => {
                ui.label(format!("Rank in year: N/A ({e})"));
                ui.label("Percentile: N/A");
            }
            None => {
                ui.label("Rank in year: N/A");
            }
        }
    });
}

fn distribution_section(ui: &mut Ui, ds: &DatasetView, colors: &LevelColors) {
    ui.heading("Index distribution");
    ui.strong("Histogram of all records");
    charts::histogram_chart(ui, &ds.histogram);
    ui.strong("Mean index by year");
    charts::mean_line(ui, &ds.mean_by_year);

    ui.add_space(8.0);
    ui.heading("Index statistics");
    ui.columns(2, |cols| {
        cols[0].strong("Overall statistics");
        match &ds.summary {
            Some(summary) => tables::summary_table(&mut cols[0], summary),
            None => {
                cols[0].label("No index values.");
            }
        }
        cols[1].strong("Maturity levels");
        charts::level_pie(&mut cols[1], &ds.level_counts, colors);
    });

    ui.strong("Records per index interval");
    charts::interval_chart(ui, &ds.interval_counts);
    ui.strong("Technology vs. application dimension");
    charts::dimension_scatter(ui, &ds.scatter);
    ui.strong("Index by year");
    charts::year_boxes(ui, &ds.boxes);
    ui.strong(format!("Top {} companies by mean index", ds.top_entities.len()));
    charts::top_entities_chart(ui, &ds.top_entities);
}
