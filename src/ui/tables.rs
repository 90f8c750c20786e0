use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::Record;
use crate::data::query::YearRank;
use crate::data::stats::Summary;

const ROW_HEIGHT: f32 = 18.0;

/// Plain text table; each table needs its own `id` when several share a panel.
fn text_table(ui: &mut Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), headers.len())
            .header(20.0, |mut header| {
                for h in headers {
                    header.col(|ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(ROW_HEIGHT, |mut table_row| {
                        for cell in row {
                            table_row.col(|ui| {
                                ui.label(cell.as_str());
                            });
                        }
                    });
                }
            });
    });
}

/// `NaN` renders as a dash.
pub fn fmt_score(v: f64) -> String {
    if v.is_nan() {
        "–".to_string()
    } else {
        format!("{v:.2}")
    }
}

/// All columns of the rows matching the selection.
pub fn records_table(ui: &mut Ui, records: &[Record]) {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.stock_code.clone(),
                r.company_name.clone(),
                r.year.to_string(),
                fmt_score(r.dt_index),
                fmt_score(r.tech_dimension),
                fmt_score(r.application_dimension),
            ]
        })
        .collect();
    text_table(
        ui,
        "records_table",
        &["Stock code", "Company", "Year", "DT index", "Technology", "Application"],
        &rows,
    );
}

/// Top-k ranking of the selected year.
pub fn top_table(ui: &mut Ui, top: &[(usize, Record)]) {
    let rows: Vec<Vec<String>> = top
        .iter()
        .map(|(rank, r)| {
            vec![
                rank.to_string(),
                r.stock_code.clone(),
                r.company_name.clone(),
                fmt_score(r.dt_index),
            ]
        })
        .collect();
    text_table(
        ui,
        "top_table",
        &["Rank", "Stock code", "Company", "DT index"],
        &rows,
    );
}

/// Rank of the selected company in each of its years.
pub fn history_table(ui: &mut Ui, history: &[YearRank]) {
    let rows: Vec<Vec<String>> = history
        .iter()
        .map(|h| vec![h.year.to_string(), fmt_score(h.dt_index), h.rank.to_string()])
        .collect();
    text_table(
        ui,
        "history_table",
        &["Year", "DT index", "Records ≥ score"],
        &rows,
    );
}

/// `describe()` output of the index column.
pub fn summary_table(ui: &mut Ui, summary: &Summary) {
    let rows: Vec<Vec<String>> = summary
        .rows()
        .iter()
        .map(|(label, v)| {
            let value = if *label == "count" {
                format!("{}", summary.count)
            } else {
                fmt_score(*v)
            };
            vec![label.to_string(), value]
        })
        .collect();
    text_table(ui, "summary_table", &["Statistic", "DT index"], &rows);
}
