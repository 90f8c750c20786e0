use std::collections::BTreeMap;
use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points, Polygon,
};

use crate::color::LevelColors;
use crate::data::classify::{IndexInterval, Level};
use crate::data::stats::{BoxStats, EntityMean, HistogramBin};

const CHART_HEIGHT: f32 = 280.0;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

fn placeholder(ui: &mut Ui) {
    ui.label("No data to plot.");
}

// ---------------------------------------------------------------------------
// Distribution charts
// ---------------------------------------------------------------------------

/// Histogram of the whole index column.
pub fn histogram_chart(ui: &mut Ui, bins: &[HistogramBin]) {
    if bins.is_empty() {
        return placeholder(ui);
    }
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width())
                .name(format!("{:.1} – {:.1}", b.start, b.end))
        })
        .collect();

    Plot::new("histogram_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Index value")
        .y_axis_label("Companies")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("count"));
        });
}

/// Companies per equal-width interval of the 0–100 range.
pub fn interval_chart(ui: &mut Ui, counts: &[(IndexInterval, usize)]) {
    if counts.iter().all(|(_, n)| *n == 0) {
        return placeholder(ui);
    }
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (interval, n))| {
            Bar::new(i as f64, *n as f64)
                .width(0.8)
                .name(interval.label())
        })
        .collect();
    let labels: Vec<&'static str> = counts.iter().map(|(i, _)| i.label()).collect();

    Plot::new("interval_chart")
        .height(CHART_HEIGHT)
        .y_axis_label("Records")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("records"));
        });
}

/// Axis label for an integer category position, empty between categories.
fn category_label(labels: &[&str], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels
        .get(value as usize)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Share of records per maturity band.
pub fn level_pie(ui: &mut Ui, counts: &[(Level, usize)], colors: &LevelColors) {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return placeholder(ui);
    }

    Plot::new("level_pie")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (level, wedges) in pie_wedges(counts) {
                let share = counts
                    .iter()
                    .find(|(l, _)| *l == level)
                    .map(|(_, n)| *n as f64 / total as f64 * 100.0)
                    .unwrap_or_default();
                let name = format!("{} – {share:.1}%", level.label());
                for wedge in wedges {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .fill_color(colors.color_for(level))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&name),
                    );
                }
            }
        });
}

/// Largest angle drawn as one polygon. The plot fills polygons as convex
/// shapes, so a slice is split into narrow wedges.
const MAX_WEDGE: f64 = TAU / 16.0;
const ARC_STEP: f64 = TAU / 180.0;

/// Unit-circle wedges for each slice, clockwise from twelve o'clock.
fn pie_wedges(counts: &[(Level, usize)]) -> Vec<(Level, Vec<Vec<[f64; 2]>>)> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut start = 0.0;
    counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(level, n)| {
            let sweep = *n as f64 / total as f64 * TAU;
            let pieces = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            let piece = sweep / pieces as f64;
            let wedges = (0..pieces)
                .map(|p| {
                    let a0 = start + piece * p as f64;
                    let steps = (piece / ARC_STEP).ceil().max(1.0) as usize;
                    let mut points = vec![[0.0, 0.0]];
                    points.extend((0..=steps).map(|s| {
                        let a = a0 + piece * s as f64 / steps as f64;
                        [a.sin(), a.cos()]
                    }));
                    points
                })
                .collect();
            start += sweep;
            (*level, wedges)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trend and relationship charts
// ---------------------------------------------------------------------------

/// Mean index per year with markers.
pub fn mean_line(ui: &mut Ui, means: &BTreeMap<i64, f64>) {
    let points: Vec<[f64; 2]> = means
        .iter()
        .filter(|(_, m)| !m.is_nan())
        .map(|(y, m)| [*y as f64, *m])
        .collect();
    if points.is_empty() {
        return placeholder(ui);
    }

    Plot::new("mean_line")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Mean DT index")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("mean")
                    .color(BAR_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(3.5)
                    .color(BAR_COLOR)
                    .name("mean"),
            );
        });
}

/// Technology dimension against application dimension.
pub fn dimension_scatter(ui: &mut Ui, points: &[[f64; 2]]) {
    if points.is_empty() {
        return placeholder(ui);
    }
    Plot::new("dimension_scatter")
        .height(CHART_HEIGHT)
        .x_axis_label("Technology dimension")
        .y_axis_label("Application dimension")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points.to_vec()))
                    .radius(1.5)
                    .color(BAR_COLOR)
                    .name("records"),
            );
        });
}

/// One box per year.
pub fn year_boxes(ui: &mut Ui, boxes: &BTreeMap<i64, BoxStats>) {
    if boxes.is_empty() {
        return placeholder(ui);
    }
    let elems: Vec<BoxElem> = boxes
        .iter()
        .map(|(year, b)| {
            BoxElem::new(
                *year as f64,
                BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
            )
            .name(year.to_string())
            .box_width(0.6)
        })
        .collect();

    Plot::new("year_boxes")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("DT index")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).color(BAR_COLOR).name("DT index"));
        });
}

/// Companies with the highest mean index across all years.
pub fn top_entities_chart(ui: &mut Ui, entities: &[EntityMean]) {
    if entities.is_empty() {
        return placeholder(ui);
    }
    let bars: Vec<Bar> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new(i as f64, e.mean)
                .width(0.7)
                .name(format!("{} {}", e.stock_code, e.company_name))
        })
        .collect();
    let labels: Vec<String> = entities.iter().map(|e| e.stock_code.clone()).collect();

    Plot::new("top_entities_chart")
        .height(CHART_HEIGHT)
        .y_axis_label("Mean DT index")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            category_label(&refs, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("mean"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedges_cover_the_full_circle() {
        let counts = [(Level::Good, 3), (Level::Leading, 1), (Level::Starting, 0)];
        let wedges = pie_wedges(&counts);

        assert_eq!(wedges.len(), 2);
        assert_eq!(wedges[0].0, Level::Good);

        // The last point of the last wedge closes the circle at twelve o'clock.
        let last = wedges[1].1.last().and_then(|w| w.last()).copied().unwrap();
        assert!(last[0].abs() < 1e-9);
        assert!((last[1] - 1.0).abs() < 1e-9);

        for (_, pieces) in &wedges {
            for wedge in pieces {
                assert_eq!(wedge[0], [0.0, 0.0]);
                assert!(wedge.len() >= 3);
            }
        }
    }

    #[test]
    fn category_labels_only_on_integer_positions() {
        let labels = ["a", "b"];
        assert_eq!(category_label(&labels, 1.0), "b");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }
}
