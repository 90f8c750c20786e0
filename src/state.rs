use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::cache::DatasetCache;
use crate::data::classify::{interval_counts, level_counts, IndexInterval, Level};
use crate::data::error::QueryError;
use crate::data::model::{Dataset, Record};
use crate::data::query::{
    current_rank, default_selection, filter, rank_history, resolve_stock, search_stocks, top_k,
    RankInfo, Selection, YearRank,
};
use crate::data::stats::{
    box_stats_by_year, describe, histogram, mean_by_year, overview, scatter_points, top_entities,
    BoxStats, EntityMean, HistogramBin, Overview, Summary,
};

// ---------------------------------------------------------------------------
// Cached engine outputs
// ---------------------------------------------------------------------------

/// Figures that depend only on the dataset. Computed once after load.
#[derive(Debug, Clone)]
pub struct DatasetView {
    pub overview: Option<Overview>,
    pub summary: Option<Summary>,
    pub histogram: Vec<HistogramBin>,
    pub mean_by_year: BTreeMap<i64, f64>,
    pub level_counts: Vec<(Level, usize)>,
    pub interval_counts: Vec<(IndexInterval, usize)>,
    pub scatter: Vec<[f64; 2]>,
    pub boxes: BTreeMap<i64, BoxStats>,
    pub top_entities: Vec<EntityMean>,
}

impl DatasetView {
    pub fn compute(dataset: &Dataset, config: &AppConfig) -> Self {
        let values = dataset.dt_values();
        Self {
            overview: overview(dataset),
            summary: describe(&values),
            histogram: histogram(&values, config.histogram_bins),
            mean_by_year: mean_by_year(dataset),
            level_counts: level_counts(dataset),
            interval_counts: interval_counts(dataset),
            scatter: scatter_points(dataset),
            boxes: box_stats_by_year(dataset),
            top_entities: top_entities(dataset, config.top_entities),
        }
    }
}

/// Figures for the selected company and year.
#[derive(Debug, Clone)]
pub struct SelectionView {
    pub stock_code: String,
    pub company_name: String,
    pub year: i64,
    /// Every row matching the selection.
    pub records: Vec<Record>,
    /// Index of the first matching row; `None` when nothing matched.
    pub dt_index: Option<f64>,
    pub top: Vec<(usize, Record)>,
    pub history: Vec<YearRank>,
    pub rank: Option<Result<RankInfo, QueryError>>,
}

impl SelectionView {
    pub fn compute(dataset: &Dataset, selection: &Selection, config: &AppConfig) -> Self {
        let records: Vec<Record> = filter(dataset, &selection.stock_code, selection.year)
            .into_iter()
            .cloned()
            .collect();
        let dt_index = records.first().map(|r| r.dt_index);

        // The rankings are only shown next to a matched record.
        let (top, history, rank) = match dt_index {
            Some(score) => (
                top_k(dataset, selection.year, config.top_k)
                    .into_iter()
                    .map(|r| (r.rank, r.record.clone()))
                    .collect(),
                rank_history(dataset, &selection.stock_code),
                Some(current_rank(dataset, selection.year, score)),
            ),
            None => (Vec::new(), Vec::new(), None),
        };

        Self {
            company_name: records
                .first()
                .map(|r| r.company_name.clone())
                .unwrap_or_else(|| dataset.company_name(&selection.stock_code).to_string()),
            stock_code: selection.stock_code.clone(),
            year: selection.year,
            records,
            dt_index,
            top,
            history,
            rank,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Single-load holder of the dataset.
    pub cache: DatasetCache,

    /// Sidebar search inputs.
    pub code_search: String,
    pub name_search: String,

    /// Stock codes matching the search inputs.
    pub matches: Vec<String>,

    /// Resolved company and year; `None` while no data is loaded.
    pub selection: Option<Selection>,

    pub dataset_view: Option<DatasetView>,
    pub selection_view: Option<SelectionView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            cache: DatasetCache::new(config.data_path.clone()),
            code_search: config.default_stock.clone(),
            name_search: String::new(),
            matches: Vec::new(),
            selection: None,
            dataset_view: None,
            selection_view: None,
            status_message: None,
            config,
        }
    }

    /// The loaded dataset, if any.
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.cache.dataset().cloned()
    }

    /// The dataset is read once per session; another file may be opened
    /// only while nothing usable is loaded.
    pub fn can_open_file(&self) -> bool {
        match self.cache.dataset() {
            Some(ds) => ds.is_empty(),
            None => true,
        }
    }

    /// Load the configured file (once) and build the views.
    pub fn load(&mut self) {
        match self.cache.get_or_load() {
            Ok(dataset) => {
                if dataset.is_empty() {
                    self.status_message = Some("The file contains no records".to_string());
                } else if dataset.skipped_rows > 0 {
                    self.status_message = Some(format!(
                        "{} rows without stock code or year were skipped",
                        dataset.skipped_rows
                    ));
                } else {
                    self.status_message = None;
                }
                self.set_dataset(&dataset);
            }
            Err(e) => {
                self.status_message = Some(format!("Error loading data: {e}"));
            }
        }
    }

    /// Replace a failed or missing load with another file.
    pub fn load_path(&mut self, path: PathBuf) {
        self.cache = DatasetCache::new(path);
        self.dataset_view = None;
        self.selection_view = None;
        self.selection = None;
        self.load();
    }

    fn set_dataset(&mut self, dataset: &Dataset) {
        self.dataset_view = Some(DatasetView::compute(dataset, &self.config));
        self.selection = default_selection(
            dataset,
            &self.config.default_stock,
            self.config.default_year,
        );
        self.apply_search();
    }

    /// Re-run the search boxes and select the first match (or the
    /// default stock when nothing matches).
    pub fn apply_search(&mut self) {
        let Some(dataset) = self.dataset() else {
            return;
        };
        self.matches = search_stocks(&dataset, &self.code_search, &self.name_search);
        let fallback = default_selection(
            &dataset,
            &self.config.default_stock,
            self.config.default_year,
        );
        if let (Some(selection), Some(fallback)) = (self.selection.as_mut(), fallback) {
            selection.stock_code = resolve_stock(&self.matches, &fallback.stock_code);
        }
        self.refresh();
    }

    pub fn select_stock(&mut self, stock_code: String) {
        if let Some(selection) = self.selection.as_mut() {
            selection.stock_code = stock_code;
        }
        self.refresh();
    }

    pub fn select_year(&mut self, year: i64) {
        if let Some(selection) = self.selection.as_mut() {
            selection.year = year;
        }
        self.refresh();
    }

    /// Recompute the selection view after an input change.
    pub fn refresh(&mut self) {
        let (Some(dataset), Some(selection)) = (self.dataset(), self.selection.as_ref()) else {
            self.selection_view = None;
            return;
        };
        log::debug!(
            "Recomputing view for {} / {}",
            selection.stock_code,
            selection.year
        );
        self.selection_view = Some(SelectionView::compute(&dataset, selection, &self.config));
    }
}
