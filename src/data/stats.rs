use std::collections::BTreeMap;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Unweighted mean of the finite values, `None` when there are none.
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Mean index per year, every year of the dataset.
pub fn mean_by_year(dataset: &Dataset) -> BTreeMap<i64, f64> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for rec in &dataset.records {
        groups.entry(rec.year).or_default().push(rec.dt_index);
    }
    groups
        .into_iter()
        .map(|(year, values)| (year, mean(values).unwrap_or(f64::NAN)))
        .collect()
}

/// Mean index per company across all its years.
pub fn mean_by_entity(dataset: &Dataset) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in &dataset.records {
        groups.entry(rec.stock_code.as_str()).or_default().push(rec.dt_index);
    }
    groups
        .into_iter()
        .map(|(code, values)| (code.to_string(), mean(values).unwrap_or(f64::NAN)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityMean {
    pub stock_code: String,
    pub company_name: String,
    pub mean: f64,
}

/// The `n` companies with the highest mean index, highest first.
/// Ties are ordered by stock code; companies without any score are left out.
pub fn top_entities(dataset: &Dataset, n: usize) -> Vec<EntityMean> {
    let mut means: Vec<(String, f64)> = mean_by_entity(dataset)
        .into_iter()
        .filter(|(_, m)| !m.is_nan())
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
        .into_iter()
        .take(n)
        .map(|(stock_code, mean)| EntityMean {
            company_name: dataset.company_name(&stock_code).to_string(),
            stock_code,
            mean,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// `describe()`-style summary of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1); `NaN` for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Label/value rows in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Quantile of sorted values by linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Summary of the finite values; `None` when nothing is left.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let sorted = sorted_finite(values);
    let count = sorted.len();
    if count == 0 {
        return None;
    }
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    Some(Summary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

// ---------------------------------------------------------------------------
// Chart inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// `bins` equal-width bins spanning the data range; each bin is
/// `[start, end)` except the last, which also holds the maximum.
/// A constant series gets a single unit-wide bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_finite(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if max == min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in sorted {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Box-and-whisker figures; whiskers reach the furthest data point within
/// 1.5 IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return None;
    }
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|v| *v >= lo_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= hi_fence)
        .unwrap_or(q3);
    Some(BoxStats {
        lower_whisker,
        q1,
        median: quantile(&sorted, 0.5),
        q3,
        upper_whisker,
    })
}

/// One box per year that has at least one score.
pub fn box_stats_by_year(dataset: &Dataset) -> BTreeMap<i64, BoxStats> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for rec in &dataset.records {
        groups.entry(rec.year).or_default().push(rec.dt_index);
    }
    groups
        .into_iter()
        .filter_map(|(year, values)| Some((year, box_stats(&values)?)))
        .collect()
}

/// (technology, application) pairs; rows missing either are skipped.
pub fn scatter_points(dataset: &Dataset) -> Vec<[f64; 2]> {
    dataset
        .records
        .iter()
        .filter(|r| r.tech_dimension.is_finite() && r.application_dimension.is_finite())
        .map(|r| [r.tech_dimension, r.application_dimension])
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub records: usize,
    pub companies: usize,
    pub first_year: i64,
    pub last_year: i64,
}

impl Overview {
    /// Inclusive number of calendar years covered.
    pub fn span_years(&self) -> i64 {
        self.last_year - self.first_year + 1
    }
}

pub fn overview(dataset: &Dataset) -> Option<Overview> {
    Some(Overview {
        records: dataset.len(),
        companies: dataset.stock_codes.len(),
        first_year: *dataset.years.first()?,
        last_year: *dataset.years.last()?,
    })
}
