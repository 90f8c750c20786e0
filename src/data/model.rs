use std::collections::{BTreeMap, BTreeSet};
use std::fmt;


/// Name shown for a company whose name is missing from the source table.
pub const UNKNOWN_COMPANY: &str = "Unknown company";

// ---------------------------------------------------------------------------
// CellValue – a single raw cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the file readers, before the
/// columns are coerced into a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a finite number. Text is parsed; empty,
    /// unparsable or infinite cells yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Null => None,
        }
        .filter(|v| v.is_finite())
    }

    /// Interpret the cell as a whole number (years are often stored as floats).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && v.fract() == 0.0)
                        .map(|v| v as i64)
                })
            }
            _ => None,
        }
    }

    /// Normalised text form used for identifiers such as stock codes.
    /// Text keeps its leading zeros; integral floats lose the `.0`.
    pub fn as_code(&self) -> Option<String> {
        match self {
            CellValue::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Float(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }

    /// Non-empty text form, used for names.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            CellValue::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one (company, year) observation
// ---------------------------------------------------------------------------

/// One row of the index table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub stock_code: String,
    pub company_name: String,
    pub year: i64,
    /// Digital transformation index. `NaN` when the source cell was empty.
    pub dt_index: f64,
    pub tech_dimension: f64,
    pub application_dimension: f64,
}

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// The six columns every source table must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StockCode,
    CompanyName,
    Year,
    DtIndex,
    TechDimension,
    ApplicationDimension,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::StockCode,
        Field::CompanyName,
        Field::Year,
        Field::DtIndex,
        Field::TechDimension,
        Field::ApplicationDimension,
    ];

    /// Header names accepted for this field: the source workbook's header
    /// first, then the English alias written by `generate_sample`.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Field::StockCode => &["股票代码", "stock_code"],
            Field::CompanyName => &["企业名称", "company_name"],
            Field::Year => &["年份", "year"],
            Field::DtIndex => &["数字化转型指数", "dt_index"],
            Field::TechDimension => &["技术维度", "tech_dimension"],
            Field::ApplicationDimension => &["应用维度", "application_dimension"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headers()[1])
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// How a single-record lookup resolves several rows sharing the same
/// `(stock_code, year)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The row that appears first in the source file wins.
    #[default]
    FirstInLoadOrder,
}

/// The full loaded table with pre-computed indices. Immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records in load order.
    pub records: Vec<Record>,
    /// Sorted distinct stock codes.
    pub stock_codes: Vec<String>,
    /// Sorted distinct years.
    pub years: Vec<i64>,
    /// Stock code → company name of its first row.
    pub names: BTreeMap<String, String>,
    /// Rows dropped during load because the key columns were unreadable.
    pub skipped_rows: usize,
    pub duplicate_policy: DuplicatePolicy,
}

impl Dataset {
    /// Build the indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut codes: BTreeSet<String> = BTreeSet::new();
        let mut years: BTreeSet<i64> = BTreeSet::new();
        let mut names: BTreeMap<String, String> = BTreeMap::new();

        for rec in &records {
            codes.insert(rec.stock_code.clone());
            years.insert(rec.year);
            names
                .entry(rec.stock_code.clone())
                .or_insert_with(|| rec.company_name.clone());
        }

        Dataset {
            records,
            stock_codes: codes.into_iter().collect(),
            years: years.into_iter().collect(),
            names,
            skipped_rows: 0,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Company name for a stock code, or [`UNKNOWN_COMPANY`].
    pub fn company_name(&self, stock_code: &str) -> &str {
        self.names
            .get(stock_code)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_COMPANY)
    }

    /// Single record for a key, resolved by [`Dataset::duplicate_policy`].
    pub fn lookup(&self, stock_code: &str, year: i64) -> Option<&Record> {
        match self.duplicate_policy {
            DuplicatePolicy::FirstInLoadOrder => self
                .records
                .iter()
                .find(|r| r.year == year && r.stock_code == stock_code),
        }
    }

    /// All records of one year, in load order.
    pub fn year_slice(&self, year: i64) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.year == year)
    }

    /// The `dt_index` column.
    pub fn dt_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.dt_index).collect()
    }
}

#[cfg(test)]
pub(crate) fn record(code: &str, year: i64, dt_index: f64) -> Record {
    Record {
        stock_code: code.to_string(),
        company_name: format!("Company {code}"),
        year,
        dt_index,
        tech_dimension: dt_index / 2.0,
        application_dimension: dt_index / 3.0,
    }
}
