use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{LoadError, SchemaError};
use super::model::{CellValue, Dataset, Field, Record, UNKNOWN_COMPANY};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an index table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "stock_code": "600000", "year": 2019, ... }, ...]`
/// * `.parquet` – flat columns, one row per record
///
/// Reading has no side effects, so loading the same file twice yields
/// equal datasets.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    std::fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    table.into_dataset()
}

// ---------------------------------------------------------------------------
// RawTable – header + untyped cells, common to all readers
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Index of the column holding `field`, trying each accepted header.
    fn column_of(&self, field: Field) -> Result<usize, SchemaError> {
        field
            .headers()
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h.trim() == *name))
            .ok_or_else(|| SchemaError::MissingColumn {
                field,
                accepted: field.headers().join(", "),
            })
    }

    /// Coerce the raw cells into records. Rows whose stock code or year
    /// cannot be read are skipped and counted; a table where no row is
    /// readable is malformed.
    pub(crate) fn into_dataset(self) -> Result<Dataset, LoadError> {
        let mut columns = [0usize; 6];
        for (slot, field) in columns.iter_mut().zip(Field::ALL) {
            *slot = self.column_of(field)?;
        }
        let [code_idx, name_idx, year_idx, dt_idx, tech_idx, app_idx] = columns;

        let null = CellValue::Null;
        let mut records = Vec::with_capacity(self.rows.len());
        let mut skipped = 0usize;

        for (row_no, row) in self.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).unwrap_or(&null);

            let (Some(stock_code), Some(year)) = (cell(code_idx).as_code(), cell(year_idx).as_i64())
            else {
                log::debug!("Skipping row {row_no}: unreadable stock code or year");
                skipped += 1;
                continue;
            };

            records.push(Record {
                stock_code,
                company_name: cell(name_idx)
                    .as_text()
                    .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
                year,
                dt_index: cell(dt_idx).as_f64().unwrap_or(f64::NAN),
                tech_dimension: cell(tech_idx).as_f64().unwrap_or(f64::NAN),
                application_dimension: cell(app_idx).as_f64().unwrap_or(f64::NAN),
            });
        }

        if records.is_empty() && skipped > 0 {
            return Err(LoadError::Malformed(format!(
                "none of the {skipped} rows has a readable stock code and year"
            )));
        }
        if skipped > 0 {
            log::warn!("Skipped {skipped} rows without a readable stock code or year");
        }

        let mut dataset = Dataset::from_records(records);
        dataset.skipped_rows = skipped;
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

/// Reads the first worksheet; the first row holds the headers.
fn read_spreadsheet(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::Empty)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or(LoadError::Empty)?
        .iter()
        .map(|c| spreadsheet_cell(c).as_text().unwrap_or_default())
        .collect();

    Ok(RawTable {
        headers,
        rows: rows.map(|r| r.iter().map(spreadsheet_cell).collect()).collect(),
    })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) | Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Cells are kept as text so stock codes such as `000001` survive;
/// numeric columns are parsed during coercion.
fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(value.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "stock_code": "600000", "company_name": "...", "year": 2019,
///     "dt_index": 41.2, "tech_dimension": 38.0, "application_dimension": 44.1 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".into()))?;

    // Column order follows first appearance across all objects.
    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat Parquet file as written by **Pandas** (`df.to_parquet()`),
/// **Polars** or the bundled `generate_sample` tool.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| normalize_column(col, name))
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Cast a column to one of `Int64`, `Float64`, `Boolean` or `Utf8`.
///
/// Narrow and unsigned integers widen to `Int64`, every float and decimal
/// type to `Float64`; string views, dictionaries (pandas categoricals),
/// dates and anything else castable become text.
fn normalize_column(col: &ArrayRef, name: &str) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Int64
        | DataType::Float64
        | DataType::Boolean
        | DataType::Utf8
        | DataType::Null => return Ok(col.clone()),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16
        | DataType::Float32
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => DataType::Float64,
        _ => DataType::Utf8,
    };
    cast(col, &target).map_err(|e| {
        LoadError::Malformed(format!(
            "column '{name}' of type {} cannot be read as {target}: {e}",
            col.data_type()
        ))
    })
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{
        DictionaryArray, Float32Array, Float64Array, Int16Array, Int64Array, StringArray,
        StringViewArray, UInt8Array,
    };
    use arrow::datatypes::{Field as ArrowField, Int32Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::Workbook;

    use crate::data::stats::mean_by_entity;

    const CSV: &str = "\
股票代码,企业名称,年份,数字化转型指数,技术维度,应用维度
000001,Ping An Bank,2019,81.5,70.0,90.0
000001,Ping An Bank,2020,85.0,72.5,91.0
600000,,2019,42.0,40.0,44.0
,Orphan,2019,10.0,1.0,2.0
";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_is_normalised_into_records() {
        let file = write_temp(".csv", CSV);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.records[0].stock_code, "000001");
        assert_eq!(ds.records[2].company_name, UNKNOWN_COMPANY);
        assert_eq!(ds.years, vec![2019, 2020]);
        assert_eq!(ds.stock_codes, vec!["000001".to_string(), "600000".to_string()]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let file = write_temp(".csv", "stock_code,year\n600000,2019\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MissingColumn {
                field: Field::CompanyName,
                ..
            })
        ));
    }

    #[test]
    fn json_records_with_english_headers() {
        let json = r#"[
            {"stock_code": 600000, "company_name": "SPD Bank", "year": 2019.0,
             "dt_index": 55.5, "tech_dimension": 50, "application_dimension": null},
            {"stock_code": "000002", "company_name": null, "year": 2020,
             "dt_index": null, "tech_dimension": 1.5, "application_dimension": 2.5}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].stock_code, "600000");
        assert_eq!(ds.records[0].year, 2019);
        assert!(ds.records[0].application_dimension.is_nan());
        assert_eq!(ds.records[1].company_name, UNKNOWN_COMPANY);
        assert!(ds.records[1].dt_index.is_nan());
    }

    #[test]
    fn missing_file_and_unknown_extension_fail() {
        let err = load_file(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));

        let file = write_temp(".txt", "hello");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "txt"));
    }

    #[test]
    fn reloading_is_deterministic() {
        let file = write_temp(".csv", CSV);
        let first = load_file(file.path()).unwrap();
        let second = load_file(file.path()).unwrap();

        assert_eq!(first.records, second.records);
        assert_eq!(mean_by_entity(&first), mean_by_entity(&second));
    }

    #[test]
    fn raw_table_rows_shorter_than_header_read_as_null() {
        let table = RawTable {
            headers: Field::ALL.iter().map(|f| f.to_string()).collect(),
            rows: vec![vec![
                CellValue::String("600000".into()),
                CellValue::String("SPD Bank".into()),
                CellValue::Integer(2021),
            ]],
        };
        let ds = table.into_dataset().unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.records[0].dt_index.is_nan());
    }

    #[test]
    fn table_without_any_readable_key_is_malformed() {
        let file = write_temp(
            ".csv",
            "stock_code,company_name,year,dt_index,tech_dimension,application_dimension\n\
             ,A,2019,1,1,1\n600000,B,nineteen,2,2,2\n",
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));

        let header_only = write_temp(
            ".csv",
            "stock_code,company_name,year,dt_index,tech_dimension,application_dimension\n",
        );
        let ds = load_file(header_only.path()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.skipped_rows, 0);
    }

    // -- Parquet --------------------------------------------------------------

    fn write_parquet(batch: RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_round_trip_keeps_codes_and_years() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("stock_code", DataType::Utf8, false),
            ArrowField::new("company_name", DataType::Utf8, true),
            ArrowField::new("year", DataType::Int64, false),
            ArrowField::new("dt_index", DataType::Float64, true),
            ArrowField::new("tech_dimension", DataType::Float64, true),
            ArrowField::new("application_dimension", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["000001", "600000"])),
                Arc::new(StringArray::from(vec![Some("Ping An Bank"), None])),
                Arc::new(Int64Array::from(vec![2019, 2020])),
                Arc::new(Float64Array::from(vec![Some(81.5), None])),
                Arc::new(Float64Array::from(vec![70.0, 40.0])),
                Arc::new(Float64Array::from(vec![90.0, 44.0])),
            ],
        )
        .unwrap();
        let file = write_parquet(batch);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 0);
        assert_eq!(ds.stock_codes, vec!["000001".to_string(), "600000".to_string()]);
        assert_eq!(ds.years, vec![2019, 2020]);
        assert_eq!(ds.records[0].dt_index, 81.5);
        assert!(ds.records[1].dt_index.is_nan());
        assert_eq!(ds.records[1].company_name, UNKNOWN_COMPANY);
    }

    #[test]
    fn parquet_with_narrow_ints_string_views_and_dictionaries() {
        let dictionary =
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("股票代码", DataType::Utf8View, false),
            ArrowField::new("企业名称", dictionary, false),
            ArrowField::new("年份", DataType::Int16, false),
            ArrowField::new("数字化转型指数", DataType::Float32, false),
            ArrowField::new("技术维度", DataType::UInt8, false),
            ArrowField::new("应用维度", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringViewArray::from(vec!["000002", "600519"])),
                Arc::new(
                    ["Vanke", "Moutai"]
                        .into_iter()
                        .collect::<DictionaryArray<Int32Type>>(),
                ),
                Arc::new(Int16Array::from(vec![2021, 2022])),
                Arc::new(Float32Array::from(vec![55.5, 62.25])),
                Arc::new(UInt8Array::from(vec![50, 60])),
                Arc::new(Float64Array::from(vec![61.0, 64.5])),
            ],
        )
        .unwrap();
        let file = write_parquet(batch);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 0);
        assert_eq!(ds.records[0].stock_code, "000002");
        assert_eq!(ds.records[1].company_name, "Moutai");
        assert_eq!(ds.years, vec![2021, 2022]);
        assert_eq!(ds.records[1].dt_index, 62.25);
        assert_eq!(ds.records[0].tech_dimension, 50.0);
    }

    #[test]
    fn columns_are_normalized_to_readable_types() {
        let narrow: ArrayRef = Arc::new(Int16Array::from(vec![Some(2019), None]));
        let col = normalize_column(&narrow, "year").unwrap();
        assert_eq!(col.data_type(), &DataType::Int64);
        assert_eq!(arrow_cell(&col, 0), CellValue::Integer(2019));
        assert_eq!(arrow_cell(&col, 1), CellValue::Null);

        let view: ArrayRef = Arc::new(StringViewArray::from(vec!["000001"]));
        let col = normalize_column(&view, "stock_code").unwrap();
        assert_eq!(col.data_type(), &DataType::Utf8);
        assert_eq!(arrow_cell(&col, 0), CellValue::String("000001".into()));

        let floats: ArrayRef = Arc::new(Float32Array::from(vec![1.5]));
        let col = normalize_column(&floats, "dt_index").unwrap();
        assert_eq!(arrow_cell(&col, 0), CellValue::Float(1.5));
    }

    // -- Spreadsheets ---------------------------------------------------------

    fn write_xlsx(headers: &[&str], rows: &[(f64, &str, f64, f64)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (i, (code, name, year, score)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, *code).unwrap();
            sheet.write_string(row, 1, *name).unwrap();
            sheet.write_number(row, 2, *year).unwrap();
            for col in 3..headers.len() {
                sheet.write_number(row, col as u16, *score).unwrap();
            }
        }
        workbook.save(dir.path().join("index.xlsx")).unwrap();
        dir
    }

    #[test]
    fn xlsx_numeric_codes_and_years_are_normalised() {
        let headers = ["股票代码", "企业名称", "年份", "数字化转型指数", "技术维度", "应用维度"];
        let dir = write_xlsx(
            &headers,
            &[(600000.0, "SPD Bank", 2019.0, 42.5), (1.0, "Ping An Bank", 2020.0, 81.0)],
        );

        let ds = load_file(&dir.path().join("index.xlsx")).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].stock_code, "600000");
        assert_eq!(ds.records[0].year, 2019);
        assert_eq!(ds.records[0].company_name, "SPD Bank");
        assert_eq!(ds.records[0].dt_index, 42.5);
        assert_eq!(ds.records[1].stock_code, "1");
        assert_eq!(ds.years, vec![2019, 2020]);
    }

    #[test]
    fn xlsx_missing_column_is_a_schema_error() {
        let headers = ["股票代码", "企业名称", "年份", "数字化转型指数", "技术维度"];
        let dir = write_xlsx(&headers, &[(600000.0, "SPD Bank", 2019.0, 42.5)]);

        let err = load_file(&dir.path().join("index.xlsx")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MissingColumn {
                field: Field::ApplicationDimension,
                ..
            })
        ));
    }
}
