use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const COMPANIES: usize = 300;
const FIRST_YEAR: i64 = 2010;
const LAST_YEAR: i64 = 2023;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Default)]
struct Columns {
    stock_code: Vec<String>,
    company_name: Vec<String>,
    year: Vec<i64>,
    dt_index: Vec<f64>,
    tech_dimension: Vec<f64>,
    application_dimension: Vec<f64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for c in 0..COMPANIES {
        // Shanghai-style and Shenzhen-style codes, the latter with leading zeros.
        let code = if c % 2 == 0 {
            format!("{:06}", 600000 + c)
        } else {
            format!("{:06}", c)
        };
        let name = format!("Sample Company {c:03}");
        let base = rng.gauss(35.0, 15.0);
        let growth = rng.gauss(2.0, 1.0);
        // Later listings: not every company covers every year.
        let listed = FIRST_YEAR + (rng.next_u64() % 6) as i64;

        for year in listed..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;
            let tech = (base + growth * t + rng.gauss(0.0, 5.0)).clamp(0.0, 100.0);
            let app = (base + growth * t + rng.gauss(0.0, 5.0)).clamp(0.0, 100.0);
            let index = (0.5 * tech + 0.5 * app + rng.gauss(0.0, 2.0)).clamp(0.0, 100.0);

            cols.stock_code.push(code.clone());
            cols.company_name.push(name.clone());
            cols.year.push(year);
            cols.dt_index.push((index * 100.0).round() / 100.0);
            cols.tech_dimension.push((tech * 100.0).round() / 100.0);
            cols.application_dimension.push((app * 100.0).round() / 100.0);
        }
    }
    cols
}

fn write_parquet(cols: &Columns, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("stock_code", DataType::Utf8, false),
        Field::new("company_name", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("dt_index", DataType::Float64, false),
        Field::new("tech_dimension", DataType::Float64, false),
        Field::new("application_dimension", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(cols.stock_code.clone())),
            Arc::new(StringArray::from(cols.company_name.clone())),
            Arc::new(Int64Array::from(cols.year.clone())),
            Arc::new(Float64Array::from(cols.dt_index.clone())),
            Arc::new(Float64Array::from(cols.tech_dimension.clone())),
            Arc::new(Float64Array::from(cols.application_dimension.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(cols: &Columns, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "stock_code",
        "company_name",
        "year",
        "dt_index",
        "tech_dimension",
        "application_dimension",
    ])?;
    for i in 0..cols.year.len() {
        writer.write_record([
            cols.stock_code[i].clone(),
            cols.company_name[i].clone(),
            cols.year[i].to_string(),
            cols.dt_index[i].to_string(),
            cols.tech_dimension[i].to_string(),
            cols.application_dimension[i].to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    let parquet_path = Path::new("sample_dt_index.parquet");
    let csv_path = Path::new("sample_dt_index.csv");
    write_parquet(&cols, parquet_path)?;
    write_csv(&cols, csv_path)?;

    println!(
        "Wrote {} records for {COMPANIES} companies ({FIRST_YEAR}-{LAST_YEAR}) to {} and {}",
        cols.year.len(),
        parquet_path.display(),
        csv_path.display()
    );
    Ok(())
}
