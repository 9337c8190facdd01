use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct Store {
    id: &'static str,
    city: &'static str,
    region: &'static str,
    lat: f64,
    lon: f64,
    /// Relative store size.
    scale: f64,
}

const STORES: [Store; 8] = [
    Store { id: "S001", city: "Seattle", region: "West", lat: 47.6062, lon: -122.3321, scale: 1.4 },
    Store { id: "S002", city: "San Francisco", region: "West", lat: 37.7749, lon: -122.4194, scale: 1.2 },
    Store { id: "S003", city: "Denver", region: "Mountain", lat: 39.7392, lon: -104.9903, scale: 0.8 },
    Store { id: "S004", city: "Chicago", region: "Midwest", lat: 41.8781, lon: -87.6298, scale: 1.1 },
    Store { id: "S005", city: "Austin", region: "South", lat: 30.2672, lon: -97.7431, scale: 0.9 },
    Store { id: "S006", city: "Atlanta", region: "South", lat: 33.7490, lon: -84.3880, scale: 0.85 },
    Store { id: "S007", city: "New York", region: "East", lat: 40.7128, lon: -74.0060, scale: 1.6 },
    Store { id: "S008", city: "Boston", region: "East", lat: 42.3601, lon: -71.0589, scale: 1.0 },
];

/// (category, average ticket, seasonal amplitude; positive peaks in winter)
const CATEGORIES: [(&str, f64, f64); 5] = [
    ("Espresso", 4.2, 0.10),
    ("Latte", 5.1, 0.20),
    ("Frappuccino", 5.9, -0.45),
    ("Tea", 3.8, 0.25),
    ("Cold Brew", 4.9, -0.35),
];

#[derive(Serialize)]
struct Row {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Store_ID")]
    store_id: &'static str,
    #[serde(rename = "City")]
    city: &'static str,
    #[serde(rename = "Region")]
    region: &'static str,
    #[serde(rename = "Drink_Category")]
    drink_category: &'static str,
    #[serde(rename = "Revenue")]
    revenue: f64,
    #[serde(rename = "Units_Sold")]
    units_sold: i64,
    #[serde(rename = "Customer_Count")]
    customer_count: i64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<(NaiveDate, Row)> {
    let mut rows = Vec::new();
    for year in 2020..=2025 {
        for month in 1..=12u32 {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            // +1 in January, -1 in July
            let season = (2.0 * std::f64::consts::PI * (month as f64 - 1.0) / 12.0).cos();
            let growth = 1.0 + 0.04 * (year - 2020) as f64;

            for store in &STORES {
                for &(category, ticket, amplitude) in &CATEGORIES {
                    let base = 900.0 * store.scale * growth * (1.0 + amplitude * season);
                    let units = (base * rng.range(0.85, 1.15)).round().max(0.0) as i64;
                    let customers = (units as f64 * rng.range(0.7, 0.9)).round() as i64;
                    let revenue = (units as f64 * ticket * rng.range(0.95, 1.05) * 100.0).round() / 100.0;
                    rows.push((
                        date,
                        Row {
                            date: date.format("%Y-%m-%d").to_string(),
                            store_id: store.id,
                            city: store.city,
                            region: store.region,
                            drink_category: category,
                            revenue,
                            units_sold: units,
                            customer_count: customers,
                            latitude: store.lat,
                            longitude: store.lon,
                        },
                    ));
                }
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[(NaiveDate, Row)]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for (_, row) in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[(NaiveDate, Row)]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let days: Vec<i32> = rows
        .iter()
        .map(|(d, _)| d.signed_duration_since(epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("Store_ID", DataType::Utf8, false),
        Field::new("City", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Drink_Category", DataType::Utf8, false),
        Field::new("Revenue", DataType::Float64, false),
        Field::new("Units_Sold", DataType::Int64, false),
        Field::new("Customer_Count", DataType::Int64, false),
        Field::new("Latitude", DataType::Float64, false),
        Field::new("Longitude", DataType::Float64, false),
    ]));

    let strings = |f: fn(&Row) -> &'static str| {
        StringArray::from(rows.iter().map(|(_, r)| f(r)).collect::<Vec<_>>())
    };

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(days)),
            Arc::new(strings(|r| r.store_id)),
            Arc::new(strings(|r| r.city)),
            Arc::new(strings(|r| r.region)),
            Arc::new(strings(|r| r.drink_category)),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.revenue))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|(_, r)| r.units_sold))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|(_, r)| r.customer_count))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.latitude))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, r)| r.longitude))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv("sample_sales.csv", &rows)?;
    write_parquet("sample_sales.parquet", &rows)?;

    let (first, last) = (rows.first(), rows.last());
    println!(
        "Wrote {} rows ({} stores, {} categories, {}–{}) to sample_sales.csv and sample_sales.parquet",
        rows.len(),
        STORES.len(),
        CATEGORIES.len(),
        first.map(|(d, _)| d.year()).unwrap_or_default(),
        last.map(|(d, _)| d.year()).unwrap_or_default(),
    );
    Ok(())
}
