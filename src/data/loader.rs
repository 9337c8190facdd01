use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Dataset, Record, RecordFields};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Date",
    "Store_ID",
    "City",
    "Region",
    "Drink_Category",
    "Revenue",
    "Units_Sold",
    "Customer_Count",
    "Latitude",
    "Longitude",
];

/// Fatal problems with an input file's shape or contents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    /// `row` is the 1-based data row (the header is not counted).
    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the columns in [`REQUIRED_COLUMNS`]
/// * `.json`    – `[{ "Date": "2021-01-01", "Store_ID": ..., ... }, ...]`
/// * `.parquet` – one column per field; `Date` as string or Date32
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} records from {} ({} years, {} categories, {} regions)",
        dataset.len(),
        path.display(),
        dataset.years.len(),
        dataset.categories.len(),
        dataset.regions.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Shared row shape (CSV + JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Store_ID")]
    store_id: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Drink_Category")]
    drink_category: String,
    #[serde(rename = "Revenue")]
    revenue: f64,
    #[serde(rename = "Units_Sold")]
    units_sold: u64,
    #[serde(rename = "Customer_Count")]
    customer_count: u64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

impl RawRecord {
    fn into_record(self, row: usize) -> Result<Record> {
        let date = parse_date(&self.date).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: self.date.clone(),
        })?;
        Ok(Record::new(RecordFields {
            date,
            store_id: self.store_id,
            city: self.city,
            region: self.region,
            drink_category: self.drink_category,
            revenue: self.revenue,
            units_sold: self.units_sold,
            customer_count: self.customer_count,
            latitude: self.latitude,
            longitude: self.longitude,
        }))
    }
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time of day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text (header row + records) into a dataset.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col.to_string()).into());
        }
    }
    let extra: Vec<&String> = headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()))
        .collect();
    if !extra.is_empty() {
        log::warn!("Ignoring unused CSV columns {extra:?}");
    }

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<RawRecord>().enumerate() {
        let row_no = i + 1;
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(raw.into_record(row_no)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`
/// with ISO dates):
///
/// ```json
/// [
///   { "Date": "2021-01-01", "Store_ID": "S001", "City": "Seattle", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(&text)
}

pub fn read_json(text: &str) -> Result<Dataset> {
    let rows: Vec<RawRecord> = serde_json::from_str(text).context("parsing JSON records")?;
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, raw)| raw.into_record(i + 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per record field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), as well as by `generate_sample`.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    // A file with no rows yields no batches, so check the schema up front.
    for col in REQUIRED_COLUMNS {
        if builder.schema().index_of(col).is_err() {
            return Err(LoadError::MissingColumn(col.to_string()).into());
        }
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = records.len();
        records.extend(batch_records(&batch, offset)?);
    }

    Ok(Dataset::from_records(records))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn batch_records(batch: &RecordBatch, row_offset: usize) -> Result<Vec<Record>> {
    let dates = column(batch, "Date")?;
    let store_ids = column(batch, "Store_ID")?;
    let cities = column(batch, "City")?;
    let regions = column(batch, "Region")?;
    let categories = column(batch, "Drink_Category")?;
    let revenue = column(batch, "Revenue")?;
    let units = column(batch, "Units_Sold")?;
    let customers = column(batch, "Customer_Count")?;
    let lat = column(batch, "Latitude")?;
    let lon = column(batch, "Longitude")?;

    let mut out = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let abs_row = row_offset + row + 1;
        let date = extract_date(dates, row).ok_or_else(|| LoadError::InvalidDate {
            row: abs_row,
            value: extract_string(dates, row).unwrap_or_default(),
        })?;
        let field = |name: &str| format!("Row {abs_row}: failed to read '{name}'");

        out.push(Record::new(RecordFields {
            date,
            store_id: extract_string(store_ids, row).with_context(|| field("Store_ID"))?,
            city: extract_string(cities, row).with_context(|| field("City"))?,
            region: extract_string(regions, row).with_context(|| field("Region"))?,
            drink_category: extract_string(categories, row)
                .with_context(|| field("Drink_Category"))?,
            revenue: extract_f64(revenue, row).with_context(|| field("Revenue"))?,
            units_sold: extract_count(units, row).with_context(|| field("Units_Sold"))?,
            customer_count: extract_count(customers, row)
                .with_context(|| field("Customer_Count"))?,
            latitude: extract_f64(lat, row).with_context(|| field("Latitude"))?,
            longitude: extract_f64(lon, row).with_context(|| field("Longitude"))?,
        }));
    }
    Ok(out)
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 | DataType::Int64 => extract_i64(col, row).map(|v| v.to_string()),
        _ => None,
    }
}

fn extract_date(col: &ArrayRef, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()?
            .value_as_date(row),
        _ => parse_date(&extract_string(col, row)?),
    }
}

fn extract_i64(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => Some(col.as_any().downcast_ref::<Int32Array>()?.value(row) as i64),
        DataType::Int64 => Some(col.as_any().downcast_ref::<Int64Array>()?.value(row)),
        _ => None,
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float32 => Some(col.as_any().downcast_ref::<Float32Array>()?.value(row) as f64),
        DataType::Float64 => Some(col.as_any().downcast_ref::<Float64Array>()?.value(row)),
        DataType::Int32 | DataType::Int64 => extract_i64(col, row).map(|v| v as f64),
        _ => None,
    }
}

fn extract_count(col: &ArrayRef, row: usize) -> Option<u64> {
    match col.data_type() {
        DataType::Float32 | DataType::Float64 => {
            let v = extract_f64(col, row)?;
            (v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
        }
        _ => u64::try_from(extract_i64(col, row)?).ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::StringArray;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str =
        "Date,Store_ID,City,Region,Drink_Category,Revenue,Units_Sold,Customer_Count,Latitude,Longitude";

    #[test]
    fn reads_csv_and_derives_fields() {
        let text = format!(
            "{HEADER}\n\
             2021-03-01,S001,Seattle,West,Latte,1250.50,300,210,47.6062,-122.3321\n\
             2022-11-01,S002,Boston,East,Mocha,980.00,220,150,42.3601,-71.0589\n"
        );
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.store_id, "S001");
        assert_eq!(first.year, 2021);
        assert_eq!(first.month_num, 3);
        assert_eq!(first.units_sold, 300);
        assert!((first.revenue - 1250.5).abs() < 1e-9);
        assert_eq!(ds.years.len(), 2);
    }

    #[test]
    fn column_order_and_extra_columns_do_not_matter() {
        let text = "Region,Date,Notes,Store_ID,City,Drink_Category,Revenue,Units_Sold,Customer_Count,Latitude,Longitude\n\
                    West,2021-01-01,promo,S1,Portland,Tea,10,1,2,45.5,-122.6\n";
        let ds = read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records[0].region, "West");
        assert_eq!(ds.records[0].drink_category, "Tea");
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "Date,Store_ID,City,Region,Revenue,Units_Sold,Customer_Count,Latitude,Longitude\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::MissingColumn(col)) => assert_eq!(col, "Drink_Category"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_fatal() {
        let text = format!("{HEADER}\nnot-a-date,S1,X,West,Tea,1,1,1,0,0\n");
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidDate { row: 1, .. })
        ));
    }

    #[test]
    fn bad_date_reports_its_data_row() {
        let text = format!(
            "{HEADER}\n\
             2021-01-01,S1,X,West,Tea,1,1,1,0,0\n\
             01/02/2021,S1,X,West,Tea,1,1,1,0,0\n"
        );
        let err = read_csv(text.as_bytes()).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::InvalidDate { row, value }) => {
                assert_eq!(*row, 2);
                assert_eq!(value, "01/02/2021");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn json_rows_are_numbered_from_one() {
        let text = r#"[{"Date": "soon", "Store_ID": "S1", "City": "X", "Region": "West",
            "Drink_Category": "Tea", "Revenue": 1, "Units_Sold": 1,
            "Customer_Count": 1, "Latitude": 0, "Longitude": 0}]"#;
        let err = read_json(text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidDate { row: 1, .. })
        ));
    }

    #[test]
    fn bad_number_is_fatal() {
        let text = format!("{HEADER}\n2021-01-01,S1,X,West,Tea,lots,1,1,0,0\n");
        assert!(read_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn accepts_datetime_strings() {
        assert_eq!(
            parse_date("2023-02-01 00:00:00"),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
        assert_eq!(
            parse_date("2023-02-01T12:30:00"),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
        assert_eq!(parse_date("2023-02-30"), None);
    }

    #[test]
    fn reads_json_records() {
        let text = r#"[
            {"Date": "2020-12-01", "Store_ID": "S017", "City": "Austin", "Region": "South",
             "Drink_Category": "Cold Brew", "Revenue": 99.5, "Units_Sold": 20,
             "Customer_Count": 18, "Latitude": 30.27, "Longitude": -97.74}
        ]"#;
        let ds = read_json(text).unwrap();
        assert_eq!(ds.records[0].store_id, "S017");
        assert_eq!(ds.records[0].month.name(), "December");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(load_file(Path::new("definitely/not/here.csv")).is_err());
    }

    // -- Parquet --

    /// Write `columns` as a single-batch Parquet file in the temp dir.
    fn write_parquet(name: &str, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "rusty-latte-{}-{name}.parquet",
            std::process::id()
        ));
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        if batch.num_rows() > 0 {
            writer.write(&batch).unwrap();
        }
        writer.close().unwrap();
        path
    }

    /// Load and remove a file written by [`write_parquet`].
    fn load_and_remove(path: PathBuf) -> Result<Dataset> {
        let result = load_file(&path);
        std::fs::remove_file(&path).ok();
        result
    }

    fn days_since_epoch(date: &str) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        d.signed_duration_since(epoch).num_days() as i32
    }

    /// Two rows with the given date and count columns; everything else fixed.
    fn two_rows(
        dates: ArrayRef,
        units: ArrayRef,
        customers: ArrayRef,
    ) -> Vec<(&'static str, ArrayRef)> {
        vec![
            ("Date", dates),
            ("Store_ID", Arc::new(StringArray::from(vec!["S001", "S002"]))),
            ("City", Arc::new(StringArray::from(vec!["Seattle", "Boston"]))),
            ("Region", Arc::new(StringArray::from(vec!["West", "East"]))),
            ("Drink_Category", Arc::new(StringArray::from(vec!["Latte", "Mocha"]))),
            ("Revenue", Arc::new(Float64Array::from(vec![1250.5, 980.0]))),
            ("Units_Sold", units),
            ("Customer_Count", customers),
            ("Latitude", Arc::new(Float32Array::from(vec![47.5_f32, 42.25]))),
            ("Longitude", Arc::new(Float64Array::from(vec![-122.3321, -71.0589]))),
        ]
    }

    #[test]
    fn reads_parquet_with_date32_and_int64_columns() {
        let dates = Date32Array::from(vec![
            days_since_epoch("2021-03-01"),
            days_since_epoch("2022-11-01"),
        ]);
        let path = write_parquet(
            "date32",
            two_rows(
                Arc::new(dates),
                Arc::new(Int64Array::from(vec![300, 220])),
                Arc::new(Int64Array::from(vec![210, 150])),
            ),
        );
        let ds = load_and_remove(path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert_eq!(first.store_id, "S001");
        assert_eq!(first.units_sold, 300);
        assert_eq!(first.customer_count, 210);
        assert!((first.latitude - 47.5).abs() < 1e-9);
        assert_eq!(ds.records[1].month.name(), "November");
    }

    #[test]
    fn reads_parquet_with_string_dates_and_mixed_numeric_types() {
        let path = write_parquet(
            "utf8",
            two_rows(
                Arc::new(StringArray::from(vec!["2021-03-01", "2022-11-01 00:00:00"])),
                Arc::new(Int32Array::from(vec![300, 220])),
                Arc::new(Float64Array::from(vec![210.0, 150.0])),
            ),
        );
        let ds = load_and_remove(path).unwrap();
        assert_eq!(ds.records[1].date, NaiveDate::from_ymd_opt(2022, 11, 1).unwrap());
        assert_eq!(ds.records[1].units_sold, 220);
        assert_eq!(ds.records[1].customer_count, 150);
    }

    #[test]
    fn fractional_parquet_count_is_fatal() {
        let path = write_parquet(
            "fractional",
            two_rows(
                Arc::new(StringArray::from(vec!["2021-03-01", "2021-04-01"])),
                Arc::new(Float64Array::from(vec![2.5, 3.0])),
                Arc::new(Int64Array::from(vec![1, 1])),
            ),
        );
        let err = load_and_remove(path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 1"), "{msg}");
        assert!(msg.contains("Units_Sold"), "{msg}");
    }

    #[test]
    fn negative_parquet_count_is_fatal() {
        let path = write_parquet(
            "negative",
            two_rows(
                Arc::new(StringArray::from(vec!["2021-03-01", "2021-04-01"])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(Int64Array::from(vec![5, -1])),
            ),
        );
        let err = load_and_remove(path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 2"), "{msg}");
        assert!(msg.contains("Customer_Count"), "{msg}");
    }

    #[test]
    fn bad_parquet_date_reports_its_data_row() {
        let path = write_parquet(
            "bad-date",
            two_rows(
                Arc::new(StringArray::from(vec!["2021-03-01", "March"])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(Int64Array::from(vec![1, 1])),
            ),
        );
        let err = load_and_remove(path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidDate { row: 2, .. })
        ));
    }

    #[test]
    fn empty_parquet_file_still_needs_every_column() {
        let dates: ArrayRef = Arc::new(StringArray::from(Vec::<&str>::new()));
        let path = write_parquet("date-only", vec![("Date", dates)]);
        let err = load_and_remove(path).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::MissingColumn(col)) => assert_eq!(col, "Store_ID"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_parquet_file_with_every_column_loads_empty() {
        let columns = two_rows(
            Arc::new(StringArray::from(vec!["2021-03-01", "2021-04-01"])),
            Arc::new(Int64Array::from(vec![1, 1])),
            Arc::new(Int64Array::from(vec![1, 1])),
        )
        .into_iter()
        .map(|(name, col)| (name, col.slice(0, 0)))
        .collect();
        let path = write_parquet("header-only", columns);
        let ds = load_and_remove(path).unwrap();
        assert!(ds.is_empty());
        assert!(ds.date_bounds.is_none());
    }
}
