use std::collections::BTreeSet;

use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single store/period performance summary.
///
/// `year`, `month` and `month_num` are derived from `date` when the record is
/// built and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub store_id: String,
    pub city: String,
    pub region: String,
    pub drink_category: String,
    pub revenue: f64,
    pub units_sold: u64,
    pub customer_count: u64,
    pub latitude: f64,
    pub longitude: f64,

    pub year: i32,
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub month_num: u32,
}

/// Raw column values of a record before the calendar fields are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub date: NaiveDate,
    pub store_id: String,
    pub city: String,
    pub region: String,
    pub drink_category: String,
    pub revenue: f64,
    pub units_sold: u64,
    pub customer_count: u64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Record {
    pub fn new(fields: RecordFields) -> Self {
        let date = fields.date;
        let month_num = date.month();
        Record {
            date,
            store_id: fields.store_id,
            city: fields.city,
            region: fields.region,
            drink_category: fields.drink_category,
            revenue: fields.revenue,
            units_sold: fields.units_sold,
            customer_count: fields.customer_count,
            latitude: fields.latitude,
            longitude: fields.longitude,
            year: date.year(),
            month: month_from_number(month_num),
            month_num,
        }
    }
}

/// Month for a 1-based month number. `chrono` guarantees `Datelike::month`
/// is in `1..=12`, so the fallback is never taken for real dates.
pub fn month_from_number(month_num: u32) -> Month {
    u8::try_from(month_num)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .unwrap_or(Month::January)
}

fn serialize_month<S: serde::Serializer>(month: &Month, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(month.name())
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter options.
///
/// Built once after loading and read-only from then on.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records (rows), in file order.
    pub records: Vec<Record>,
    /// Distinct years present in `records`.
    pub years: BTreeSet<i32>,
    /// Distinct drink categories.
    pub categories: BTreeSet<String>,
    /// Distinct regions.
    pub regions: BTreeSet<String>,
    /// `(min, max)` of `Record::date`, `None` for an empty dataset.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build filter option indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            years.insert(rec.year);
            categories.insert(rec.drink_category.clone());
            regions.insert(rec.region.clone());
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        Dataset {
            records,
            years,
            categories,
            regions,
            date_bounds,
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
}
