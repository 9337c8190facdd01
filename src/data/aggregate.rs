//! Derived summaries of the filtered record set.
//!
//! Every function here is a pure function of `(dataset, indices)`. Empty
//! input yields zero totals and empty series.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{month_from_number, Dataset, Record};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Scalar metrics shown in the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub total_revenue: f64,
    pub total_units: u64,
    pub total_customers: u64,
    /// `total_revenue / total_customers`, or `0.0` when there are no customers.
    pub avg_spend: f64,
}

/// Revenue for one (year, month) cell of the seasonal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month_num: u32,
    pub month: String,
    pub revenue: f64,
}

/// One line of the seasonal chart: a year's monthly revenue in calendar order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeries {
    pub year: i32,
    pub points: Vec<MonthlyRevenue>,
}

/// One bar of a grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal<T> {
    pub label: String,
    pub value: T,
}

/// Per-store totals placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorePoint {
    pub store_id: String,
    pub city: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub revenue: f64,
    pub customer_count: u64,
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Half-width (degrees) of a square window around the centre that
    /// contains every store.
    pub half_span: f64,
}

/// Smallest window shown around a single store, in degrees.
const MIN_HALF_SPAN: f64 = 1.0;

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

fn selected<'a>(dataset: &'a Dataset, indices: &'a [usize]) -> impl Iterator<Item = &'a Record> {
    indices.iter().filter_map(|&i| dataset.records.get(i))
}

/// Total revenue, units, customers and average spend per customer.
pub fn summarize(dataset: &Dataset, indices: &[usize]) -> Summary {
    let mut summary = Summary::default();
    for rec in selected(dataset, indices) {
        summary.record_count += 1;
        summary.total_revenue += rec.revenue;
        summary.total_units += rec.units_sold;
        summary.total_customers += rec.customer_count;
    }
    summary.avg_spend = if summary.total_customers == 0 {
        0.0
    } else {
        summary.total_revenue / summary.total_customers as f64
    };
    summary
}

/// Revenue grouped by (year, month), ordered by month number ascending.
/// Rows sharing a month are ordered by year.
pub fn monthly_revenue(dataset: &Dataset, indices: &[usize]) -> Vec<MonthlyRevenue> {
    let mut acc: BTreeMap<(u32, i32), f64> = BTreeMap::new();
    for rec in selected(dataset, indices) {
        *acc.entry((rec.month_num, rec.year)).or_default() += rec.revenue;
    }
    acc.into_iter()
        .map(|((month_num, year), revenue)| MonthlyRevenue {
            year,
            month_num,
            month: month_from_number(month_num).name().to_string(),
            revenue,
        })
        .collect()
}

/// Split the monthly rows into one series per year (years ascending).
pub fn monthly_series(monthly: &[MonthlyRevenue]) -> Vec<YearSeries> {
    let mut by_year: BTreeMap<i32, Vec<MonthlyRevenue>> = BTreeMap::new();
    for row in monthly {
        by_year.entry(row.year).or_default().push(row.clone());
    }
    by_year
        .into_iter()
        .map(|(year, points)| YearSeries { year, points })
        .collect()
}

/// Revenue per drink category, highest first.
pub fn revenue_by_category(dataset: &Dataset, indices: &[usize]) -> Vec<GroupTotal<f64>> {
    let mut acc: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in selected(dataset, indices) {
        *acc.entry(rec.drink_category.as_str()).or_default() += rec.revenue;
    }
    let mut rows: Vec<GroupTotal<f64>> = acc
        .into_iter()
        .map(|(label, value)| GroupTotal {
            label: label.to_string(),
            value,
        })
        .collect();
    // Stable sort: equal totals stay in label order.
    rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    rows
}

/// Customer count per region, highest first.
pub fn customers_by_region(dataset: &Dataset, indices: &[usize]) -> Vec<GroupTotal<u64>> {
    let mut acc: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in selected(dataset, indices) {
        *acc.entry(rec.region.as_str()).or_default() += rec.customer_count;
    }
    let mut rows: Vec<GroupTotal<u64>> = acc
        .into_iter()
        .map(|(label, value)| GroupTotal {
            label: label.to_string(),
            value,
        })
        .collect();
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
}

/// Revenue and customers per store location.
///
/// Grouping key is (store, city, region, latitude, longitude); coordinates are
/// compared bit-for-bit.
pub fn store_points(dataset: &Dataset, indices: &[usize]) -> Vec<StorePoint> {
    type Key<'a> = (&'a str, &'a str, &'a str, u64, u64);
    let mut acc: BTreeMap<Key<'_>, StorePoint> = BTreeMap::new();
    for rec in selected(dataset, indices) {
        let key = (
            rec.store_id.as_str(),
            rec.city.as_str(),
            rec.region.as_str(),
            rec.latitude.to_bits(),
            rec.longitude.to_bits(),
        );
        let point = acc.entry(key).or_insert_with(|| StorePoint {
            store_id: rec.store_id.clone(),
            city: rec.city.clone(),
            region: rec.region.clone(),
            latitude: rec.latitude,
            longitude: rec.longitude,
            revenue: 0.0,
            customer_count: 0,
        });
        point.revenue += rec.revenue;
        point.customer_count += rec.customer_count;
    }
    acc.into_values().collect()
}

/// Centre the map on the mean store position, wide enough to show them all.
pub fn map_view(points: &[StorePoint]) -> Option<MapView> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let center_lat = points.iter().map(|p| p.latitude).sum::<f64>() / n;
    let center_lon = points.iter().map(|p| p.longitude).sum::<f64>() / n;
    let half_span = points
        .iter()
        .map(|p| {
            (p.latitude - center_lat)
                .abs()
                .max((p.longitude - center_lon).abs())
        })
        .fold(MIN_HALF_SPAN, f64::max);
    Some(MapView {
        center_lat,
        center_lon,
        half_span,
    })
}

/// Bubble radius (in points) proportional to revenue, where the
/// highest-revenue store gets `max_radius`.
pub fn bubble_radius(revenue: f64, max_revenue: f64, max_radius: f32) -> f32 {
    if max_revenue <= 0.0 || revenue <= 0.0 {
        return 0.0;
    }
    ((revenue / max_revenue) as f32 * max_radius).clamp(0.0, max_radius)
}

// ---------------------------------------------------------------------------
// Dashboard – everything the UI shows for one filter pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub monthly: Vec<MonthlyRevenue>,
    pub series: Vec<YearSeries>,
    pub by_category: Vec<GroupTotal<f64>>,
    pub by_region: Vec<GroupTotal<u64>>,
    pub stores: Vec<StorePoint>,
    pub map_view: Option<MapView>,
}

impl Dashboard {
    pub fn compute(dataset: &Dataset, indices: &[usize]) -> Self {
        let monthly = monthly_revenue(dataset, indices);
        let series = monthly_series(&monthly);
        let stores = store_points(dataset, indices);
        let map_view = map_view(&stores);
        Dashboard {
            summary: summarize(dataset, indices),
            monthly,
            series,
            by_category: revenue_by_category(dataset, indices),
            by_region: customers_by_region(dataset, indices),
            stores,
            map_view,
        }
    }

    /// Largest per-store revenue, used to scale bubbles.
    pub fn max_store_revenue(&self) -> f64 {
        self.stores.iter().map(|s| s.revenue).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.record_count == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{filtered_indices, FilterCriteria};
    use crate::data::model::tests::record;

    fn two_records() -> Dataset {
        Dataset::from_records(vec![
            record("2021-05-01", "West", "Latte", 10.0, 2, 2),
            record("2022-05-01", "East", "Latte", 20.0, 3, 4),
        ])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_year_scenario() {
        let ds = two_records();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.years = BTreeSet::from([2021]);
        let s = summarize(&ds, &filtered_indices(&ds, &criteria));
        assert!(close(s.total_revenue, 10.0));
        assert_eq!(s.total_units, 2);
        assert!(close(s.avg_spend, 5.0));
    }

    #[test]
    fn both_years_scenario() {
        let ds = two_records();
        let criteria = FilterCriteria::for_dataset(&ds);
        let s = summarize(&ds, &filtered_indices(&ds, &criteria));
        assert!(close(s.total_revenue, 30.0));
        assert_eq!(s.total_units, 5);
        assert_eq!(s.total_customers, 6);
        assert!(close(s.avg_spend, 5.0));
    }

    #[test]
    fn inverted_range_degrades_to_zero() {
        let ds = two_records();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        std::mem::swap(&mut criteria.start, &mut criteria.end);
        let idx = filtered_indices(&ds, &criteria);
        let dash = Dashboard::compute(&ds, &idx);
        assert!(dash.is_empty());
        assert_eq!(dash.summary, Summary::default());
        assert!(dash.monthly.is_empty());
        assert!(dash.series.is_empty());
        assert!(dash.by_category.is_empty());
        assert!(dash.by_region.is_empty());
        assert!(dash.stores.is_empty());
        assert!(dash.map_view.is_none());
        assert_eq!(dash.max_store_revenue(), 0.0);
    }

    #[test]
    fn avg_spend_is_zero_without_customers() {
        let ds = Dataset::from_records(vec![record("2021-01-01", "West", "Tea", 12.0, 4, 0)]);
        let s = summarize(&ds, &[0]);
        assert!(close(s.total_revenue, 12.0));
        assert_eq!(s.avg_spend, 0.0);
    }

    #[test]
    fn monthly_rows_are_in_calendar_order_and_sum_to_total() {
        let ds = Dataset::from_records(vec![
            record("2021-12-01", "West", "Latte", 1.0, 1, 1),
            record("2022-01-01", "West", "Latte", 2.0, 1, 1),
            record("2021-03-01", "East", "Latte", 4.0, 1, 1),
            record("2021-12-20", "East", "Mocha", 8.0, 1, 1),
            record("2022-03-01", "East", "Tea", 16.0, 1, 1),
        ]);
        let all: Vec<usize> = (0..ds.len()).collect();
        let monthly = monthly_revenue(&ds, &all);

        let months: Vec<u32> = monthly.iter().map(|m| m.month_num).collect();
        assert_eq!(months, vec![1, 3, 3, 12]);
        assert_eq!(monthly[0].month, "January");
        assert_eq!(monthly[3].month, "December");
        assert!(close(monthly[3].revenue, 9.0));

        let sum: f64 = monthly.iter().map(|m| m.revenue).sum();
        assert!(close(sum, summarize(&ds, &all).total_revenue));

        let series = monthly_series(&monthly);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2021);
        assert_eq!(
            series[0].points.iter().map(|p| p.month_num).collect::<Vec<_>>(),
            vec![3, 12]
        );
        assert_eq!(series[1].year, 2022);
    }

    #[test]
    fn grouped_bars_are_descending() {
        let ds = Dataset::from_records(vec![
            record("2021-01-01", "West", "Latte", 5.0, 1, 10),
            record("2021-01-01", "East", "Mocha", 30.0, 1, 3),
            record("2021-02-01", "West", "Tea", 12.0, 1, 1),
            record("2021-03-01", "North", "Latte", 10.0, 1, 7),
        ]);
        let all: Vec<usize> = (0..ds.len()).collect();

        let cats = revenue_by_category(&ds, &all);
        let labels: Vec<&str> = cats.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Mocha", "Latte", "Tea"]);
        assert!(cats.windows(2).all(|w| w[0].value >= w[1].value));

        let regions = customers_by_region(&ds, &all);
        assert_eq!(regions[0].label, "West");
        assert_eq!(regions[0].value, 11);
        assert!(regions.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn store_points_group_by_location() {
        let ds = Dataset::from_records(vec![
            record("2021-01-01", "West", "Latte", 5.0, 1, 2),
            record("2021-02-01", "West", "Mocha", 7.0, 1, 3),
            record("2021-02-01", "East", "Mocha", 1.0, 1, 1),
        ]);
        let all: Vec<usize> = (0..ds.len()).collect();
        let stores = store_points(&ds, &all);
        assert_eq!(stores.len(), 2);
        let west = stores.iter().find(|s| s.region == "West").unwrap();
        assert!(close(west.revenue, 12.0));
        assert_eq!(west.customer_count, 5);
    }

    #[test]
    fn map_view_is_centred_on_mean_position() {
        let point = |lat: f64, lon: f64| StorePoint {
            store_id: "S".into(),
            city: "C".into(),
            region: "R".into(),
            latitude: lat,
            longitude: lon,
            revenue: 1.0,
            customer_count: 1,
        };
        let view = map_view(&[point(30.0, -120.0), point(40.0, -80.0)]).unwrap();
        assert!(close(view.center_lat, 35.0));
        assert!(close(view.center_lon, -100.0));
        assert!(close(view.half_span, 20.0));

        let single = map_view(&[point(10.0, 10.0)]).unwrap();
        assert!(close(single.half_span, MIN_HALF_SPAN));
    }

    #[test]
    fn bubble_radius_is_proportional() {
        assert_eq!(bubble_radius(100.0, 100.0, 20.0), 20.0);
        assert_eq!(bubble_radius(25.0, 100.0, 20.0), 5.0);
        assert_eq!(bubble_radius(0.0, 100.0, 20.0), 0.0);
        assert_eq!(bubble_radius(5.0, 0.0, 20.0), 0.0);
    }
}
