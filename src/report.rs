//! Headless rendering of a [`Dashboard`] for `--report` and `--json`.

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::data::aggregate::Dashboard;
use crate::data::filter::FilterCriteria;
use crate::format;

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct StoreRow {
    #[tabled(rename = "Store")]
    store_id: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Customers")]
    customers: String,
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Markdown-ish text report of every dashboard section.
pub fn render_text(dashboard: &Dashboard, criteria: &FilterCriteria) -> String {
    let s = &dashboard.summary;
    // One entry per output line; blank entries separate blocks.
    let mut lines: Vec<String> = vec![
        "# Retail Performance Dashboard".to_string(),
        String::new(),
        format!(
            "Filters: years {:?}, categories {:?}, regions {:?}, {} to {}",
            criteria.years, criteria.categories, criteria.regions, criteria.start, criteria.end
        ),
        String::new(),
        "## Key Metrics".to_string(),
        String::new(),
        format!("Total Revenue:          {}", format::currency(s.total_revenue)),
        format!("Total Units Sold:       {}", format::count(s.total_units)),
        format!("Avg Spend per Customer: {}", format::currency(s.avg_spend)),
        String::new(),
    ];

    let months = dashboard
        .monthly
        .iter()
        .map(|m| MonthRow {
            year: m.year,
            month: m.month.clone(),
            revenue: format::currency(m.revenue),
        })
        .collect();
    section(&mut lines, "Monthly Revenue by Year", table::<MonthRow>(months));

    let cats = dashboard
        .by_category
        .iter()
        .map(|g| GroupRow {
            label: g.label.clone(),
            value: format::currency(g.value),
        })
        .collect();
    section(&mut lines, "Sales by Drink Category", table::<GroupRow>(cats));

    let regions = dashboard
        .by_region
        .iter()
        .map(|g| GroupRow {
            label: g.label.clone(),
            value: format::count(g.value),
        })
        .collect();
    section(&mut lines, "Customer Count by Region", table::<GroupRow>(regions));

    let stores = dashboard
        .stores
        .iter()
        .map(|p| StoreRow {
            store_id: p.store_id.clone(),
            city: p.city.clone(),
            region: p.region.clone(),
            revenue: format::currency(p.revenue),
            customers: format::count(p.customer_count),
        })
        .collect();
    let mut body = table::<StoreRow>(stores);
    if let Some(view) = dashboard.map_view {
        body = format!(
            "Centre: {:.4}, {:.4}\n\n{body}",
            view.center_lat, view.center_lon
        );
    }
    section(&mut lines, "Store Revenue Map", body);
    // No blank line after the last section.
    lines.pop();

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `## title`, a blank line, `body`, a blank line.
fn section(lines: &mut Vec<String>, title: &str, body: String) {
    lines.push(format!("## {title}"));
    lines.push(String::new());
    lines.push(body);
    lines.push(String::new());
}

#[derive(Serialize)]
struct JsonReport<'a> {
    filters: JsonFilters<'a>,
    #[serde(flatten)]
    dashboard: &'a Dashboard,
}

#[derive(Serialize)]
struct JsonFilters<'a> {
    years: Vec<i32>,
    categories: Vec<&'a str>,
    regions: Vec<&'a str>,
    start: String,
    end: String,
}

/// Pretty JSON of the criteria and every aggregate.
pub fn render_json(dashboard: &Dashboard, criteria: &FilterCriteria) -> Result<String> {
    let report = JsonReport {
        filters: JsonFilters {
            years: criteria.years.iter().copied().collect(),
            categories: criteria.categories.iter().map(String::as_str).collect(),
            regions: criteria.regions.iter().map(String::as_str).collect(),
            start: criteria.start.to_string(),
            end: criteria.end.to_string(),
        },
        dashboard,
    };
    serde_json::to_string_pretty(&report).context("serialising dashboard")
}
