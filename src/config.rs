//! Command-line configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::data::filter::FilterCriteria;
use crate::data::loader::parse_date;
use crate::data::model::Dataset;

#[derive(Debug, Parser)]
#[command(
    name = "rusty-latte",
    version,
    about = "Retail performance dashboard: revenue, seasonality and store map"
)]
pub struct Cli {
    /// Sales records file (.csv, .json or .parquet)
    #[arg(default_value = "sales_performance.csv")]
    pub data: PathBuf,

    /// Print the dashboard as text tables instead of opening a window
    #[arg(long, conflicts_with = "json")]
    pub report: bool,

    /// Print the dashboard as JSON instead of opening a window
    #[arg(long)]
    pub json: bool,

    /// Only include these years (repeatable; default: all)
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Only include these drink categories (repeatable; default: all)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Only include these regions (repeatable; default: all)
    #[arg(long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// First date to include, YYYY-MM-DD (default: earliest record)
    #[arg(long, value_parser = cli_date)]
    pub from: Option<NaiveDate>,

    /// Last date to include, YYYY-MM-DD (default: latest record)
    #[arg(long, value_parser = cli_date)]
    pub to: Option<NaiveDate>,

    /// Radius in points of the largest store bubble on the map
    #[arg(long, default_value_t = 24.0)]
    pub max_bubble_radius: f32,

    /// Initial window width
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Initial window height
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

fn cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("'{s}' is not a YYYY-MM-DD date"))
}

impl Cli {
    /// Whether to skip the window and print to stdout.
    pub fn headless(&self) -> bool {
        self.report || self.json
    }

    /// Default criteria for `dataset`, narrowed by any filters given on the
    /// command line.
    pub fn criteria(&self, dataset: &Dataset) -> FilterCriteria {
        let mut criteria = FilterCriteria::for_dataset(dataset);
        if !self.years.is_empty() {
            criteria.years = self.years.iter().copied().collect();
        }
        if !self.categories.is_empty() {
            criteria.categories = self.categories.iter().cloned().collect();
        }
        if !self.regions.is_empty() {
            criteria.regions = self.regions.iter().cloned().collect();
        }
        if let Some(from) = self.from {
            criteria.start = from;
        }
        if let Some(to) = self.to {
            criteria.end = to;
        }
        criteria
    }
}
