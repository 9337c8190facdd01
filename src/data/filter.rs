use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter criteria: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The active selection across the four filter dimensions.
///
/// A record passes when its year, drink category and region are all selected
/// and its date lies in `[start, end]`. An empty set in any dimension, or
/// `start > end`, matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub years: BTreeSet<i32>,
    pub categories: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            years: BTreeSet::new(),
            categories: BTreeSet::new(),
            regions: BTreeSet::new(),
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }
}

impl FilterCriteria {
    /// Initialise criteria with every value selected and the full date range
    /// (i.e., show everything).
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let (start, end) = dataset
            .date_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            years: dataset.years.clone(),
            categories: dataset.categories.clone(),
            regions: dataset.regions.clone(),
            start,
            end,
        }
    }

    /// Whether a single record satisfies all four predicates.
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(&record.year)
            && self.categories.contains(&record.drink_category)
            && self.regions.contains(&record.region)
            && record.date >= self.start
            && record.date <= self.end
    }

    /// True when the date interval itself is empty.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Return indices of records that pass the criteria, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.is_inverted() {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}
