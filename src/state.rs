use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::YearPalette;
use crate::data::aggregate::Dashboard;
use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A string-valued multi-select filter. Years have their own methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    Region,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current filter selections.
    pub filters: FilterCriteria,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible records.
    pub dashboard: Dashboard,

    /// Line colour per year.
    pub palette: YearPalette,

    /// Radius of the largest store bubble.
    pub max_bubble_radius: f32,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterCriteria::default(),
            visible_indices: Vec::new(),
            dashboard: Dashboard::default(),
            palette: YearPalette::default(),
            max_bubble_radius: 24.0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset with every filter at its default.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let filters = FilterCriteria::for_dataset(&dataset);
        self.set_dataset_with_filters(dataset, filters);
    }

    /// Ingest a dataset with an initial selection (e.g. from the command line).
    pub fn set_dataset_with_filters(&mut self, dataset: Dataset, filters: FilterCriteria) {
        self.palette = YearPalette::new(&dataset.years);
        self.filters = filters;
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the dashboard after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filters);
        self.dashboard = Dashboard::compute(ds, &self.visible_indices);
        log::debug!(
            "Refiltered: {} of {} records visible",
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Toggle a single year in the year filter.
    pub fn toggle_year(&mut self, year: i32) {
        toggle(&mut self.filters.years, &year);
        self.refilter();
    }

    /// Toggle a single value in the category or region filter.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        toggle(self.selection_mut(dim), &value.to_string());
        self.refilter();
    }

    /// Select every year.
    pub fn select_all_years(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters.years = ds.years.clone();
            self.refilter();
        }
    }

    /// Deselect every year.
    pub fn select_no_years(&mut self) {
        self.filters.years.clear();
        self.refilter();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let all = match dim {
            Dimension::Category => ds.categories.clone(),
            Dimension::Region => ds.regions.clone(),
        };
        *self.selection_mut(dim) = all;
        self.refilter();
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection_mut(dim).clear();
        self.refilter();
    }

    /// Set the inclusive date interval. `start > end` is allowed and simply
    /// matches nothing.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.filters.start = start;
        self.filters.end = end;
        self.refilter();
    }

    /// Back to "everything selected".
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters = FilterCriteria::for_dataset(ds);
            self.refilter();
        }
    }

    pub fn selection(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Category => &self.filters.categories,
            Dimension::Region => &self.filters.regions,
        }
    }

    fn selection_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Category => &mut self.filters.categories,
            Dimension::Region => &mut self.filters.regions,
        }
    }
}

fn toggle<T: Ord + Clone>(set: &mut BTreeSet<T>, value: &T) {
    if !set.remove(value) {
        set.insert(value.clone());
    }
}
