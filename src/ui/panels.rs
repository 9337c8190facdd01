use std::collections::BTreeSet;

use chrono::NaiveDate;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, Dimension};

/// A filter change requested by a widget, applied once the panel is drawn.
enum FilterAction {
    ToggleYear(i32),
    AllYears,
    NoYears,
    Toggle(Dimension, String),
    SelectAll(Dimension),
    SelectNone(Dimension),
    Dates(NaiveDate, NaiveDate),
    Reset,
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so the dataset borrow ends before mutating state.
    let years = dataset.years.clone();
    let categories = dataset.categories.clone();
    let regions = dataset.regions.clone();
    let has_dates = dataset.date_bounds.is_some();

    let mut actions: Vec<FilterAction> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if ui.button("Reset filters").clicked() {
                actions.push(FilterAction::Reset);
            }
            ui.add_space(4.0);

            // ---- Years ----
            let selected = &state.filters.years;
            let header = format!("Year  ({}/{})", selected.len(), years.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("years")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            actions.push(FilterAction::AllYears);
                        }
                        if ui.small_button("None").clicked() {
                            actions.push(FilterAction::NoYears);
                        }
                    });
                    for &year in &years {
                        let mut checked = selected.contains(&year);
                        let text = RichText::new(year.to_string())
                            .color(state.palette.color_for(year));
                        if ui.checkbox(&mut checked, text).changed() {
                            actions.push(FilterAction::ToggleYear(year));
                        }
                    }
                });

            // ---- Drink category / region ----
            value_filter(
                ui,
                "Drink Category",
                Dimension::Category,
                &categories,
                state.selection(Dimension::Category),
                &mut actions,
            );
            value_filter(
                ui,
                "Region",
                Dimension::Region,
                &regions,
                state.selection(Dimension::Region),
                &mut actions,
            );

            // ---- Date range ----
            ui.separator();
            ui.strong("Date Range");
            if !has_dates {
                ui.label("Dataset is empty.");
                return;
            }
            let mut start = state.filters.start;
            let mut end = state.filters.end;
            let mut changed = false;
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("From");
                changed |= ui
                    .add(DatePickerButton::new(&mut start).id_salt("date_from"))
                    .changed();
                ui.end_row();
                ui.label("To");
                changed |= ui
                    .add(DatePickerButton::new(&mut end).id_salt("date_to"))
                    .changed();
                ui.end_row();
            });
            if start > end {
                ui.label(
                    RichText::new("Start is after end: nothing matches.")
                        .color(Color32::YELLOW),
                );
            }
            if changed {
                actions.push(FilterAction::Dates(start, end));
            }
        });

    for action in actions {
        match action {
            FilterAction::ToggleYear(y) => state.toggle_year(y),
            FilterAction::AllYears => state.select_all_years(),
            FilterAction::NoYears => state.select_no_years(),
            FilterAction::Toggle(dim, v) => state.toggle_value(dim, &v),
            FilterAction::SelectAll(dim) => state.select_all(dim),
            FilterAction::SelectNone(dim) => state.select_none(dim),
            FilterAction::Dates(s, e) => state.set_date_range(s, e),
            FilterAction::Reset => state.reset_filters(),
        }
    }
}

/// Collapsible checklist for one string-valued dimension.
fn value_filter(
    ui: &mut Ui,
    title: &str,
    dim: Dimension,
    all_values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    actions: &mut Vec<FilterAction>,
) {
    let header = format!("{title}  ({}/{})", selected.len(), all_values.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    actions.push(FilterAction::SelectAll(dim));
                }
                if ui.small_button("None").clicked() {
                    actions.push(FilterAction::SelectNone(dim));
                }
            });
            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.as_str()).changed() {
                    actions.push(FilterAction::Toggle(dim, val.clone()));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
