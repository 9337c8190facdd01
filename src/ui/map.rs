use std::collections::HashMap;

use eframe::egui::Ui;
use egui_plot::{MarkerShape, Plot, Points};

use crate::color::BUBBLE_FILL;
use crate::data::aggregate::{bubble_radius, StorePoint};
use crate::format;
use crate::state::AppState;

/// Extra room around the outermost stores.
const MARGIN: f64 = 1.1;
/// Bubbles never shrink below this, so low-revenue stores stay hoverable.
const MIN_RADIUS: f32 = 2.0;

// ---------------------------------------------------------------------------
// Store bubble map (lon/lat plane)
// ---------------------------------------------------------------------------

/// One bubble per store at `[longitude, latitude]`, sized by revenue.
pub fn store_map(ui: &mut Ui, state: &AppState) {
    let dash = &state.dashboard;
    let Some(view) = dash.map_view else {
        ui.label("No data for the current filters.");
        return;
    };

    let labels = bubble_labels(&dash.stores);
    let tooltips: HashMap<String, String> = labels.iter().cloned().collect();

    let max_revenue = dash.max_store_revenue();
    let span = view.half_span * MARGIN;

    Plot::new("store_map")
        .height(480.0)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(view.center_lon - span)
        .include_x(view.center_lon + span)
        .include_y(view.center_lat - span)
        .include_y(view.center_lat + span)
        .label_formatter(move |name, value| match tooltips.get(name) {
            Some(text) => text.clone(),
            None => format!("{:.3}, {:.3}", value.y, value.x),
        })
        .show(ui, |plot_ui| {
            for (store, (series, _)) in dash.stores.iter().zip(&labels) {
                let radius = bubble_radius(store.revenue, max_revenue, state.max_bubble_radius)
                    .max(MIN_RADIUS);
                plot_ui.points(
                    Points::new(vec![[store.longitude, store.latitude]])
                        .name(series)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius)
                        .color(BUBBLE_FILL),
                );
            }
        });
}

/// `(series name, tooltip)` per store point.
///
/// Several points can share a store ID (same store, different city or
/// coordinates), so the series name carries the point's position in the list
/// to keep hover lookups one-to-one.
fn bubble_labels(stores: &[StorePoint]) -> Vec<(String, String)> {
    stores
        .iter()
        .enumerate()
        .map(|(i, s)| {
            (
                format!("{} #{}", s.store_id, i + 1),
                format!(
                    "Store: {}\nCity: {}\nRevenue: {}\nCustomers: {}",
                    s.store_id,
                    s.city,
                    format::currency(s.revenue),
                    format::count(s.customer_count)
                ),
            )
        })
        .collect()
}
