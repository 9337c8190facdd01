/// egui widgets: filter side panel, metric cards, charts and store map.
pub mod charts;
pub mod map;
pub mod metrics;
pub mod panels;

use eframe::egui::{ScrollArea, Ui};

use crate::state::AppState;

/// Render the central dashboard: metrics, seasonal chart, bar charts, map.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Retail Performance Dashboard");
            if state.dashboard.is_empty() {
                ui.weak("No records match the current filters.");
            }
            ui.add_space(4.0);

            ui.strong("Key Metrics");
            metrics::metric_cards(ui, &state.dashboard.summary);
            ui.add_space(12.0);

            ui.strong("Monthly Revenue by Year (Seasonality View)");
            charts::seasonal_chart(ui, state);
            ui.add_space(12.0);

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("Sales by Drink Category");
                charts::category_chart(&mut cols[0], &state.dashboard.by_category);
                cols[1].strong("Customer Count by Region");
                charts::region_chart(&mut cols[1], &state.dashboard.by_region);
            });
            ui.add_space(12.0);

            ui.strong("Store Revenue Map");
            map::store_map(ui, state);
        });
}
