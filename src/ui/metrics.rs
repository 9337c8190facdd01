use eframe::egui::{RichText, Ui};

use crate::data::aggregate::Summary;
use crate::format;

/// Three scorecards: total revenue, units sold, average spend.
pub fn metric_cards(ui: &mut Ui, summary: &Summary) {
    let cards = [
        ("Total Revenue", format::currency(summary.total_revenue)),
        ("Total Units Sold", format::count(summary.total_units)),
        ("Avg Spend per Customer", format::currency(summary.avg_spend)),
    ];
    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            col.group(|ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).size(26.0).strong());
            });
        }
    });
}
