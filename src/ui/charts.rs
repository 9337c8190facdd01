use eframe::egui::Ui;
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::BAR_FILL;
use crate::data::aggregate::GroupTotal;
use crate::data::model::month_from_number;
use crate::format;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

/// Short month label for an axis position, or `""` between months.
fn month_tick(value: f64) -> String {
    let m = value.round();
    if (value - m).abs() > 1e-6 || !(1.0..=12.0).contains(&m) {
        return String::new();
    }
    month_from_number(m as u32).name()[..3].to_string()
}

// ---------------------------------------------------------------------------
// Seasonal line chart
// ---------------------------------------------------------------------------

/// Monthly revenue, one line per year, months in calendar order.
pub fn seasonal_chart(ui: &mut Ui, state: &AppState) {
    let series = &state.dashboard.series;
    if series.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    Plot::new("seasonal_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("Revenue")
        .include_x(0.5)
        .include_x(12.5)
        .include_y(0.0)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 3.0, 12.0]))
        .x_axis_formatter(|mark, _range| month_tick(mark.value))
        .y_axis_formatter(|mark, _range| format::compact(mark.value))
        .label_formatter(|name, value| {
            if name.is_empty() {
                return String::new();
            }
            let month = month_from_number(value.x.round().clamp(1.0, 12.0) as u32);
            format!(
                "Year: {name}\nMonth: {}\nRevenue: {}",
                month.name(),
                format::currency(value.y)
            )
        })
        .show(ui, |plot_ui| {
            for line in series {
                let color = state.palette.color_for(line.year);
                let name = line.year.to_string();
                let coords: Vec<[f64; 2]> = line
                    .points
                    .iter()
                    .map(|p| [p.month_num as f64, p.revenue])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(&name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(Points::new(coords).name(&name).color(color).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Grouped bar charts
// ---------------------------------------------------------------------------

/// Revenue per drink category, highest first.
pub fn category_chart(ui: &mut Ui, rows: &[GroupTotal<f64>]) {
    let bars: Vec<(String, f64)> = rows.iter().map(|g| (g.label.clone(), g.value)).collect();
    bar_chart(ui, "category_chart", "Revenue", bars, format::currency);
}

/// Customer count per region, highest first.
pub fn region_chart(ui: &mut Ui, rows: &[GroupTotal<u64>]) {
    let bars: Vec<(String, f64)> = rows
        .iter()
        .map(|g| (g.label.clone(), g.value as f64))
        .collect();
    bar_chart(ui, "region_chart", "Customers", bars, |v| format::count(v as u64));
}

fn bar_chart(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    rows: Vec<(String, f64)>,
    value_fmt: fn(f64) -> String,
) {
    if rows.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar::new(i as f64, *value).name(label).width(0.7))
        .collect();
    let labels: Vec<String> = rows.into_iter().map(|(label, _)| label).collect();

    let chart = BarChart::new(bars)
        .color(BAR_FILL)
        .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
            format!("{}\n{}", bar.name, value_fmt(bar.value))
        }));

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(|mark, _range| format::compact(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}
