mod app;
mod color;
mod config;
mod data;
mod format;
mod report;
mod state;
mod ui;

use anyhow::Context;
use app::RustyLatteApp;
use clap::Parser;
use eframe::egui;

use config::Cli;
use data::aggregate::Dashboard;
use data::filter::filtered_indices;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // Missing or malformed data is fatal at startup.
    let dataset = data::loader::load_file(&cli.data)?;
    let criteria = cli.criteria(&dataset);

    if cli.headless() {
        let dashboard = Dashboard::compute(&dataset, &filtered_indices(&dataset, &criteria));
        if cli.json {
            println!("{}", report::render_json(&dashboard, &criteria)?);
        } else {
            print!("{}", report::render_text(&dashboard, &criteria));
        }
        return Ok(());
    }

    let mut state = AppState {
        max_bubble_radius: cli.max_bubble_radius,
        ..AppState::default()
    };
    state.set_dataset_with_filters(dataset, criteria);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([cli.width, cli.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Latte – Retail Performance Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyLatteApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the dashboard window")
}
