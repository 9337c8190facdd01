use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Fill colour of the store bubbles on the map: `rgba(30, 144, 255, 160)`
/// premultiplied.
pub const BUBBLE_FILL: Color32 = Color32::from_rgba_premultiplied(19, 90, 160, 160);

/// Colour of the bar charts.
pub const BAR_FILL: Color32 = Color32::from_rgb(0, 112, 74);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Year → Color32 for the seasonal chart
// ---------------------------------------------------------------------------

/// Maps every year in the dataset to a stable colour, so a year keeps its
/// colour when other years are filtered out.
#[derive(Debug, Clone, Default)]
pub struct YearPalette {
    mapping: BTreeMap<i32, Color32>,
}

impl YearPalette {
    pub fn new(years: &BTreeSet<i32>) -> Self {
        let mapping = years
            .iter()
            .copied()
            .zip(generate_palette(years.len()))
            .collect();
        YearPalette { mapping }
    }

    pub fn color_for(&self, year: i32) -> Color32 {
        self.mapping.get(&year).copied().unwrap_or(Color32::GRAY)
    }
}
