use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::classify::Level;

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
// Level colours
// ---------------------------------------------------------------------------

/// Fixed colour per maturity band, shared by the pie chart and its legend
/// so a band keeps its colour whatever the slice order.
#[derive(Debug, Clone)]
pub struct LevelColors {
    colors: [Color32; 5],
}

impl Default for LevelColors {
    fn default() -> Self {
        let palette = generate_palette(Level::ALL.len());
        let mut colors = [Color32::GRAY; 5];
        for (slot, c) in colors.iter_mut().zip(palette) {
            *slot = c;
        }
        Self { colors }
    }
}

impl LevelColors {
    pub fn color_for(&self, level: Level) -> Color32 {
        self.colors[level as usize]
    }
}
