//! Per-entity bar colours.
//!
//! Every entity of the table gets one colour from a reversed "rocket" ramp
//! (pale peach to near black), in table order, so a country keeps its colour
//! from frame to frame.

use plotters::style::RGBColor;
use std::collections::HashMap;

/// Stops of the "rocket" colormap, dark to light
const ROCKET: [(u8, u8, u8); 6] = [
    (3, 5, 26),
    (76, 29, 75),
    (161, 26, 91),
    (232, 63, 63),
    (246, 156, 115),
    (250, 235, 221),
];

const FALLBACK: RGBColor = RGBColor(128, 128, 128);

/// Colour at `t` in `[0, 1]` of the reversed ramp (0 = lightest)
pub fn rocket_r(t: f64) -> RGBColor {
    let t = 1.0 - t.clamp(0.0, 1.0);
    let scaled = t * (ROCKET.len() - 1) as f64;
    let low = scaled.floor() as usize;
    let high = (low + 1).min(ROCKET.len() - 1);
    let frac = scaled - low as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (ROCKET[low], ROCKET[high]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Fixed colour assignment for a set of entities
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: HashMap<String, RGBColor>,
}

impl Palette {
    pub fn for_entities<'a>(entities: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = entities.into_iter().collect();
        let last = names.len().saturating_sub(1).max(1) as f64;

        let colors = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), rocket_r(i as f64 / last)))
            .collect();
        Self { colors }
    }

    pub fn color_of(&self, entity: &str) -> RGBColor {
        self.colors.get(entity).copied().unwrap_or(FALLBACK)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
