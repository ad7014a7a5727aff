//! Color ramps and legend styling for map layers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gradient::{interpolate_color, Color};

const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];

const GREENS: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
    "#00441b",
];

const PURPLES: [&str; 9] = [
    "#fcfbfd", "#efedf5", "#dadaeb", "#bcbddc", "#9e9ac8", "#807dba", "#6a51a3", "#54278f",
    "#3f007d",
];

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// Sequential color ramp over [0, 1] with evenly spaced stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRamp {
    Blues,
    Reds,
    Greens,
    Purples,
    Viridis,
}

impl ColorRamp {
    /// Hex color stops from low to high.
    pub fn stops(&self) -> &'static [&'static str] {
        match self {
            ColorRamp::Blues => &BLUES,
            ColorRamp::Reds => &REDS,
            ColorRamp::Greens => &GREENS,
            ColorRamp::Purples => &PURPLES,
            ColorRamp::Viridis => &VIRIDIS,
        }
    }

    /// Parse from name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "blues" => Some(ColorRamp::Blues),
            "reds" => Some(ColorRamp::Reds),
            "greens" => Some(ColorRamp::Greens),
            "purples" => Some(ColorRamp::Purples),
            "viridis" => Some(ColorRamp::Viridis),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorRamp::Blues => "blues",
            ColorRamp::Reds => "reds",
            ColorRamp::Greens => "greens",
            ColorRamp::Purples => "purples",
            ColorRamp::Viridis => "viridis",
        }
    }

    /// Opaque color at `t`, clipped to [0, 1].
    ///
    /// Linear interpolation between the two surrounding stops; `t = 0` and
    /// `t = 1` hit the first and last stop exactly.
    pub fn color_at(&self, t: f32) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let last = stops.len() - 1;
        let pos = t * last as f32;
        let i = (pos.floor() as usize).min(last);
        let j = (i + 1).min(last);

        let lo = parse_stop(stops[i]);
        let hi = parse_stop(stops[j]);
        interpolate_color(lo, hi, pos - i as f32)
    }

    /// CSS `linear-gradient` running left (0) to right (1), for legends.
    pub fn css_gradient(&self) -> String {
        format!("linear-gradient(to right, {})", self.stops().join(", "))
    }
}

impl fmt::Display for ColorRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_stop(hex: &str) -> Color {
    let (r, g, b) = hex_to_rgb(hex).unwrap_or((0, 0, 0));
    Color::new(r, g, b, 255)
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Continuous legend for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub caption: String,
    pub ramp: ColorRamp,
    pub min: f32,
    pub max: f32,
}

impl Legend {
    /// A 0..1 legend, matching the display normalization of overlays.
    pub fn unit(caption: impl Into<String>, ramp: ColorRamp) -> Self {
        Self {
            caption: caption.into(),
            ramp,
            min: 0.0,
            max: 1.0,
        }
    }

    /// Evenly spaced tick labels from min to max.
    pub fn ticks(&self, count: usize) -> Vec<String> {
        if count < 2 {
            return vec![format!("{:.1}", self.min)];
        }
        (0..count)
            .map(|i| {
                let v = self.min + (self.max - self.min) * i as f32 / (count - 1) as f32;
                format!("{:.1}", v)
            })
            .collect()
    }
}
