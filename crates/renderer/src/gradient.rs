//! Gradient rendering of normalized grids.

use crate::style::ColorRamp;

/// Denominator guard for display normalization.
pub const DISPLAY_EPSILON: f32 = 1e-6;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Linear color interpolation
pub(crate) fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Stretch values to [0, 1] using the observed range: `(x - min) / (max - min + eps)`.
///
/// NaN stays NaN. A grid with no finite values comes back unchanged.
pub fn display_normalize(data: &[f32]) -> Vec<f32> {
    let mut finite = data.iter().copied().filter(|v| v.is_finite());
    let Some(first) = finite.next() else {
        return data.to_vec();
    };
    let (min, max) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min + DISPLAY_EPSILON;

    data.iter()
        .map(|&v| if v.is_finite() { (v - min) / range } else { v })
        .collect()
}

/// Map values already in [0, 1] to RGB8, 3 bytes per cell.
///
/// Values are clipped to [0, 1]; NaN maps to the low end of the ramp.
pub fn array_to_colormap(data: &[f32], ramp: ColorRamp) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(data.len() * 3);
    for &value in data {
        let color = ramp.color_at(value);
        pixels.extend_from_slice(&[color.r, color.g, color.b]);
    }
    pixels
}

/// Render grid data as an RGBA overlay.
///
/// # Arguments
/// - `data`: 2D grid of values in [0, 1] (row-major order)
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `ramp`: Color ramp for valid cells
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel). NaN cells are fully transparent.
pub fn render_overlay_rgba(data: &[f32], width: usize, height: usize, ramp: ColorRamp) -> Vec<u8> {
    let mut pixels = vec![0u8; width * height * 4];

    for (idx, &value) in data.iter().take(width * height).enumerate() {
        let color = if value.is_finite() {
            ramp.color_at(value)
        } else {
            Color::transparent()
        };

        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}
