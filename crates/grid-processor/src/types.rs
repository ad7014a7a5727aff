//! Option and summary types for grid processing.

use serde::{Deserialize, Serialize};

/// Interpolation method for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// How a source grid is resampled onto the reference lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignOptions {
    #[serde(default)]
    pub method: InterpolationMethod,
    /// Value for destination pixels the source does not cover.
    #[serde(default)]
    pub fill: f32,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::Bilinear,
            fill: 0.0,
        }
    }
}

/// Statistics over the valid cells of a composite grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub valid_cells: usize,
    pub total_cells: usize,
}

impl RiskSummary {
    /// Summarize finite values of `data`.
    pub fn from_values(data: &[f32]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut valid_cells = 0usize;

        for &v in data.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
            valid_cells += 1;
        }

        if valid_cells == 0 {
            return Self {
                min: f32::NAN,
                max: f32::NAN,
                mean: f32::NAN,
                valid_cells,
                total_cells: data.len(),
            };
        }

        Self {
            min,
            max,
            mean: (sum / valid_cells as f64) as f32,
            valid_cells,
            total_cells: data.len(),
        }
    }
}
