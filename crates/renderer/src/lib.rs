//! Rendering for flood-risk layers.
//!
//! - Color ramps and legends
//! - Gradient rendering to RGB / RGBA pixels
//! - PNG encoding
//! - The interactive HTML map

pub mod error;
pub mod gradient;
pub mod map;
pub mod png;
pub mod style;

pub use error::{RenderError, Result};
pub use gradient::{array_to_colormap, display_normalize, render_overlay_rgba, Color};
pub use map::{default_ramp, render, MapDocument, MapLayer, MapOptions};
pub use style::{hex_to_rgb, ColorRamp, Legend};
