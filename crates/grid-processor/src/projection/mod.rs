//! Resampling utilities for aligning grids.
//!
//! `interpolation` samples a grid at fractional pixel positions;
//! `reproject` drives it across a whole destination lattice.

pub mod interpolation;
pub mod reproject;

pub use interpolation::{bilinear_interpolate, nearest_interpolate};
pub use reproject::align_to_reference;
