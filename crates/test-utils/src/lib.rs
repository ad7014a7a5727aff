//! Shared test utilities for the flood-risk workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic raster generators
//! - Grid fixtures over the default area of interest
//! - Temporary output directories
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, uniform_raster};
//! ```

pub mod fixtures;
pub mod generators;
pub mod output;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use output::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert every value of a slice lies within `[lo, hi]` (NaN fails).
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_all_within;
///
/// assert_all_within!(&grid.data, 0.0, 1.0);
/// ```
#[macro_export]
macro_rules! assert_all_within {
    ($values:expr, $lo:expr, $hi:expr) => {{
        let lo: f64 = $lo as f64;
        let hi: f64 = $hi as f64;
        for (i, v) in $values.iter().enumerate() {
            let v: f64 = *v as f64;
            if !(v >= lo && v <= hi) {
                panic!(
                    "assertion failed: value at index {} is `{:?}`, outside [{:?}, {:?}]",
                    i, v, lo, hi
                );
            }
        }
    }};
}
