//! Shared test utilities for the pixel-render workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Raw pixel-stack generators
//! - Pixel-set metadata fixtures
//! - Approximate equality assertions
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
//! use test_utils::{metadata_fixture, ramp_stack};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

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
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert two byte-planar images agree pixel for pixel, naming the first
/// differing pixel.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_bands_eq;
///
/// assert_bands_eq!(buffer.red(), &[0, 0, 0, 0], 2);
/// ```
#[macro_export]
macro_rules! assert_bands_eq {
    ($left:expr, $right:expr, $width:expr) => {{
        let left: &[u8] = $left;
        let right: &[u8] = $right;
        assert_eq!(left.len(), right.len(), "band lengths differ");
        if let Some(i) = left.iter().zip(right).position(|(l, r)| l != r) {
            panic!(
                "bands differ at ({}, {}): left `{}`, right `{}`",
                i % $width,
                i / $width,
                left[i],
                right[i]
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_bands_eq_passes() {
        assert_bands_eq!(&[1, 2, 3, 4], &[1, 2, 3, 4], 2);
    }

    #[test]
    #[should_panic(expected = "bands differ at (1, 1)")]
    fn test_assert_bands_eq_names_pixel() {
        assert_bands_eq!(&[1, 2, 3, 4], &[1, 2, 3, 5], 2);
    }
}
