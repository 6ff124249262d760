//! Shared test utilities for the pincast-import workspace.
//!
//! This crate provides common testing infrastructure:
//! - A programmatic NetCDF composite fixture builder
//! - Sample-grid generators
//! - Approximate-equality assertion macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
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

/// Macro for checking geometry fields of imported metadata in one shot.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_field_meta_approx;
///
/// assert_field_meta_approx!(meta, x1 = 0.0, x2 = 9000.0, xpixelsize = 1000.0);
/// ```
#[macro_export]
macro_rules! assert_field_meta_approx {
    ($meta:expr, $($field:ident = $expected:expr),+ $(,)?) => {{
        $(
            $crate::assert_approx_eq!($meta.$field, $expected, 1e-6);
        )+
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
        assert_approx_eq!(-5.0_f32, -5.0_f32, 1e-9_f64);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);
    }
}
