//! Grid extent in projected coordinates.

use crate::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangular extent of a rain-field grid in CRS units.
///
/// Corners are cell-center coordinates: `(x1, y1)` is the lower-left
/// center, `(x2, y2)` the upper-right center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl FieldBounds {
    /// Create bounds from corner coordinates.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Check if a point lies within this extent.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Check corner ordering. `x1 < x2` and `y1 < y2` must hold.
    pub fn validate(&self) -> FieldResult<()> {
        if !(self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite())
        {
            return Err(FieldError::InvalidBounds(format!(
                "non-finite corner in {}",
                self
            )));
        }
        if self.x1 >= self.x2 || self.y1 >= self.y2 {
            return Err(FieldError::InvalidBounds(format!(
                "corners out of order in {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FieldBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}
