//! In-memory precipitation fields.

use crate::{FieldError, FieldMetadata, FieldResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sample precision of an imported field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit samples.
    Single,
    /// 64-bit samples.
    Double,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Double
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

impl FromStr for Precision {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Precision::Single),
            "double" => Ok(Precision::Double),
            _ => Err(FieldError::UnknownPrecision(s.to_string())),
        }
    }
}

/// Grid samples tagged with their precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValues {
    Single(Vec<f32>),
    Double(Vec<f64>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Single(v) => v.len(),
            FieldValues::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at a flat index, widened to f64.
    pub fn get(&self, idx: usize) -> Option<f64> {
        match self {
            FieldValues::Single(v) => v.get(idx).map(|x| *x as f64),
            FieldValues::Double(v) => v.get(idx).copied(),
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            FieldValues::Single(_) => Precision::Single,
            FieldValues::Double(_) => Precision::Double,
        }
    }
}

/// A precipitation composite imported from an external file.
///
/// Samples are row-major with shape `(rows, cols)`. Row 0 is the
/// northernmost row when `metadata.yorigin` is `Upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainField {
    pub values: FieldValues,
    /// Grid shape as (rows, cols).
    pub shape: (usize, usize),
    /// Per-pixel quality on the same grid, when the source provides it.
    pub quality: Option<Vec<f64>>,
    pub metadata: FieldMetadata,
}

impl RainField {
    /// Build a field, validating value and quality counts against the shape.
    pub fn new(
        values: FieldValues,
        shape: (usize, usize),
        quality: Option<Vec<f64>>,
        metadata: FieldMetadata,
    ) -> FieldResult<Self> {
        let (rows, cols) = shape;
        if values.len() != rows * cols {
            return Err(FieldError::ShapeMismatch {
                rows,
                cols,
                actual: values.len(),
            });
        }
        if let Some(q) = &quality {
            if q.len() != rows * cols {
                return Err(FieldError::QualityShapeMismatch {
                    rows,
                    cols,
                    actual: q.len(),
                });
            }
        }
        Ok(Self {
            values,
            shape,
            quality,
            metadata,
        })
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample at (row, col), widened to f64.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.0 || col >= self.shape.1 {
            return None;
        }
        self.values.get(row * self.shape.1 + col)
    }

    /// Copy the samples out as f64 regardless of stored precision.
    pub fn values_f64(&self) -> Vec<f64> {
        match &self.values {
            FieldValues::Single(v) => v.iter().map(|x| *x as f64).collect(),
            FieldValues::Double(v) => v.clone(),
        }
    }

    /// Number of finite samples.
    pub fn finite_count(&self) -> usize {
        match &self.values {
            FieldValues::Single(v) => v.iter().filter(|x| x.is_finite()).count(),
            FieldValues::Double(v) => v.iter().filter(|x| x.is_finite()).count(),
        }
    }

    /// Largest finite sample, or None when every sample is non-finite.
    pub fn max_value(&self) -> Option<f64> {
        let mut max = f64::NEG_INFINITY;
        let mut seen = false;
        for idx in 0..self.len() {
            if let Some(v) = self.values.get(idx) {
                if v.is_finite() {
                    seen = true;
                    if v > max {
                        max = v;
                    }
                }
            }
        }
        if seen {
            Some(max)
        } else {
            None
        }
    }
}
