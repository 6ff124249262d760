//! Geospatial and physical metadata attached to imported fields.
//!
//! The field set mirrors the metadata contract nowcasting pipelines expect
//! from an importer: grid geometry, CRS, physical unit, transform state and
//! valid times.

use crate::{FieldBounds, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical unit of precipitation samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecipUnit {
    /// Rain rate, millimeters per hour.
    #[serde(rename = "mm/h")]
    MmPerHour,
    /// Accumulated depth, millimeters.
    #[serde(rename = "mm")]
    Mm,
    /// Radar reflectivity.
    #[serde(rename = "dBZ")]
    Dbz,
}

impl fmt::Display for PrecipUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecipUnit::MmPerHour => write!(f, "mm/h"),
            PrecipUnit::Mm => write!(f, "mm"),
            PrecipUnit::Dbz => write!(f, "dBZ"),
        }
    }
}

impl FromStr for PrecipUnit {
    type Err = FieldError;

    /// Normalize the spellings seen in radar product files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm/h" | "mm/hr" | "mm h-1" | "mm h^-1" | "mm.h-1" | "mmh" => Ok(PrecipUnit::MmPerHour),
            "mm" => Ok(PrecipUnit::Mm),
            "dbz" => Ok(PrecipUnit::Dbz),
            _ => Err(FieldError::UnknownUnit(s.to_string())),
        }
    }
}

/// Statistical transform applied to the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueTransform {
    #[serde(rename = "dB")]
    Db,
    #[serde(rename = "BoxCox")]
    BoxCox,
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "sqrt")]
    Sqrt,
}

impl fmt::Display for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTransform::Db => write!(f, "dB"),
            ValueTransform::BoxCox => write!(f, "BoxCox"),
            ValueTransform::Log => write!(f, "log"),
            ValueTransform::Sqrt => write!(f, "sqrt"),
        }
    }
}

impl FromStr for ValueTransform {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "db" => Ok(ValueTransform::Db),
            "boxcox" | "box-cox" => Ok(ValueTransform::BoxCox),
            "log" => Ok(ValueTransform::Log),
            "sqrt" => Ok(ValueTransform::Sqrt),
            _ => Err(FieldError::UnknownTransform(s.to_string())),
        }
    }
}

/// Vertical orientation of the grid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YOrigin {
    /// Row 0 is the northernmost row.
    Upper,
    /// Row 0 is the southernmost row.
    Lower,
}

impl fmt::Display for YOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YOrigin::Upper => write!(f, "upper"),
            YOrigin::Lower => write!(f, "lower"),
        }
    }
}

impl FromStr for YOrigin {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" => Ok(YOrigin::Upper),
            "lower" => Ok(YOrigin::Lower),
            _ => Err(FieldError::UnknownYOrigin(s.to_string())),
        }
    }
}

/// Metadata an importer attaches to every field it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// PROJ.4 definition of the grid CRS, when it could be recovered.
    pub projection: Option<String>,
    /// Smallest x cell-center coordinate.
    pub x1: f64,
    /// Smallest y cell-center coordinate.
    pub y1: f64,
    /// Largest x cell-center coordinate.
    pub x2: f64,
    /// Largest y cell-center coordinate.
    pub y2: f64,
    /// Cell width in CRS units.
    pub xpixelsize: f64,
    /// Cell height in CRS units.
    pub ypixelsize: f64,
    /// Linear unit of the CRS axes, e.g. "m".
    pub cartesian_unit: Option<String>,
    pub yorigin: YOrigin,
    /// Producing institution, from the file's global attributes.
    pub institution: Option<String>,
    pub unit: PrecipUnit,
    /// Transform applied to the samples. None means plain rates or depths.
    pub transform: Option<ValueTransform>,
    /// Accumulation or compositing interval in minutes.
    pub accutime: Option<f64>,
    /// Minimum detectable value, when known.
    pub threshold: Option<f64>,
    /// The value that represents no precipitation.
    pub zerovalue: f64,
    /// Valid times decoded from the file's time coordinate.
    pub timestamps: Vec<DateTime<Utc>>,
}

impl Default for FieldMetadata {
    fn default() -> Self {
        Self {
            projection: None,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            xpixelsize: 0.0,
            ypixelsize: 0.0,
            cartesian_unit: None,
            yorigin: YOrigin::Upper,
            institution: None,
            unit: PrecipUnit::MmPerHour,
            transform: None,
            accutime: None,
            threshold: None,
            zerovalue: 0.0,
            timestamps: Vec::new(),
        }
    }
}

impl FieldMetadata {
    /// Grid extent as a bounds value.
    pub fn bounds(&self) -> FieldBounds {
        FieldBounds::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Check that the corner span agrees with the pixel sizes for a grid of
    /// the given shape, within half a pixel.
    pub fn grid_shape_consistent(&self, rows: usize, cols: usize) -> bool {
        if rows < 2 || cols < 2 {
            return true;
        }
        let x_span = self.x2 - self.x1;
        let y_span = self.y2 - self.y1;
        let x_expected = (cols - 1) as f64 * self.xpixelsize;
        let y_expected = (rows - 1) as f64 * self.ypixelsize;
        (x_span - x_expected).abs() <= self.xpixelsize * 0.5
            && (y_span - y_expected).abs() <= self.ypixelsize * 0.5
    }
}
