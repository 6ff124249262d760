//! Per-call import configuration.

use rainfield::Precision;
use serde::{Deserialize, Serialize};

/// Options for an import operation.
///
/// The defaults match the composite files the PINCAST generator writes:
/// rain rate in a variable named `RATE`, no quality read, double precision
/// output, non-finite samples kept as NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Variable holding the precipitation samples.
    pub precip_var: String,
    /// Quality variable to read alongside, when set.
    pub quality_var: Option<String>,
    /// Output sample precision.
    pub precision: Precision,
    /// When set, non-finite samples are replaced with this value after
    /// import.
    pub fill_value: Option<f64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            precip_var: "RATE".to_string(),
            quality_var: None,
            precision: Precision::default(),
            fill_value: None,
        }
    }
}

impl ImportOptions {
    pub fn with_precip_var(mut self, name: impl Into<String>) -> Self {
        self.precip_var = name.into();
        self
    }

    pub fn with_quality_var(mut self, name: impl Into<String>) -> Self {
        self.quality_var = Some(name.into());
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_fill_value(mut self, fill: f64) -> Self {
        self.fill_value = Some(fill);
        self
    }
}
