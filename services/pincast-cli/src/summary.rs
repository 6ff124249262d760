//! Human- and JSON-facing summaries of imported fields.

use rainfield::{FieldMetadata, RainField};
use serde::Serialize;

/// Summary of one imported field, printable as text or JSON.
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub rows: usize,
    pub cols: usize,
    pub precision: String,
    pub finite_samples: usize,
    pub total_samples: usize,
    pub max_value: Option<f64>,
    pub has_quality: bool,
    pub metadata: FieldMetadata,
}

impl FieldSummary {
    pub fn from_field(field: &RainField) -> Self {
        Self {
            rows: field.rows(),
            cols: field.cols(),
            precision: field.values.precision().to_string(),
            finite_samples: field.finite_count(),
            total_samples: field.len(),
            max_value: field.max_value(),
            has_quality: field.quality.is_some(),
            metadata: field.metadata.clone(),
        }
    }

    pub fn print_human(&self) {
        let meta = &self.metadata;

        println!("Shape:       {} rows x {} cols ({})", self.rows, self.cols, self.precision);
        println!("Bounds:      {}", meta.bounds());
        println!(
            "Pixel size:  {} x {} {}",
            meta.xpixelsize,
            meta.ypixelsize,
            meta.cartesian_unit.as_deref().unwrap_or("(unknown unit)")
        );
        println!(
            "Projection:  {}",
            meta.projection.as_deref().unwrap_or("(not recovered)")
        );
        println!("Y origin:    {}", meta.yorigin);
        println!("Unit:        {}", meta.unit);
        if let Some(transform) = &meta.transform {
            println!("Transform:   {}", transform);
        }
        if let Some(accutime) = meta.accutime {
            println!("Accutime:    {} min", accutime);
        }
        if let Some(institution) = &meta.institution {
            println!("Institution: {}", institution);
        }
        if meta.timestamps.is_empty() {
            println!("Timestamps:  (none)");
        } else {
            let times: Vec<String> = meta.timestamps.iter().map(|t| t.to_rfc3339()).collect();
            println!("Timestamps:  {}", times.join(", "));
        }
        println!(
            "Samples:     {} finite of {} total",
            self.finite_samples, self.total_samples
        );
        match self.max_value {
            Some(max) => println!("Max value:   {} {}", max, meta.unit),
            None => println!("Max value:   (no finite samples)"),
        }
        if self.has_quality {
            println!("Quality:     present");
        }
    }
}
