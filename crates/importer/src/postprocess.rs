//! Post-import normalization of fields.
//!
//! Importers return samples in the precision they read. This step applies
//! the caller's options so every import path hands back the same dtype
//! behavior: optional non-finite fill first, then the precision cast.

use crate::options::ImportOptions;
use rainfield::{FieldValues, Precision, RainField};

/// Apply fill and precision options to an imported field.
///
/// The returned field's values always match `options.precision`. Quality
/// samples are left exactly as the importer read them.
pub fn postprocess(mut field: RainField, options: &ImportOptions) -> RainField {
    if let Some(fill) = options.fill_value {
        fill_non_finite(&mut field.values, fill);
    }
    field.values = cast_values(field.values, options.precision);
    field
}

fn fill_non_finite(values: &mut FieldValues, fill: f64) {
    match values {
        FieldValues::Single(v) => {
            let fill = fill as f32;
            for x in v.iter_mut() {
                if !x.is_finite() {
                    *x = fill;
                }
            }
        }
        FieldValues::Double(v) => {
            for x in v.iter_mut() {
                if !x.is_finite() {
                    *x = fill;
                }
            }
        }
    }
}

fn cast_values(values: FieldValues, precision: Precision) -> FieldValues {
    match (values, precision) {
        (FieldValues::Single(v), Precision::Double) => {
            FieldValues::Double(v.into_iter().map(|x| x as f64).collect())
        }
        (FieldValues::Double(v), Precision::Single) => {
            FieldValues::Single(v.into_iter().map(|x| x as f32).collect())
        }
        (values, _) => values,
    }
}
