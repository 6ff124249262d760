//! Rain-field data model shared across the import pipeline.
//!
//! A [`RainField`] is what an importer produces: a 2-D precipitation grid
//! with optional per-pixel quality and the geospatial metadata downstream
//! nowcasting code needs to interpret it.

pub mod bounds;
pub mod error;
pub mod field;
pub mod metadata;

pub use bounds::FieldBounds;
pub use error::{FieldError, FieldResult};
pub use field::{FieldValues, Precision, RainField};
pub use metadata::{FieldMetadata, PrecipUnit, ValueTransform, YOrigin};
