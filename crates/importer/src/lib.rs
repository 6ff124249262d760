//! Importer abstraction for rain-field products.
//!
//! An [`Importer`] reads one external file format into a
//! [`rainfield::RainField`]. Importers register by name in an
//! [`ImporterRegistry`]; callers either pick one explicitly or let
//! [`import_file`] dispatch on the path. After the importer returns,
//! [`postprocess`] applies the caller's fill and precision options so every
//! import path produces fields with uniform dtype handling.

pub mod error;
pub mod format;
pub mod options;
pub mod postprocess;
pub mod registry;

pub use error::{ImportError, Result};
pub use format::FileKind;
pub use options::ImportOptions;
pub use postprocess::postprocess;
pub use registry::{import_file, Importer, ImporterRegistry};
