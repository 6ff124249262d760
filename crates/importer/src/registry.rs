//! Importer trait and name-keyed registry.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rainfield::RainField;
use tracing::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::options::ImportOptions;
use crate::postprocess::postprocess;

/// A named importer for one external file format.
pub trait Importer: Send + Sync {
    /// Unique registry name, e.g. `pincast_netcdf`.
    fn name(&self) -> &str;

    /// One-line human description.
    fn description(&self) -> &str;

    /// Cheap path check. Must not open the file.
    fn can_import(&self, path: &Path) -> bool;

    /// Read a file into a field. Fill and precision handling happen in
    /// [`postprocess`] after this returns.
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<RainField>;
}

/// Registry of available importers, keyed by name.
///
/// Plugins install themselves through their `register` hooks; iteration is
/// in name order so dispatch stays deterministic.
#[derive(Default)]
pub struct ImporterRegistry {
    importers: BTreeMap<String, Arc<dyn Importer>>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an importer. A previous importer with the same name is
    /// replaced.
    pub fn register<I>(&mut self, importer: I)
    where
        I: Importer + 'static,
    {
        let name = importer.name().to_string();
        if self
            .importers
            .insert(name.clone(), Arc::new(importer))
            .is_some()
        {
            warn!(importer = %name, "Replaced existing importer");
        } else {
            info!(importer = %name, "Registered importer");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Importer>> {
        self.importers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.importers.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }

    /// Iterate importers in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Importer>> {
        self.importers.values()
    }

    /// First importer whose `can_import` accepts the path, in name order.
    pub fn find_for_path(&self, path: &Path) -> Option<Arc<dyn Importer>> {
        self.importers
            .values()
            .find(|importer| importer.can_import(path))
            .cloned()
    }
}

/// Resolve an importer for the path and run a full import, post-processing
/// included.
pub fn import_file(
    registry: &ImporterRegistry,
    path: &Path,
    options: &ImportOptions,
) -> Result<RainField> {
    let importer = registry
        .find_for_path(path)
        .ok_or_else(|| ImportError::NoImporter(path.to_path_buf()))?;

    debug!(
        importer = %importer.name(),
        path = %path.display(),
        precip_var = %options.precip_var,
        "Importing file"
    );

    let field = importer.import(path, options)?;
    let field = postprocess(field, options);

    info!(
        importer = %importer.name(),
        path = %path.display(),
        rows = field.rows(),
        cols = field.cols(),
        finite = field.finite_count(),
        "Import complete"
    );

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainfield::{FieldMetadata, FieldValues, Precision};

    struct StubImporter {
        name: &'static str,
        extension: &'static str,
    }

    impl Importer for StubImporter {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn can_import(&self, path: &Path) -> bool {
            path.extension().and_then(|e| e.to_str()) == Some(self.extension)
        }

        fn import(&self, _path: &Path, _options: &ImportOptions) -> Result<RainField> {
            let field = RainField::new(
                FieldValues::Double(vec![1.0, f64::NAN]),
                (1, 2),
                None,
                FieldMetadata::default(),
            )?;
            Ok(field)
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ImporterRegistry::new();
        assert!(registry.is_empty());

        registry.register(StubImporter {
            name: "stub_nc",
            extension: "nc",
        });

        assert_eq!(registry.len(), 1);
        assert!(registry.get("stub_nc").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["stub_nc"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ImporterRegistry::new();
        registry.register(StubImporter {
            name: "stub",
            extension: "nc",
        });
        registry.register(StubImporter {
            name: "stub",
            extension: "cdf",
        });

        assert_eq!(registry.len(), 1);
        let importer = registry.get("stub").unwrap();
        assert!(importer.can_import(Path::new("a.cdf")));
        assert!(!importer.can_import(Path::new("a.nc")));
    }

    #[test]
    fn test_find_for_path_name_order() {
        let mut registry = ImporterRegistry::new();
        registry.register(StubImporter {
            name: "b_importer",
            extension: "nc",
        });
        registry.register(StubImporter {
            name: "a_importer",
            extension: "nc",
        });

        let found = registry.find_for_path(Path::new("x.nc")).unwrap();
        assert_eq!(found.name(), "a_importer");
        assert!(registry.find_for_path(Path::new("x.grib2")).is_none());
    }

    #[test]
    fn test_import_file_applies_postprocess() {
        let mut registry = ImporterRegistry::new();
        registry.register(StubImporter {
            name: "stub",
            extension: "nc",
        });

        let options = ImportOptions::default()
            .with_fill_value(0.0)
            .with_precision(Precision::Single);
        let field = import_file(&registry, Path::new("x.nc"), &options).unwrap();

        assert_eq!(field.values.precision(), Precision::Single);
        assert_eq!(field.values_f64(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_import_file_no_importer() {
        let registry = ImporterRegistry::new();
        let err = import_file(&registry, Path::new("x.nc"), &ImportOptions::default());
        assert!(matches!(err, Err(ImportError::NoImporter(_))));
    }
}
