//! Subcommand implementations.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use importer::{import_file, ImportOptions, ImporterRegistry};
use rainfield::Precision;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::summary::FieldSummary;

/// `pincast importers`: list what the registry knows.
pub fn importers(registry: &ImporterRegistry) -> Result<()> {
    if registry.is_empty() {
        println!("No importers registered");
        return Ok(());
    }

    for importer in registry.iter() {
        println!("{:<20} {}", importer.name(), importer.description());
    }
    Ok(())
}

/// `pincast info`: import with defaults and print the summary.
pub fn info(registry: &ImporterRegistry, file: &Path, json: bool) -> Result<()> {
    let field = import_file(registry, file, &ImportOptions::default())
        .with_context(|| format!("failed to import {}", file.display()))?;

    let summary = FieldSummary::from_field(&field);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("File:        {}", file.display());
        summary.print_human();
    }
    Ok(())
}

/// `pincast import`: full import with explicit options.
#[allow(clippy::too_many_arguments)]
pub fn import(
    registry: &ImporterRegistry,
    file: &Path,
    precip_var: &str,
    quality_var: Option<&str>,
    precision: &str,
    fill_value: Option<f64>,
    json: bool,
) -> Result<()> {
    let precision: Precision = precision
        .parse()
        .with_context(|| format!("invalid precision {:?}", precision))?;

    let mut options = ImportOptions::default()
        .with_precip_var(precip_var)
        .with_precision(precision);
    if let Some(quality_var) = quality_var {
        options = options.with_quality_var(quality_var);
    }
    if let Some(fill) = fill_value {
        options = options.with_fill_value(fill);
    }

    let field = import_file(registry, file, &options)
        .with_context(|| format!("failed to import {}", file.display()))?;

    let summary = FieldSummary::from_field(&field);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Imported {}", file.display());
        summary.print_human();
    }
    Ok(())
}

/// `pincast scan`: walk a directory, import every candidate file, report
/// the tally. Fails when any candidate fails to import.
pub fn scan(registry: &ImporterRegistry, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(anyhow!("{} is not a directory", dir.display()));
    }

    let mut candidates = 0usize;
    let mut imported = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let Some(importer) = registry.find_for_path(path) else {
            skipped += 1;
            continue;
        };
        candidates += 1;

        match import_file(registry, path, &ImportOptions::default()) {
            Ok(field) => {
                imported += 1;
                info!(
                    path = %path.display(),
                    importer = %importer.name(),
                    rows = field.rows(),
                    cols = field.cols(),
                    "Imported"
                );
                println!(
                    "ok   {} ({}x{}, {} finite)",
                    path.display(),
                    field.rows(),
                    field.cols(),
                    field.finite_count()
                );
            }
            Err(e) => {
                failed += 1;
                warn!(path = %path.display(), error = %e, "Import failed");
                println!("FAIL {} ({})", path.display(), e);
            }
        }
    }

    println!(
        "{} candidate(s): {} imported, {} failed, {} other file(s) skipped",
        candidates, imported, failed, skipped
    );

    if failed > 0 {
        return Err(anyhow!("{} of {} imports failed", failed, candidates));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_utils::CompositeFixture;

    #[test]
    fn test_scan_counts_and_fails_on_bad_file() {
        let dir = tempdir().unwrap();
        CompositeFixture::new(2, 3)
            .with_file_name("good.nc")
            .write(dir.path());
        std::fs::write(dir.path().join("bad.nc"), b"not netcdf").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let registry = pincast_netcdf::default_registry();
        let err = scan(&registry, dir.path());
        assert!(err.is_err());
    }

    #[test]
    fn test_scan_all_good() {
        let dir = tempdir().unwrap();
        CompositeFixture::new(2, 3)
            .with_file_name("a.nc")
            .write(dir.path());
        CompositeFixture::new(4, 4)
            .with_file_name("b.nc")
            .write(dir.path());

        let registry = pincast_netcdf::default_registry();
        assert!(scan(&registry, dir.path()).is_ok());
    }

    #[test]
    fn test_scan_rejects_non_directory() {
        let registry = pincast_netcdf::default_registry();
        assert!(scan(&registry, Path::new("/no/such/dir")).is_err());
    }

    #[test]
    fn test_info_on_fixture() {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(2, 3).write(dir.path());

        let registry = pincast_netcdf::default_registry();
        assert!(info(&registry, &path, false).is_ok());
        assert!(info(&registry, &path, true).is_ok());
    }

    #[test]
    fn test_import_rejects_bad_precision() {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(2, 3).write(dir.path());

        let registry = pincast_netcdf::default_registry();
        let err = import(&registry, &path, "RATE", None, "half", None, false);
        assert!(err.is_err());
    }
}
