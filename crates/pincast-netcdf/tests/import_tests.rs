//! End-to-end imports of synthetic PINCAST composites.
//!
//! Every test writes the exact NetCDF file it needs through the
//! `CompositeFixture` builder and imports it back through the public
//! importer surface.

use chrono::{TimeZone, Utc};
use importer::{import_file, ImportError, ImportOptions, Importer};
use pincast_netcdf::PincastNetcdfImporter;
use rainfield::{Precision, YOrigin};
use tempfile::tempdir;
use test_utils::{assert_approx_eq, assert_field_meta_approx, gradient_grid, CompositeFixture};

fn import_default(fixture: CompositeFixture) -> rainfield::RainField {
    let dir = tempdir().unwrap();
    let path = fixture.write(dir.path());
    PincastNetcdfImporter::new()
        .import(&path, &ImportOptions::default())
        .unwrap()
}

#[test]
fn imports_default_composite() {
    let field = import_default(CompositeFixture::new(3, 4));

    assert_eq!(field.shape, (3, 4));
    assert_eq!(field.values.precision(), Precision::Double);
    assert_eq!(field.values_f64(), gradient_grid(3, 4));
    assert!(field.quality.is_none());

    let meta = &field.metadata;
    assert_field_meta_approx!(
        meta,
        x1 = 0.0,
        x2 = 3000.0,
        y1 = 0.0,
        y2 = 2000.0,
        xpixelsize = 1000.0,
        ypixelsize = 1000.0,
    );
    assert_eq!(meta.yorigin, YOrigin::Upper);
    assert_eq!(meta.unit, rainfield::PrecipUnit::MmPerHour);
    assert_eq!(meta.transform, None);
    assert_eq!(meta.zerovalue, 0.0);
    assert_eq!(meta.threshold, None);
    assert!(meta.timestamps.is_empty());
}

#[test]
fn recovers_polar_stereographic_crs() {
    let field = import_default(CompositeFixture::new(2, 2));
    let meta = &field.metadata;

    assert_eq!(
        meta.projection.as_deref(),
        Some("+proj=stere +lat_0=90 +lat_ts=60 +lon_0=25 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs")
    );
    assert_eq!(meta.cartesian_unit.as_deref(), Some("m"));
}

#[test]
fn missing_crs_leaves_projection_unset() {
    let field = import_default(CompositeFixture::new(2, 2).without_wkt());

    assert_eq!(field.metadata.projection, None);
    assert_eq!(field.metadata.cartesian_unit, None);
}

#[test]
fn garbage_wkt_degrades_to_no_projection() {
    let field = import_default(CompositeFixture::new(2, 2).with_wkt("COMPD_CS[nonsense"));
    assert_eq!(field.metadata.projection, None);
}

#[test]
fn decodes_cf_packing() {
    let field = import_default(
        CompositeFixture::new(1, 4)
            .with_values(vec![0.0, 0.5, 12.5, f64::NAN])
            .with_packing(0.5, 0.0, -999.0),
    );

    let values = field.values_f64();
    assert_approx_eq!(values[0], 0.0, 1e-9);
    assert_approx_eq!(values[1], 0.5, 1e-9);
    assert_approx_eq!(values[2], 12.5, 1e-9);
    assert!(values[3].is_nan());
}

#[test]
fn reads_quality_when_configured() {
    let quality: Vec<f64> = vec![0.9, 0.8, 0.7, 0.6, 0.5, 0.4];
    let field = {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(2, 3)
            .with_quality(quality.clone())
            .write(dir.path());
        PincastNetcdfImporter::new()
            .import(
                &path,
                &ImportOptions::default().with_quality_var("QUALITY"),
            )
            .unwrap()
    };

    assert_eq!(field.quality, Some(quality));
}

#[test]
fn absent_quality_variable_is_none() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(2, 3).write(dir.path());

    let field = PincastNetcdfImporter::new()
        .import(
            &path,
            &ImportOptions::default().with_quality_var("QUALITY"),
        )
        .unwrap();

    assert!(field.quality.is_none());
}

#[test]
fn quality_shape_mismatch_is_invalid_data() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(2, 3).write(dir.path());

    // the x coordinate variable exists but is not a 2-D grid
    let err = PincastNetcdfImporter::new().import(
        &path,
        &ImportOptions::default().with_quality_var("x"),
    );
    assert!(matches!(err, Err(ImportError::InvalidData(_))));
}

#[test]
fn missing_precip_variable() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(2, 2).write(dir.path());

    let err = PincastNetcdfImporter::new().import(
        &path,
        &ImportOptions::default().with_precip_var("PRECIP"),
    );
    assert!(matches!(err, Err(ImportError::MissingVariable(v)) if v == "PRECIP"));
}

#[test]
fn squeezes_singleton_time_dimension() {
    let field = import_default(
        CompositeFixture::new(2, 3)
            .with_time("minutes since 2026-08-22 12:00:00", vec![0.0])
            .with_time_dimension(),
    );

    assert_eq!(field.shape, (2, 3));
    assert_eq!(
        field.metadata.timestamps,
        vec![Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap()]
    );
}

#[test]
fn rejects_stacked_time_dimension() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(2, 3)
        .with_time("minutes since 2026-08-22 12:00:00", vec![0.0, 5.0])
        .with_time_dimension()
        .write(dir.path());

    let err = PincastNetcdfImporter::new().import(&path, &ImportOptions::default());
    assert!(matches!(err, Err(ImportError::InvalidData(_))));
}

#[test]
fn decodes_time_coordinate_without_time_dimension() {
    let field = import_default(
        CompositeFixture::new(2, 2).with_time("seconds since 2026-08-22 12:00:00", vec![300.0]),
    );

    assert_eq!(
        field.metadata.timestamps,
        vec![Utc.with_ymd_and_hms(2026, 8, 22, 12, 5, 0).unwrap()]
    );
}

#[test]
fn reads_institution_and_accutime() {
    let field = import_default(
        CompositeFixture::new(2, 2)
            .with_institution("Finnish Meteorological Institute")
            .with_accutime(5.0),
    );

    assert_eq!(
        field.metadata.institution.as_deref(),
        Some("Finnish Meteorological Institute")
    );
    assert_eq!(field.metadata.accutime, Some(5.0));
}

#[test]
fn ascending_y_is_lower_origin() {
    let field = import_default(
        CompositeFixture::new(3, 2)
            .with_origin(0.0, 0.0)
            .with_ascending_y(),
    );

    assert_eq!(field.metadata.yorigin, YOrigin::Lower);
    assert_field_meta_approx!(field.metadata, y1 = 0.0, y2 = 2000.0);
}

#[test]
fn normalizes_unit_spelling() {
    let field = import_default(CompositeFixture::new(2, 2).with_units("mm h-1"));
    assert_eq!(field.metadata.unit, rainfield::PrecipUnit::MmPerHour);
}

#[test]
fn unknown_unit_defaults_to_mm_per_hour() {
    let field = import_default(CompositeFixture::new(2, 2).with_units("furlongs"));
    assert_eq!(field.metadata.unit, rainfield::PrecipUnit::MmPerHour);
}

#[test]
fn import_bytes_round_trip() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(2, 3).write(dir.path());
    let bytes = std::fs::read(&path).unwrap();

    let field = PincastNetcdfImporter::new()
        .import_bytes(&bytes, &ImportOptions::default())
        .unwrap();

    assert_eq!(field.shape, (2, 3));
    assert_eq!(field.values_f64(), gradient_grid(2, 3));
}

#[test]
fn registry_dispatch_applies_postprocess() {
    let dir = tempdir().unwrap();
    let path = CompositeFixture::new(1, 3)
        .with_values(vec![1.0, f64::NAN, 3.0])
        .with_packing(1.0, 0.0, -999.0)
        .write(dir.path());

    let registry = pincast_netcdf::default_registry();
    let options = ImportOptions::default()
        .with_fill_value(0.0)
        .with_precision(Precision::Single);
    let field = import_file(&registry, &path, &options).unwrap();

    assert_eq!(field.values.precision(), Precision::Single);
    assert_eq!(field.values_f64(), vec![1.0, 0.0, 3.0]);
}

#[test]
fn corrupt_file_is_invalid_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.nc");
    std::fs::write(&path, b"definitely not netcdf").unwrap();

    let err = PincastNetcdfImporter::new().import(&path, &ImportOptions::default());
    assert!(matches!(err, Err(ImportError::InvalidData(_))));
}
