//! NetCDF access helpers built on the netcdf crate.
//!
//! The netcdf library wraps libnetcdf/HDF5, which works on file handles. In
//! addition to the attribute and variable helpers this module carries the
//! temp-file staging used when importing from in-memory bytes; on Linux the
//! staging directory is `/dev/shm` so the round trip stays off disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use importer::{ImportError, Result};
use netcdf::AttributeValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics to stderr even for conditions the
/// Rust side handles, such as probing for attributes that are optional in
/// the file. Runs once per process; safe to call repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handlers are the documented way to disable HDF5's
        // automatic error reporting.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a composite file. A missing path reports as `FileNotFound` instead
/// of surfacing as an HDF5 open failure.
pub(crate) fn open_composite(path: &Path) -> Result<netcdf::File> {
    silence_hdf5_errors();

    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    netcdf::open(path)
        .map_err(|e| ImportError::InvalidData(format!("Failed to open NetCDF: {}", e)))
}

/// A variable read as f64 with CF packing applied.
pub(crate) struct PackedVariable {
    /// Unpacked samples; masked cells are NaN.
    pub data: Vec<f64>,
    /// Dimension names and lengths, outermost first.
    pub dims: Vec<(String, usize)>,
    /// The variable's `units` attribute, when present.
    pub units: Option<String>,
}

/// Read a variable as f64 and decode CF packing: samples equal to
/// `_FillValue` or `missing_value` become NaN, the rest are scaled by
/// `scale_factor` and shifted by `add_offset`.
pub(crate) fn read_packed_var(file: &netcdf::File, name: &str) -> Result<PackedVariable> {
    let var = file
        .variable(name)
        .ok_or_else(|| ImportError::MissingVariable(name.to_string()))?;

    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| ImportError::InvalidData(format!("Failed to read {}: {}", name, e)))?;

    let scale_factor = var_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = var_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill_value = var_f64_attr(&var, "_FillValue");
    let missing_value = var_f64_attr(&var, "missing_value");

    let data = raw
        .into_iter()
        .map(|raw| {
            if is_masked(raw, fill_value) || is_masked(raw, missing_value) {
                f64::NAN
            } else {
                raw * scale_factor + add_offset
            }
        })
        .collect();

    let dims = var
        .dimensions()
        .iter()
        .map(|d| (d.name().to_string(), d.len()))
        .collect();

    Ok(PackedVariable {
        data,
        dims,
        units: var_str_attr(&var, "units"),
    })
}

fn is_masked(raw: f64, sentinel: Option<f64>) -> bool {
    match sentinel {
        Some(s) if s.is_nan() => raw.is_nan(),
        Some(s) => raw == s,
        None => false,
    }
}

/// Read a 1-D coordinate variable.
pub(crate) fn read_coord(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| ImportError::MissingVariable(name.to_string()))?;
    var.get_values::<f64, _>(..)
        .map_err(|e| ImportError::InvalidData(format!("Failed to read {}: {}", name, e)))
}

/// Decode a CF time coordinate into UTC timestamps.
///
/// Returns None when the variable is absent or its `units` attribute is
/// missing or not understood.
pub(crate) fn read_timestamps(file: &netcdf::File, name: &str) -> Option<Vec<DateTime<Utc>>> {
    let var = file.variable(name)?;
    let units = var_str_attr(&var, "units")?;
    let (step_seconds, base) = parse_time_units(&units)?;
    let offsets: Vec<f64> = var.get_values(..).ok()?;

    Some(
        offsets
            .iter()
            .map(|&offset| {
                base + Duration::milliseconds((offset * step_seconds * 1000.0).round() as i64)
            })
            .collect(),
    )
}

/// Parse a CF units string like `"seconds since 2026-08-22 12:00:00"` into
/// the step length in seconds and the base instant.
pub(crate) fn parse_time_units(units: &str) -> Option<(f64, DateTime<Utc>)> {
    let mut parts = units.splitn(3, ' ');
    let step = parts.next()?;
    if parts.next()? != "since" {
        return None;
    }
    let instant = parts.next()?.trim().trim_end_matches(" UTC").trim();

    let step_seconds = match step.to_ascii_lowercase().as_str() {
        "seconds" | "second" | "s" => 1.0,
        "minutes" | "minute" | "min" => 60.0,
        "hours" | "hour" | "h" => 3600.0,
        "days" | "day" | "d" => 86400.0,
        _ => return None,
    };

    Some((step_seconds, parse_instant(instant)?))
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&nd.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Check for an attribute without triggering HDF5 diagnostics for names
/// that are not there.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Numeric attribute of a variable, widened to f64.
pub(crate) fn var_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

/// String attribute of a variable.
pub(crate) fn var_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut v) => {
            if v.is_empty() {
                None
            } else {
                Some(v.remove(0))
            }
        }
        _ => None,
    }
}

/// Numeric attribute that may hold one value or a list, as f64 values.
/// CF writes `standard_parallel` this way for two-parallel projections.
pub(crate) fn var_f64_list_attr(var: &netcdf::Variable, name: &str) -> Option<Vec<f64>> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(vec![v]),
        AttributeValue::Doubles(v) => Some(v),
        AttributeValue::Float(v) => Some(vec![v as f64]),
        AttributeValue::Floats(v) => Some(v.into_iter().map(|x| x as f64).collect()),
        AttributeValue::Int(v) => Some(vec![v as f64]),
        AttributeValue::Ints(v) => Some(v.into_iter().map(|x| x as f64).collect()),
        AttributeValue::Short(v) => Some(vec![v as f64]),
        AttributeValue::Shorts(v) => Some(v.into_iter().map(|x| x as f64).collect()),
        _ => None,
    }
}

/// Global string attribute of the file.
pub(crate) fn global_str_attr(file: &netcdf::File, name: &str) -> Option<String> {
    let attr = file.attribute(name)?;
    match attr.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Global numeric attribute of the file, widened to f64.
pub(crate) fn global_f64_attr(file: &netcdf::File, name: &str) -> Option<f64> {
    let attr = file.attribute(name)?;
    f64::try_from(attr.value().ok()?).ok()
}

/// Numeric attribute looked up on a named variable.
pub(crate) fn lookup_var_f64_attr(file: &netcdf::File, var: &str, name: &str) -> Option<f64> {
    let var = file.variable(var)?;
    var_f64_attr(&var, name)
}

/// Directory for staging in-memory NetCDF buffers. Prefers /dev/shm on
/// Linux when it is writable.
pub(crate) fn staging_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm = Path::new("/dev/shm");
        if shm.is_dir() {
            let probe = shm.join(format!(".pincast_probe_{}", std::process::id()));
            if std::fs::write(&probe, b"probe").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return shm.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Unique staging file name. Process id, thread id and a counter keep
/// concurrent imports apart.
pub(crate) fn staging_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("pincast_import_{}_{:?}_{}.nc", pid, tid, count)
}
