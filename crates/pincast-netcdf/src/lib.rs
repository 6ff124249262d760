//! NetCDF importer for PINCAST radar composites.
//!
//! Reads the rain-rate composites written by the PINCAST
//! `radar_composite_generator`: a 2-D precipitation variable (`RATE` by
//! default) on projected `x`/`y` coordinates, with the CRS attached as WKT
//! on a `spatial_ref` grid-mapping variable, an optional `QUALITY`
//! variable, and an optional `time` coordinate.
//!
//! The importer installs itself into an [`ImporterRegistry`] through
//! [`register`]; [`default_registry`] returns a registry with it already in
//! place.

pub mod crs;
pub mod reader;

use std::path::Path;

use importer::{FileKind, ImportError, ImportOptions, Importer, ImporterRegistry, Result};
use rainfield::{FieldMetadata, FieldValues, PrecipUnit, RainField, YOrigin};
use tracing::{debug, warn};

pub use reader::silence_hdf5_errors;

/// Registry name of the PINCAST importer.
pub const IMPORTER_NAME: &str = "pincast_netcdf";

/// Importer for NetCDF composites from the PINCAST
/// `radar_composite_generator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PincastNetcdfImporter;

impl PincastNetcdfImporter {
    pub fn new() -> Self {
        Self
    }

    /// Import from an in-memory NetCDF buffer.
    ///
    /// libnetcdf reads from paths, so the bytes are staged to a unique file
    /// (`/dev/shm` when available) and removed again afterwards.
    pub fn import_bytes(&self, bytes: &[u8], options: &ImportOptions) -> Result<RainField> {
        let path = reader::staging_dir().join(reader::staging_filename());
        std::fs::write(&path, bytes)?;

        let result = self.import(&path, options);

        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove staging file");
        }

        result
    }
}

impl Importer for PincastNetcdfImporter {
    fn name(&self) -> &str {
        IMPORTER_NAME
    }

    fn description(&self) -> &str {
        "Rain-rate composites from the PINCAST radar_composite_generator (NetCDF)"
    }

    fn can_import(&self, path: &Path) -> bool {
        FileKind::from_path(path) == FileKind::NetCdf
    }

    fn import(&self, path: &Path, options: &ImportOptions) -> Result<RainField> {
        let file = reader::open_composite(path)?;

        let precip = reader::read_packed_var(&file, &options.precip_var)?;
        let (rows, cols, y_dim, x_dim) = grid_shape(&precip.dims, &options.precip_var)?;

        let quality = read_quality(&file, options, rows, cols)?;

        let xs = reader::read_coord(&file, &x_dim)?;
        let ys = reader::read_coord(&file, &y_dim)?;
        let geometry = GridGeometry::from_coords(&xs, &ys, rows, cols)?;

        let crs = crs::extract_crs(&file, &options.precip_var);
        if crs.is_none() {
            debug!(path = %path.display(), "No CRS recovered, projection left unset");
        }

        let unit = precip
            .units
            .as_deref()
            .and_then(|u| u.parse::<PrecipUnit>().ok())
            .unwrap_or(PrecipUnit::MmPerHour);

        let institution = reader::global_str_attr(&file, "nc.institution")
            .or_else(|| reader::global_str_attr(&file, "institution"));

        let accutime = reader::global_f64_attr(&file, "accutime")
            .or_else(|| reader::lookup_var_f64_attr(&file, &options.precip_var, "accutime"));

        let timestamps = reader::read_timestamps(&file, "time").unwrap_or_default();

        let metadata = FieldMetadata {
            projection: crs.as_ref().map(|c| c.proj4.clone()),
            x1: geometry.x1,
            y1: geometry.y1,
            x2: geometry.x2,
            y2: geometry.y2,
            xpixelsize: geometry.xpixelsize,
            ypixelsize: geometry.ypixelsize,
            cartesian_unit: crs.and_then(|c| c.cartesian_unit),
            yorigin: geometry.yorigin,
            institution,
            unit,
            transform: None,
            accutime,
            threshold: None,
            zerovalue: 0.0,
            timestamps,
        };

        let field = RainField::new(
            FieldValues::Double(precip.data),
            (rows, cols),
            quality,
            metadata,
        )?;

        Ok(field)
    }
}

/// Install the PINCAST importer into a registry. This is the plugin hook
/// the host calls at startup.
pub fn register(registry: &mut ImporterRegistry) {
    registry.register(PincastNetcdfImporter::new());
}

/// Registry with the built-in PINCAST importer installed.
pub fn default_registry() -> ImporterRegistry {
    let mut registry = ImporterRegistry::new();
    register(&mut registry);
    registry
}

/// Reduce the precipitation variable's dimensions to a 2-D grid.
///
/// Singleton leading dimensions (a time axis of length 1) are squeezed
/// away. A leading dimension longer than 1 means a stacked file, which the
/// generator never writes, and is rejected.
fn grid_shape(
    dims: &[(String, usize)],
    var: &str,
) -> Result<(usize, usize, String, String)> {
    let mut dims = dims.to_vec();
    while dims.len() > 2 {
        let (name, len) = &dims[0];
        if *len != 1 {
            return Err(ImportError::InvalidData(format!(
                "{} has a leading dimension {} of length {}, expected a single composite",
                var, name, len
            )));
        }
        dims.remove(0);
    }

    match dims.as_slice() {
        [(y_dim, rows), (x_dim, cols)] => Ok((*rows, *cols, y_dim.clone(), x_dim.clone())),
        _ => Err(ImportError::InvalidData(format!(
            "{} is {}-dimensional, expected a 2-D grid",
            var,
            dims.len()
        ))),
    }
}

/// Read the optional quality variable. A configured name that is absent
/// yields None; a present variable must match the precipitation grid.
fn read_quality(
    file: &netcdf::File,
    options: &ImportOptions,
    rows: usize,
    cols: usize,
) -> Result<Option<Vec<f64>>> {
    let Some(name) = options.quality_var.as_deref() else {
        return Ok(None);
    };
    if file.variable(name).is_none() {
        debug!(quality_var = name, "Quality variable not in file");
        return Ok(None);
    }

    let quality = reader::read_packed_var(file, name)?;
    let (q_rows, q_cols, _, _) = grid_shape(&quality.dims, name)?;
    if (q_rows, q_cols) != (rows, cols) {
        return Err(ImportError::InvalidData(format!(
            "quality variable {} is {}x{}, precipitation grid is {}x{}",
            name, q_rows, q_cols, rows, cols
        )));
    }

    Ok(Some(quality.data))
}

/// Grid geometry derived from the cell-center coordinate arrays.
struct GridGeometry {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    xpixelsize: f64,
    ypixelsize: f64,
    yorigin: YOrigin,
}

impl GridGeometry {
    fn from_coords(xs: &[f64], ys: &[f64], rows: usize, cols: usize) -> Result<Self> {
        if xs.len() < 2 || ys.len() < 2 {
            return Err(ImportError::InvalidData(format!(
                "coordinate arrays too short ({} x, {} y), need at least 2 entries each",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() != cols || ys.len() != rows {
            return Err(ImportError::InvalidData(format!(
                "grid is {}x{} but coordinates are {} y, {} x",
                rows,
                cols,
                ys.len(),
                xs.len()
            )));
        }

        let (x1, x2) = min_max(xs);
        let (y1, y2) = min_max(ys);

        // north-up files store y descending; anything non-monotonic is
        // treated as north-up
        let yorigin = if ys.windows(2).all(|w| w[1] > w[0]) {
            YOrigin::Lower
        } else {
            YOrigin::Upper
        };

        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            xpixelsize: (xs[1] - xs[0]).abs(),
            ypixelsize: (ys[1] - ys[0]).abs(),
            yorigin,
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}
