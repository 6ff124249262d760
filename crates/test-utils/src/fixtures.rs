//! Programmatic NetCDF composite fixtures.
//!
//! [`CompositeFixture`] writes a synthetic file with the layout the PINCAST
//! `radar_composite_generator` produces: a precipitation variable on
//! `y`/`x` coordinates, a `spatial_ref` grid-mapping variable carrying the
//! CRS as WKT, and optionally CF packing, a quality variable, a `time`
//! coordinate and global attributes. Tests build the exact file they need
//! instead of shipping binary test data.

use std::path::{Path, PathBuf};

use crate::generators::gradient_grid;

/// WKT1 polar stereographic definition matching the generator's default
/// output CRS.
pub const DEFAULT_WKT: &str = r#"PROJCS["unnamed",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Polar_Stereographic"],PARAMETER["latitude_of_origin",60],PARAMETER["central_meridian",25],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]]]"#;

/// CF packing attributes for the precipitation variable.
#[derive(Debug, Clone, Copy)]
pub struct Packing {
    pub scale_factor: f64,
    pub add_offset: f64,
    pub fill_value: f64,
}

/// Builder for a synthetic PINCAST composite NetCDF file.
///
/// Defaults produce a well-formed north-up composite: a `RATE` variable
/// with gradient samples in mm/h, 1 km pixels, x starting at 0, y
/// descending to 0, and [`DEFAULT_WKT`] on a `spatial_ref` variable.
pub struct CompositeFixture {
    rows: usize,
    cols: usize,
    x0: f64,
    y0: f64,
    xpixelsize: f64,
    ypixelsize: f64,
    y_ascending: bool,
    values: Vec<f64>,
    quality: Option<Vec<f64>>,
    precip_var: String,
    quality_var: String,
    units: Option<String>,
    wkt: Option<String>,
    packing: Option<Packing>,
    time_units: Option<String>,
    time_offsets: Vec<f64>,
    time_dimension: bool,
    institution: Option<String>,
    accutime: Option<f64>,
    file_name: String,
}

impl CompositeFixture {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            x0: 0.0,
            y0: (rows.saturating_sub(1)) as f64 * 1000.0,
            xpixelsize: 1000.0,
            ypixelsize: 1000.0,
            y_ascending: false,
            values: gradient_grid(rows, cols),
            quality: None,
            precip_var: "RATE".to_string(),
            quality_var: "QUALITY".to_string(),
            units: Some("mm/h".to_string()),
            wkt: Some(DEFAULT_WKT.to_string()),
            packing: None,
            time_units: None,
            time_offsets: Vec::new(),
            time_dimension: false,
            institution: None,
            accutime: None,
            file_name: "composite.nc".to_string(),
        }
    }

    /// Replace the precipitation samples (row-major, rows x cols). NaN
    /// samples are written as the fill value when packing is configured.
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        assert_eq!(values.len(), self.rows * self.cols);
        self.values = values;
        self
    }

    /// Add a quality variable on the same grid.
    pub fn with_quality(mut self, quality: Vec<f64>) -> Self {
        assert_eq!(quality.len(), self.rows * self.cols);
        self.quality = Some(quality);
        self
    }

    pub fn with_precip_var(mut self, name: impl Into<String>) -> Self {
        self.precip_var = name.into();
        self
    }

    pub fn with_quality_var(mut self, name: impl Into<String>) -> Self {
        self.quality_var = name.into();
        self
    }

    /// Set the `units` attribute of the precipitation variable.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Write no `units` attribute.
    pub fn without_units(mut self) -> Self {
        self.units = None;
        self
    }

    pub fn with_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.wkt = Some(wkt.into());
        self
    }

    /// Write no grid-mapping variable at all.
    pub fn without_wkt(mut self) -> Self {
        self.wkt = None;
        self
    }

    /// Store samples CF-packed with the given attributes.
    pub fn with_packing(mut self, scale_factor: f64, add_offset: f64, fill_value: f64) -> Self {
        self.packing = Some(Packing {
            scale_factor,
            add_offset,
            fill_value,
        });
        self
    }

    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.x0 = x0;
        self.y0 = y0;
        self
    }

    pub fn with_pixel_size(mut self, xpixelsize: f64, ypixelsize: f64) -> Self {
        self.xpixelsize = xpixelsize;
        self.ypixelsize = ypixelsize;
        self
    }

    /// Write the y coordinate ascending (south-up) instead of descending.
    pub fn with_ascending_y(mut self) -> Self {
        self.y_ascending = true;
        self
    }

    /// Add a `time` coordinate with the given CF units string and offsets.
    pub fn with_time(mut self, units: impl Into<String>, offsets: Vec<f64>) -> Self {
        self.time_units = Some(units.into());
        self.time_offsets = offsets;
        self
    }

    /// Write the precipitation variable as `(time, y, x)` instead of
    /// `(y, x)`. Sample data is repeated per step.
    pub fn with_time_dimension(mut self) -> Self {
        self.time_dimension = true;
        self
    }

    /// Set the global `nc.institution` attribute.
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    /// Set the global `accutime` attribute, in minutes.
    pub fn with_accutime(mut self, minutes: f64) -> Self {
        self.accutime = Some(minutes);
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Write the fixture into the directory and return the file path.
    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.file_name);
        let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

        let time_len = self.time_offsets.len().max(1);
        let needs_time_dim = self.time_dimension || self.time_units.is_some();
        if needs_time_dim {
            file.add_dimension("time", time_len).expect("add dim time");
        }
        file.add_dimension("y", self.rows).expect("add dim y");
        file.add_dimension("x", self.cols).expect("add dim x");

        // Coordinate variables, cell centers.
        {
            let xs: Vec<f64> = (0..self.cols)
                .map(|i| self.x0 + i as f64 * self.xpixelsize)
                .collect();
            let mut var = file.add_variable::<f64>("x", &["x"]).expect("add var x");
            var.put_values(&xs, ..).expect("put x values");
        }
        {
            let ys: Vec<f64> = (0..self.rows)
                .map(|i| {
                    if self.y_ascending {
                        self.y0 + i as f64 * self.ypixelsize
                    } else {
                        self.y0 - i as f64 * self.ypixelsize
                    }
                })
                .collect();
            let mut var = file.add_variable::<f64>("y", &["y"]).expect("add var y");
            var.put_values(&ys, ..).expect("put y values");
        }

        if let Some(units) = &self.time_units {
            let offsets: Vec<f64> = if self.time_offsets.is_empty() {
                vec![0.0]
            } else {
                self.time_offsets.clone()
            };
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add var time");
            var.put_values(&offsets, ..).expect("put time values");
            var.put_attribute("units", units.as_str())
                .expect("add time units");
        }

        // Grid-mapping variable, the rioxarray way: a dummy variable whose
        // crs_wkt attribute carries the CRS.
        if let Some(wkt) = &self.wkt {
            let mut var = file
                .add_variable::<i32>("spatial_ref", &[])
                .expect("add var spatial_ref");
            var.put_attribute("crs_wkt", wkt.as_str())
                .expect("add crs_wkt");
        }

        // Precipitation variable.
        {
            let dims: Vec<&str> = if self.time_dimension {
                vec!["time", "y", "x"]
            } else {
                vec!["y", "x"]
            };
            let mut var = file
                .add_variable::<f64>(&self.precip_var, &dims)
                .expect("add precip var");

            if let Some(units) = &self.units {
                var.put_attribute("units", units.as_str())
                    .expect("add precip units");
            }
            if self.wkt.is_some() {
                var.put_attribute("grid_mapping", "spatial_ref")
                    .expect("add grid_mapping");
            }

            let mut samples = self.encoded_values();
            if self.time_dimension {
                let per_step = samples.clone();
                for _ in 1..time_len {
                    samples.extend_from_slice(&per_step);
                }
            }

            if let Some(packing) = &self.packing {
                var.put_attribute("scale_factor", packing.scale_factor)
                    .expect("add scale_factor");
                var.put_attribute("add_offset", packing.add_offset)
                    .expect("add add_offset");
                var.put_attribute("_FillValue", packing.fill_value)
                    .expect("add _FillValue");
            }

            var.put_values(&samples, ..).expect("put precip values");
        }

        // Optional quality variable, plain f64 on the same 2-D grid.
        if let Some(quality) = &self.quality {
            let mut var = file
                .add_variable::<f64>(&self.quality_var, &["y", "x"])
                .expect("add quality var");
            var.put_values(quality, ..).expect("put quality values");
        }

        if let Some(institution) = &self.institution {
            file.add_attribute("nc.institution", institution.as_str())
                .expect("add institution");
        }
        if let Some(accutime) = self.accutime {
            file.add_attribute("accutime", accutime)
                .expect("add accutime");
        }

        path
    }

    /// Samples as stored in the file: packed raw values with NaN cells
    /// replaced by the fill sentinel, or the physical values as-is.
    fn encoded_values(&self) -> Vec<f64> {
        match &self.packing {
            Some(packing) => self
                .values
                .iter()
                .map(|&v| {
                    if v.is_nan() {
                        packing.fill_value
                    } else {
                        (v - packing.add_offset) / packing.scale_factor
                    }
                })
                .collect(),
            None => self.values.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_default_fixture() {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(3, 4).write(dir.path());

        let file = netcdf::open(&path).unwrap();
        let rate = file.variable("RATE").unwrap();
        assert_eq!(rate.dimensions().len(), 2);
        assert!(file.variable("spatial_ref").is_some());
        assert!(file.variable("x").is_some());
        assert!(file.variable("y").is_some());
    }

    #[test]
    fn test_packing_round_trip() {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(1, 3)
            .with_values(vec![0.0, 2.5, f64::NAN])
            .with_packing(0.5, 1.0, -999.0)
            .write(dir.path());

        let file = netcdf::open(&path).unwrap();
        let raw: Vec<f64> = file.variable("RATE").unwrap().get_values(..).unwrap();
        // (v - offset) / scale
        assert_eq!(raw, vec![-2.0, 3.0, -999.0]);
    }

    #[test]
    fn test_time_dimension_repeats_samples() {
        let dir = tempdir().unwrap();
        let path = CompositeFixture::new(2, 2)
            .with_time("minutes since 2026-08-22 12:00:00", vec![0.0, 5.0])
            .with_time_dimension()
            .write(dir.path());

        let file = netcdf::open(&path).unwrap();
        let rate = file.variable("RATE").unwrap();
        assert_eq!(rate.dimensions().len(), 3);
        assert_eq!(rate.dimensions()[0].len(), 2);
    }
}
