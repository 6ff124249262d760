//! CRS recovery for composite grids.
//!
//! Composites carry their CRS the rioxarray way: a scalar grid-mapping
//! variable (usually `spatial_ref`) whose `crs_wkt` attribute holds the CRS
//! as WKT. That WKT is parsed here, without GDAL, into the PROJ.4 string
//! and axis unit downstream code expects. Files without WKT fall back to
//! plain CF grid-mapping attributes. Either route failing leaves the CRS
//! unset rather than failing the import.

use tracing::debug;

use crate::reader;

/// CRS of a composite grid.
pub(crate) struct CrsInfo {
    /// PROJ.4 definition.
    pub proj4: String,
    /// Linear unit of the projected axes, e.g. "m". None for geographic
    /// CRS.
    pub cartesian_unit: Option<String>,
}

/// Recover the CRS attached to the precipitation variable's grid.
pub(crate) fn extract_crs(file: &netcdf::File, precip_var: &str) -> Option<CrsInfo> {
    let mapping = find_grid_mapping(file, precip_var)?;

    let wkt = reader::var_str_attr(&mapping, "crs_wkt")
        .or_else(|| reader::var_str_attr(&mapping, "spatial_ref"));
    if let Some(wkt) = wkt {
        if let Some(info) = crs_from_wkt(&wkt) {
            return Some(info);
        }
        debug!("CRS WKT not understood, trying grid mapping attributes");
    }

    crs_from_cf_var(&mapping)
}

/// Locate the grid-mapping variable: the precipitation variable's
/// `grid_mapping` attribute first, then a variable named `spatial_ref`,
/// then any variable carrying CRS attributes.
fn find_grid_mapping<'f>(file: &'f netcdf::File, precip_var: &str) -> Option<netcdf::Variable<'f>> {
    if let Some(precip) = file.variable(precip_var) {
        if let Some(attr) = reader::var_str_attr(&precip, "grid_mapping") {
            // the extended form is "name: coord coord"
            let name = attr.split_whitespace().next().unwrap_or("");
            let name = name.trim_end_matches(':');
            if let Some(var) = file.variable(name) {
                return Some(var);
            }
        }
    }

    if let Some(var) = file.variable("spatial_ref") {
        return Some(var);
    }

    file.variables().find(|var| {
        reader::has_attr(var, "crs_wkt")
            || reader::has_attr(var, "grid_mapping_name")
            || reader::has_attr(var, "spatial_ref")
    })
}

// =============================================================================
// WKT route
// =============================================================================

#[derive(Debug, Clone)]
enum WktValue {
    Str(String),
    Num(f64),
    Word(String),
    Node(WktNode),
}

/// One `KEYWORD[...]` element of a WKT definition.
#[derive(Debug, Clone)]
struct WktNode {
    keyword: String,
    items: Vec<WktValue>,
}

impl WktNode {
    /// First quoted string item, by WKT convention the entity name.
    fn name(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            WktValue::Str(s) => Some(s.as_str()),
            _ => None,
        })
    }

    fn first_num(&self) -> Option<f64> {
        self.items.iter().find_map(|item| match item {
            WktValue::Num(n) => Some(*n),
            _ => None,
        })
    }

    fn nums(&self) -> Vec<f64> {
        self.items
            .iter()
            .filter_map(|item| match item {
                WktValue::Num(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Direct child node with the keyword.
    fn child(&self, keyword: &str) -> Option<&WktNode> {
        self.children(keyword).next()
    }

    fn children<'a, 'k>(
        &'a self,
        keyword: &'k str,
    ) -> impl Iterator<Item = &'a WktNode> + use<'a, 'k> {
        self.items.iter().filter_map(move |item| match item {
            WktValue::Node(node) if node.keyword == keyword => Some(node),
            _ => None,
        })
    }

    /// Depth-first search for a node with the keyword.
    fn find(&self, keyword: &str) -> Option<&WktNode> {
        if self.keyword == keyword {
            return Some(self);
        }
        for item in &self.items {
            if let WktValue::Node(node) = item {
                if let Some(found) = node.find(keyword) {
                    return Some(found);
                }
            }
        }
        None
    }
}

struct WktParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

/// Parse a WKT1 or WKT2 definition into its node tree. Both bracket styles
/// are accepted; keywords are uppercased.
fn parse_wkt(input: &str) -> Option<WktNode> {
    let mut parser = WktParser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    parser.skip_ws();
    let keyword = parser.ident()?;
    parser.node_body(keyword)
}

impl WktParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(
            std::str::from_utf8(&self.bytes[start..self.pos])
                .ok()?
                .to_ascii_uppercase(),
        )
    }

    /// Parse `[...]` or `(...)` after the keyword has been consumed.
    fn node_body(&mut self, keyword: String) -> Option<WktNode> {
        self.skip_ws();
        let close = match self.bump()? {
            b'[' => b']',
            b'(' => b')',
            _ => return None,
        };

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek()? {
                c if c == close => {
                    self.pos += 1;
                    break;
                }
                b',' => {
                    self.pos += 1;
                }
                _ => items.push(self.value()?),
            }
        }

        Some(WktNode { keyword, items })
    }

    fn value(&mut self) -> Option<WktValue> {
        match self.peek()? {
            b'"' => self.quoted().map(WktValue::Str),
            c if c == b'-' || c == b'+' || c == b'.' || c.is_ascii_digit() => {
                self.number().map(WktValue::Num)
            }
            _ => {
                let ident = self.ident()?;
                self.skip_ws();
                match self.peek() {
                    Some(b'[') | Some(b'(') => self.node_body(ident).map(WktValue::Node),
                    _ => Some(WktValue::Word(ident)),
                }
            }
        }
    }

    fn quoted(&mut self) -> Option<String> {
        self.bump();
        let mut out = Vec::new();
        loop {
            match self.bump()? {
                b'"' => {
                    // a doubled quote escapes a literal quote
                    if self.peek() == Some(b'"') {
                        self.pos += 1;
                        out.push(b'"');
                    } else {
                        break;
                    }
                }
                c => out.push(c),
            }
        }
        String::from_utf8(out).ok()
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }
}

/// Build CRS info from a WKT1 or WKT2 definition.
fn crs_from_wkt(wkt: &str) -> Option<CrsInfo> {
    let root = parse_wkt(wkt)?;

    match root.keyword.as_str() {
        "PROJCS" | "PROJCRS" | "PROJECTEDCRS" => projected_crs(&root),
        "GEOGCS" | "GEOGCRS" | "GEOGRAPHICCRS" => {
            let mut parts = vec!["+proj=longlat".to_string()];
            parts.extend(datum_parts(&root));
            parts.push("+no_defs".to_string());
            Some(CrsInfo {
                proj4: parts.join(" "),
                cartesian_unit: None,
            })
        }
        _ => None,
    }
}

fn projected_crs(root: &WktNode) -> Option<CrsInfo> {
    let method = projection_method(root)?;
    let spec = ProjectionSpec {
        method: normalize(&method),
        params: projection_params(root),
    };

    let mut parts = proj4_projection_parts(&spec)?;
    parts.push(format!(
        "+x_0={}",
        spec.param(&["false_easting", "easting_at_projection_centre", "easting_at_false_origin"])
            .unwrap_or(0.0)
    ));
    parts.push(format!(
        "+y_0={}",
        spec.param(&[
            "false_northing",
            "northing_at_projection_centre",
            "northing_at_false_origin"
        ])
        .unwrap_or(0.0)
    ));
    parts.extend(datum_parts(root));

    let (unit_name, unit_factor) = linear_unit(root);
    let cartesian_unit = unit_name.as_deref().map(|n| unit_short_name(n, unit_factor));
    if let Some(short) = &cartesian_unit {
        match short.as_str() {
            "m" | "km" | "ft" | "us-ft" => parts.push(format!("+units={}", short)),
            _ => {
                if let Some(factor) = unit_factor {
                    parts.push(format!("+to_meter={}", factor));
                }
            }
        }
    }

    parts.push("+no_defs".to_string());

    Some(CrsInfo {
        proj4: parts.join(" "),
        cartesian_unit,
    })
}

/// Projection method name: WKT1 `PROJECTION`, WKT2 `CONVERSION > METHOD`.
fn projection_method(root: &WktNode) -> Option<String> {
    if let Some(projection) = root.child("PROJECTION") {
        return projection.name().map(|s| s.to_string());
    }
    root.find("METHOD")?.name().map(|s| s.to_string())
}

fn projection_params(root: &WktNode) -> Vec<(String, f64)> {
    let mut params = Vec::new();
    collect_params(root, &mut params);
    params
}

fn collect_params(node: &WktNode, params: &mut Vec<(String, f64)>) {
    if node.keyword == "PARAMETER" {
        if let (Some(name), Some(value)) = (node.name(), node.first_num()) {
            params.push((normalize(name), value));
        }
        return;
    }
    for item in &node.items {
        if let WktValue::Node(child) = item {
            collect_params(child, params);
        }
    }
}

struct ProjectionSpec {
    method: String,
    params: Vec<(String, f64)>,
}

impl ProjectionSpec {
    /// First parameter matching any of the normalized names.
    fn param(&self, names: &[&str]) -> Option<f64> {
        names.iter().find_map(|name| {
            self.params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| *value)
        })
    }
}

/// The `+proj` fragment and its latitude/longitude parameters.
///
/// Covers the mappings the composite generator emits. WKT1 and WKT2 spell
/// parameters differently, so every lookup lists both names.
fn proj4_projection_parts(spec: &ProjectionSpec) -> Option<Vec<String>> {
    let method = spec.method.as_str();
    let mut parts = Vec::new();

    if method.contains("polar_stereographic") {
        parts.push("+proj=stere".to_string());
        let lat = spec.param(&[
            "latitude_of_origin",
            "latitude_of_natural_origin",
            "latitude_of_standard_parallel",
            "standard_parallel_1",
            "latitude_of_projection_origin",
        ]);
        let pole = if lat.unwrap_or(90.0) < 0.0 { -90.0 } else { 90.0 };
        parts.push(format!("+lat_0={}", pole));
        if let Some(lat) = lat {
            if lat.abs() < 90.0 {
                parts.push(format!("+lat_ts={}", lat));
            }
        }
        if let Some(k) = spec.param(&["scale_factor", "scale_factor_at_natural_origin"]) {
            if k != 1.0 {
                parts.push(format!("+k={}", k));
            }
        }
        parts.push(format!(
            "+lon_0={}",
            spec.param(&[
                "central_meridian",
                "longitude_of_origin",
                "longitude_of_natural_origin",
                "straight_vertical_longitude_from_pole",
            ])
            .unwrap_or(0.0)
        ));
    } else if method.contains("lambert_conformal") {
        parts.push("+proj=lcc".to_string());
        let lat_0 = spec
            .param(&[
                "latitude_of_origin",
                "latitude_of_natural_origin",
                "latitude_of_false_origin",
                "latitude_of_projection_origin",
            ])
            .unwrap_or(0.0);
        let lat_1 = spec
            .param(&["standard_parallel_1", "latitude_of_1st_standard_parallel"])
            .unwrap_or(lat_0);
        let lat_2 = spec
            .param(&["standard_parallel_2", "latitude_of_2nd_standard_parallel"])
            .unwrap_or(lat_1);
        parts.push(format!("+lat_0={}", lat_0));
        parts.push(format!("+lat_1={}", lat_1));
        parts.push(format!("+lat_2={}", lat_2));
        if let Some(k) = spec.param(&["scale_factor", "scale_factor_at_natural_origin"]) {
            if k != 1.0 {
                parts.push(format!("+k_0={}", k));
            }
        }
        parts.push(format!(
            "+lon_0={}",
            spec.param(&[
                "central_meridian",
                "longitude_of_central_meridian",
                "longitude_of_false_origin",
                "longitude_of_natural_origin",
                "longitude_of_origin",
            ])
            .unwrap_or(0.0)
        ));
    } else if method.contains("azimuthal_equal_area") {
        parts.push("+proj=laea".to_string());
        parts.push(format!(
            "+lat_0={}",
            spec.param(&[
                "latitude_of_center",
                "latitude_of_natural_origin",
                "latitude_of_projection_origin",
                "latitude_of_origin",
            ])
            .unwrap_or(0.0)
        ));
        parts.push(format!(
            "+lon_0={}",
            spec.param(&[
                "longitude_of_center",
                "longitude_of_natural_origin",
                "longitude_of_projection_origin",
                "central_meridian",
            ])
            .unwrap_or(0.0)
        ));
    } else if method.contains("transverse_mercator") {
        parts.push("+proj=tmerc".to_string());
        parts.push(format!(
            "+lat_0={}",
            spec.param(&["latitude_of_origin", "latitude_of_natural_origin"])
                .unwrap_or(0.0)
        ));
        parts.push(format!(
            "+lon_0={}",
            spec.param(&[
                "central_meridian",
                "longitude_of_natural_origin",
                "longitude_of_central_meridian",
            ])
            .unwrap_or(0.0)
        ));
        if let Some(k) = spec.param(&[
            "scale_factor",
            "scale_factor_at_natural_origin",
            "scale_factor_at_central_meridian",
        ]) {
            parts.push(format!("+k={}", k));
        }
    } else if method.contains("mercator") {
        parts.push("+proj=merc".to_string());
        parts.push(format!(
            "+lon_0={}",
            spec.param(&[
                "central_meridian",
                "longitude_of_natural_origin",
                "longitude_of_projection_origin",
            ])
            .unwrap_or(0.0)
        ));
        if let Some(lat_ts) = spec.param(&[
            "standard_parallel_1",
            "latitude_of_standard_parallel",
            "standard_parallel",
        ]) {
            parts.push(format!("+lat_ts={}", lat_ts));
        } else if let Some(k) = spec.param(&["scale_factor", "scale_factor_at_natural_origin"]) {
            if k != 1.0 {
                parts.push(format!("+k={}", k));
            }
        }
    } else if method.contains("stereographic") {
        parts.push("+proj=stere".to_string());
        parts.push(format!(
            "+lat_0={}",
            spec.param(&["latitude_of_origin", "latitude_of_natural_origin"])
                .unwrap_or(0.0)
        ));
        parts.push(format!(
            "+lon_0={}",
            spec.param(&["central_meridian", "longitude_of_natural_origin"])
                .unwrap_or(0.0)
        ));
        if let Some(k) = spec.param(&["scale_factor", "scale_factor_at_natural_origin"]) {
            parts.push(format!("+k={}", k));
        }
    } else {
        return None;
    }

    Some(parts)
}

/// Datum or ellipsoid fragment. A recognized datum compresses to
/// `+datum=...`, otherwise the ellipsoid is spelled out.
fn datum_parts(root: &WktNode) -> Vec<String> {
    if let Some(datum) = root.find("DATUM") {
        if let Some(name) = datum.name() {
            let normalized = normalize(name);
            if (normalized.contains("wgs") && normalized.contains("84"))
                || (normalized.contains("world_geodetic_system") && normalized.contains("1984"))
            {
                return vec!["+datum=WGS84".to_string()];
            }
            if normalized.contains("nad83")
                || (normalized.contains("north_american") && normalized.contains("1983"))
            {
                return vec!["+datum=NAD83".to_string()];
            }
        }
    }

    let ellipsoid = root.find("SPHEROID").or_else(|| root.find("ELLIPSOID"));
    if let Some(ellipsoid) = ellipsoid {
        if let Some(name) = ellipsoid.name() {
            let normalized = normalize(name);
            if normalized.contains("wgs") && normalized.contains("84") {
                return vec!["+ellps=WGS84".to_string()];
            }
            if normalized.contains("grs") && normalized.contains("80") {
                return vec!["+ellps=GRS80".to_string()];
            }
        }
        let nums = ellipsoid.nums();
        if let Some(&a) = nums.first() {
            let rf = nums.get(1).copied().unwrap_or(0.0);
            if rf == 0.0 {
                return vec![format!("+a={}", a), format!("+b={}", a)];
            }
            return vec![format!("+a={}", a), format!("+rf={}", rf)];
        }
    }

    Vec::new()
}

/// Linear unit of the projected axes: direct `UNIT` child in WKT1, a
/// `LENGTHUNIT` on the CRS or its axes in WKT2.
fn linear_unit(root: &WktNode) -> (Option<String>, Option<f64>) {
    for keyword in ["UNIT", "LENGTHUNIT"] {
        if let Some(unit) = root.child(keyword) {
            return (unit.name().map(|s| s.to_string()), unit.first_num());
        }
    }
    for axis in root.children("AXIS") {
        for keyword in ["LENGTHUNIT", "UNIT"] {
            if let Some(unit) = axis.child(keyword) {
                return (unit.name().map(|s| s.to_string()), unit.first_num());
            }
        }
    }
    (None, None)
}

fn unit_short_name(name: &str, factor: Option<f64>) -> String {
    match normalize(name).as_str() {
        "metre" | "meter" | "m" => "m".to_string(),
        "kilometre" | "kilometer" | "km" => "km".to_string(),
        "foot" | "ft" => "ft".to_string(),
        "us_survey_foot" | "foot_us" => "us-ft".to_string(),
        _ => {
            if let Some(factor) = factor {
                if (factor - 1.0).abs() < 1e-9 {
                    return "m".to_string();
                }
            }
            name.to_string()
        }
    }
}

/// Lowercase with every non-alphanumeric run collapsed to one underscore.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_underscore = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

// =============================================================================
// CF grid-mapping route
// =============================================================================

/// CF grid-mapping attributes over a mapping variable.
fn crs_from_cf_var(mapping: &netcdf::Variable) -> Option<CrsInfo> {
    let name = reader::var_str_attr(mapping, "grid_mapping_name")?;
    let name = name.trim();
    let get = |attr: &str| reader::var_f64_attr(mapping, attr);
    let get_list = |attr: &str| reader::var_f64_list_attr(mapping, attr);

    let proj4 = proj4_from_cf(name, &get, &get_list)?;
    let cartesian_unit = if name == "latitude_longitude" {
        None
    } else {
        Some("m".to_string())
    };

    Some(CrsInfo {
        proj4,
        cartesian_unit,
    })
}

/// PROJ.4 string from plain CF grid-mapping attributes.
///
/// `get` reads a scalar attribute; `get_list` reads an attribute that may
/// hold one or two values, which is how CF writes `standard_parallel`.
fn proj4_from_cf(
    mapping_name: &str,
    get: &dyn Fn(&str) -> Option<f64>,
    get_list: &dyn Fn(&str) -> Option<Vec<f64>>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    match mapping_name {
        "polar_stereographic" => {
            parts.push("+proj=stere".to_string());
            let lat_0 = get("latitude_of_projection_origin").unwrap_or(90.0);
            parts.push(format!("+lat_0={}", if lat_0 < 0.0 { -90.0 } else { 90.0 }));
            if let Some(lat_ts) = get_list("standard_parallel").and_then(|v| v.first().copied()) {
                parts.push(format!("+lat_ts={}", lat_ts));
            } else if let Some(k) = get("scale_factor_at_projection_origin") {
                parts.push(format!("+k={}", k));
            }
            parts.push(format!(
                "+lon_0={}",
                get("straight_vertical_longitude_from_pole")
                    .or_else(|| get("longitude_of_projection_origin"))
                    .unwrap_or(0.0)
            ));
        }
        "lambert_conformal_conic" => {
            parts.push("+proj=lcc".to_string());
            let parallels = get_list("standard_parallel").unwrap_or_default();
            let lat_0 = get("latitude_of_projection_origin").unwrap_or(0.0);
            let lat_1 = parallels.first().copied().unwrap_or(lat_0);
            let lat_2 = parallels.get(1).copied().unwrap_or(lat_1);
            parts.push(format!("+lat_0={}", lat_0));
            parts.push(format!("+lat_1={}", lat_1));
            parts.push(format!("+lat_2={}", lat_2));
            parts.push(format!(
                "+lon_0={}",
                get("longitude_of_central_meridian").unwrap_or(0.0)
            ));
        }
        "lambert_azimuthal_equal_area" => {
            parts.push("+proj=laea".to_string());
            parts.push(format!(
                "+lat_0={}",
                get("latitude_of_projection_origin").unwrap_or(0.0)
            ));
            parts.push(format!(
                "+lon_0={}",
                get("longitude_of_projection_origin").unwrap_or(0.0)
            ));
        }
        "transverse_mercator" => {
            parts.push("+proj=tmerc".to_string());
            parts.push(format!(
                "+lat_0={}",
                get("latitude_of_projection_origin").unwrap_or(0.0)
            ));
            parts.push(format!(
                "+lon_0={}",
                get("longitude_of_central_meridian").unwrap_or(0.0)
            ));
            if let Some(k) = get("scale_factor_at_central_meridian") {
                parts.push(format!("+k={}", k));
            }
        }
        "mercator" => {
            parts.push("+proj=merc".to_string());
            parts.push(format!(
                "+lon_0={}",
                get("longitude_of_projection_origin").unwrap_or(0.0)
            ));
            if let Some(lat_ts) = get_list("standard_parallel").and_then(|v| v.first().copied()) {
                parts.push(format!("+lat_ts={}", lat_ts));
            } else if let Some(k) = get("scale_factor_at_projection_origin") {
                parts.push(format!("+k={}", k));
            }
        }
        "latitude_longitude" => {
            parts.push("+proj=longlat".to_string());
            parts.extend(cf_earth_parts(get));
            parts.push("+no_defs".to_string());
            return Some(parts.join(" "));
        }
        _ => return None,
    }

    parts.push(format!("+x_0={}", get("false_easting").unwrap_or(0.0)));
    parts.push(format!("+y_0={}", get("false_northing").unwrap_or(0.0)));
    parts.extend(cf_earth_parts(get));
    parts.push("+units=m".to_string());
    parts.push("+no_defs".to_string());

    Some(parts.join(" "))
}

/// Earth shape from CF attributes, defaulting to WGS84.
fn cf_earth_parts(get: &dyn Fn(&str) -> Option<f64>) -> Vec<String> {
    if let Some(radius) = get("earth_radius") {
        return vec![format!("+R={}", radius)];
    }
    if let Some(a) = get("semi_major_axis") {
        if let Some(rf) = get("inverse_flattening") {
            return vec![format!("+a={}", a), format!("+rf={}", rf)];
        }
        if let Some(b) = get("semi_minor_axis") {
            return vec![format!("+a={}", a), format!("+b={}", b)];
        }
        return vec![format!("+a={}", a), format!("+b={}", a)];
    }
    vec!["+ellps=WGS84".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const POLAR_STEREO_WKT1: &str = r#"PROJCS["unnamed",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Polar_Stereographic"],PARAMETER["latitude_of_origin",60],PARAMETER["central_meridian",25],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]]]"#;

    const POLAR_STEREO_WKT2: &str = r#"PROJCRS["unknown",BASEGEOGCRS["unknown",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]]],CONVERSION["unknown",METHOD["Polar Stereographic (variant B)",ID["EPSG",9829]],PARAMETER["Latitude of standard parallel",60,ANGLEUNIT["degree",0.0174532925199433]],PARAMETER["Longitude of origin",25,ANGLEUNIT["degree",0.0174532925199433]],PARAMETER["False easting",0,LENGTHUNIT["metre",1]],PARAMETER["False northing",0,LENGTHUNIT["metre",1]]],CS[Cartesian,2],AXIS["(E)",east,ORDER[1],LENGTHUNIT["metre",1]],AXIS["(N)",north,ORDER[2],LENGTHUNIT["metre",1]]]"#;

    const LCC_WKT1: &str = r#"PROJCS["unnamed",GEOGCS["NAD83",DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic_2SP"],PARAMETER["standard_parallel_1",33],PARAMETER["standard_parallel_2",45],PARAMETER["latitude_of_origin",40],PARAMETER["central_meridian",-97],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1]]"#;

    const GEOGRAPHIC_WKT1: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;

    #[test]
    fn test_wkt1_polar_stereographic() {
        let info = crs_from_wkt(POLAR_STEREO_WKT1).unwrap();
        assert_eq!(
            info.proj4,
            "+proj=stere +lat_0=90 +lat_ts=60 +lon_0=25 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs"
        );
        assert_eq!(info.cartesian_unit.as_deref(), Some("m"));
    }

    #[test]
    fn test_wkt2_polar_stereographic() {
        let info = crs_from_wkt(POLAR_STEREO_WKT2).unwrap();
        assert_eq!(
            info.proj4,
            "+proj=stere +lat_0=90 +lat_ts=60 +lon_0=25 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs"
        );
        assert_eq!(info.cartesian_unit.as_deref(), Some("m"));
    }

    #[test]
    fn test_wkt1_lambert_conformal() {
        let info = crs_from_wkt(LCC_WKT1).unwrap();
        assert!(info.proj4.starts_with("+proj=lcc"));
        assert!(info.proj4.contains("+lat_0=40"));
        assert!(info.proj4.contains("+lat_1=33"));
        assert!(info.proj4.contains("+lat_2=45"));
        assert!(info.proj4.contains("+lon_0=-97"));
        assert!(info.proj4.contains("+datum=NAD83"));
    }

    #[test]
    fn test_wkt1_geographic() {
        let info = crs_from_wkt(GEOGRAPHIC_WKT1).unwrap();
        assert_eq!(info.proj4, "+proj=longlat +datum=WGS84 +no_defs");
        assert_eq!(info.cartesian_unit, None);
    }

    #[test]
    fn test_wkt_sphere_ellipsoid() {
        let wkt = r#"PROJCS["sphere",GEOGCS["sphere",DATUM["unknown",SPHEROID["sphere",6370000,0]],PRIMEM["Greenwich",0],UNIT["degree",0.017453292519943295]],PROJECTION["Polar_Stereographic"],PARAMETER["latitude_of_origin",60],PARAMETER["central_meridian",0],UNIT["metre",1]]"#;
        let info = crs_from_wkt(wkt).unwrap();
        assert!(info.proj4.contains("+a=6370000"));
        assert!(info.proj4.contains("+b=6370000"));
    }

    #[test]
    fn test_wkt_unknown_projection_rejected() {
        let wkt = r#"PROJCS["unnamed",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],PROJECTION["Cassini_Soldner"],PARAMETER["latitude_of_origin",0],UNIT["metre",1]]"#;
        assert!(crs_from_wkt(wkt).is_none());
    }

    #[test]
    fn test_wkt_malformed_rejected() {
        assert!(crs_from_wkt("PROJCS[\"unclosed\"").is_none());
        assert!(crs_from_wkt("not wkt at all").is_none());
        assert!(crs_from_wkt("").is_none());
    }

    #[test]
    fn test_wkt_quoted_escapes_and_parens() {
        let node = parse_wkt(r#"UNIT("the ""metre""",1)"#).unwrap();
        assert_eq!(node.keyword, "UNIT");
        assert_eq!(node.name(), Some("the \"metre\""));
        assert_eq!(node.first_num(), Some(1.0));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Polar_Stereographic"), "polar_stereographic");
        assert_eq!(
            normalize("Polar Stereographic (variant B)"),
            "polar_stereographic_variant_b"
        );
        assert_eq!(normalize("Latitude of origin"), "latitude_of_origin");
    }

    fn scalar_getter<'a>(
        map: &'a HashMap<&'static str, f64>,
    ) -> impl Fn(&str) -> Option<f64> + 'a {
        move |name: &str| map.get(name).copied()
    }

    #[test]
    fn test_cf_polar_stereographic() {
        let map: HashMap<&str, f64> = [
            ("straight_vertical_longitude_from_pole", 25.0),
            ("latitude_of_projection_origin", 90.0),
            ("standard_parallel", 60.0),
            ("false_easting", 0.0),
            ("false_northing", 0.0),
        ]
        .into_iter()
        .collect();
        let get = scalar_getter(&map);
        let get_list = |name: &str| map.get(name).copied().map(|v| vec![v]);

        let proj4 = proj4_from_cf("polar_stereographic", &get, &get_list).unwrap();
        assert!(proj4.starts_with("+proj=stere"));
        assert!(proj4.contains("+lat_0=90"));
        assert!(proj4.contains("+lat_ts=60"));
        assert!(proj4.contains("+lon_0=25"));
        assert!(proj4.contains("+ellps=WGS84"));
        assert!(proj4.ends_with("+no_defs"));
    }

    #[test]
    fn test_cf_lambert_two_parallels() {
        let map: HashMap<&str, f64> = [
            ("latitude_of_projection_origin", 40.0),
            ("longitude_of_central_meridian", -97.0),
        ]
        .into_iter()
        .collect();
        let get = scalar_getter(&map);
        let get_list = |name: &str| {
            if name == "standard_parallel" {
                Some(vec![33.0, 45.0])
            } else {
                None
            }
        };

        let proj4 = proj4_from_cf("lambert_conformal_conic", &get, &get_list).unwrap();
        assert!(proj4.contains("+lat_1=33"));
        assert!(proj4.contains("+lat_2=45"));
        assert!(proj4.contains("+lon_0=-97"));
    }

    #[test]
    fn test_cf_earth_radius_sphere() {
        let map: HashMap<&str, f64> = [
            ("latitude_of_projection_origin", 90.0),
            ("earth_radius", 6371229.0),
        ]
        .into_iter()
        .collect();
        let get = scalar_getter(&map);
        let get_list = |_: &str| None;

        let proj4 = proj4_from_cf("polar_stereographic", &get, &get_list).unwrap();
        assert!(proj4.contains("+R=6371229"));
        assert!(!proj4.contains("+ellps"));
    }

    #[test]
    fn test_cf_unknown_mapping_rejected() {
        let get = |_: &str| None;
        let get_list = |_: &str| None;
        assert!(proj4_from_cf("oblique_mercator", &get, &get_list).is_none());
    }
}
