//! File format detection from paths.

use std::path::Path;

/// Detected file kind based on extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// NetCDF format
    NetCdf,
    /// Unknown format
    Unknown,
}

impl FileKind {
    /// Detect the kind from the path's file name. Extension only, the file
    /// is not opened.
    pub fn from_path(path: &Path) -> FileKind {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            return FileKind::Unknown;
        };
        let lower = name.to_lowercase();

        if lower.ends_with(".nc")
            || lower.ends_with(".nc4")
            || lower.ends_with(".cdf")
            || lower.ends_with(".netcdf")
        {
            FileKind::NetCdf
        } else {
            FileKind::Unknown
        }
    }
}
