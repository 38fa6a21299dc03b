//! Directory scanning for boundary overlay files.

use std::path::Path;

use tracing::debug;

use crate::errors::BoundaryResult;
use crate::models::BoundaryFile;

/// Suffix reserved for metadata sidecars; never a boundary file itself.
pub const SIDECAR_SUFFIX: &str = ".meta.json";

pub fn is_sidecar(file_name: &str) -> bool {
    file_name.ends_with(SIDECAR_SUFFIX)
}

/// List supported boundary files in `dir`, sorted by file name.
///
/// The directory is scanned flat (no recursion). A missing directory yields
/// an empty list; any other failure to read the directory itself is
/// returned to the caller.
pub fn list_boundary_files(dir: &Path) -> BoundaryResult<Vec<BoundaryFile>> {
    debug!("Searching {} for files", dir.display());
    if !dir.exists() {
        debug!("Boundary directory does not exist: {}", dir.display());
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_sidecar(&name) {
            continue;
        }
        if let Some(file) = BoundaryFile::from_path(&path) {
            files.push(file);
        }
    }

    // Byte order on the raw file name; this is the layer stacking order.
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    let names: Vec<String> = files.iter().map(BoundaryFile::file_name).collect();
    debug!("Found {} boundary files: {:?}", files.len(), names);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundaryFormat;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let files = list_boundary_files(&tmp.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn root_that_is_a_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("states.geojson");
        touch(tmp.path(), "states.geojson");
        let err = list_boundary_files(&path).unwrap_err();
        assert!(matches!(err, crate::errors::BoundaryError::Io(_)));
    }

    #[test]
    fn filters_extensions_and_sidecars() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "states.geojson");
        touch(tmp.path(), "states.meta.json");
        touch(tmp.path(), "rivers.JSON");
        touch(tmp.path(), "parcels.GPKG");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "shape.shp");
        std::fs::create_dir(tmp.path().join("nested.geojson")).unwrap();

        let files = list_boundary_files(tmp.path()).unwrap();
        let names: Vec<String> = files.iter().map(BoundaryFile::file_name).collect();
        assert_eq!(names, vec!["parcels.GPKG", "rivers.JSON", "states.geojson"]);
        assert_eq!(files[0].format, BoundaryFormat::Gpkg);
        assert_eq!(files[1].format, BoundaryFormat::Geojson);
        assert_eq!(files[2].stem, "states");
    }

    #[test]
    fn sidecar_only_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.meta.json");
        touch(tmp.path(), "b.meta.json");
        assert!(list_boundary_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn sidecar_suffix_is_case_sensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "B.META.json");
        let files = list_boundary_files(tmp.path()).unwrap();
        let names: Vec<String> = files.iter().map(BoundaryFile::file_name).collect();
        assert_eq!(names, vec!["B.META.json"]);
    }

    #[test]
    fn ordering_is_lexicographic_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["c.geojson", "a.geojson", "B.geojson", "b.geojson"] {
            touch(tmp.path(), name);
        }
        let files = list_boundary_files(tmp.path()).unwrap();
        let names: Vec<String> = files.iter().map(BoundaryFile::file_name).collect();
        assert_eq!(names, vec!["B.geojson", "a.geojson", "b.geojson", "c.geojson"]);
    }
}
