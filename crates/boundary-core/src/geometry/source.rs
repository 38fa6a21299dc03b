//! Reading a boundary file into a lon/lat feature collection.
//!
//! This is the only place coordinates are normalised; everything downstream
//! assumes lon/lat.

use std::path::Path;

use tracing::debug;

use crate::errors::{BoundaryError, BoundaryResult};
use crate::geometry::crs::{normalize_to_lon_lat, Crs};
use crate::geometry::geojson::read_geojson;
use crate::models::{BoundaryFile, BoundaryFormat, FeatureCollection};

/// First layer of a GeoPackage, before CRS normalisation.
#[derive(Clone, Debug)]
pub struct GpkgLayer {
    pub name: String,
    pub crs: Crs,
    pub collection: FeatureCollection,
}

/// A GeoPackage conversion capability. Optional at runtime.
pub trait GpkgBackend: Send + Sync {
    fn read_first_layer(&self, path: &Path) -> BoundaryResult<GpkgLayer>;
}

/// Reads boundary files, dispatching on format.
pub struct GeometrySource {
    gpkg: Option<Box<dyn GpkgBackend>>,
}

impl Default for GeometrySource {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometrySource {
    /// Source with every backend compiled into this build.
    pub fn new() -> Self {
        #[cfg(feature = "gpkg")]
        let gpkg: Option<Box<dyn GpkgBackend>> =
            Some(Box::new(crate::geometry::gpkg::SqliteGpkgBackend));
        #[cfg(not(feature = "gpkg"))]
        let gpkg: Option<Box<dyn GpkgBackend>> = None;
        Self { gpkg }
    }

    pub fn without_gpkg() -> Self {
        Self { gpkg: None }
    }

    pub fn with_gpkg_backend(backend: Box<dyn GpkgBackend>) -> Self {
        Self {
            gpkg: Some(backend),
        }
    }

    pub fn supports_gpkg(&self) -> bool {
        self.gpkg.is_some()
    }

    pub fn read(&self, file: &BoundaryFile) -> BoundaryResult<FeatureCollection> {
        match file.format {
            BoundaryFormat::Geojson => read_geojson(&file.path),
            BoundaryFormat::Gpkg => {
                let backend = self.gpkg.as_ref().ok_or_else(|| {
                    BoundaryError::MissingDependency(format!(
                        "GeoPackage support requires the gpkg backend; cannot read {}",
                        file.file_name()
                    ))
                })?;
                let mut layer = backend.read_first_layer(&file.path)?;
                debug!(
                    "Loaded layer {} from {} ({} features)",
                    layer.name,
                    file.file_name(),
                    layer.collection.len()
                );
                normalize_to_lon_lat(&mut layer.collection, &layer.crs)?;
                Ok(layer.collection)
            }
        }
    }

    /// Read an arbitrary path, rejecting extensions that are not boundary
    /// formats.
    pub fn read_path(&self, path: &Path) -> BoundaryResult<FeatureCollection> {
        let file = BoundaryFile::from_path(path).ok_or_else(|| {
            BoundaryError::UnsupportedFormat(path.display().to_string())
        })?;
        self.read(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(Crs);

    impl GpkgBackend for FixedBackend {
        fn read_first_layer(&self, _path: &Path) -> BoundaryResult<GpkgLayer> {
            let collection = crate::geometry::geojson::parse_geojson(
                r#"{"type": "FeatureCollection", "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-20037508.342789244, 0.0]},
                     "properties": {"name": "edge"}}
                ]}"#,
            )?;
            Ok(GpkgLayer {
                name: "fixed".into(),
                crs: self.0.clone(),
                collection,
            })
        }
    }

    fn gpkg_file(dir: &Path) -> BoundaryFile {
        let path = dir.join("layer.gpkg");
        std::fs::write(&path, b"").unwrap();
        BoundaryFile::from_path(&path).unwrap()
    }

    #[test]
    fn gpkg_capability_reflects_backend() {
        assert!(!GeometrySource::without_gpkg().supports_gpkg());
        assert!(GeometrySource::with_gpkg_backend(Box::new(FixedBackend(Crs::Wgs84))).supports_gpkg());
        assert_eq!(GeometrySource::new().supports_gpkg(), cfg!(feature = "gpkg"));
    }

    #[test]
    fn missing_backend_is_missing_dependency() {
        let tmp = tempfile::tempdir().unwrap();
        let err = GeometrySource::without_gpkg()
            .read(&gpkg_file(tmp.path()))
            .unwrap_err();
        match err {
            BoundaryError::MissingDependency(msg) => assert!(msg.contains("layer.gpkg")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn gpkg_layers_are_reprojected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = GeometrySource::with_gpkg_backend(Box::new(FixedBackend(Crs::WebMercator)));
        let fc = source.read(&gpkg_file(tmp.path())).unwrap();
        let lon = fc.features[0].geometry.as_ref().unwrap()["coordinates"][0]
            .as_f64()
            .unwrap();
        assert!((lon + 180.0).abs() < 1e-6);
    }

    #[test]
    fn read_path_rejects_unknown_extension() {
        let err = GeometrySource::new()
            .read_path(Path::new("/tmp/boundary.shp"))
            .unwrap_err();
        assert!(matches!(err, BoundaryError::UnsupportedFormat(_)));
    }

    #[test]
    fn geojson_is_read_without_transform() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pts.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [500000.0, 10.0]}, "properties": {}}
            ]}"#,
        )
        .unwrap();
        let fc = GeometrySource::without_gpkg().read_path(&path).unwrap();
        assert_eq!(
            fc.features[0].geometry.as_ref().unwrap()["coordinates"][0],
            500000.0
        );
    }

    #[cfg(feature = "gpkg")]
    #[test]
    fn sqlite_backend_reprojects_web_mercator() {
        use crate::geometry::gpkg::tests::write_gpkg;
        use crate::geometry::wkb::tests::WkbWriter;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("merc.gpkg");
        write_gpkg(
            &path,
            Some((3857, "EPSG", 3857)),
            &[(WkbWriter::new(1).xy(20037508.342789244, 0.0).0, "east", Some(1))],
        );
        let fc = GeometrySource::new().read_path(&path).unwrap();
        let coords = &fc.features[0].geometry.as_ref().unwrap()["coordinates"];
        assert!((coords[0].as_f64().unwrap() - 180.0).abs() < 1e-6);
        assert!(coords[1].as_f64().unwrap().abs() < 1e-6);
    }

    #[cfg(feature = "gpkg")]
    #[test]
    fn sqlite_backend_reprojects_utm() {
        use crate::geometry::gpkg::tests::write_gpkg;
        use crate::geometry::wkb::tests::WkbWriter;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("utm.gpkg");
        write_gpkg(
            &path,
            Some((32615, "EPSG", 32615)),
            &[(WkbWriter::new(1).xy(500000.0, 4649776.0).0, "iowa", Some(1))],
        );
        let fc = GeometrySource::new().read_path(&path).unwrap();
        let coords = &fc.features[0].geometry.as_ref().unwrap()["coordinates"];
        let (lon, lat) = (coords[0].as_f64().unwrap(), coords[1].as_f64().unwrap());
        assert!((lon + 93.0).abs() < 1e-6, "lon {lon}");
        assert!((lat - 42.0).abs() < 0.01, "lat {lat}");
    }
}
