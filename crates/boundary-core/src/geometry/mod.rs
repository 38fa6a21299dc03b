pub mod crs;
pub mod geojson;
#[cfg(feature = "gpkg")]
pub mod gpkg;
pub mod source;
pub mod wkb;

pub use source::{GeometrySource, GpkgBackend, GpkgLayer};
