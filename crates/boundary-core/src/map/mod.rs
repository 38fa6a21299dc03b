pub mod basemap;
pub mod leaflet;
pub mod surface;

pub use basemap::{BasemapCatalog, MapRequest};
pub use leaflet::LeafletMap;
pub use surface::{MapSurface, TileLayer};
