//! Coordinate reference system detection and normalisation to lon/lat.
//!
//! Web Mercator is inverted directly. Every other defined frame goes through
//! proj4rs, with EPSG codes resolved to proj strings by `crs-definitions`.

use std::f64::consts::PI;

use proj4rs::proj::Proj;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{BoundaryError, BoundaryResult};
use crate::models::FeatureCollection;

/// Spherical Mercator radius (metres).
const EARTH_RADIUS: f64 = 6_378_137.0;

const WEB_MERCATOR_CODES: &[i64] = &[3857, 900913, 3785, 102100, 102113];

/// Target frame of every reprojection.
const LON_LAT_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Reference frame of a source layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Crs {
    /// No usable CRS definition; coordinates are taken as lon/lat.
    Undefined,
    Wgs84,
    WebMercator,
    /// Any other frame. `definition` is the stored WKT or proj string, if any.
    Other {
        organization: String,
        code: i64,
        definition: Option<String>,
    },
}

impl Crs {
    pub fn from_authority(organization: &str, code: i64) -> Self {
        let org = organization.to_ascii_uppercase();
        match (org.as_str(), code) {
            ("EPSG", 4326) => Self::Wgs84,
            ("OGC", 84) => Self::Wgs84,
            ("EPSG" | "ESRI", c) if WEB_MERCATOR_CODES.contains(&c) => Self::WebMercator,
            ("NONE" | "", _) => Self::Undefined,
            _ => Self::Other {
                organization: organization.to_string(),
                code,
                definition: None,
            },
        }
    }

    /// Attach the stored definition to an `Other` frame. The GeoPackage
    /// placeholder `undefined` counts as no definition.
    pub fn with_definition(self, definition: &str) -> Self {
        match self {
            Self::Other {
                organization, code, ..
            } => {
                let text = definition.trim();
                let definition = (!text.is_empty() && !text.eq_ignore_ascii_case("undefined"))
                    .then(|| text.to_string());
                Self::Other {
                    organization,
                    code,
                    definition,
                }
            }
            other => other,
        }
    }

    /// Proj string for an `Other` frame: the EPSG registry first, then a
    /// stored proj-style definition.
    fn proj_string(&self) -> Option<String> {
        let Self::Other {
            organization,
            code,
            definition,
        } = self
        else {
            return None;
        };
        if organization.eq_ignore_ascii_case("EPSG") {
            let registered = u16::try_from(*code).ok().and_then(crs_definitions::from_code);
            if let Some(def) = registered {
                return Some(def.proj4.replace("+type=crs", "").trim().to_string());
            }
        }
        definition
            .as_deref()
            .filter(|d| d.starts_with("+proj="))
            .map(str::to_string)
    }
}

fn is_geographic(proj_string: &str) -> bool {
    proj_string.split_whitespace().any(|param| {
        matches!(
            param,
            "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"
        )
    })
}

fn projection_error(crs: &str, err: impl std::fmt::Display) -> BoundaryError {
    BoundaryError::Projection(format!("{crs}: {err}"))
}

// ---------------------------------------------------------------------------
// LonLatTransform
// ---------------------------------------------------------------------------

/// Point transform from a layer's frame into lon/lat degrees.
pub enum LonLatTransform {
    Identity,
    WebMercator,
    Proj {
        source: Box<Proj>,
        target: Box<Proj>,
        geographic_source: bool,
    },
}

impl LonLatTransform {
    /// Build the transform for `crs`.
    ///
    /// A frame with neither a registered code nor a stored definition is
    /// treated as undefined. A stored definition that cannot be turned into
    /// a projection is an error.
    pub fn for_crs(crs: &Crs) -> BoundaryResult<Self> {
        match crs {
            Crs::Undefined | Crs::Wgs84 => Ok(Self::Identity),
            Crs::WebMercator => Ok(Self::WebMercator),
            Crs::Other {
                organization,
                code,
                definition,
            } => {
                let label = format!("{organization}:{code}");
                let Some(proj_string) = crs.proj_string() else {
                    if definition.is_none() {
                        warn!("{} has no definition; assuming coordinates are lon/lat", label);
                        return Ok(Self::Identity);
                    }
                    return Err(projection_error(&label, "unsupported CRS definition"));
                };
                debug!("Resolved {} to {}", label, proj_string);
                let source =
                    Proj::from_proj_string(&proj_string).map_err(|e| projection_error(&label, e))?;
                let target =
                    Proj::from_proj_string(LON_LAT_PROJ).map_err(|e| projection_error(&label, e))?;
                Ok(Self::Proj {
                    source: Box::new(source),
                    target: Box::new(target),
                    geographic_source: is_geographic(&proj_string),
                })
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    pub fn apply(&self, x: f64, y: f64) -> BoundaryResult<(f64, f64)> {
        match self {
            Self::Identity => Ok((x, y)),
            Self::WebMercator => {
                let lon = (x / EARTH_RADIUS).to_degrees();
                let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
                Ok((lon, lat))
            }
            Self::Proj {
                source,
                target,
                geographic_source,
            } => {
                // proj4rs works in radians for geographic frames.
                let mut point = if *geographic_source {
                    (x.to_radians(), y.to_radians(), 0.0)
                } else {
                    (x, y, 0.0)
                };
                proj4rs::transform::transform(source, target, &mut point)
                    .map_err(|e| BoundaryError::Projection(format!("({x}, {y}): {e}")))?;
                Ok((point.0.to_degrees(), point.1.to_degrees()))
            }
        }
    }
}

/// Rewrite every position in `collection` into lon/lat.
pub fn normalize_to_lon_lat(collection: &mut FeatureCollection, crs: &Crs) -> BoundaryResult<()> {
    let transform = LonLatTransform::for_crs(crs)?;
    if transform.is_identity() {
        debug!("Layer CRS is {:?}; no reprojection needed", crs);
        return Ok(());
    }
    debug!(
        "Reprojecting {} features from {:?} to lon/lat",
        collection.len(),
        crs
    );
    for feature in &mut collection.features {
        if let Some(geometry) = feature.geometry.as_mut() {
            reproject_geometry(geometry, &transform)?;
        }
    }
    Ok(())
}

fn reproject_geometry(geometry: &mut Value, transform: &LonLatTransform) -> BoundaryResult<()> {
    if let Some(coords) = geometry.get_mut("coordinates") {
        reproject_coordinates(coords, transform)?;
    }
    if let Some(Value::Array(members)) = geometry.get_mut("geometries") {
        for member in members {
            reproject_geometry(member, transform)?;
        }
    }
    Ok(())
}

fn reproject_coordinates(coords: &mut Value, transform: &LonLatTransform) -> BoundaryResult<()> {
    let Value::Array(items) = coords else {
        return Ok(());
    };
    let is_position = items.first().is_some_and(Value::is_number);
    if !is_position {
        for item in items {
            reproject_coordinates(item, transform)?;
        }
        return Ok(());
    }
    let (Some(x), Some(y)) = (items[0].as_f64(), items.get(1).and_then(Value::as_f64)) else {
        return Ok(());
    };
    let (lon, lat) = transform.apply(x, y)?;
    items[0] = Value::from(lon);
    items[1] = Value::from(lat);
    Ok(())
}
