//! Well-known-binary decoding into GeoJSON geometry JSON.
//!
//! Handles ISO type codes (`1000`/`2000`/`3000` offsets for Z, M and ZM) and
//! the EWKB high-bit flags. Z ordinates are kept, M ordinates are dropped.

use serde_json::{json, Value};

use crate::errors::{BoundaryError, BoundaryResult};

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

#[derive(Clone, Copy)]
struct Dims {
    z: bool,
    m: bool,
}

struct WkbReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WkbReader<'a> {
    fn take(&mut self, n: usize) -> BoundaryResult<&'a [u8]> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(BoundaryError::Wkb(format!(
                "unexpected end of data at byte {} (need {n} more)",
                self.pos
            )));
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> BoundaryResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self, little: bool) -> BoundaryResult<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(if little {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn f64(&mut self, little: bool) -> BoundaryResult<f64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(if little {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }

    fn position(&mut self, little: bool, dims: Dims) -> BoundaryResult<Value> {
        let x = self.f64(little)?;
        let y = self.f64(little)?;
        let z = if dims.z { Some(self.f64(little)?) } else { None };
        if dims.m {
            self.f64(little)?;
        }
        Ok(match z {
            Some(z) => json!([x, y, z]),
            None => json!([x, y]),
        })
    }

    fn positions(&mut self, little: bool, dims: Dims) -> BoundaryResult<Value> {
        let n = self.u32(little)?;
        let mut out = Vec::with_capacity(n.min(4096) as usize);
        for _ in 0..n {
            out.push(self.position(little, dims)?);
        }
        Ok(Value::Array(out))
    }

    fn rings(&mut self, little: bool, dims: Dims) -> BoundaryResult<Value> {
        let n = self.u32(little)?;
        let mut out = Vec::with_capacity(n.min(4096) as usize);
        for _ in 0..n {
            out.push(self.positions(little, dims)?);
        }
        Ok(Value::Array(out))
    }

    /// Read `n` nested geometries and collect their `coordinates`.
    fn members(&mut self, little: bool) -> BoundaryResult<Value> {
        let n = self.u32(little)?;
        let mut out = Vec::with_capacity(n.min(4096) as usize);
        for _ in 0..n {
            let mut member = self.geometry()?;
            out.push(member["coordinates"].take());
        }
        Ok(Value::Array(out))
    }

    fn geometry(&mut self) -> BoundaryResult<Value> {
        let little = match self.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(BoundaryError::Wkb(format!("invalid byte order marker {other}")))
            }
        };
        let raw = self.u32(little)?;
        if raw & EWKB_SRID != 0 {
            self.u32(little)?;
        }
        let code = raw & 0x0fff_ffff;
        let (base, iso_dims) = (code % 1000, code / 1000);
        let dims = Dims {
            z: raw & EWKB_Z != 0 || iso_dims == 1 || iso_dims == 3,
            m: raw & EWKB_M != 0 || iso_dims == 2 || iso_dims == 3,
        };

        let geometry = match base {
            1 => {
                let coords = self.position(little, dims)?;
                let empty = coords.as_array().is_some_and(|c| c.iter().all(Value::is_null));
                if empty {
                    json!({"type": "Point", "coordinates": []})
                } else {
                    json!({"type": "Point", "coordinates": coords})
                }
            }
            2 => json!({"type": "LineString", "coordinates": self.positions(little, dims)?}),
            3 => json!({"type": "Polygon", "coordinates": self.rings(little, dims)?}),
            4 => json!({"type": "MultiPoint", "coordinates": self.members(little)?}),
            5 => json!({"type": "MultiLineString", "coordinates": self.members(little)?}),
            6 => json!({"type": "MultiPolygon", "coordinates": self.members(little)?}),
            7 => {
                let n = self.u32(little)?;
                let mut geometries = Vec::with_capacity(n.min(4096) as usize);
                for _ in 0..n {
                    geometries.push(self.geometry()?);
                }
                json!({"type": "GeometryCollection", "geometries": geometries})
            }
            other => {
                return Err(BoundaryError::Wkb(format!(
                    "unsupported geometry type code {other}"
                )))
            }
        };
        Ok(geometry)
    }
}

/// Decode a WKB buffer into GeoJSON geometry JSON.
pub fn decode_wkb(buf: &[u8]) -> BoundaryResult<Value> {
    WkbReader { buf, pos: 0 }.geometry()
}

/// Decode a GeoPackage geometry blob (`GP` header, optional envelope, WKB).
///
/// Returns `None` when the header marks the geometry as empty.
pub fn decode_gpkg_geometry(blob: &[u8]) -> BoundaryResult<Option<Value>> {
    if blob.len() < 8 || &blob[0..2] != b"GP" {
        return Err(BoundaryError::Wkb(
            "missing GeoPackage geometry header".to_string(),
        ));
    }
    let flags = blob[3];
    if flags & 0b0001_0000 != 0 {
        return Ok(None);
    }
    let envelope_len = match (flags >> 1) & 0b111 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        other => {
            return Err(BoundaryError::Wkb(format!(
                "invalid envelope indicator {other}"
            )))
        }
    };
    let offset = 8 + envelope_len;
    if offset > blob.len() {
        return Err(BoundaryError::Wkb("truncated GeoPackage envelope".to_string()));
    }
    decode_wkb(&blob[offset..]).map(Some)
}
