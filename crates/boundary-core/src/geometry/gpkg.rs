//! SQLite-backed GeoPackage reading.
//!
//! Only the first feature layer is read. Each open is read-only and the
//! connection is dropped before returning.

use std::path::Path;

use indexmap::IndexMap;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::errors::{BoundaryError, BoundaryResult};
use crate::geometry::crs::Crs;
use crate::geometry::source::{GpkgBackend, GpkgLayer};
use crate::geometry::wkb::decode_gpkg_geometry;
use crate::models::{Feature, FeatureCollection};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Map a SQLite cell onto a JSON property value.
fn cell_to_json(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::from(v),
        ValueRef::Real(v) => Value::from(v),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

fn first_feature_table(conn: &Connection) -> BoundaryResult<String> {
    conn.query_row(
        "SELECT table_name FROM gpkg_contents \
         WHERE data_type = 'features' ORDER BY rowid LIMIT 1;",
        [],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| BoundaryError::Parse("GeoPackage has no feature layers".to_string()))
}

fn lookup_crs(conn: &Connection, srs_id: i64) -> BoundaryResult<Crs> {
    if srs_id <= 0 {
        return Ok(Crs::Undefined);
    }
    let row: Option<(String, i64, String)> = conn
        .query_row(
            "SELECT organization, organization_coordsys_id, definition \
             FROM gpkg_spatial_ref_sys WHERE srs_id = ?1;",
            params![srs_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    Ok(match row {
        Some((organization, code, definition)) => {
            Crs::from_authority(&organization, code).with_definition(&definition)
        }
        None => Crs::Undefined,
    })
}

fn primary_key_column(conn: &Connection, table: &str) -> BoundaryResult<Option<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", quote_ident(table)))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        let pk: i64 = row.get("pk")?;
        if pk == 1 {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// SqliteGpkgBackend
// ---------------------------------------------------------------------------

/// GeoPackage reader built on rusqlite.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteGpkgBackend;

impl GpkgBackend for SqliteGpkgBackend {
    fn read_first_layer(&self, path: &Path) -> BoundaryResult<GpkgLayer> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let table = first_feature_table(&conn)?;
        let (geometry_column, srs_id): (String, i64) = conn.query_row(
            "SELECT column_name, srs_id FROM gpkg_geometry_columns WHERE table_name = ?1;",
            params![table],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let crs = lookup_crs(&conn, srs_id)?;
        let pk = primary_key_column(&conn, &table)?;
        debug!(
            "Reading GeoPackage layer {} (geometry={}, srs_id={}, crs={:?})",
            table, geometry_column, srs_id, crs
        );

        let mut stmt = conn.prepare(&format!("SELECT * FROM {};", quote_ident(&table)))?;
        let col_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let mut rows = stmt.query([])?;

        let mut features = Vec::new();
        while let Some(row) = rows.next()? {
            let mut feature = Feature {
                id: None,
                geometry: None,
                properties: IndexMap::new(),
            };
            for (i, name) in col_names.iter().enumerate() {
                let cell = row.get_ref(i)?;
                if name.eq_ignore_ascii_case(&geometry_column) {
                    feature.geometry = match cell {
                        ValueRef::Blob(blob) => decode_gpkg_geometry(blob)?,
                        _ => None,
                    };
                } else if pk.as_deref() == Some(name.as_str()) {
                    feature.id = Some(cell_to_json(cell));
                } else {
                    feature.properties.insert(name.clone(), cell_to_json(cell));
                }
            }
            features.push(feature);
        }

        Ok(GpkgLayer {
            name: table,
            crs,
            collection: FeatureCollection {
                features,
                ..Default::default()
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
