//! Rust library for reading and writing OGC GeoPackage files, built around a
//! codec for the GeoPackage geometry blob format (a small header wrapping
//! little-endian WKB) and its `rusqlite` integration.

#![allow(dead_code)]

pub mod error;
pub mod geometry;
pub mod spatial;
mod sql;
pub mod srs;
pub mod table;

use rusqlite::{params, Connection, DatabaseName, OpenFlags};

use crate::error::{Error, Result};
use crate::sql::table_definitions::*;
use crate::sql::INSERT_GPKG_EXTENSION;
use crate::srs::{defaults::*, SpatialRefSys};
use std::path::Path;

/// `0x47504B47` — ASCII `"GPKG"`, the SQLite `application_id` every
/// GeoPackage file must carry.
pub const APPLICATION_ID: u32 = 0x47504B47;

/// Creation-time toggles. Whether an extension is enabled is recorded purely
/// as a `gpkg_extensions` bookkeeping row (§4.9); no extension's actual
/// behavior beyond the core codec is implemented.
#[derive(Debug, Clone)]
pub struct GeoPackageOptions {
    pub user_version: u32,
}

impl GeoPackageOptions {
    pub fn new() -> Self {
        GeoPackageOptions { user_version: 10300 }
    }
}

impl Default for GeoPackageOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoPackage: upon creation, the tables required for specification
/// conformance are created; upon opening, those tables plus the byte-order
/// and integrity pragmas are validated, and the geometry adapters/converters
/// and spatial predicate functions (§4.6/§4.7) are registered on the
/// connection.
pub struct GeoPackage {
    /// The underlying rusqlite connection for the GeoPackage.
    ///
    /// Access is provided here to allow a user to do what is necessary for
    /// their specific use case, but extra care should be taken if using this
    /// for write operations, since the integrity of the GeoPackage could be
    /// compromised.
    pub conn: Connection,
}

impl GeoPackage {
    /// Creates an empty GeoPackage with the following metadata tables:
    /// * gpkg_spatial_ref_sys
    /// * gpkg_contents
    /// * gpkg_geometry_columns
    /// * gpkg_extensions
    /// * gpkg_tile_matrix
    /// * gpkg_tile_matrix_set
    pub fn create<P: AsRef<Path>>(path: P) -> Result<GeoPackage> {
        Self::create_with_options(path, &GeoPackageOptions::new())
    }

    pub fn create_with_options<P: AsRef<Path>>(
        path: P,
        options: &GeoPackageOptions,
    ) -> Result<GeoPackage> {
        let conn = Connection::open(path)?;
        let gpkg = GeoPackage { conn };
        gpkg.conn
            .pragma_update(Some(DatabaseName::Main), "application_id", APPLICATION_ID)?;
        gpkg.conn.pragma_update(
            Some(DatabaseName::Main),
            "user_version",
            options.user_version,
        )?;
        gpkg.conn.execute(CREATE_SPATIAL_REF_SYS_TABLE, [])?;
        gpkg.new_srs(&WGS84)?;
        gpkg.new_srs(&CARTESIAN)?;
        gpkg.new_srs(&GEOGRAPHIC)?;
        gpkg.conn.execute(CREATE_CONTENTS_TABLE, [])?;
        gpkg.conn.execute(CREATE_GEOMETRY_COLUMNS_TABLE, [])?;
        gpkg.conn.execute(CREATE_EXTENSTIONS_TABLE, [])?;
        gpkg.conn.execute(CREATE_TILE_MATRIX_TABLE, [])?;
        gpkg.conn.execute(CREATE_TILE_MATRIX_SET_TABLE, [])?;
        gpkg.register_sql_extensions()?;
        log::debug!("created geopackage with application_id {:#x}", APPLICATION_ID);
        Ok(gpkg)
    }

    fn new_srs(&self, srs: &SpatialRefSys) -> Result<()> {
        self.conn.execute(
            crate::sql::INSERT_GPKG_SRS,
            params![
                srs.name,
                srs.id,
                srs.organization,
                srs.organization_coordsys_id,
                srs.definition,
                srs.description,
            ],
        )?;
        Ok(())
    }

    /// Close the geopackage.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Sqlite(e))
    }

    /// Open a geopackage, validating its internals and wiring the geometry
    /// adapters/converters and spatial predicate functions onto the
    /// returned connection so that the SQL surface in §6 works end to end.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<GeoPackage> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        let application_id: u32 =
            conn.query_row("SELECT * FROM pragma_application_id()", [], |row| {
                row.get(0)
            })?;
        if application_id != APPLICATION_ID {
            return Err(Error::Validation(format!(
                "not a geopackage: application_id {application_id:#x}"
            )));
        }
        let integrity_check: String =
            conn.query_row("SELECT * FROM pragma_integrity_check()", [], |row| {
                row.get(0)
            })?;
        if integrity_check != "ok" {
            return Err(Error::Validation(format!(
                "integrity check failed: {integrity_check}"
            )));
        }
        {
            let mut stmt = conn.prepare("SELECT * FROM pragma_foreign_key_check()")?;
            let mut rows = stmt.query([])?;
            if rows.next()?.is_some() {
                return Err(Error::Validation("foreign key check failed".to_string()));
            }
        }
        let gpkg = GeoPackage { conn };
        gpkg.register_sql_extensions()?;
        Ok(gpkg)
    }

    fn register_sql_extensions(&self) -> Result<()> {
        geometry::register_predicates(&self.conn)?;
        Ok(())
    }

    /// Names of every table registered in `gpkg_contents`.
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT table_name FROM gpkg_contents")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Names of tables registered with `data_type = 'features'`.
    pub fn feature_classes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT table_name FROM gpkg_contents WHERE data_type = 'features'")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Register a named extension against a table/column in `gpkg_extensions`.
    /// This records the bookkeeping row only; it does not implement the
    /// extension's behavior.
    pub fn enable_extension(
        &self,
        table_name: &str,
        column_name: Option<&str>,
        extension_name: &str,
        definition: &str,
        scope: &str,
    ) -> Result<()> {
        self.conn.execute(
            INSERT_GPKG_EXTENSION,
            params![table_name, column_name, extension_name, definition, scope],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::geometry::{LineStringZ, Point};
    use crate::table::{Field, FeatureClass, FieldType, Table};

    use super::*;

    #[test]
    fn create_then_open_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("create.gpkg");
        let gp = GeoPackage::create(&path).unwrap();
        gp.close().unwrap();
        let gp2 = GeoPackage::open(&path).unwrap();
        assert!(gp2.tables().unwrap().is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rejects_non_geopackage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not-a-gpkg.sqlite");
        Connection::open(&path).unwrap();
        assert!(GeoPackage::open(&path).is_err());
    }

    #[test]
    fn feature_class_round_trips_geometry_through_sql() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roads.gpkg");
        let gp = GeoPackage::create(&path).unwrap();

        let fc = FeatureClass::new(
            "roads",
            "geom",
            "Point",
            4326,
            vec![Field::new("name", FieldType::Text)],
        );
        fc.create(&gp).unwrap();

        let point = Point::new(4326, -105.0, 40.0);
        gp.conn
            .execute(
                "INSERT INTO roads (geom, name) VALUES (?1, ?2)",
                rusqlite::params![point, "Main St"],
            )
            .unwrap();

        let fetched: Point = gp
            .conn
            .query_row("SELECT geom FROM roads WHERE name = ?1", ["Main St"], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(fetched, point);
        assert_eq!(gp.feature_classes().unwrap(), vec!["roads".to_string()]);
    }

    #[test]
    fn table_round_trips_attributes_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.gpkg");
        let gp = GeoPackage::create(&path).unwrap();

        let table = Table::new(
            "notes",
            vec![Field::new("body", FieldType::Text).not_null()],
        );
        table.create(&gp).unwrap();
        gp.conn
            .execute("INSERT INTO notes (body) VALUES (?1)", ["hello"])
            .unwrap();
        let body: String = gp
            .conn
            .query_row("SELECT body FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "hello");
        assert_eq!(gp.tables().unwrap(), vec!["notes".to_string()]);
    }

    #[test]
    fn lazy_linestring_round_trips_through_sql() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paths.gpkg");
        let gp = GeoPackage::create(&path).unwrap();
        let fc = FeatureClass::new("paths", "geom", "LineStringZ", -1, vec![]);
        fc.create(&gp).unwrap();

        let line = LineStringZ::new(-1, vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 2.0]]);
        gp.conn
            .execute(
                "INSERT INTO paths (geom) VALUES (?1)",
                rusqlite::params![line],
            )
            .unwrap();
        let fetched: LineStringZ = gp
            .conn
            .query_row("SELECT geom FROM paths", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fetched.coordinates().unwrap(), line.coordinates().unwrap());
    }
}
