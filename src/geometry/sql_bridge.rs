//! `rusqlite` `ToSql`/`FromSql` adapters for the 24 addressable geometry
//! types, and the `create_function` registration of the spatial predicates.
//!
//! Unlike a `sqlite3.register_converter`-style dispatch keyed by the
//! declared column type name, rusqlite resolves `FromSql`/`ToSql` by the
//! concrete Rust type requested at the call site — so each geometry struct
//! gets its own impl rather than one dispatching on a runtime tag.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Result as SqliteResult, ToSql};

use crate::geometry::{
    LineString, LineStringM, LineStringZ, LineStringZM, MultiLineString, MultiLineStringM,
    MultiLineStringZ, MultiLineStringZM, MultiPoint, MultiPointM, MultiPointZ, MultiPointZM,
    MultiPolygon, MultiPolygonM, MultiPolygonZ, MultiPolygonZM, Point, PointM, PointZ, PointZM,
    Polygon, PolygonM, PolygonZ, PolygonZM,
};
use crate::spatial;

fn to_sql_err(e: crate::error::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn from_sql_err(e: crate::error::Error) -> FromSqlError {
    FromSqlError::Other(Box::new(e))
}

/// Point family: `to_blob`/`from_blob` are infallible to encode but still
/// fallible to decode (a malformed header is a decode-time error).
macro_rules! impl_sql_point {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToSql for $t {
                fn to_sql(&self) -> SqliteResult<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.to_blob()))
                }
            }

            impl FromSql for $t {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let bytes = value.as_blob()?;
                    <$t>::from_blob(bytes).map_err(from_sql_err)
                }
            }
        )*
    };
}

/// Aggregate families (Line/Polygon/Multi*): `to_blob` materializes the
/// lazily-decoded body, so it is itself fallible.
macro_rules! impl_sql_lazy {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToSql for $t {
                fn to_sql(&self) -> SqliteResult<ToSqlOutput<'_>> {
                    let blob = self.to_blob().map_err(to_sql_err)?;
                    Ok(ToSqlOutput::from(blob))
                }
            }

            impl FromSql for $t {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let bytes = value.as_blob()?;
                    <$t>::from_blob(bytes).map_err(from_sql_err)
                }
            }
        )*
    };
}

impl_sql_point!(Point, PointZ, PointM, PointZM);

impl_sql_lazy!(
    LineString,
    LineStringZ,
    LineStringM,
    LineStringZM,
    Polygon,
    PolygonZ,
    PolygonM,
    PolygonZM,
    MultiPoint,
    MultiPointZ,
    MultiPointM,
    MultiPointZM,
    MultiLineString,
    MultiLineStringZ,
    MultiLineStringM,
    MultiLineStringZM,
    MultiPolygon,
    MultiPolygonZ,
    MultiPolygonM,
    MultiPolygonZM,
);

/// Register the `ST_IsEmpty`/`ST_MinX`/`ST_MaxX`/`ST_MinY`/`ST_MaxY`
/// predicate functions on a connection. All 28 variants are decoded through
/// the same header/envelope-first path, so one registration per predicate
/// covers every geometry column regardless of its declared type.
pub fn register_predicates(conn: &Connection) -> rusqlite::Result<()> {
    use rusqlite::functions::FunctionFlags;
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("ST_IsEmpty", 1, flags, |ctx| {
        let blob = ctx.get_raw(0).as_blob().ok();
        Ok(blob.and_then(spatial::is_empty))
    })?;
    conn.create_scalar_function("ST_MinX", 1, flags, |ctx| {
        let blob = ctx.get_raw(0).as_blob().ok();
        Ok(blob.and_then(spatial::min_x))
    })?;
    conn.create_scalar_function("ST_MaxX", 1, flags, |ctx| {
        let blob = ctx.get_raw(0).as_blob().ok();
        Ok(blob.and_then(spatial::max_x))
    })?;
    conn.create_scalar_function("ST_MinY", 1, flags, |ctx| {
        let blob = ctx.get_raw(0).as_blob().ok();
        Ok(blob.and_then(spatial::min_y))
    })?;
    conn.create_scalar_function("ST_MaxY", 1, flags, |ctx| {
        let blob = ctx.get_raw(0).as_blob().ok();
        Ok(blob.and_then(spatial::max_y))
    })?;
    Ok(())
}
