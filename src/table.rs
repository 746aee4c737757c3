//! Schema objects: `Field`, `Table` (attribute-only), and `FeatureClass`
//! (table with a geometry column), plus identifier validation.

use rusqlite::Params;

use crate::error::{Error, Result};
use crate::sql::{
    CREATE_ATTRIBUTE_TABLE, CREATE_FEATURE_TABLE, INSERT_GPKG_CONTENTS,
    INSERT_GPKG_GEOMETRY_COLUMNS,
};
use crate::GeoPackage;

const KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHOUT",
];

/// Validate a table or column identifier: must match `[A-Za-z_]\w*` and must
/// not be a SQL keyword. Unlike `fudgeo.util.escape_name`, an invalid name is
/// rejected rather than wrapped in quotes — this codec never needs to
/// round-trip arbitrary user-chosen identifiers.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !starts_ok || !rest_ok || KEYWORDS.contains(&name.to_ascii_uppercase().as_str()) {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}

/// SQLite/GeoPackage column affinity names, per §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    TinyInt,
    SmallInt,
    MediumInt,
    Integer,
    Float,
    Double,
    Real,
    Text,
    Blob,
    Date,
    Timestamp,
    DateTime,
}

impl FieldType {
    fn as_sql(self) -> &'static str {
        match self {
            FieldType::Boolean => "BOOLEAN",
            FieldType::TinyInt => "TINYINT",
            FieldType::SmallInt => "SMALLINT",
            FieldType::MediumInt => "MEDIUMINT",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Real => "REAL",
            FieldType::Text => "TEXT",
            FieldType::Blob => "BLOB",
            FieldType::Date => "DATE",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::DateTime => "DATETIME",
        }
    }
}

/// One non-geometry column descriptor.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub size: Option<u32>,
    pub not_null: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
            size: None,
            not_null: false,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn definition(&self) -> Result<String> {
        let name = validate_identifier(&self.name)?;
        let size = match (self.field_type, self.size) {
            (FieldType::Text | FieldType::Blob, Some(n)) => format!("({n})"),
            _ => String::new(),
        };
        let suffix = if self.not_null { " NOT NULL" } else { "" };
        Ok(format!("{name} {}{size}{suffix}", self.field_type.as_sql()))
    }
}

/// An attribute-only table (`data_type = attributes` in `gpkg_contents`).
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Table {
            name: name.into(),
            fields,
        }
    }

    fn field_defs(&self) -> Result<String> {
        let mut out = String::new();
        for field in &self.fields {
            out.push_str(", ");
            out.push_str(&field.definition()?);
        }
        Ok(out)
    }

    /// Create the table and register it in `gpkg_contents`.
    pub fn create(&self, gpkg: &GeoPackage) -> Result<()> {
        let name = validate_identifier(&self.name)?;
        let sql = CREATE_ATTRIBUTE_TABLE
            .replace("{name}", name)
            .replace("{fields}", &self.field_defs()?);
        gpkg.conn.execute(&sql, [])?;
        gpkg.conn.execute(
            INSERT_GPKG_CONTENTS,
            rusqlite::params![name, "attributes", name, "", Option::<i32>::None],
        )?;
        Ok(())
    }

    pub fn insert(&self, gpkg: &GeoPackage, sql: &str, params: impl Params) -> Result<i64> {
        gpkg.conn.execute(sql, params)?;
        Ok(gpkg.conn.last_insert_rowid())
    }
}

/// A table with a single geometry column (`data_type = features`).
pub struct FeatureClass {
    pub name: String,
    pub fields: Vec<Field>,
    pub geometry_column: String,
    /// One of the 28 variant names, e.g. `"LineStringZ"` — used verbatim as
    /// the declared SQL type so rusqlite's `FromSql` dispatch by Rust type
    /// lines up with the column's declared geometry type at the call site.
    pub geometry_type: String,
    pub srs_id: i32,
}

impl FeatureClass {
    pub fn new(
        name: impl Into<String>,
        geometry_column: impl Into<String>,
        geometry_type: impl Into<String>,
        srs_id: i32,
        fields: Vec<Field>,
    ) -> Self {
        FeatureClass {
            name: name.into(),
            fields,
            geometry_column: geometry_column.into(),
            geometry_type: geometry_type.into(),
            srs_id,
        }
    }

    fn field_defs(&self) -> Result<String> {
        let mut out = String::new();
        for field in &self.fields {
            out.push_str(", ");
            out.push_str(&field.definition()?);
        }
        Ok(out)
    }

    pub fn create(&self, gpkg: &GeoPackage) -> Result<()> {
        let name = validate_identifier(&self.name)?;
        let geom_name = validate_identifier(&self.geometry_column)?;
        let sql = CREATE_FEATURE_TABLE
            .replace("{name}", name)
            .replace("{geom_name}", geom_name)
            .replace("{geometry_type}", &self.geometry_type)
            .replace("{fields}", &self.field_defs()?);
        gpkg.conn.execute(&sql, [])?;
        gpkg.conn.execute(
            INSERT_GPKG_CONTENTS,
            rusqlite::params![name, "features", name, "", self.srs_id],
        )?;
        let (z, m) = z_m_flags(&self.geometry_type);
        gpkg.conn.execute(
            INSERT_GPKG_GEOMETRY_COLUMNS,
            rusqlite::params![name, geom_name, &self.geometry_type, self.srs_id, z, m],
        )?;
        Ok(())
    }

    pub fn insert(&self, gpkg: &GeoPackage, sql: &str, params: impl Params) -> Result<i64> {
        gpkg.conn.execute(sql, params)?;
        Ok(gpkg.conn.last_insert_rowid())
    }
}

fn z_m_flags(geometry_type: &str) -> (i32, i32) {
    let has_z = geometry_type.ends_with('Z') || geometry_type.ends_with("ZM");
    let has_m = geometry_type.ends_with('M');
    (has_z as i32, has_m as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_keyword_identifiers() {
        assert!(validate_identifier("select").is_err());
        assert!(validate_identifier("Table").is_err());
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(validate_identifier("1table").is_err());
        assert!(validate_identifier("my table").is_err());
    }

    #[test]
    fn accepts_ordinary_identifiers() {
        assert!(validate_identifier("roads").is_ok());
        assert!(validate_identifier("_hidden").is_ok());
    }

    #[test]
    fn z_m_flags_detected_from_type_name() {
        assert_eq!(z_m_flags("LineString"), (0, 0));
        assert_eq!(z_m_flags("LineStringZ"), (1, 0));
        assert_eq!(z_m_flags("LineStringM"), (0, 1));
        assert_eq!(z_m_flags("LineStringZM"), (1, 1));
    }
}
