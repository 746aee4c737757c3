//! DDL and SQL templates for GeoPackage bootstrap and schema-object creation.

pub(crate) mod table_definitions {
    pub const CREATE_SPATIAL_REF_SYS_TABLE: &str = "
        CREATE TABLE gpkg_spatial_ref_sys (
            srs_name TEXT NOT NULL,
            srs_id INTEGER NOT NULL PRIMARY KEY,
            organization TEXT NOT NULL,
            organization_coordsys_id INTEGER NOT NULL,
            definition TEXT NOT NULL,
            description TEXT
        )";

    pub const CREATE_CONTENTS_TABLE: &str = "
        CREATE TABLE gpkg_contents (
            table_name TEXT NOT NULL PRIMARY KEY,
            data_type TEXT NOT NULL,
            identifier TEXT UNIQUE,
            description TEXT DEFAULT '',
            last_change TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            min_x DOUBLE,
            min_y DOUBLE,
            max_x DOUBLE,
            max_y DOUBLE,
            srs_id INTEGER,
            CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        )";

    pub const CREATE_GEOMETRY_COLUMNS_TABLE: &str = "
        CREATE TABLE gpkg_geometry_columns (
            table_name TEXT NOT NULL,
            column_name TEXT NOT NULL,
            geometry_type_name TEXT NOT NULL,
            srs_id INTEGER NOT NULL,
            z TINYINT NOT NULL,
            m TINYINT NOT NULL,
            CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
            CONSTRAINT uk_gc_table_name UNIQUE (table_name),
            CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
            CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        )";

    pub const CREATE_EXTENSTIONS_TABLE: &str = "
        CREATE TABLE gpkg_extensions (
            table_name TEXT,
            column_name TEXT,
            extension_name TEXT NOT NULL,
            definition TEXT NOT NULL,
            scope TEXT NOT NULL,
            CONSTRAINT ge_tce UNIQUE (table_name, column_name, extension_name)
        )";

    pub const CREATE_TILE_MATRIX_TABLE: &str = "
        CREATE TABLE gpkg_tile_matrix (
            table_name TEXT NOT NULL,
            zoom_level INTEGER NOT NULL,
            matrix_width INTEGER NOT NULL,
            matrix_height INTEGER NOT NULL,
            tile_width INTEGER NOT NULL,
            tile_height INTEGER NOT NULL,
            pixel_x_size DOUBLE NOT NULL,
            pixel_y_size DOUBLE NOT NULL,
            CONSTRAINT pk_ttm PRIMARY KEY (table_name, zoom_level),
            CONSTRAINT fk_tmm_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name)
        )";

    pub const CREATE_TILE_MATRIX_SET_TABLE: &str = "
        CREATE TABLE gpkg_tile_matrix_set (
            table_name TEXT NOT NULL PRIMARY KEY,
            srs_id INTEGER NOT NULL,
            min_x DOUBLE NOT NULL,
            min_y DOUBLE NOT NULL,
            max_x DOUBLE NOT NULL,
            max_y DOUBLE NOT NULL,
            CONSTRAINT fk_gtms_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
            CONSTRAINT fk_gtms_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        )";
}

/// Registers the single `gpkg_geom_ext` row in `gpkg_extensions` so a reader
/// knows this file's geometry columns use the codec implemented here.
pub(crate) const INSERT_GPKG_EXTENSION: &str = "
    INSERT INTO gpkg_extensions (
        table_name, column_name, extension_name, definition, scope)
    VALUES (?1, ?2, ?3, ?4, ?5)";

pub(crate) const INSERT_GPKG_SRS: &str =
    "INSERT INTO gpkg_spatial_ref_sys VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const INSERT_GPKG_CONTENTS: &str = "
    INSERT INTO gpkg_contents (table_name, data_type, identifier, description, srs_id)
    VALUES (?1, ?2, ?3, ?4, ?5)";

pub(crate) const INSERT_GPKG_GEOMETRY_COLUMNS: &str = "
    INSERT INTO gpkg_geometry_columns (
        table_name, column_name, geometry_type_name, srs_id, z, m)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// `{name}` the escaped table name, `{geom_name}` the escaped geometry
/// column name, `{geometry_type}` its declared SQL type name (used by the
/// `FromSql`/`ToSql` dispatch to pick the right geometry struct), `{fields}`
/// the comma-joined non-geometry column definitions.
pub(crate) const CREATE_FEATURE_TABLE: &str = "CREATE TABLE {name} (\n        fid INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,\n        {geom_name} {geometry_type}{fields}\n    )";

/// `{name}` the escaped table name, `{fields}` the comma-joined column
/// definitions (an attributes-only table has no geometry column).
pub(crate) const CREATE_ATTRIBUTE_TABLE: &str = "CREATE TABLE {name} (\n        fid INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT{fields}\n    )";
