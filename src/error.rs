//! Crate-wide error type.

/// The result type returned by most methods within the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad magic, version, or byte-order bit in the 8-byte geometry header.
    #[error("malformed geopackage geometry header at byte offset {offset}")]
    MalformedHeader { offset: usize },

    /// Header envelope code was 5, 6, or 7.
    #[error("unsupported envelope code {code} at byte offset {offset}")]
    UnsupportedEnvelopeCode { code: u8, offset: usize },

    /// The WKB type code did not match the variant the caller requested.
    #[error("wrong geometry type: expected wkb type {expected}, found {found} at byte offset {offset}")]
    WrongGeometryType {
        expected: u32,
        found: u32,
        offset: usize,
    },

    /// Blob shorter than the header, envelope, or body implied by counts.
    #[error("geometry blob truncated at byte offset {offset}")]
    Truncated { offset: usize },

    /// A count times dimension times 8 exceeds the remaining bytes.
    #[error("invalid coordinate count at byte offset {offset}")]
    InvalidCount { offset: usize },

    /// A constructor was given coordinate tuples with the wrong arity.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A table/column identifier was a SQL keyword or not a valid bare
    /// identifier, so it cannot be safely composed into SQL text.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The referenced SRS id has no row in `gpkg_spatial_ref_sys`.
    #[error("unknown spatial reference system id {0}")]
    UnknownSrs(i32),

    /// GeoPackage failed one of the validation checks performed on open.
    #[error("geopackage failed validation: {0}")]
    Validation(String),

    #[error("sqlite error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}
