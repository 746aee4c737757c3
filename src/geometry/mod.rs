//! GeoPackage geometry blob codec: header, envelope, WKB primitives, and the
//! 28-variant type taxonomy, collapsed here into 24 addressable Rust types
//! (`LinearRing` is polygon-internal and never encoded/decoded on its own).

mod envelope;
pub(crate) mod header;
mod lazy;
mod linestring;
mod point;
mod polygon;
pub(crate) mod primitive;

pub use envelope::{Envelope, EMPTY_ENVELOPE};
pub use linestring::{
    LineString, LineStringM, LineStringZ, LineStringZM, MultiLineString, MultiLineStringM,
    MultiLineStringZ, MultiLineStringZM,
};
pub use point::{MultiPoint, MultiPointM, MultiPointZ, MultiPointZM, Point, PointM, PointZ, PointZM};
pub use polygon::{
    MultiPolygon, MultiPolygonM, MultiPolygonZ, MultiPolygonZM, Polygon, PolygonM, PolygonZ,
    PolygonZM,
};

pub(crate) mod sql_bridge;
pub use sql_bridge::register_predicates;

/// Decode the 8-byte header (and envelope-code sub-field) of a raw blob for
/// the spatial predicate functions, which never materialize a typed value.
pub(crate) fn header_for_predicates(bytes: &[u8]) -> crate::error::Result<header::DecodedHeader> {
    header::decode_header(bytes)
}

/// The dimensionality tag shared by every family: plain XY, Z-only, M-only,
/// or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensionality {
    Xy,
    Z,
    M,
    Zm,
}

/// One of the 28 geometry variants named by the OGC/ISO SQL-MM taxonomy.
///
/// `LinearRing` variants are included for completeness (every WKB type code
/// the format reserves has a tag here) but the codec never produces or
/// consumes a standalone `LinearRing` blob — rings only ever appear nested
/// inside a polygon's ring list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point(Dimensionality),
    LineString(Dimensionality),
    Polygon(Dimensionality),
    MultiPoint(Dimensionality),
    MultiLineString(Dimensionality),
    MultiPolygon(Dimensionality),
    LinearRing(Dimensionality),
}

impl GeometryType {
    /// The WKB type code this variant serializes under.
    pub fn wkb_type(self) -> u32 {
        use Dimensionality::*;
        use GeometryType::*;
        let (base, dim) = match self {
            Point(d) => (1, d),
            LineString(d) => (2, d),
            Polygon(d) => (3, d),
            MultiPoint(d) => (4, d),
            MultiLineString(d) => (5, d),
            MultiPolygon(d) => (6, d),
            LinearRing(d) => (101, d),
        };
        let offset = match dim {
            Xy => 0,
            Z => 1000,
            M => 2000,
            Zm => 3000,
        };
        base + offset
    }

    /// Number of coordinate scalars per tuple for this variant's dimension.
    pub fn dimension(self) -> usize {
        match self {
            GeometryType::Point(d)
            | GeometryType::LineString(d)
            | GeometryType::Polygon(d)
            | GeometryType::MultiPoint(d)
            | GeometryType::MultiLineString(d)
            | GeometryType::MultiPolygon(d)
            | GeometryType::LinearRing(d) => match d {
                Dimensionality::Xy => 2,
                Dimensionality::Z | Dimensionality::M => 3,
                Dimensionality::Zm => 4,
            },
        }
    }

    /// Decode a WKB type code back into its variant, if it names one of the
    /// 28 recognized tags (base codes 1-6 plus the Z/M/ZM 1000-offsets; the
    /// `101` ring family is not a real WKB code and is never matched here,
    /// since rings never carry their own prefix on the wire).
    pub fn from_wkb_type(code: u32) -> Option<Self> {
        use Dimensionality::*;
        let (base, dim) = match code {
            0..=6 => (code, Xy),
            1000..=1006 => (code - 1000, Z),
            2000..=2006 => (code - 2000, M),
            3000..=3006 => (code - 3000, Zm),
            _ => return None,
        };
        Some(match base {
            1 => GeometryType::Point(dim),
            2 => GeometryType::LineString(dim),
            3 => GeometryType::Polygon(dim),
            4 => GeometryType::MultiPoint(dim),
            5 => GeometryType::MultiLineString(dim),
            6 => GeometryType::MultiPolygon(dim),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wkb_type_round_trips_all_28() {
        use Dimensionality::*;
        let families = [
            GeometryType::Point as fn(Dimensionality) -> GeometryType,
            GeometryType::LineString,
            GeometryType::Polygon,
            GeometryType::MultiPoint,
            GeometryType::MultiLineString,
            GeometryType::MultiPolygon,
            GeometryType::LinearRing,
        ];
        for family in families {
            for dim in [Xy, Z, M, Zm] {
                let variant = family(dim);
                if matches!(variant, GeometryType::LinearRing(_)) {
                    continue;
                }
                let code = variant.wkb_type();
                assert_eq!(GeometryType::from_wkb_type(code), Some(variant));
            }
        }
    }

    #[test]
    fn dimension_matches_z_m_zm() {
        assert_eq!(GeometryType::Point(Dimensionality::Xy).dimension(), 2);
        assert_eq!(GeometryType::Point(Dimensionality::Z).dimension(), 3);
        assert_eq!(GeometryType::Point(Dimensionality::M).dimension(), 3);
        assert_eq!(GeometryType::Point(Dimensionality::Zm).dimension(), 4);
    }
}
