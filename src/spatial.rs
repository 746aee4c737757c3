//! Spatial predicate functions (§4.6): pure functions over a raw geometry
//! blob, preferring the embedded envelope and falling back to a single
//! decode pass whose AABB is cached keyed by the blob's contents.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::geometry::{
    Envelope, GeometryType, MultiLineString, MultiLineStringM, MultiLineStringZ,
    MultiLineStringZM, MultiPoint, MultiPointM, MultiPointZ, MultiPointZM, MultiPolygon,
    MultiPolygonM, MultiPolygonZ, MultiPolygonZM, Point, PointM, PointZ, PointZM, Polygon,
    PolygonM, PolygonZ, PolygonZM,
};
use crate::geometry::{LineString, LineStringM, LineStringZ, LineStringZM};

const AABB_CACHE_CAPACITY: usize = 256;

/// `(min_x, max_x, min_y, max_y)`.
type Aabb = (f64, f64, f64, f64);

static AABB_CACHE: Lazy<Mutex<HashMap<Vec<u8>, Aabb>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// `ST_IsEmpty`: decode only byte 3's empty-geometry bit.
pub fn is_empty(blob: &[u8]) -> Option<bool> {
    let flags = *blob.get(3)?;
    Some((flags >> 4) & 1 == 1)
}

pub fn min_x(blob: &[u8]) -> Option<f64> {
    aabb(blob).map(|(min_x, ..)| min_x)
}

pub fn max_x(blob: &[u8]) -> Option<f64> {
    aabb(blob).map(|(_, max_x, ..)| max_x)
}

pub fn min_y(blob: &[u8]) -> Option<f64> {
    aabb(blob).map(|(_, _, min_y, _)| min_y)
}

pub fn max_y(blob: &[u8]) -> Option<f64> {
    aabb(blob).map(|(_, _, _, max_y)| max_y)
}

fn aabb(blob: &[u8]) -> Option<Aabb> {
    if let Some(hit) = AABB_CACHE.lock().unwrap().get(blob) {
        return Some(*hit);
    }
    let computed = compute_aabb(blob)?;
    let mut cache = AABB_CACHE.lock().unwrap();
    if cache.len() >= AABB_CACHE_CAPACITY {
        cache.clear();
    }
    cache.insert(blob.to_vec(), computed);
    Some(computed)
}

fn compute_aabb(blob: &[u8]) -> Option<Aabb> {
    let header = crate::geometry::header_for_predicates(blob).ok()?;
    if header.envelope_code != 0 {
        let region = blob.get(8..header.body_offset)?;
        let env = Envelope::decode(header.envelope_code, region).ok()?;
        return Some((env.min_x, env.max_x, env.min_y, env.max_y));
    }
    if header.empty {
        return None;
    }
    let wkb_type = crate::geometry::primitive::read_prefix(blob, header.body_offset).ok()?;
    let variant = GeometryType::from_wkb_type(wkb_type)?;
    if let GeometryType::Point(_) = variant {
        let coord_offset = header.body_offset + crate::geometry::primitive::WKB_PREFIX_LEN;
        let x = crate::geometry::primitive::read_f64(blob, coord_offset).ok()?;
        let y = crate::geometry::primitive::read_f64(blob, coord_offset + 8).ok()?;
        return Some((x, x, y, y));
    }
    let env = envelope_of(variant, blob).ok()?;
    Some((env.min_x, env.max_x, env.min_y, env.max_y))
}

/// Decode `blob` through the variant its WKB prefix names and return its
/// envelope. Any mismatch between the prefix and the actual body surfaces
/// as a decode error here, which the caller turns into SQL null.
fn envelope_of(variant: GeometryType, blob: &[u8]) -> crate::error::Result<Envelope> {
    use crate::geometry::Dimensionality::*;
    use GeometryType::*;
    Ok(match variant {
        Point(Xy) => self::Point::from_blob(blob)?.envelope(),
        Point(Z) => PointZ::from_blob(blob)?.envelope(),
        Point(M) => PointM::from_blob(blob)?.envelope(),
        Point(Zm) => PointZM::from_blob(blob)?.envelope(),
        LineString(Xy) => self::LineString::from_blob(blob)?.envelope()?,
        LineString(Z) => LineStringZ::from_blob(blob)?.envelope()?,
        LineString(M) => LineStringM::from_blob(blob)?.envelope()?,
        LineString(Zm) => LineStringZM::from_blob(blob)?.envelope()?,
        Polygon(Xy) => self::Polygon::from_blob(blob)?.envelope()?,
        Polygon(Z) => PolygonZ::from_blob(blob)?.envelope()?,
        Polygon(M) => PolygonM::from_blob(blob)?.envelope()?,
        Polygon(Zm) => PolygonZM::from_blob(blob)?.envelope()?,
        MultiPoint(Xy) => self::MultiPoint::from_blob(blob)?.envelope()?,
        MultiPoint(Z) => MultiPointZ::from_blob(blob)?.envelope()?,
        MultiPoint(M) => MultiPointM::from_blob(blob)?.envelope()?,
        MultiPoint(Zm) => MultiPointZM::from_blob(blob)?.envelope()?,
        MultiLineString(Xy) => self::MultiLineString::from_blob(blob)?.envelope()?,
        MultiLineString(Z) => MultiLineStringZ::from_blob(blob)?.envelope()?,
        MultiLineString(M) => MultiLineStringM::from_blob(blob)?.envelope()?,
        MultiLineString(Zm) => MultiLineStringZM::from_blob(blob)?.envelope()?,
        MultiPolygon(Xy) => self::MultiPolygon::from_blob(blob)?.envelope()?,
        MultiPolygon(Z) => MultiPolygonZ::from_blob(blob)?.envelope()?,
        MultiPolygon(M) => MultiPolygonM::from_blob(blob)?.envelope()?,
        MultiPolygon(Zm) => MultiPolygonZM::from_blob(blob)?.envelope()?,
        LinearRing(_) => return Err(crate::error::Error::MalformedHeader { offset: 0 }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn is_empty_reads_flags_bit() {
        let empty = Point::empty(4326).to_blob();
        let present = Point::new(4326, 1.0, 2.0).to_blob();
        assert_eq!(is_empty(&empty), Some(true));
        assert_eq!(is_empty(&present), Some(false));
    }

    #[test]
    fn is_empty_on_truncated_blob_is_null() {
        assert_eq!(is_empty(&[0, 1]), None);
    }

    #[test]
    fn min_max_prefer_embedded_envelope() {
        let ls = LineString::new(4326, vec![vec![0.0, 0.0], vec![5.0, 10.0]]);
        let blob = ls.to_blob().unwrap();
        assert_eq!(min_x(&blob), Some(0.0));
        assert_eq!(max_x(&blob), Some(5.0));
        assert_eq!(min_y(&blob), Some(0.0));
        assert_eq!(max_y(&blob), Some(10.0));
    }

    #[test]
    fn falls_back_to_point_xy_without_envelope() {
        let p = Point::new(4326, 3.0, 7.0);
        let blob = p.to_blob();
        assert_eq!(min_x(&blob), Some(3.0));
        assert_eq!(max_x(&blob), Some(3.0));
        assert_eq!(min_y(&blob), Some(7.0));
        assert_eq!(max_y(&blob), Some(7.0));
    }

    #[test]
    fn unparseable_blob_yields_null_not_panic() {
        assert_eq!(min_x(&[1, 2, 3]), None);
    }

    #[test]
    fn envelope_flag_set_but_region_truncated_yields_null_not_panic() {
        // Well-formed 8-byte header declaring envelope code 1 (32 bytes),
        // but the blob ends right after the header.
        let blob = [0x47, 0x50, 0x00, 0b0000_0011, 0xE6, 0x10, 0x00, 0x00];
        assert_eq!(min_x(&blob), None);
        assert_eq!(max_x(&blob), None);
        assert_eq!(min_y(&blob), None);
        assert_eq!(max_y(&blob), None);
    }
}
