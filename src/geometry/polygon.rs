//! Polygon{,Z,M,ZM} and MultiPolygon{,Z,M,ZM} — 8 of the 28 variants.
//!
//! A ring (`LinearRing` in the taxonomy) is never addressable on its own; it
//! only ever appears embedded in a polygon's ring list, so there is no
//! separate `LinearRing` type here.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geometry::envelope::{Envelope, EMPTY_ENVELOPE};
use crate::geometry::header::{decode_header, encode_header};
use crate::geometry::lazy::Lazy;
use crate::geometry::primitive::{
    read_prefix, unpack_lines, unpack_polygons, write_full_polygon, write_prefix, write_ring,
    write_u32, WKB_PREFIX_LEN,
};

/// Generates a `Polygon{,Z,M,ZM}` struct: a lazily-decoded sequence of rings,
/// the first of which is the exterior and the rest holes (§4.4/§4.5).
macro_rules! polygon_variant {
    ($name:ident, $wkb_type:expr, $dim:expr, $env_fn:path) => {
        pub struct $name {
            pub srs_id: i32,
            rings: Lazy<Vec<Vec<Vec<f64>>>>,
            env: RefCell<Option<Envelope>>,
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;
            const DIM: usize = $dim;

            pub fn new(srs_id: i32, rings: Vec<Vec<Vec<f64>>>) -> Self {
                Self {
                    srs_id,
                    rings: Lazy::done(rings),
                    env: RefCell::new(None),
                }
            }

            pub fn rings(&self) -> Result<Vec<Vec<Vec<f64>>>> {
                self.rings.get(|bytes| unpack_lines(bytes, Self::DIM, true))
            }

            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.rings()?.is_empty())
            }

            pub fn envelope(&self) -> Result<Envelope> {
                if let Some(env) = *self.env.borrow() {
                    return Ok(env);
                }
                let rings = self.rings()?;
                let exterior = rings.first().cloned().unwrap_or_default();
                let env = $env_fn(&exterior).with_srs(self.srs_id);
                *self.env.borrow_mut() = Some(env);
                Ok(env)
            }

            pub fn to_blob(&self) -> Result<Vec<u8>> {
                let rings = self.rings()?;
                let empty = rings.is_empty();
                let env = if empty { EMPTY_ENVELOPE } else { self.envelope()? };
                let (env_code, env_bytes) = env.encode();
                let mut out = Vec::from(encode_header(self.srs_id, empty, env_code));
                out.extend_from_slice(&env_bytes);
                write_prefix(&mut out, Self::WKB_TYPE);
                write_u32(&mut out, rings.len() as u32);
                for ring in &rings {
                    write_ring(&mut out, ring);
                }
                Ok(out)
            }

            pub fn from_blob(bytes: &[u8]) -> Result<Self> {
                let header = decode_header(bytes)?;
                if header.empty {
                    return Ok(Self::new(header.srs_id, Vec::new()));
                }
                let found = read_prefix(bytes, header.body_offset)?;
                if found != Self::WKB_TYPE {
                    return Err(Error::WrongGeometryType {
                        expected: Self::WKB_TYPE,
                        found,
                        offset: header.body_offset,
                    });
                }
                let env = if header.envelope_code != 0 {
                    let region = bytes
                        .get(8..header.body_offset)
                        .ok_or(Error::Truncated { offset: 8 })?;
                    Some(Envelope::decode(header.envelope_code, region)?.with_srs(header.srs_id))
                } else {
                    None
                };
                let body: Arc<[u8]> = Arc::from(
                    bytes
                        .get(header.body_offset + WKB_PREFIX_LEN..)
                        .ok_or(Error::Truncated { offset: header.body_offset })?,
                );
                Ok(Self {
                    srs_id: header.srs_id,
                    rings: Lazy::pending(body),
                    env: RefCell::new(env),
                })
            }
        }
    };
}

polygon_variant!(Polygon, 3, 2, Envelope::from_xy);
polygon_variant!(PolygonZ, 1003, 3, Envelope::from_xyz);
polygon_variant!(PolygonM, 2003, 3, Envelope::from_xym);
polygon_variant!(PolygonZM, 3003, 4, Envelope::from_xyzm);

/// Generates a `MultiPolygon{,Z,M,ZM}` struct: a lazily-decoded sequence of
/// full WKB polygon elements, envelope derived from each element's exterior
/// ring.
macro_rules! multi_polygon_variant {
    ($name:ident, $wkb_type:expr, $elem_type:expr, $dim:expr, $env_fn:path) => {
        pub struct $name {
            pub srs_id: i32,
            polygons: Lazy<Vec<Vec<Vec<Vec<f64>>>>>,
            env: RefCell<Option<Envelope>>,
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;
            const DIM: usize = $dim;

            pub fn new(srs_id: i32, polygons: Vec<Vec<Vec<Vec<f64>>>>) -> Self {
                Self {
                    srs_id,
                    polygons: Lazy::done(polygons),
                    env: RefCell::new(None),
                }
            }

            pub fn polygons(&self) -> Result<Vec<Vec<Vec<Vec<f64>>>>> {
                self.polygons.get(|bytes| unpack_polygons(bytes, Self::DIM))
            }

            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.polygons()?.is_empty())
            }

            pub fn envelope(&self) -> Result<Envelope> {
                if let Some(env) = *self.env.borrow() {
                    return Ok(env);
                }
                let polygons = self.polygons()?;
                let env = Envelope::from_sub_envelopes(
                    polygons
                        .iter()
                        .map(|rings| $env_fn(rings.first().map(Vec::as_slice).unwrap_or(&[]))),
                )
                .with_srs(self.srs_id);
                *self.env.borrow_mut() = Some(env);
                Ok(env)
            }

            pub fn to_blob(&self) -> Result<Vec<u8>> {
                let polygons = self.polygons()?;
                let empty = polygons.is_empty();
                let env = if empty { EMPTY_ENVELOPE } else { self.envelope()? };
                let (env_code, env_bytes) = env.encode();
                let mut out = Vec::from(encode_header(self.srs_id, empty, env_code));
                out.extend_from_slice(&env_bytes);
                write_prefix(&mut out, Self::WKB_TYPE);
                write_u32(&mut out, polygons.len() as u32);
                for rings in &polygons {
                    write_full_polygon(&mut out, $elem_type, rings);
                }
                Ok(out)
            }

            pub fn from_blob(bytes: &[u8]) -> Result<Self> {
                let header = decode_header(bytes)?;
                if !header.empty {
                    let found = read_prefix(bytes, header.body_offset)?;
                    if found != Self::WKB_TYPE {
                        return Err(Error::WrongGeometryType {
                            expected: Self::WKB_TYPE,
                            found,
                            offset: header.body_offset,
                        });
                    }
                }
                let env = if header.envelope_code != 0 {
                    let region = bytes
                        .get(8..header.body_offset)
                        .ok_or(Error::Truncated { offset: 8 })?;
                    Some(Envelope::decode(header.envelope_code, region)?.with_srs(header.srs_id))
                } else {
                    None
                };
                let body: Arc<[u8]> = Arc::from(
                    bytes
                        .get(header.body_offset + WKB_PREFIX_LEN..)
                        .ok_or(Error::Truncated { offset: header.body_offset })?,
                );
                Ok(Self {
                    srs_id: header.srs_id,
                    polygons: Lazy::pending(body),
                    env: RefCell::new(env),
                })
            }
        }
    };
}

multi_polygon_variant!(MultiPolygon, 6, 3, 2, Envelope::from_xy);
multi_polygon_variant!(MultiPolygonZ, 1006, 1003, 3, Envelope::from_xyz);
multi_polygon_variant!(MultiPolygonM, 2006, 2003, 3, Envelope::from_xym);
multi_polygon_variant!(MultiPolygonZM, 3006, 3003, 4, Envelope::from_xyzm);

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
            vec![10.0, 0.0],
            vec![0.0, 0.0],
        ]
    }

    #[test]
    fn polygon_round_trips_with_hole() {
        let hole = vec![
            vec![2.0, 2.0],
            vec![2.0, 4.0],
            vec![4.0, 4.0],
            vec![4.0, 2.0],
            vec![2.0, 2.0],
        ];
        let poly = Polygon::new(4326, vec![square(), hole]);
        let blob = poly.to_blob().unwrap();
        let decoded = Polygon::from_blob(&blob).unwrap();
        let rings = decoded.rings().unwrap();
        assert_eq!(rings.len(), 2);
        let env = decoded.envelope().unwrap();
        assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (0.0, 10.0, 0.0, 10.0));
    }

    #[test]
    fn multi_polygon_round_trips() {
        let mp = MultiPolygon::new(4326, vec![vec![square()], vec![square()]]);
        let blob = mp.to_blob().unwrap();
        let decoded = MultiPolygon::from_blob(&blob).unwrap();
        assert_eq!(decoded.polygons().unwrap().len(), 2);
    }

    #[test]
    fn multi_polygon_empty_flagged_blob_truncated_before_body_is_error() {
        let blob = [0x47, 0x50, 0x00, 0b0001_0001, 0xE6, 0x10, 0x00, 0x00];
        assert!(MultiPolygon::from_blob(&blob).is_err());
    }
}
