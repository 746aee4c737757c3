//! Point{,Z,M,ZM} and MultiPoint{,Z,M,ZM} — 8 of the 28 geometry variants.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geometry::envelope::{Envelope, EMPTY_ENVELOPE};
use crate::geometry::header::{decode_header, encode_header};
use crate::geometry::lazy::Lazy;
use crate::geometry::primitive::{
    pack_coords, read_f64, read_prefix, unpack_points, write_f64, write_prefix, WKB_PREFIX_LEN,
};

/// Generates a `Point{,Z,M,ZM}` struct: eager encode/decode per §4.4/§4.5,
/// `is_empty` true iff every coordinate is NaN, envelope always the empty
/// sentinel (a point is its own envelope, so one is never stored).
macro_rules! point_variant {
    ($name:ident, $wkb_type:expr, [$($field:ident),+]) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            pub srs_id: i32,
            $(pub $field: f64,)+
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;

            pub fn new(srs_id: i32, $($field: f64),+) -> Self {
                Self { srs_id, $($field),+ }
            }

            pub fn empty(srs_id: i32) -> Self {
                Self { srs_id, $($field: f64::NAN),+ }
            }

            pub fn is_empty(&self) -> bool {
                $(self.$field.is_nan())&&+
            }

            pub fn envelope(&self) -> Envelope {
                EMPTY_ENVELOPE
            }

            pub fn to_blob(&self) -> Vec<u8> {
                let mut out = Vec::from(encode_header(self.srs_id, self.is_empty(), 0));
                write_prefix(&mut out, Self::WKB_TYPE);
                $(write_f64(&mut out, self.$field);)+
                out
            }

            #[allow(unused_assignments)]
            pub fn from_blob(bytes: &[u8]) -> Result<Self> {
                let header = decode_header(bytes)?;
                if header.empty {
                    return Ok(Self::empty(header.srs_id));
                }
                let found = read_prefix(bytes, header.body_offset)?;
                if found != Self::WKB_TYPE {
                    return Err(Error::WrongGeometryType {
                        expected: Self::WKB_TYPE,
                        found,
                        offset: header.body_offset,
                    });
                }
                let mut offset = header.body_offset + WKB_PREFIX_LEN;
                $(
                    let $field = read_f64(bytes, offset)?;
                    offset += 8;
                )+
                Ok(Self::new(header.srs_id, $($field),+))
            }
        }
    };
}

point_variant!(Point, 1, [x, y]);
point_variant!(PointZ, 1001, [x, y, z]);
point_variant!(PointM, 2001, [x, y, m]);
point_variant!(PointZM, 3001, [x, y, z, m]);

/// Generates a `MultiPoint{,Z,M,ZM}` struct: lazily decoded aggregate per
/// §4.5, cached envelope derived from materialized coordinates.
macro_rules! multi_point_variant {
    ($name:ident, $point:ident, $wkb_type:expr, $dim:expr, $has_z:expr, $has_m:expr, $env_fn:path) => {
        pub struct $name {
            pub srs_id: i32,
            coords: Lazy<Vec<Vec<f64>>>,
            env: std::cell::RefCell<Option<Envelope>>,
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;
            const DIM: usize = $dim;

            pub fn new(srs_id: i32, points: Vec<$point>) -> Self {
                let coords = points
                    .iter()
                    .map(AsCoords::as_coords)
                    .collect::<Vec<_>>();
                Self {
                    srs_id,
                    coords: Lazy::done(coords),
                    env: std::cell::RefCell::new(None),
                }
            }

            fn coordinates(&self) -> Result<Vec<Vec<f64>>> {
                self.coords.get(|bytes| unpack_points(bytes, Self::DIM))
            }

            pub fn points(&self) -> Result<Vec<$point>> {
                let srs_id = self.srs_id;
                Ok(self
                    .coordinates()?
                    .into_iter()
                    .map(|c| vec_to_point::<$point>(srs_id, &c))
                    .collect())
            }

            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.coordinates()?.is_empty())
            }

            pub fn envelope(&self) -> Result<Envelope> {
                if let Some(env) = *self.env.borrow() {
                    return Ok(env);
                }
                let coords = self.coordinates()?;
                let env = $env_fn(&coords).with_srs(self.srs_id);
                *self.env.borrow_mut() = Some(env);
                Ok(env)
            }

            pub fn to_blob(&self) -> Result<Vec<u8>> {
                let coords = self.coordinates()?;
                let empty = coords.is_empty();
                let env = if empty {
                    EMPTY_ENVELOPE
                } else {
                    self.envelope()?
                };
                let (env_code, env_bytes) = env.encode();
                let mut out = Vec::from(encode_header(self.srs_id, empty, env_code));
                out.extend_from_slice(&env_bytes);
                write_prefix(&mut out, Self::WKB_TYPE);
                pack_coords(&mut out, &coords, $has_z, $has_m, true);
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
                    coords: Lazy::pending(body),
                    env: std::cell::RefCell::new(env),
                })
            }
        }
    };
}

// Small dispatch trait so the multi-point macro can convert to/from flat
// coordinate tuples regardless of which Point* type it was instantiated for.
trait AsCoords: Sized {
    fn as_coords(&self) -> Vec<f64>;
    fn from_coords(srs_id: i32, c: &[f64]) -> Self;
}
impl AsCoords for Point {
    fn as_coords(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
    fn from_coords(srs_id: i32, c: &[f64]) -> Self {
        Point::new(srs_id, c[0], c[1])
    }
}
impl AsCoords for PointZ {
    fn as_coords(&self) -> Vec<f64> {
        vec![self.x, self.y, self.z]
    }
    fn from_coords(srs_id: i32, c: &[f64]) -> Self {
        PointZ::new(srs_id, c[0], c[1], c[2])
    }
}
impl AsCoords for PointM {
    fn as_coords(&self) -> Vec<f64> {
        vec![self.x, self.y, self.m]
    }
    fn from_coords(srs_id: i32, c: &[f64]) -> Self {
        PointM::new(srs_id, c[0], c[1], c[2])
    }
}
impl AsCoords for PointZM {
    fn as_coords(&self) -> Vec<f64> {
        vec![self.x, self.y, self.z, self.m]
    }
    fn from_coords(srs_id: i32, c: &[f64]) -> Self {
        PointZM::new(srs_id, c[0], c[1], c[2], c[3])
    }
}

fn vec_to_point<P: AsCoords>(srs_id: i32, c: &[f64]) -> P {
    P::from_coords(srs_id, c)
}

multi_point_variant!(
    MultiPoint,
    Point,
    4,
    2,
    false,
    false,
    Envelope::from_xy
);
multi_point_variant!(
    MultiPointZ,
    PointZ,
    1004,
    3,
    true,
    false,
    Envelope::from_xyz
);
multi_point_variant!(
    MultiPointM,
    PointM,
    2004,
    3,
    false,
    true,
    Envelope::from_xym
);
multi_point_variant!(
    MultiPointZM,
    PointZM,
    3004,
    4,
    true,
    true,
    Envelope::from_xyzm
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trips() {
        let p = Point::new(4326, 1.0, 2.0);
        let blob = p.to_blob();
        let decoded = Point::from_blob(&blob).unwrap();
        assert_eq!(p, decoded);
        assert_eq!(
            blob,
            vec![
                0x47, 0x50, 0x00, 0x01, 0xE6, 0x10, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x40,
            ]
        );
    }

    #[test]
    fn empty_point_round_trips() {
        let p = Point::empty(4326);
        assert!(p.is_empty());
        let decoded = Point::from_blob(&p.to_blob()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn multi_point_empty_flagged_blob_truncated_before_body_is_error() {
        // Header declares empty (bit4) with no envelope; body_offset is 8
        // but the blob ends there, 5 bytes short of the WKB prefix.
        let blob = [0x47, 0x50, 0x00, 0b0001_0001, 0xE6, 0x10, 0x00, 0x00];
        assert!(MultiPoint::from_blob(&blob).is_err());
    }

    #[test]
    fn multi_point_lazily_decodes() {
        let mp = MultiPoint::new(4326, vec![Point::new(4326, 1.0, 2.0), Point::new(4326, 3.0, 4.0)]);
        let blob = mp.to_blob().unwrap();
        let decoded = MultiPoint::from_blob(&blob).unwrap();
        let env = decoded.envelope().unwrap();
        assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (1.0, 3.0, 2.0, 4.0));
        // second call reuses the cached envelope
        assert_eq!(decoded.envelope().unwrap(), env);
    }
}
