//! LineString{,Z,M,ZM} and MultiLineString{,Z,M,ZM} — 8 of the 28 variants.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geometry::envelope::{Envelope, EMPTY_ENVELOPE};
use crate::geometry::header::{decode_header, encode_header};
use crate::geometry::lazy::Lazy;
use crate::geometry::primitive::{
    read_prefix, unpack_line, unpack_lines, write_full_line, write_prefix, write_ring,
    WKB_PREFIX_LEN,
};

/// Generates a `LineString{,Z,M,ZM}` struct: a single lazily-decoded ring of
/// coordinate tuples per §4.4/§4.5.
macro_rules! line_variant {
    ($name:ident, $wkb_type:expr, $dim:expr, $env_fn:path) => {
        pub struct $name {
            pub srs_id: i32,
            coords: Lazy<Vec<Vec<f64>>>,
            env: RefCell<Option<Envelope>>,
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;
            const DIM: usize = $dim;

            pub fn new(srs_id: i32, points: Vec<Vec<f64>>) -> Self {
                Self {
                    srs_id,
                    coords: Lazy::done(points),
                    env: RefCell::new(None),
                }
            }

            pub fn coordinates(&self) -> Result<Vec<Vec<f64>>> {
                // the outer WKB prefix was already consumed in `from_blob`,
                // so the remaining body is bare count + coords (ring shape).
                self.coords.get(|bytes| unpack_line(bytes, Self::DIM, true))
            }

            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.coordinates()?.is_empty())
            }

            pub fn envelope(&self) -> Result<Envelope> {
                if let Some(env) = *self.env.borrow() {
                    return Ok(env);
                }
                let env = $env_fn(&self.coordinates()?).with_srs(self.srs_id);
                *self.env.borrow_mut() = Some(env);
                Ok(env)
            }

            pub fn to_blob(&self) -> Result<Vec<u8>> {
                let coords = self.coordinates()?;
                let empty = coords.is_empty();
                let env = if empty { EMPTY_ENVELOPE } else { self.envelope()? };
                let (env_code, env_bytes) = env.encode();
                let mut out = Vec::from(encode_header(self.srs_id, empty, env_code));
                out.extend_from_slice(&env_bytes);
                write_prefix(&mut out, Self::WKB_TYPE);
                write_ring(&mut out, &coords);
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
                    coords: Lazy::pending(body),
                    env: RefCell::new(env),
                })
            }
        }
    };
}

line_variant!(LineString, 2, 2, Envelope::from_xy);
line_variant!(LineStringZ, 1002, 3, Envelope::from_xyz);
line_variant!(LineStringM, 2002, 3, Envelope::from_xym);
line_variant!(LineStringZM, 3002, 4, Envelope::from_xyzm);

/// Generates a `MultiLineString{,Z,M,ZM}` struct: a lazily-decoded sequence
/// of line element bodies, envelope derived axis-wise from the elements.
macro_rules! multi_line_variant {
    ($name:ident, $wkb_type:expr, $elem_type:expr, $dim:expr, $env_fn:path) => {
        pub struct $name {
            pub srs_id: i32,
            lines: Lazy<Vec<Vec<Vec<f64>>>>,
            env: RefCell<Option<Envelope>>,
        }

        impl $name {
            pub(crate) const WKB_TYPE: u32 = $wkb_type;
            const DIM: usize = $dim;

            pub fn new(srs_id: i32, lines: Vec<Vec<Vec<f64>>>) -> Self {
                Self {
                    srs_id,
                    lines: Lazy::done(lines),
                    env: RefCell::new(None),
                }
            }

            pub fn lines(&self) -> Result<Vec<Vec<Vec<f64>>>> {
                self.lines.get(|bytes| unpack_lines(bytes, Self::DIM, false))
            }

            pub fn is_empty(&self) -> Result<bool> {
                Ok(self.lines()?.is_empty())
            }

            pub fn envelope(&self) -> Result<Envelope> {
                if let Some(env) = *self.env.borrow() {
                    return Ok(env);
                }
                let lines = self.lines()?;
                let env = Envelope::from_sub_envelopes(lines.iter().map(|l| $env_fn(l)))
                    .with_srs(self.srs_id);
                *self.env.borrow_mut() = Some(env);
                Ok(env)
            }

            pub fn to_blob(&self) -> Result<Vec<u8>> {
                let lines = self.lines()?;
                let empty = lines.is_empty();
                let env = if empty { EMPTY_ENVELOPE } else { self.envelope()? };
                let (env_code, env_bytes) = env.encode();
                let mut out = Vec::from(encode_header(self.srs_id, empty, env_code));
                out.extend_from_slice(&env_bytes);
                write_prefix(&mut out, Self::WKB_TYPE);
                crate::geometry::primitive::write_u32(&mut out, lines.len() as u32);
                for line in &lines {
                    write_full_line(&mut out, $elem_type, line);
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
                    lines: Lazy::pending(body),
                    env: RefCell::new(env),
                })
            }
        }
    };
}

multi_line_variant!(MultiLineString, 5, 2, 2, Envelope::from_xy);
multi_line_variant!(MultiLineStringZ, 1005, 1002, 3, Envelope::from_xyz);
multi_line_variant!(MultiLineStringM, 2005, 2002, 3, Envelope::from_xym);
multi_line_variant!(MultiLineStringZM, 3005, 3002, 4, Envelope::from_xyzm);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_string_round_trips() {
        let ls = LineString::new(4326, vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]]);
        let blob = ls.to_blob().unwrap();
        let decoded = LineString::from_blob(&blob).unwrap();
        assert_eq!(decoded.coordinates().unwrap(), ls.coordinates().unwrap());
        let env = decoded.envelope().unwrap();
        assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (0.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn empty_line_string_round_trips() {
        let ls = LineString::new(4326, Vec::new());
        let decoded = LineString::from_blob(&ls.to_blob().unwrap()).unwrap();
        assert!(decoded.is_empty().unwrap());
    }

    #[test]
    fn multi_line_string_empty_flagged_blob_truncated_before_body_is_error() {
        let blob = [0x47, 0x50, 0x00, 0b0001_0001, 0xE6, 0x10, 0x00, 0x00];
        assert!(MultiLineString::from_blob(&blob).is_err());
    }

    #[test]
    fn multi_line_string_envelope_spans_elements() {
        let mls = MultiLineString::new(
            4326,
            vec![
                vec![vec![0.0, 0.0], vec![1.0, 1.0]],
                vec![vec![-1.0, 5.0], vec![2.0, 2.0]],
            ],
        );
        let blob = mls.to_blob().unwrap();
        let decoded = MultiLineString::from_blob(&blob).unwrap();
        let env = decoded.envelope().unwrap();
        assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (-1.0, 2.0, 0.0, 5.0));
    }
}
