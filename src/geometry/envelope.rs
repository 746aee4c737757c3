//! The envelope (axis-aligned bounding box) model and its on-disk codec.

use crate::error::{Error, Result};
use crate::geometry::header::ENVELOPE_DOUBLE_COUNT;
use crate::geometry::primitive::{read_f64, write_f64};

/// An immutable axis-aligned bounding box covering XY, XYZ, XYM, or XYZM.
///
/// Equality is component-wise with NaN treated as equal to NaN, so that
/// [`EMPTY_ENVELOPE`] compares equal to itself (`f64`'s own `PartialEq`
/// would not consider two NaNs equal).
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub code: u8,
    pub srs_id: i32,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_m: f64,
    pub max_m: f64,
}

/// Sentinel for "no envelope known" — code 0, every axis NaN.
pub const EMPTY_ENVELOPE: Envelope = Envelope {
    code: 0,
    srs_id: 0,
    min_x: f64::NAN,
    max_x: f64::NAN,
    min_y: f64::NAN,
    max_y: f64::NAN,
    min_z: f64::NAN,
    max_z: f64::NAN,
    min_m: f64::NAN,
    max_m: f64::NAN,
};

fn nan_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.srs_id == other.srs_id
            && nan_eq(self.min_x, other.min_x)
            && nan_eq(self.max_x, other.max_x)
            && nan_eq(self.min_y, other.min_y)
            && nan_eq(self.max_y, other.max_y)
            && nan_eq(self.min_z, other.min_z)
            && nan_eq(self.max_z, other.max_z)
            && nan_eq(self.min_m, other.min_m)
            && nan_eq(self.max_m, other.max_m)
    }
}

impl Envelope {
    pub(crate) fn with_srs(mut self, srs_id: i32) -> Self {
        self.srs_id = srs_id;
        self
    }

    /// Tight AABB over XY coordinate tuples.
    pub(crate) fn from_xy(points: &[Vec<f64>]) -> Self {
        if points.is_empty() {
            return EMPTY_ENVELOPE;
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
        }
        Envelope {
            code: 1,
            min_x,
            max_x,
            min_y,
            max_y,
            ..EMPTY_ENVELOPE
        }
    }

    /// Tight AABB over XYZ coordinate tuples.
    pub(crate) fn from_xyz(points: &[Vec<f64>]) -> Self {
        if points.is_empty() {
            return EMPTY_ENVELOPE;
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_z, mut max_z) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
            min_z = min_z.min(p[2]);
            max_z = max_z.max(p[2]);
        }
        Envelope {
            code: 2,
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
            ..EMPTY_ENVELOPE
        }
    }

    /// Tight AABB over XYM coordinate tuples (third scalar is the measure).
    pub(crate) fn from_xym(points: &[Vec<f64>]) -> Self {
        if points.is_empty() {
            return EMPTY_ENVELOPE;
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_m, mut max_m) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
            min_m = min_m.min(p[2]);
            max_m = max_m.max(p[2]);
        }
        Envelope {
            code: 3,
            min_x,
            max_x,
            min_y,
            max_y,
            min_m,
            max_m,
            ..EMPTY_ENVELOPE
        }
    }

    /// Tight AABB over XYZM coordinate tuples.
    pub(crate) fn from_xyzm(points: &[Vec<f64>]) -> Self {
        if points.is_empty() {
            return EMPTY_ENVELOPE;
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_z, mut max_z) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_m, mut max_m) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
            min_z = min_z.min(p[2]);
            max_z = max_z.max(p[2]);
            min_m = min_m.min(p[3]);
            max_m = max_m.max(p[3]);
        }
        Envelope {
            code: 4,
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
            min_m,
            max_m,
            ..EMPTY_ENVELOPE
        }
    }

    /// Axis-wise min/max of a sequence of sub-geometry envelopes (used to
    /// derive a Polygon/MultiLineString/MultiPolygon envelope from its parts).
    pub(crate) fn from_sub_envelopes(envelopes: impl Iterator<Item = Envelope>) -> Self {
        let mut acc: Option<Envelope> = None;
        for e in envelopes {
            acc = Some(match acc {
                None => e,
                Some(a) => Envelope {
                    code: a.code.max(e.code),
                    min_x: a.min_x.min(e.min_x),
                    max_x: a.max_x.max(e.max_x),
                    min_y: a.min_y.min(e.min_y),
                    max_y: a.max_y.max(e.max_y),
                    min_z: nan_min(a.min_z, e.min_z),
                    max_z: nan_max(a.max_z, e.max_z),
                    min_m: nan_min(a.min_m, e.min_m),
                    max_m: nan_max(a.max_m, e.max_m),
                    srs_id: a.srs_id,
                },
            });
        }
        acc.unwrap_or(EMPTY_ENVELOPE)
    }

    /// Encode the envelope's `(envelope_code, doubles)` representation.
    pub(crate) fn encode(&self) -> (u8, Vec<u8>) {
        if self.code == 0 {
            return (0, Vec::new());
        }
        let mut out = Vec::with_capacity(ENVELOPE_DOUBLE_COUNT[self.code as usize] * 8);
        write_f64(&mut out, self.min_x);
        write_f64(&mut out, self.max_x);
        write_f64(&mut out, self.min_y);
        write_f64(&mut out, self.max_y);
        match self.code {
            2 => {
                write_f64(&mut out, self.min_z);
                write_f64(&mut out, self.max_z);
            }
            3 => {
                write_f64(&mut out, self.min_m);
                write_f64(&mut out, self.max_m);
            }
            4 => {
                write_f64(&mut out, self.min_z);
                write_f64(&mut out, self.max_z);
                write_f64(&mut out, self.min_m);
                write_f64(&mut out, self.max_m);
            }
            _ => {}
        }
        (self.code, out)
    }

    /// Decode an envelope region given its code and the raw bytes of the
    /// region (missing axes hold NaN).
    pub(crate) fn decode(code: u8, bytes: &[u8]) -> Result<Self> {
        if code == 0 {
            return Ok(EMPTY_ENVELOPE);
        }
        let min_x = read_f64(bytes, 0)?;
        let max_x = read_f64(bytes, 8)?;
        let min_y = read_f64(bytes, 16)?;
        let max_y = read_f64(bytes, 24)?;
        let mut env = Envelope {
            code,
            min_x,
            max_x,
            min_y,
            max_y,
            ..EMPTY_ENVELOPE
        };
        match code {
            2 => {
                env.min_z = read_f64(bytes, 32)?;
                env.max_z = read_f64(bytes, 40)?;
            }
            3 => {
                env.min_m = read_f64(bytes, 32)?;
                env.max_m = read_f64(bytes, 40)?;
            }
            4 => {
                env.min_z = read_f64(bytes, 32)?;
                env.max_z = read_f64(bytes, 40)?;
                env.min_m = read_f64(bytes, 48)?;
                env.max_m = read_f64(bytes, 56)?;
            }
            0 | 1 => {}
            _ => return Err(Error::UnsupportedEnvelopeCode { code, offset: 3 }),
        }
        Ok(env)
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.min(b),
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.max(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_envelope_equals_itself() {
        assert_eq!(EMPTY_ENVELOPE, EMPTY_ENVELOPE);
    }

    #[test]
    fn round_trips_xy() {
        let env = Envelope {
            code: 1,
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 11.0,
            ..EMPTY_ENVELOPE
        };
        let (code, bytes) = env.encode();
        let decoded = Envelope::decode(code, &bytes).unwrap();
        assert_eq!(env, decoded);
    }

    #[test]
    fn from_xy_empty_is_empty_envelope() {
        assert_eq!(Envelope::from_xy(&[]), EMPTY_ENVELOPE);
    }
}
