//! Pack/unpack of the 8-byte GeoPackage geometry blob header.
//!
//! Byte layout (little-endian view, LSB = bit 0 of the flags byte):
//!   0..2  magic `"GP"`
//!   2     version (always 0)
//!   3     flags: bit0 byte-order, bits1..3 envelope code, bit4 empty, bit5 reserved
//!   4..8  SRS id, signed 32-bit little-endian

use std::collections::HashMap;
use std::sync::Mutex;

use byteorder::{ByteOrder, LittleEndian};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};

const MAGIC: [u8; 2] = [0x47, 0x50];
const VERSION: u8 = 0;
pub(crate) const HEADER_LEN: usize = 8;

/// Absolute byte length of the envelope region for each envelope code.
const ENVELOPE_BYTE_LEN: [usize; 5] = [0, 32, 48, 48, 64];

/// Number of doubles making up the envelope for each code (2 * dimensions used).
pub(crate) const ENVELOPE_DOUBLE_COUNT: [usize; 5] = [0, 4, 6, 6, 8];

/// A handful of `(srs_id, empty, envelope_code)` combinations recur for
/// every inserted row, so header bytes are memoized rather than repacked.
///
/// Bounded: once the memo grows past [`MEMO_CAPACITY`] distinct keys it is
/// cleared outright rather than allowed to grow without bound.
const MEMO_CAPACITY: usize = 256;

type HeaderMemoKey = (i32, bool, u8);

static HEADER_MEMO: Lazy<Mutex<HashMap<HeaderMemoKey, [u8; HEADER_LEN]>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Encode the 8-byte header for a geometry with the given SRS id, emptiness,
/// and envelope code. `envelope_code` occupies bits 1..3 of the flags byte;
/// the byte-order bit is always set (this codec only ever writes
/// little-endian).
pub(crate) fn encode_header(srs_id: i32, empty: bool, envelope_code: u8) -> [u8; HEADER_LEN] {
    let key = (srs_id, empty, envelope_code);
    {
        let memo = HEADER_MEMO.lock().unwrap();
        if let Some(bytes) = memo.get(&key) {
            log::trace!("header memo hit for {key:?}");
            return *bytes;
        }
    }
    log::trace!("header memo miss for {key:?}");
    let mut flags = 0b0000_0001u8;
    flags |= (envelope_code & 0b111) << 1;
    if empty {
        flags |= 1 << 4;
    }
    let mut bytes = [0u8; HEADER_LEN];
    bytes[0..2].copy_from_slice(&MAGIC);
    bytes[2] = VERSION;
    bytes[3] = flags;
    LittleEndian::write_i32(&mut bytes[4..8], srs_id);

    let mut memo = HEADER_MEMO.lock().unwrap();
    if memo.len() >= MEMO_CAPACITY {
        memo.clear();
    }
    memo.insert(key, bytes);
    bytes
}

/// Decoded header fields: SRS id, envelope code, the absolute byte offset at
/// which the WKB body starts, and the empty flag.
pub(crate) struct DecodedHeader {
    pub srs_id: i32,
    pub envelope_code: u8,
    pub body_offset: usize,
    pub empty: bool,
}

/// Decode the 8-byte header. Rejects big-endian inputs, unknown versions,
/// bad magic, and envelope codes 5..7.
pub(crate) fn decode_header(bytes: &[u8]) -> Result<DecodedHeader> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Truncated { offset: 0 });
    }
    if bytes[0..2] != MAGIC {
        return Err(Error::MalformedHeader { offset: 0 });
    }
    if bytes[2] != VERSION {
        return Err(Error::MalformedHeader { offset: 2 });
    }
    let flags = bytes[3];
    if flags & 1 == 0 {
        return Err(Error::MalformedHeader { offset: 3 });
    }
    let envelope_code = (flags >> 1) & 0b111;
    if envelope_code > 4 {
        return Err(Error::UnsupportedEnvelopeCode {
            code: envelope_code,
            offset: 3,
        });
    }
    let empty = (flags >> 4) & 1 == 1;
    let srs_id = LittleEndian::read_i32(&bytes[4..8]);
    let body_offset = HEADER_LEN + ENVELOPE_BYTE_LEN[envelope_code as usize];
    Ok(DecodedHeader {
        srs_id,
        envelope_code,
        body_offset,
        empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_header() {
        let bytes = encode_header(4326, false, 1);
        let decoded = decode_header(&bytes).unwrap();
        assert_eq!(decoded.srs_id, 4326);
        assert_eq!(decoded.envelope_code, 1);
        assert_eq!(decoded.body_offset, 40);
        assert!(!decoded.empty);
    }

    #[test]
    fn rejects_big_endian() {
        let mut bytes = encode_header(4326, false, 0);
        bytes[3] &= !1;
        assert!(matches!(
            decode_header(&bytes),
            Err(Error::MalformedHeader { offset: 3 })
        ));
    }

    #[test]
    fn rejects_bad_envelope_code() {
        let mut bytes = encode_header(4326, false, 0);
        bytes[3] |= 0b1110; // envelope code bits = 7
        assert!(matches!(
            decode_header(&bytes),
            Err(Error::UnsupportedEnvelopeCode { code: 7, offset: 3 })
        ));
    }

    #[test]
    fn memoizes_identical_headers() {
        let a = encode_header(4326, false, 1);
        let b = encode_header(4326, false, 1);
        assert_eq!(a, b);
    }
}
