//! Little-endian fixed-width primitive encode/decode and the count-prefixed
//! coordinate packing shared by every aggregate geometry variant.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// WKB endian byte + 4-byte type code, e.g. `01 01 00 00 00` for a 2D point.
pub(crate) const WKB_PREFIX_LEN: usize = 5;

/// Write a WKB point/geometry prefix (always little-endian in this codec).
pub(crate) fn write_prefix(out: &mut Vec<u8>, wkb_type: u32) {
    out.push(1);
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, wkb_type);
    out.extend_from_slice(&buf);
}

/// Read and validate a WKB prefix at `offset`, returning the type code.
pub(crate) fn read_prefix(bytes: &[u8], offset: usize) -> Result<u32> {
    require_len(bytes, offset + WKB_PREFIX_LEN, offset)?;
    let endian = bytes[offset];
    if endian != 1 {
        return Err(Error::MalformedHeader { offset });
    }
    Ok(LittleEndian::read_u32(&bytes[offset + 1..offset + 5]))
}

fn require_len(bytes: &[u8], needed: usize, offset: usize) -> Result<()> {
    if bytes.len() < needed {
        return Err(Error::Truncated { offset });
    }
    Ok(())
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    require_len(bytes, offset + 4, offset)?;
    Ok(LittleEndian::read_u32(&bytes[offset..offset + 4]))
}

pub(crate) fn read_f64(bytes: &[u8], offset: usize) -> Result<f64> {
    require_len(bytes, offset + 8, offset)?;
    Ok(LittleEndian::read_f64(&bytes[offset..offset + 8]))
}

pub(crate) fn write_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

pub(crate) fn write_f64(out: &mut Vec<u8>, value: f64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_f64(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// WKB point type code for the given Z/M combination (the dimension alone
/// is ambiguous between Z and M, so the caller's `has_z`/`has_m` decide).
pub(crate) fn point_type_code(has_z: bool, has_m: bool) -> u32 {
    match (has_z, has_m) {
        (false, false) => 1,
        (true, false) => 1001,
        (false, true) => 2001,
        (true, true) => 3001,
    }
}

/// Pack a flat count-prefixed sequence of coordinate tuples.
///
/// When `with_point_prefix` is set (MultiPoint bodies), each tuple is
/// preceded by its own 5-byte WKB point prefix selected by `has_z`/`has_m`.
pub(crate) fn pack_coords(
    out: &mut Vec<u8>,
    points: &[Vec<f64>],
    has_z: bool,
    has_m: bool,
    with_point_prefix: bool,
) {
    let point_type = point_type_code(has_z, has_m);
    write_u32(out, points.len() as u32);
    for p in points {
        if with_point_prefix {
            write_prefix(out, point_type);
        }
        for v in p {
            write_f64(out, *v);
        }
    }
}

/// Write a ring body: count + flat doubles, no WKB prefix.
pub(crate) fn write_ring(out: &mut Vec<u8>, points: &[Vec<f64>]) {
    write_u32(out, points.len() as u32);
    for p in points {
        for v in p {
            write_f64(out, *v);
        }
    }
}

/// Write a full WKB linestring (own prefix + ring body) — used both for a
/// standalone LineString's body and for each element of a MultiLineString.
pub(crate) fn write_full_line(out: &mut Vec<u8>, wkb_type: u32, points: &[Vec<f64>]) {
    write_prefix(out, wkb_type);
    write_ring(out, points);
}

/// Write a full WKB polygon (own prefix + ring count + rings) — used both
/// for a standalone Polygon's body and for each element of a MultiPolygon.
pub(crate) fn write_full_polygon(out: &mut Vec<u8>, wkb_type: u32, rings: &[Vec<Vec<f64>>]) {
    write_prefix(out, wkb_type);
    write_u32(out, rings.len() as u32);
    for ring in rings {
        write_ring(out, ring);
    }
}

/// Read a count then `count` flat tuples of `dim` doubles.
///
/// `is_ring` selects a bare 4-byte count header (polygon ring, no WKB type
/// prefix) versus a full 9-byte WKB linestring header (1 endian byte + 4-byte
/// type code + 4-byte count) whose type code is not re-validated here — the
/// caller has already established the expected variant.
pub(crate) fn unpack_line(bytes: &[u8], dim: usize, is_ring: bool) -> Result<Vec<Vec<f64>>> {
    let (count, mut offset) = read_count_header(bytes, is_ring)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut tuple = Vec::with_capacity(dim);
        for _ in 0..dim {
            tuple.push(read_f64(bytes, offset)?);
            offset += 8;
        }
        out.push(tuple);
    }
    Ok(out)
}

/// Read a MultiPoint body: count then `count` (5-byte prefix + `dim` doubles).
pub(crate) fn unpack_points(bytes: &[u8], dim: usize) -> Result<Vec<Vec<f64>>> {
    let count = read_u32(bytes, 0)?;
    let mut offset = 4;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        read_prefix(bytes, offset)?;
        offset += WKB_PREFIX_LEN;
        let mut tuple = Vec::with_capacity(dim);
        for _ in 0..dim {
            tuple.push(read_f64(bytes, offset)?);
            offset += 8;
        }
        out.push(tuple);
    }
    Ok(out)
}

/// Read Polygon (`is_ring = true`) or MultiLineString (`is_ring = false`)
/// bodies: a count followed by `count` sub-bodies.
pub(crate) fn unpack_lines(bytes: &[u8], dim: usize, is_ring: bool) -> Result<Vec<Vec<Vec<f64>>>> {
    let count = read_u32(bytes, 0)?;
    let mut offset = 4;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (line, consumed) = unpack_one_line(&bytes[offset..], dim, is_ring)?;
        out.push(line);
        offset += consumed;
    }
    Ok(out)
}

/// Read MultiPolygon bodies: count followed by `count` full WKB polygons
/// (each with its own 5-byte prefix, then a ring count plus rings).
pub(crate) fn unpack_polygons(bytes: &[u8], dim: usize) -> Result<Vec<Vec<Vec<Vec<f64>>>>> {
    let count = read_u32(bytes, 0)?;
    let mut offset = 4;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        read_prefix(bytes, offset)?;
        let ring_count = read_u32(bytes, offset + 5)?;
        let mut ring_offset = offset + 9;
        let mut rings = Vec::with_capacity(ring_count as usize);
        for _ in 0..ring_count {
            let (ring, consumed) = unpack_one_line(&bytes[ring_offset..], dim, true)?;
            rings.push(ring);
            ring_offset += consumed;
        }
        out.push(rings);
        offset = ring_offset;
    }
    Ok(out)
}

/// Read a single ring/linestring body starting at `bytes[0]`, returning the
/// parsed tuples plus the number of bytes consumed (header + payload).
fn unpack_one_line(bytes: &[u8], dim: usize, is_ring: bool) -> Result<(Vec<Vec<f64>>, usize)> {
    let (count, header_len) = read_count_header(bytes, is_ring)?;
    let payload = (count as usize) * dim * 8;
    require_len(bytes, header_len + payload, 0)?;
    let line = unpack_line(bytes, dim, is_ring)?;
    Ok((line, header_len + payload))
}

fn read_count_header(bytes: &[u8], is_ring: bool) -> Result<(u32, usize)> {
    if is_ring {
        Ok((read_u32(bytes, 0)?, 4))
    } else {
        read_prefix(bytes, 0)?;
        Ok((read_u32(bytes, 5)?, 9))
    }
}
