//! Whole-crate round trips against the literal scenarios and invariants.

use gpkg::geometry::{LineString, MultiPoint, Point, Polygon};
use gpkg::spatial;
use gpkg::table::{Field, FeatureClass, FieldType, Table};
use gpkg::GeoPackage;
use tempfile::tempdir;

fn hex_bytes(s: &str) -> Vec<u8> {
    s.split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

// S1
#[test]
fn empty_line_string_matches_literal_bytes() {
    let ls = LineString::new(4326, Vec::new());
    let blob = ls.to_blob().unwrap();
    assert_eq!(
        blob,
        hex_bytes("47 50 00 11 E6 10 00 00 01 02 00 00 00 00 00 00 00")
    );
    let decoded = LineString::from_blob(&blob).unwrap();
    assert_eq!(decoded.srs_id, 4326);
    assert!(decoded.is_empty().unwrap());
}

// S2
#[test]
fn point_matches_literal_bytes_and_predicates() {
    let p = Point::new(4326, 1.0, 2.0);
    let blob = p.to_blob();
    assert_eq!(blob.len(), 29);
    assert_eq!(&blob[..8], &hex_bytes("47 50 00 01 E6 10 00 00")[..]);
    assert_eq!(&blob[8..13], &hex_bytes("01 01 00 00 00")[..]);
    assert_eq!(spatial::min_x(&blob), Some(1.0));
    assert_eq!(spatial::max_x(&blob), Some(1.0));
    assert_eq!(spatial::min_y(&blob), Some(2.0));
    assert_eq!(spatial::max_y(&blob), Some(2.0));
    assert_eq!(spatial::is_empty(&blob), Some(false));
}

// S3
#[test]
fn line_string_with_envelope_round_trips_byte_identical() {
    let ls = LineString::new(-1, vec![vec![0.0, 0.0], vec![10.0, 11.0]]);
    let blob = ls.to_blob().unwrap();
    assert_eq!(blob[3], 0b0000_0011);
    let decoded = LineString::from_blob(&blob).unwrap();
    let re_encoded = decoded.to_blob().unwrap();
    assert_eq!(blob, re_encoded);
    assert_eq!(spatial::min_x(&blob), Some(0.0));
    assert_eq!(spatial::max_x(&blob), Some(10.0));
    assert_eq!(spatial::min_y(&blob), Some(0.0));
    assert_eq!(spatial::max_y(&blob), Some(11.0));
}

// S4
#[test]
fn polygon_with_one_ring_matches_envelope() {
    let poly = Polygon::new(
        4326,
        vec![vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 0.0],
        ]],
    );
    let decoded = Polygon::from_blob(&poly.to_blob().unwrap()).unwrap();
    let rings = decoded.rings().unwrap();
    assert_eq!(rings.len(), 1);
    assert_eq!(rings[0].len(), 5);
    let env = decoded.envelope().unwrap();
    assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (0.0, 1.0, 0.0, 1.0));
}

// S5
#[test]
fn empty_point_reports_null_predicates() {
    let p = Point::empty(4326);
    let blob = p.to_blob();
    assert_eq!(spatial::is_empty(&blob), Some(true));
    assert_eq!(spatial::min_x(&blob), None);
}

// S6
#[test]
fn multi_point_without_envelope_lazily_computes_once() {
    let mp = MultiPoint::new(4326, vec![Point::new(4326, 1.0, 2.0), Point::new(4326, 3.0, 4.0)]);
    let blob = mp.to_blob().unwrap();
    let decoded = MultiPoint::from_blob(&blob).unwrap();
    let env = decoded.envelope().unwrap();
    assert_eq!((env.min_x, env.max_x, env.min_y, env.max_y), (1.0, 3.0, 2.0, 4.0));
    assert_eq!(decoded.envelope().unwrap(), env);
}

// P8
#[test]
fn big_endian_header_is_rejected() {
    let mut blob = Point::new(4326, 1.0, 2.0).to_blob();
    blob[3] &= !1;
    assert!(Point::from_blob(&blob).is_err());
}

// P9
#[test]
fn unsupported_envelope_code_is_rejected() {
    let mut blob = Point::new(4326, 1.0, 2.0).to_blob();
    blob[3] |= 0b0000_1010;
    assert!(Point::from_blob(&blob).is_err());
}

// P5
#[test]
fn predicate_bounding_box_contains_every_decoded_coordinate() {
    let ls = LineString::new(4326, vec![vec![-3.0, 2.0], vec![7.0, -1.0], vec![0.0, 9.0]]);
    let blob = ls.to_blob().unwrap();
    let coords = LineString::from_blob(&blob).unwrap().coordinates().unwrap();
    let (min_x, max_x, min_y, max_y) = (
        spatial::min_x(&blob).unwrap(),
        spatial::max_x(&blob).unwrap(),
        spatial::min_y(&blob).unwrap(),
        spatial::max_y(&blob).unwrap(),
    );
    for c in coords {
        assert!(c[0] >= min_x && c[0] <= max_x);
        assert!(c[1] >= min_y && c[1] <= max_y);
    }
}

#[test]
fn full_geopackage_lifecycle_with_multiple_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("city.gpkg");
    let gp = GeoPackage::create(&path).unwrap();

    let parks = FeatureClass::new(
        "parks",
        "geom",
        "Polygon",
        4326,
        vec![Field::new("name", FieldType::Text)],
    );
    parks.create(&gp).unwrap();

    let sensors = Table::new(
        "sensors",
        vec![Field::new("reading", FieldType::Double).not_null()],
    );
    sensors.create(&gp).unwrap();

    let poly = Polygon::new(
        4326,
        vec![vec![
            vec![0.0, 0.0],
            vec![0.0, 2.0],
            vec![2.0, 2.0],
            vec![2.0, 0.0],
            vec![0.0, 0.0],
        ]],
    );
    gp.conn
        .execute(
            "INSERT INTO parks (geom, name) VALUES (?1, ?2)",
            rusqlite::params![poly, "Central Park"],
        )
        .unwrap();
    gp.conn
        .execute("INSERT INTO sensors (reading) VALUES (?1)", [42.5])
        .unwrap();

    let is_empty: bool = gp
        .conn
        .query_row("SELECT ST_IsEmpty(geom) FROM parks", [], |row| row.get(0))
        .unwrap();
    assert!(!is_empty);

    let mut names = gp.tables().unwrap();
    names.sort();
    assert_eq!(names, vec!["parks".to_string(), "sensors".to_string()]);
    assert_eq!(gp.feature_classes().unwrap(), vec!["parks".to_string()]);

    gp.close().unwrap();
    let reopened = GeoPackage::open(&path).unwrap();
    let reading: f64 = reopened
        .conn
        .query_row("SELECT reading FROM sensors", [], |row| row.get(0))
        .unwrap();
    assert_eq!(reading, 42.5);
}
