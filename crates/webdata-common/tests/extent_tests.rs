//! Tests for the WGS84 extent validator.

use webdata_common::extent::{validate_or_world, BboxParseError, BoundingBox, Extent, WGS84_WORLD};
use webdata_common::CrsCode;

fn in_world(extent: &Extent) -> bool {
    let b = extent.bbox;
    b.min_x >= -180.0
        && b.min_y >= -90.0
        && b.max_x <= 180.0
        && b.max_y <= 90.0
        && b.min_x <= b.max_x
        && b.min_y <= b.max_y
}

/// A spread of boxes covering valid, overshooting, inverted and garbage input.
fn sample_boxes() -> Vec<BoundingBox> {
    let values = [
        -400.0,
        -180.0,
        -95.0,
        -90.0,
        -10.5,
        0.0,
        12.25,
        90.0,
        91.0,
        180.0,
        181.0,
        f64::NAN,
        f64::INFINITY,
    ];
    let mut boxes = Vec::new();
    for &a in &values {
        for &b in &values {
            boxes.push(BoundingBox::new(a, b, -a, -b));
            boxes.push(BoundingBox::new(a, -b, b, a.abs()));
            boxes.push(BoundingBox::new(a, b, a + 10.0, b + 5.0));
        }
    }
    boxes
}

// ============================================================================
// Corner parsing
// ============================================================================

#[test]
fn test_from_corners_negative() {
    let bbox = BoundingBox::from_corners("-180 -90", "180 90").unwrap();
    assert_eq!(bbox, WGS84_WORLD);
}

#[test]
fn test_from_corners_extra_whitespace() {
    let bbox = BoundingBox::from_corners("  6.0   45.5 ", "\n10.5 48.0\t").unwrap();
    assert_eq!(bbox.min_x, 6.0);
    assert_eq!(bbox.max_y, 48.0);
}

#[test]
fn test_from_corners_invalid_format() {
    let result = BoundingBox::from_corners("6.0", "10.5 48.0");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_from_corners_invalid_number() {
    let result = BoundingBox::from_corners("abc 45.5", "10.5 48.0");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

// ============================================================================
// Validation contract
// ============================================================================

#[test]
fn test_valid_box_unchanged() {
    let extent = Extent::wgs84(BoundingBox::new(5.9, 45.8, 10.5, 47.8));
    assert_eq!(extent.validate(), extent);
}

#[test]
fn test_clamps_each_value_independently() {
    let extent = Extent::wgs84(BoundingBox::new(-200.0, 10.0, 20.0, 100.0)).validate();
    assert_eq!(extent.bbox, BoundingBox::new(-180.0, 10.0, 20.0, 90.0));
    assert_eq!(extent.projection, CrsCode::Epsg4326);
}

#[test]
fn test_non_finite_becomes_world() {
    let extent = Extent::wgs84(BoundingBox::new(f64::NAN, 0.0, 10.0, 10.0)).validate();
    assert_eq!(extent, Extent::world());

    let extent = Extent::wgs84(BoundingBox::new(0.0, 0.0, f64::INFINITY, 10.0)).validate();
    assert_eq!(extent, Extent::world());
}

#[test]
fn test_inverted_latitude_becomes_world() {
    let extent = Extent::wgs84(BoundingBox::new(0.0, 50.0, 10.0, 40.0)).validate();
    assert_eq!(extent, Extent::world());
}

#[test]
fn test_box_outside_world_becomes_world() {
    let extent = Extent::wgs84(BoundingBox::new(200.0, 10.0, 250.0, 20.0)).validate();
    assert_eq!(extent, Extent::world());
}

#[test]
fn test_projected_crs_becomes_world() {
    let extent = Extent::new(
        BoundingBox::new(-20037508.34, -20037508.34, 20037508.34, 20037508.34),
        CrsCode::Epsg3857,
    )
    .validate();
    assert_eq!(extent, Extent::world());
}

#[test]
fn test_crs84_kept() {
    let extent = Extent::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), CrsCode::Crs84).validate();
    assert_eq!(extent.projection, CrsCode::Crs84);
}

#[test]
fn test_validate_or_world_absent() {
    assert_eq!(validate_or_world(None), Extent::world());
}

#[test]
fn test_validate_or_world_present() {
    let extent = validate_or_world(Some(BoundingBox::new(0.0, 0.0, 190.0, 10.0)));
    assert_eq!(extent.bbox, BoundingBox::new(0.0, 0.0, 180.0, 10.0));
}

// ============================================================================
// Properties over many boxes
// ============================================================================

#[test]
fn test_validated_always_within_world() {
    for bbox in sample_boxes() {
        let extent = Extent::wgs84(bbox).validate();
        assert!(in_world(&extent), "{:?} validated to {:?}", bbox, extent);
    }
}

#[test]
fn test_validate_idempotent() {
    for bbox in sample_boxes() {
        let once = Extent::wgs84(bbox).validate();
        let twice = once.validate();
        assert_eq!(once, twice, "not idempotent for {:?}", bbox);
    }
}
