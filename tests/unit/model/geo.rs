use delivery_staff::model::{compute_route, GeoCoordinate, GeoCoordinateError};

#[test]
fn coordinate_range_check() {
    assert!(GeoCoordinate::try_new(90.0, 180.0).is_ok());
    assert!(GeoCoordinate::try_new(-90.0, -180.0).is_ok());
    let result = GeoCoordinate::try_new(90.0001, 0.0);
    assert_eq!(result.err(), Some(GeoCoordinateError::LatitudeRange(90.0001)));
    let result = GeoCoordinate::try_new(0.0, -180.5);
    assert_eq!(result.err(), Some(GeoCoordinateError::LongitudeRange(-180.5)));
    let result = GeoCoordinate::try_new(f64::NAN, 0.0);
    assert_eq!(result.err(), Some(GeoCoordinateError::NotFinite));
    let result = GeoCoordinate::try_new(1.0, f64::INFINITY);
    assert_eq!(result.err(), Some(GeoCoordinateError::NotFinite));
}

#[test]
fn route_requires_both_endpoints() {
    let origin = GeoCoordinate::try_new(25.0330, 121.5654).unwrap();
    let dest = GeoCoordinate::try_new(25.0478, 121.5170).unwrap();
    assert!(compute_route(None, None).is_none());
    assert!(compute_route(Some(&origin), None).is_none());
    assert!(compute_route(None, Some(&dest)).is_none());
    let route = compute_route(Some(&origin), Some(&dest)).unwrap();
    assert_eq!(route.origin, origin);
    assert_eq!(route.destination, dest);
    let [p0, p1] = route.points();
    assert_eq!(p0.latitude(), 25.0330);
    assert_eq!(p1.longitude(), 121.5170);
}

#[test]
fn route_idempotent() {
    let origin = GeoCoordinate::try_new(-33.8688, 151.2093).unwrap();
    let dest = GeoCoordinate::try_new(-37.8136, 144.9631).unwrap();
    let first = compute_route(Some(&origin), Some(&dest));
    let second = compute_route(Some(&origin), Some(&dest));
    assert!(first.is_some());
    assert_eq!(first, second);
}
