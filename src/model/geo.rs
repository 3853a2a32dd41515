use std::result::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum GeoCoordinateError {
    NotFinite,
    LatitudeRange(f64),
    LongitudeRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

/// A straight two-point line from the staff's position to the order address.
///
/// This is an approximation for display only, it is NOT a navigable path,
/// no road network is taken into account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    pub origin: GeoCoordinate,
    pub destination: GeoCoordinate,
}

impl GeoCoordinate {
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, GeoCoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            Err(GeoCoordinateError::NotFinite)
        } else if !(-90.0..=90.0).contains(&latitude) {
            Err(GeoCoordinateError::LatitudeRange(latitude))
        } else if !(-180.0..=180.0).contains(&longitude) {
            Err(GeoCoordinateError::LongitudeRange(longitude))
        } else {
            Ok(Self {
                latitude,
                longitude,
            })
        }
    }
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl RouteSegment {
    pub fn points(&self) -> [GeoCoordinate; 2] {
        [self.origin, self.destination]
    }
}

/// Returns `None` while either endpoint is still pending, that is a normal
/// state, not an error.
pub fn compute_route(
    origin: Option<&GeoCoordinate>,
    destination: Option<&GeoCoordinate>,
) -> Option<RouteSegment> {
    match (origin, destination) {
        (Some(o), Some(d)) => Some(RouteSegment {
            origin: *o,
            destination: *d,
        }),
        _others => None,
    }
}
