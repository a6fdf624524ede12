//! Coordinate math on fixed point geographic coordinates.
//!
//! Coordinates are stored as integer micro degrees, which is exact for OSM
//! style data and keeps node records at 8 bytes. All trigonometry happens in
//! double precision after scaling by [`COORDINATE_PRECISION`]. Distances are
//! spherical (haversine or the flat earth small angle approximation), which
//! is plenty for turn angles and priority heuristics.

use std::f64::consts::PI;

/// Scaling factor between integer micro degrees and floating point degrees.
pub const COORDINATE_PRECISION: f64 = 1_000_000.;
/// Quadratic mean earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_372_797.560_856;

const RAD: f64 = PI / 180.;

/// A geographic position in integer micro degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinate {
    pub lat: i32,
    pub lon: i32,
}

impl Coordinate {
    pub fn from_degrees(lat: f64, lon: f64) -> Coordinate {
        Coordinate {
            lat: (lat * COORDINATE_PRECISION) as i32,
            lon: (lon * COORDINATE_PRECISION) as i32,
        }
    }

    pub fn lat_degrees(self) -> f64 {
        f64::from(self.lat) / COORDINATE_PRECISION
    }

    pub fn lon_degrees(self) -> f64 {
        f64::from(self.lon) / COORDINATE_PRECISION
    }
}

/// Web mercator projection of latitudes, used wherever angles have to be
/// measured in screen space rather than on the sphere.
pub mod mercator {
    use super::*;

    pub fn lat_to_y(lat_degrees: f64) -> f64 {
        (((lat_degrees * RAD) / 2. + PI / 4.).tan()).ln() / RAD
    }

    pub fn y_to_lat(y: f64) -> f64 {
        (2. * (y * RAD).exp().atan() - PI / 2.) / RAD
    }
}

/// Great circle distance in meters via the haversine formula.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat_degrees() * RAD;
    let lon1 = a.lon_degrees() * RAD;
    let lat2 = b.lat_degrees() * RAD;
    let lon2 = b.lon_degrees() * RAD;

    let dlat = lat1 - lat2;
    let dlon = lon1 - lon2;

    let aharv = (dlat / 2.).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.).sin().powi(2);
    let charv = 2. * aharv.sqrt().atan2((1. - aharv).sqrt());
    EARTH_RADIUS * charv
}

/// Small angle approximation of the great circle distance in meters.
/// Cheaper than [`haversine_distance`] and indistinguishable at road scale.
pub fn great_circle_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat_degrees() * RAD;
    let lon1 = a.lon_degrees() * RAD;
    let lat2 = b.lat_degrees() * RAD;
    let lon2 = b.lon_degrees() * RAD;

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.).cos();
    let y = lat2 - lat1;
    x.hypot(y) * EARTH_RADIUS
}

/// Distance in projected degrees on the mercator plane.
pub fn euclidean_distance(a: Coordinate, b: Coordinate) -> f64 {
    let dx = a.lon_degrees() - b.lon_degrees();
    let dy = mercator::lat_to_y(a.lat_degrees()) - mercator::lat_to_y(b.lat_degrees());
    (dx * dx + dy * dy).sqrt()
}

/// Initial compass bearing from `a` to `b` in degrees in `[0, 360)`.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat_degrees() * RAD;
    let lat2 = b.lat_degrees() * RAD;
    let dlon = (b.lon_degrees() - a.lon_degrees()) * RAD;

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let mut result = y.atan2(x) / RAD;
    while result < 0. {
        result += 360.;
    }
    result
}

/// Angle of the turn `(a -> v) -> (v -> b)` in degrees, measured between the
/// screen space vectors `a - v` and `b - v` and normalized to `[0, 360)`.
/// A straight continuation comes out as 180, a U turn as 0 or 360.
pub fn turn_angle(a: Coordinate, v: Coordinate, b: Coordinate) -> f64 {
    let y_a = mercator::lat_to_y(a.lat_degrees());
    let y_v = mercator::lat_to_y(v.lat_degrees());
    let y_b = mercator::lat_to_y(b.lat_degrees());

    let v1x = a.lon_degrees() - v.lon_degrees();
    let v1y = y_a - y_v;
    let v2x = b.lon_degrees() - v.lon_degrees();
    let v2y = y_b - y_v;

    let mut angle = (v2y.atan2(v2x) - v1y.atan2(v1x)) / RAD;
    while angle < 0. {
        angle += 360.;
    }
    angle
}
