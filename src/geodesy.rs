//! Spherical-earth distance, bearing and region-of-interest tests.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::domain::{MaxDistance, Point};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometers.
pub fn distance_km(p1: Point, p2: Point) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + p1.lat.to_radians().cos()
            * p2.lat.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from `p1` to `p2` folded into `[0, π]`.
///
/// Only the deviation from the north/south axis is kept, east and west are
/// not distinguished.
pub fn bearing(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x).abs()
}

/// True if `candidate` lies inside the region of interest around `center`.
pub fn is_within_ellipse(candidate: Point, center: Point, max_dist: &MaxDistance) -> bool {
    let theta = bearing(center, candidate);
    let limit = if max_dist.max_angle < theta && theta < PI - max_dist.max_angle {
        max_dist.x / theta.sin().abs()
    } else {
        max_dist.y / (FRAC_PI_2 - theta).sin().abs()
    };
    distance_km(candidate, center) <= limit
}

/// Point reached by travelling `distance_km` from `origin` along the initial
/// bearing `bearing_deg` (clockwise from north).
pub fn destination_point(origin: Point, bearing_deg: f64, distance_km: f64) -> Point {
    let angular = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    Point::new(lat2.to_degrees(), lon2.to_degrees())
}
