//! Spherical geometry on raw coordinates: distance, bearing, projection,
//! midpoint, and radius bounding boxes.
//!
//! All functions are pure and operate in degrees at the API boundary and
//! radians internally. Distances are kilometres on a sphere of radius
//! [`EARTH_RADIUS_KM`].

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance calculation in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude in the planar bounding-box approximation.
const KM_PER_DEGREE: f64 = 111.0;

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// A WGS84 coordinate in degrees.
///
/// Range is not enforced on construction; use [`Point::is_valid`] before
/// trusting a point that came from outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when latitude is within `[-90, 90]` and longitude within `[-180, 180]`.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.lat, first.lat, first.lng, first.lng);
        for p in iter {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.min_lng = bbox.min_lng.min(p.lng);
            bbox.max_lng = bbox.max_lng.max(p.lng);
        }
        Some(bbox)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A point that passed a radius filter, with its position in the input slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyPoint {
    pub index: usize,
    pub point: Point,
    pub distance_km: f64,
}

/// Great-circle distance in kilometres (Haversine).
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    let (lat1, lat2) = (p1.lat.to_radians(), p2.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (p2.lng - p1.lng).to_radians();
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial great-circle bearing from `p1` to `p2`, in degrees `[0, 360)`.
/// 0 is due north, 90 due east.
pub fn bearing(p1: &Point, p2: &Point) -> f64 {
    let (lat1, lat2) = (p1.lat.to_radians(), p2.lat.to_radians());
    let dlng = (p2.lng - p1.lng).to_radians();
    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Eight-point compass heading for a bearing in degrees.
///
/// Each heading owns a 45° sector centred on it, so `N` covers `[337.5, 22.5)`.
pub fn compass_direction(bearing_deg: f64) -> &'static str {
    let sector = ((normalize_bearing(bearing_deg) + 22.5) / 45.0) as usize % 8;
    COMPASS_POINTS[sector]
}

/// Point reached by travelling `distance_km` from `start` along `bearing_deg`.
/// Longitude of the result is normalized into `(-180, 180]`.
pub fn destination(start: &Point, bearing_deg: f64, distance_km: f64) -> Point {
    let lat1 = start.lat.to_radians();
    let lng1 = start.lng.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    Point::new(lat2.to_degrees(), normalize_longitude(lng2.to_degrees()))
}

/// Great-circle midpoint between two points.
pub fn midpoint(p1: &Point, p2: &Point) -> Point {
    let (lat1, lat2) = (p1.lat.to_radians(), p2.lat.to_radians());
    let lng1 = p1.lng.to_radians();
    let dlng = (p2.lng - p1.lng).to_radians();

    let bx = lat2.cos() * dlng.cos();
    let by = lat2.cos() * dlng.sin();
    let lat_m = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lng_m = lng1 + by.atan2(lat1.cos() + bx);

    Point::new(lat_m.to_degrees(), normalize_longitude(lng_m.to_degrees()))
}

/// Planar box around `center` extending `radius_km` in each direction.
///
/// Uses 111 km per degree, scaled by `cos(lat)` for longitude. The box
/// over-covers the circle and distorts near the poles; post-filter with
/// [`distance`] when exact membership matters.
pub fn bounding_box(center: &Point, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let lng_delta = radius_km / (KM_PER_DEGREE * center.lat.to_radians().cos());
    BoundingBox::new(
        (center.lat - lat_delta).max(-90.0),
        (center.lat + lat_delta).min(90.0),
        center.lng - lng_delta,
        center.lng + lng_delta,
    )
}

/// Points within `radius_km` of `center`, nearest first.
///
/// The bounding box rejects far points before any trigonometry runs; only
/// survivors pay for a Haversine distance.
pub fn find_nearest(center: &Point, points: &[Point], radius_km: f64) -> Vec<NearbyPoint> {
    let bbox = bounding_box(center, radius_km);
    let mut hits: Vec<NearbyPoint> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| bbox.contains(p))
        .filter_map(|(index, p)| {
            let distance_km = distance(center, p);
            (distance_km <= radius_km).then_some(NearbyPoint {
                index,
                point: *p,
                distance_km,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits
}

fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

fn normalize_longitude(lng: f64) -> f64 {
    let l = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if l <= -180.0 {
        l + 360.0
    } else {
        l
    }
}
