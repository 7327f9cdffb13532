//! Simple polygons over lat/lng vertices: containment, measurements, GeoJSON.

use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geometry::{self, BoundingBox, Point, EARTH_RADIUS_KM};

/// An implicitly closed ring of vertices; the last vertex connects back to the first.
///
/// Only meaningful with at least three vertices. Smaller polygons contain nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// At least three vertices, each within coordinate range.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.points.iter().all(Point::is_valid)
    }

    /// Even-odd ray casting along the longitude axis.
    ///
    /// Points lying exactly on an edge or vertex may land on either side.
    pub fn contains(&self, point: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (&self.points[i], &self.points[j]);
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let crossing_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
                if point.lng < crossing_lng {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Arithmetic mean of the vertices (not the area centroid).
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat, lng) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(Point::new(lat / n, lng / n))
    }

    /// Sum of Haversine edge lengths, closing edge included.
    pub fn perimeter_km(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| geometry::distance(a, b)).sum()
    }

    /// Shoelace area over radian coordinates scaled by R².
    ///
    /// Treats the sphere as locally flat and ignores longitude convergence, so
    /// it is only a rough figure for city-scale polygons and degrades with extent.
    pub fn area_km2(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let twice_area: f64 = self
            .edges()
            .map(|(a, b)| {
                a.lng.to_radians() * b.lat.to_radians() - b.lng.to_radians() * a.lat.to_radians()
            })
            .sum();
        twice_area.abs() / 2.0 * EARTH_RADIUS_KM * EARTH_RADIUS_KM
    }

    /// GeoJSON `Polygon` geometry with an explicitly closed outer ring.
    pub fn to_geojson(&self) -> Result<String> {
        let mut ring: Vec<Vec<f64>> = self.points.iter().map(|p| vec![p.lng, p.lat]).collect();
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }
        let geom = Geometry::new(Value::Polygon(vec![ring]));
        Ok(serde_json::to_string(&geom)?)
    }

    /// Parses a GeoJSON `Polygon`, keeping only the outer ring and dropping
    /// its closing vertex.
    pub fn from_geojson(geojson: &str) -> Result<Self> {
        let geom: Geometry = serde_json::from_str(geojson)
            .map_err(|e| GeoError::InvalidGeoJson(format!("failed to parse: {e}")))?;

        let rings = match geom.value {
            Value::Polygon(rings) => rings,
            _ => {
                return Err(GeoError::InvalidGeoJson(
                    "expected Polygon geometry".to_string(),
                ))
            }
        };
        let outer = rings
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::InvalidGeoJson("polygon has no rings".to_string()))?;

        let mut points = outer
            .iter()
            .map(|position| match position.as_slice() {
                [lng, lat, ..] => Ok(Point::new(*lat, *lng)),
                _ => Err(GeoError::InvalidGeoJson(
                    "position must have at least 2 values".to_string(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        if points.len() >= 2 && points.first() == points.last() {
            points.pop();
        }
        Ok(Self { points })
    }

    /// Consecutive vertex pairs, wrapping from the last vertex to the first.
    fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.points
            .iter()
            .zip(self.points.iter().cycle().skip(1))
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}
