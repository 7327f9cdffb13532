//! Named polygons (service areas, surge zones, no-pickup zones) and the
//! collection that answers "which geofences contain this point?".
//!
//! Collections are expected to hold tens of geofences, so every query is a
//! linear scan in insertion order.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geometry::Point;
use crate::polygon::Polygon;

/// Purpose of a geofence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceKind {
    ServiceArea,
    SurgeZone,
    NoPickupZone,
    Airport,
}

impl GeofenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GeofenceKind::ServiceArea => "service_area",
            GeofenceKind::SurgeZone => "surge_zone",
            GeofenceKind::NoPickupZone => "no_pickup_zone",
            GeofenceKind::Airport => "airport",
        }
    }
}

impl fmt::Display for GeofenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeofenceKind {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "service_area" => Ok(GeofenceKind::ServiceArea),
            "surge_zone" => Ok(GeofenceKind::SurgeZone),
            "no_pickup_zone" => Ok(GeofenceKind::NoPickupZone),
            "airport" => Ok(GeofenceKind::Airport),
            other => Err(GeoError::InvalidGeofenceKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub kind: GeofenceKind,
    pub polygon: Polygon,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Geofence {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: GeofenceKind,
        polygon: Polygon,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            polygon,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.polygon.contains(point)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeofenceCollection {
    geofences: Vec<Geofence>,
}

impl GeofenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a geofence. Ids are not deduplicated; [`GeofenceCollection::get`]
    /// and [`GeofenceCollection::remove`] act on the first match.
    pub fn add(&mut self, geofence: Geofence) {
        self.geofences.push(geofence);
    }

    pub fn remove(&mut self, id: &str) -> Option<Geofence> {
        let pos = self.geofences.iter().position(|g| g.id == id)?;
        Some(self.geofences.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Geofence> {
        self.geofences.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.geofences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geofences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Geofence> {
        self.geofences.iter()
    }

    /// Every geofence whose polygon contains `point`.
    pub fn find_containing(&self, point: &Point) -> Vec<&Geofence> {
        self.geofences.iter().filter(|g| g.contains(point)).collect()
    }

    /// Geofences of `kind` containing `point`.
    pub fn find_by_type(&self, point: &Point, kind: GeofenceKind) -> Vec<&Geofence> {
        self.geofences
            .iter()
            .filter(|g| g.kind == kind && g.contains(point))
            .collect()
    }

    /// True iff some service-area geofence contains `point`.
    pub fn is_in_service_area(&self, point: &Point) -> bool {
        self.geofences
            .iter()
            .any(|g| g.kind == GeofenceKind::ServiceArea && g.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(min_lat, min_lng),
            Point::new(min_lat, max_lng),
            Point::new(max_lat, max_lng),
            Point::new(max_lat, min_lng),
        ])
    }

    fn city() -> GeofenceCollection {
        let mut fences = GeofenceCollection::new();
        let sf = rect(37.70, -122.52, 37.82, -122.35);
        fences.add(Geofence::new("sf", "San Francisco", GeofenceKind::ServiceArea, sf));
        let soma = rect(37.77, -122.42, 37.79, -122.39);
        fences.add(
            Geofence::new("soma", "SoMa surge", GeofenceKind::SurgeZone, soma)
                .with_metadata("multiplier_cap", "2.5"),
        );
        let sfo = rect(37.60, -122.40, 37.64, -122.35);
        fences.add(Geofence::new("sfo", "SFO", GeofenceKind::Airport, sfo));
        fences
    }

    #[test]
    fn finds_all_containing_geofences() {
        let fences = city();
        let soma = Point::new(37.78, -122.40);
        let ids: Vec<&str> = fences.find_containing(&soma).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["sf", "soma"]);
    }

    #[test]
    fn filters_by_kind() {
        let fences = city();
        let soma = Point::new(37.78, -122.40);
        let surge = fences.find_by_type(&soma, GeofenceKind::SurgeZone);
        assert_eq!(surge.len(), 1);
        assert_eq!(surge[0].metadata.get("multiplier_cap").map(String::as_str), Some("2.5"));
        assert!(fences.find_by_type(&soma, GeofenceKind::NoPickupZone).is_empty());
    }

    #[test]
    fn service_area_requires_service_area_kind() {
        let fences = city();
        assert!(fences.is_in_service_area(&Point::new(37.75, -122.45)));
        // Inside the airport fence only.
        assert!(!fences.is_in_service_area(&Point::new(37.62, -122.38)));
        assert!(!GeofenceCollection::new().is_in_service_area(&Point::new(37.75, -122.45)));
    }

    #[test]
    fn remove_and_get_by_id() {
        let mut fences = city();
        assert_eq!(fences.get("sfo").map(|g| g.kind), Some(GeofenceKind::Airport));
        assert!(fences.remove("sfo").is_some());
        assert!(fences.remove("sfo").is_none());
        assert_eq!(fences.len(), 2);
    }

    #[test]
    fn kind_parses_and_serializes_snake_case() {
        let kind: GeofenceKind = "service_area".parse().expect("kind");
        assert_eq!(kind, GeofenceKind::ServiceArea);
        assert!(matches!("lake".parse::<GeofenceKind>(), Err(GeoError::InvalidGeofenceKind(_))));
        let json = serde_json::to_string(&GeofenceKind::NoPickupZone).expect("json");
        assert_eq!(json, "\"no_pickup_zone\"");
    }
}
