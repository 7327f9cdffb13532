//! Geospatial indexing core for ride-hailing services.
//!
//! Converts coordinates into hex grid cells and geohashes, keeps a live
//! driver → cell index for proximity search, aggregates per-cell demand and
//! supply into a surge heatmap, and answers geofence containment queries.
//!
//! ```rust
//! use ride_geo::{DriverSpatialIndex, GridResolution, Point};
//!
//! let index = DriverSpatialIndex::new(GridResolution::Neighborhood);
//! index.update_driver("driver-1", Point::new(37.7749, -122.4194));
//! let nearby = index.nearby(&Point::new(37.7755, -122.4190), 1);
//! assert_eq!(nearby, vec!["driver-1".to_string()]);
//! ```

pub mod config;
pub mod driver_index;
pub mod error;
pub mod geofence;
pub mod geohash;
pub mod geometry;
pub mod heatmap;
pub mod matching;
pub mod polygon;
pub mod spatial;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use config::{GridConfig, HeatmapConfig, MatcherConfig};
pub use driver_index::DriverSpatialIndex;
pub use error::{GeoError, Result};
pub use geofence::{Geofence, GeofenceCollection, GeofenceKind};
pub use geometry::{BoundingBox, NearbyPoint, Point, EARTH_RADIUS_KM};
pub use heatmap::{Heatmap, HeatmapCell, SurgeColor};
pub use matching::{BatchMatcher, MatchCandidate, MatchResult, RideRequest};
pub use polygon::Polygon;
pub use spatial::{Cell, GridResolution, HexGrid};
