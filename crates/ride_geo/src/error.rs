use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors raised when parsing or converting geospatial input.
///
/// Queries against already-built structures never return these; an absent
/// driver or an empty cell is reported as `None` or an empty collection.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("invalid cell format: {0}")]
    InvalidCellFormat(String),

    #[error("invalid geohash: {0}")]
    InvalidGeohash(String),

    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("unknown geofence kind: {0}")]
    InvalidGeofenceKind(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
