use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A request waiting for a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub request_id: String,
    pub pickup: Point,
}

impl RideRequest {
    pub fn new(request_id: impl Into<String>, pickup: Point) -> Self {
        Self {
            request_id: request_id.into(),
            pickup,
        }
    }
}

/// Represents a potential driver-request pairing with scoring information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub driver_id: String,
    pub request_id: String,
    /// Higher is better.
    pub score: f64,
    /// Hex grid steps from the pickup cell to the driver's cell.
    pub grid_distance: u32,
    pub eta_secs: u64,
}

/// Represents a successful match result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub request_id: String,
    pub driver_id: String,
    pub score: f64,
}

impl From<MatchCandidate> for MatchResult {
    fn from(candidate: MatchCandidate) -> Self {
        Self {
            request_id: candidate.request_id,
            driver_id: candidate.driver_id,
            score: candidate.score,
        }
    }
}
