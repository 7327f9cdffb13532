//! Candidate generation from the driver index plus greedy assignment.

use crate::config::MatcherConfig;
use crate::driver_index::DriverSpatialIndex;
use crate::spatial::{distance_km_between_cells, grid_distance, point_to_cell};

use super::greedy::greedy_assign;
use super::types::{MatchCandidate, MatchResult, RideRequest};

/// Batch matcher: pairs every request with drivers in nearby cells and
/// resolves conflicts greedily.
#[derive(Debug, Clone, Default)]
pub struct BatchMatcher {
    config: MatcherConfig,
}

impl BatchMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Pickup ETA in seconds from straight-line distance, at least one second.
    fn estimate_eta_secs(&self, distance_km: f64) -> u64 {
        if distance_km <= 0.0 || self.config.avg_speed_kmh <= 0.0 {
            return 1;
        }
        (distance_km / self.config.avg_speed_kmh * 3600.0).max(1.0) as u64
    }

    /// Score in `(0, 1]`, decreasing with grid distance.
    fn score_pairing(grid_distance: u32) -> f64 {
        1.0 / (1.0 + grid_distance as f64)
    }

    /// Every (request, nearby driver) pair, in request order then driver id order.
    ///
    /// Requests with an invalid pickup point produce no candidates.
    pub fn build_candidates(
        &self,
        requests: &[RideRequest],
        drivers: &DriverSpatialIndex,
    ) -> Vec<MatchCandidate> {
        let mut candidates = Vec::new();
        for request in requests {
            let pickup_cell = match point_to_cell(&request.pickup, drivers.resolution()) {
                Ok(cell) => cell,
                Err(err) => {
                    log::warn!("Skipping request {}: {}", request.request_id, err);
                    continue;
                }
            };
            let nearby = drivers.nearby_with_cells(&request.pickup, self.config.k_rings);
            for (driver_id, driver_cell) in nearby {
                let Some(steps) = grid_distance(pickup_cell, driver_cell) else {
                    continue;
                };
                let distance_km = distance_km_between_cells(pickup_cell, driver_cell);
                candidates.push(MatchCandidate {
                    driver_id,
                    request_id: request.request_id.clone(),
                    score: Self::score_pairing(steps),
                    grid_distance: steps,
                    eta_secs: self.estimate_eta_secs(distance_km),
                });
            }
        }
        candidates
    }

    /// Builds candidates and assigns them greedily.
    ///
    /// Each request is decided at its best candidate (ties in driver id
    /// order). If that driver was claimed by a higher-scoring request, the
    /// request goes unmatched.
    pub fn match_requests(
        &self,
        requests: &[RideRequest],
        drivers: &DriverSpatialIndex,
    ) -> Vec<MatchResult> {
        let candidates = self.build_candidates(requests, drivers);
        let matches: Vec<MatchResult> = greedy_assign(&candidates)
            .into_iter()
            .map(MatchResult::from)
            .collect();
        log::debug!(
            "Batch matched {} of {} requests from {} candidates",
            matches.len(),
            requests.len(),
            candidates.len()
        );
        matches
    }
}
