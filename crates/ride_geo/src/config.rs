//! Tunable parameters for the grid, heatmap, and batch matcher.
//!
//! Every struct has a `Default` matching production settings and `with_*`
//! builders for overrides. All of them deserialize from JSON/TOML.

use serde::{Deserialize, Serialize};

use crate::spatial::GridResolution;

/// Default number of cached k-ring results per grid.
const DEFAULT_DISK_CACHE_CAPACITY: usize = 1_000;

/// Hex grid settings shared by the driver index and heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Resolution at which points are bucketed into cells.
    pub resolution: GridResolution,
    /// Capacity of the per-grid k-ring LRU cache. 0 disables caching.
    pub disk_cache_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: GridResolution::Neighborhood,
            disk_cache_capacity: DEFAULT_DISK_CACHE_CAPACITY,
        }
    }
}

impl GridConfig {
    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_disk_cache_capacity(mut self, capacity: usize) -> Self {
        self.disk_cache_capacity = capacity;
        self
    }
}

/// Normalization constants for heatmap scores.
///
/// A cell saturates its demand score at `demand_normalization` open requests
/// and its supply score at `supply_normalization` drivers. These are tuning
/// knobs, not physical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    pub demand_normalization: f64,
    pub supply_normalization: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            demand_normalization: 50.0,
            supply_normalization: 20.0,
        }
    }
}

impl HeatmapConfig {
    pub fn with_demand_normalization(mut self, requests: f64) -> Self {
        self.demand_normalization = requests;
        self
    }

    pub fn with_supply_normalization(mut self, drivers: f64) -> Self {
        self.supply_normalization = drivers;
        self
    }
}

/// Candidate generation settings for batch matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Grid rings searched around each pickup cell, capped at
    /// [`MAX_COVER_RINGS`](crate::spatial::MAX_COVER_RINGS).
    pub k_rings: u32,
    /// Average driving speed (km/h) used to estimate pickup ETA.
    pub avg_speed_kmh: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            k_rings: 2,
            avg_speed_kmh: 40.0,
        }
    }
}

impl MatcherConfig {
    pub fn with_k_rings(mut self, k_rings: u32) -> Self {
        self.k_rings = k_rings;
        self
    }

    pub fn with_avg_speed_kmh(mut self, avg_speed_kmh: f64) -> Self {
        self.avg_speed_kmh = avg_speed_kmh;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatmap_config_defaults_match_saturation_points() {
        let config = HeatmapConfig::default();
        assert_eq!(config.demand_normalization, 50.0);
        assert_eq!(config.supply_normalization, 20.0);
    }

    #[test]
    fn grid_config_deserializes_with_resolution_name() {
        let config: GridConfig =
            serde_json::from_str(r#"{"resolution":"block","disk_cache_capacity":10}"#)
                .expect("valid config");
        assert_eq!(config.resolution, GridResolution::Block);
        assert_eq!(config.disk_cache_capacity, 10);
    }

    #[test]
    fn builders_override_defaults() {
        let config = MatcherConfig::default().with_k_rings(4).with_avg_speed_kmh(25.0);
        assert_eq!(config.k_rings, 4);
        assert_eq!(config.avg_speed_kmh, 25.0);
    }
}
