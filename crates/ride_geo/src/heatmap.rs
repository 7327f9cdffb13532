//! Per-cell demand/supply heatmap with surge levels and display colors.
//!
//! A cell's scores, surge level, and color are pure functions of its driver
//! and request counts and are recomputed on every update.
//!
//! Surge formula:
//! - no drivers, some requests → `2.0`
//! - no drivers, no requests → `1.0`
//! - otherwise by `requests / drivers`: `> 3` → `2.0`, `> 2` → `1.5`,
//!   `> 1.5` → `1.25`, else `1.0`

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{GridConfig, HeatmapConfig};
use crate::error::Result;
use crate::geometry::Point;
use crate::spatial::{cell_to_point, Cell, HexGrid};

/// Surge multiplier of a cell with no data.
pub const BASE_SURGE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurgeColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Gray,
}

impl SurgeColor {
    pub fn as_str(self) -> &'static str {
        match self {
            SurgeColor::Red => "red",
            SurgeColor::Orange => "orange",
            SurgeColor::Yellow => "yellow",
            SurgeColor::Green => "green",
            SurgeColor::Blue => "blue",
            SurgeColor::Gray => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub cell_id: String,
    pub center: Point,
    pub driver_count: u32,
    pub request_count: u32,
    pub demand_score: f64,
    pub supply_score: f64,
    pub surge_level: f64,
    pub color: SurgeColor,
}

impl HeatmapCell {
    fn compute(cell: Cell, driver_count: u32, request_count: u32, config: &HeatmapConfig) -> Self {
        let surge = surge_level(driver_count, request_count);
        Self {
            cell_id: cell.to_string(),
            center: cell_to_point(cell),
            driver_count,
            request_count,
            demand_score: demand_score(request_count, config),
            supply_score: supply_score(driver_count, config),
            surge_level: surge,
            color: surge_color(surge, driver_count, request_count),
        }
    }

    /// Placeholder for a covered cell with no recorded data.
    fn empty(cell: Cell) -> Self {
        Self {
            cell_id: cell.to_string(),
            center: cell_to_point(cell),
            driver_count: 0,
            request_count: 0,
            demand_score: 0.0,
            supply_score: 0.0,
            surge_level: BASE_SURGE,
            color: SurgeColor::Gray,
        }
    }
}

/// Open requests normalized to `[0, 1]`.
pub fn demand_score(request_count: u32, config: &HeatmapConfig) -> f64 {
    (request_count as f64 / config.demand_normalization).min(1.0)
}

/// Available drivers normalized to `[0, 1]`.
pub fn supply_score(driver_count: u32, config: &HeatmapConfig) -> f64 {
    (driver_count as f64 / config.supply_normalization).min(1.0)
}

pub fn surge_level(driver_count: u32, request_count: u32) -> f64 {
    if driver_count == 0 {
        return if request_count > 0 { 2.0 } else { BASE_SURGE };
    }
    let ratio = request_count as f64 / driver_count as f64;
    if ratio > 3.0 {
        2.0
    } else if ratio > 2.0 {
        1.5
    } else if ratio > 1.5 {
        1.25
    } else {
        BASE_SURGE
    }
}

/// Display color for a surge level. A cell with no drivers and no requests
/// is gray whatever its surge.
pub fn surge_color(surge: f64, driver_count: u32, request_count: u32) -> SurgeColor {
    if driver_count == 0 && request_count == 0 {
        SurgeColor::Gray
    } else if surge >= 2.0 {
        SurgeColor::Red
    } else if surge >= 1.5 {
        SurgeColor::Orange
    } else if surge >= 1.25 {
        SurgeColor::Yellow
    } else if surge >= 1.0 {
        SurgeColor::Green
    } else {
        SurgeColor::Blue
    }
}

/// Thread-safe surge heatmap keyed by cell string.
#[derive(Debug)]
pub struct Heatmap {
    grid: HexGrid,
    config: HeatmapConfig,
    cells: RwLock<HashMap<String, HeatmapCell>>,
}

impl Heatmap {
    pub fn new(grid_config: GridConfig, config: HeatmapConfig) -> Self {
        Self {
            grid: HexGrid::with_config(grid_config),
            config,
            cells: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Records counts for `cell_id` and recomputes its derived fields.
    ///
    /// Malformed cell ids, and cells at a resolution other than this
    /// heatmap's grid, are logged and dropped.
    pub fn update_cell(&self, cell_id: &str, driver_count: u32, request_count: u32) {
        let cell: Cell = match cell_id.parse() {
            Ok(cell) => cell,
            Err(err) => {
                log::warn!("Dropping heatmap update: {}", err);
                return;
            }
        };
        if cell.resolution() != self.grid.resolution() {
            log::warn!(
                "Dropping heatmap update for {}: resolution {:?}, heatmap uses {:?}",
                cell,
                cell.resolution(),
                self.grid.resolution()
            );
            return;
        }
        let record = HeatmapCell::compute(cell, driver_count, request_count, &self.config);
        log::debug!(
            "Heatmap cell {} drivers={} requests={} surge={}",
            record.cell_id,
            driver_count,
            request_count,
            record.surge_level
        );
        self.cells.write().insert(record.cell_id.clone(), record);
    }

    /// Stored record for `cell_id`. Lookups use the canonical cell string,
    /// so any accepted spelling of the id finds the same record.
    pub fn get_cell(&self, cell_id: &str) -> Option<HeatmapCell> {
        let key = cell_id.parse::<Cell>().ok()?.to_string();
        self.cells.read().get(&key).cloned()
    }

    /// One entry per cell covering the circle, synthesizing empty gray cells
    /// where nothing was recorded.
    pub fn cells_in_radius(&self, center: &Point, radius_km: f64) -> Result<Vec<HeatmapCell>> {
        let covered = self.grid.cover_radius(center, radius_km)?;
        let cells = self.cells.read();
        Ok(covered
            .into_iter()
            .map(|cell| {
                cells
                    .get(&cell.to_string())
                    .cloned()
                    .unwrap_or_else(|| HeatmapCell::empty(cell))
            })
            .collect())
    }

    /// Snapshot of every recorded cell.
    pub fn cells(&self) -> Vec<HeatmapCell> {
        self.cells.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    pub fn clear(&self) {
        self.cells.write().clear();
    }
}

impl Default for Heatmap {
    fn default() -> Self {
        Self::new(GridConfig::default(), HeatmapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{point_to_cell, GridResolution};

    fn sf_cell_id() -> String {
        point_to_cell(&Point::new(37.7749, -122.4194), GridResolution::Neighborhood)
            .expect("cell")
            .to_string()
    }

    #[test]
    fn surge_table() {
        assert_eq!(surge_level(0, 5), 2.0);
        assert_eq!(surge_level(0, 0), 1.0);
        assert_eq!(surge_level(5, 16), 2.0);
        assert_eq!(surge_level(5, 15), 1.5);
        assert_eq!(surge_level(5, 10), 1.25);
        assert_eq!(surge_level(4, 6), 1.0);
        assert_eq!(surge_level(10, 1), 1.0);
    }

    #[test]
    fn color_thresholds() {
        assert_eq!(surge_color(2.0, 1, 1), SurgeColor::Red);
        assert_eq!(surge_color(1.5, 1, 1), SurgeColor::Orange);
        assert_eq!(surge_color(1.25, 1, 1), SurgeColor::Yellow);
        assert_eq!(surge_color(1.0, 1, 1), SurgeColor::Green);
        assert_eq!(surge_color(0.9, 1, 1), SurgeColor::Blue);
        assert_eq!(surge_color(1.0, 0, 0), SurgeColor::Gray);
    }

    #[test]
    fn color_names_match_serialized_form() {
        for color in [
            SurgeColor::Red,
            SurgeColor::Orange,
            SurgeColor::Yellow,
            SurgeColor::Green,
            SurgeColor::Blue,
            SurgeColor::Gray,
        ] {
            let json = serde_json::to_string(&color).expect("serialize");
            assert_eq!(json, format!("\"{}\"", color.as_str()));
        }
    }

    #[test]
    fn scores_saturate_at_normalization() {
        let config = HeatmapConfig::default();
        assert_eq!(demand_score(25, &config), 0.5);
        assert_eq!(demand_score(500, &config), 1.0);
        assert_eq!(supply_score(5, &config), 0.25);
        assert_eq!(supply_score(40, &config), 1.0);
    }

    #[test]
    fn update_cell_records_derived_fields() {
        let heatmap = Heatmap::default();
        let id = sf_cell_id();
        heatmap.update_cell(&id, 5, 10);
        let cell = heatmap.get_cell(&id).expect("recorded");
        assert!(cell.surge_level > 1.0);
        assert_ne!(cell.color, SurgeColor::Gray);
        assert_eq!(cell.demand_score, 0.2);
        assert_eq!(cell.supply_score, 0.25);

        heatmap.update_cell(&id, 5, 2);
        let cell = heatmap.get_cell(&id).expect("recorded");
        assert_eq!(cell.surge_level, 1.0);
        assert_eq!(cell.color, SurgeColor::Green);
        assert_eq!(heatmap.len(), 1);
    }

    #[test]
    fn malformed_cell_ids_are_ignored() {
        let heatmap = Heatmap::default();
        heatmap.update_cell("not-a-cell", 1, 1);
        heatmap.update_cell("", 1, 1);
        assert!(heatmap.is_empty());
        assert!(heatmap.get_cell("not-a-cell").is_none());
    }

    #[test]
    fn cells_at_other_resolutions_are_rejected() {
        let heatmap = Heatmap::default();
        let center = Point::new(37.7749, -122.4194);
        let city = point_to_cell(&center, GridResolution::City).expect("cell");
        heatmap.update_cell(&city.to_string(), 1, 9);
        assert!(heatmap.is_empty());

        let covered = heatmap.cells_in_radius(&center, 0.5).expect("cover");
        assert!(covered.iter().all(|c| c.color == SurgeColor::Gray));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let heatmap = Heatmap::default();
        let id = sf_cell_id();
        heatmap.update_cell(&id.to_uppercase(), 1, 1);
        assert!(heatmap.get_cell(&id).is_some());
    }

    #[test]
    fn custom_normalization_changes_scores() {
        let config = HeatmapConfig::default().with_demand_normalization(10.0);
        let heatmap = Heatmap::new(GridConfig::default(), config);
        let id = sf_cell_id();
        heatmap.update_cell(&id, 1, 5);
        assert_eq!(heatmap.get_cell(&id).expect("cell").demand_score, 0.5);
    }
}
