//! Live driver → hex cell index for proximity search.
//!
//! Maintains a forward map (cell → drivers) and a reverse map (driver → cell)
//! so updates and removals touch only the affected cells. Both maps sit behind
//! one reader-writer lock: every mutation is serialized, and readers always
//! observe the state after the last completed write.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::config::GridConfig;
use crate::geometry::Point;
use crate::spatial::{Cell, GridResolution, HexGrid, MAX_COVER_RINGS};

#[derive(Debug, Default)]
struct DriverCells {
    /// Map from cell to the drivers currently inside it. Never holds empty sets.
    drivers_by_cell: HashMap<Cell, HashSet<String>>,
    /// Reverse mapping: driver → current cell (for efficient updates)
    driver_to_cell: HashMap<String, Cell>,
}

impl DriverCells {
    fn detach(&mut self, driver_id: &str, cell: Cell) {
        if let Some(drivers) = self.drivers_by_cell.get_mut(&cell) {
            drivers.remove(driver_id);
            if drivers.is_empty() {
                self.drivers_by_cell.remove(&cell);
            }
        }
    }
}

/// Thread-safe index of driver positions bucketed by hex cell.
///
/// Share across ingestion and matching tasks with `Arc<DriverSpatialIndex>`.
#[derive(Debug)]
pub struct DriverSpatialIndex {
    grid: HexGrid,
    cells: RwLock<DriverCells>,
}

impl DriverSpatialIndex {
    pub fn new(resolution: GridResolution) -> Self {
        Self::with_config(GridConfig::default().with_resolution(resolution))
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self {
            grid: HexGrid::with_config(config),
            cells: RwLock::new(DriverCells::default()),
        }
    }

    pub fn resolution(&self) -> GridResolution {
        self.grid.resolution()
    }

    /// Moves `driver_id` to the cell containing `location`.
    ///
    /// No-op when the driver is already in that cell. Invalid locations are
    /// logged and ignored, leaving the driver where it was.
    pub fn update_driver(&self, driver_id: &str, location: Point) {
        let cell = match self.grid.point_to_cell(&location) {
            Ok(cell) => cell,
            Err(err) => {
                log::warn!("Ignoring location update for driver {}: {}", driver_id, err);
                return;
            }
        };

        let mut cells = self.cells.write();
        let previous = cells.driver_to_cell.get(driver_id).copied();
        if previous == Some(cell) {
            return;
        }
        if let Some(old_cell) = previous {
            cells.detach(driver_id, old_cell);
        }
        cells
            .drivers_by_cell
            .entry(cell)
            .or_default()
            .insert(driver_id.to_string());
        cells.driver_to_cell.insert(driver_id.to_string(), cell);
        log::debug!("Driver {} moved {:?} -> {}", driver_id, previous.map(|c| c.to_string()), cell);
    }

    /// Removes `driver_id` from both maps. Absent drivers are ignored.
    pub fn remove_driver(&self, driver_id: &str) {
        let mut cells = self.cells.write();
        if let Some(cell) = cells.driver_to_cell.remove(driver_id) {
            cells.detach(driver_id, cell);
            log::debug!("Driver {} removed from {}", driver_id, cell);
        }
    }

    /// Drivers within `k_rings` grid steps of the pickup cell, sorted by id.
    ///
    /// Returns an empty list for an invalid pickup point. `k_rings` above
    /// [`MAX_COVER_RINGS`] is clamped.
    pub fn nearby(&self, pickup: &Point, k_rings: u32) -> Vec<String> {
        self.nearby_with_cells(pickup, k_rings)
            .into_iter()
            .map(|(driver_id, _)| driver_id)
            .collect()
    }

    /// Like [`DriverSpatialIndex::nearby`], paired with each driver's cell
    /// as of the same snapshot.
    ///
    /// `k_rings` is clamped to [`MAX_COVER_RINGS`].
    pub fn nearby_with_cells(&self, pickup: &Point, k_rings: u32) -> Vec<(String, Cell)> {
        let origin = match self.grid.point_to_cell(pickup) {
            Ok(cell) => cell,
            Err(err) => {
                log::warn!("Rejecting nearby query: {}", err);
                return Vec::new();
            }
        };
        if k_rings > MAX_COVER_RINGS {
            log::warn!("Clamping nearby query from {} to {} rings", k_rings, MAX_COVER_RINGS);
        }
        let disk = self.grid.k_ring(origin, k_rings.min(MAX_COVER_RINGS));

        let cells = self.cells.read();
        let mut result: Vec<(String, Cell)> = disk
            .iter()
            .filter_map(|cell| cells.drivers_by_cell.get(cell).map(|drivers| (cell, drivers)))
            .flat_map(|(cell, drivers)| drivers.iter().map(move |d| (d.clone(), *cell)))
            .collect();
        // A driver sits in exactly one cell, so the union has no duplicates.
        result.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        result
    }

    pub fn driver_count(&self) -> usize {
        self.cells.read().driver_to_cell.len()
    }

    pub fn cell_of(&self, driver_id: &str) -> Option<Cell> {
        self.cells.read().driver_to_cell.get(driver_id).copied()
    }

    /// Sorted ids of drivers currently in `cell`.
    pub fn drivers_in_cell(&self, cell: &Cell) -> Vec<String> {
        let cells = self.cells.read();
        let mut drivers: Vec<String> = cells
            .drivers_by_cell
            .get(cell)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        drivers.sort_unstable();
        drivers
    }

    /// Driver count per occupied cell.
    pub fn cell_stats(&self) -> HashMap<Cell, usize> {
        self.cells
            .read()
            .drivers_by_cell
            .iter()
            .map(|(cell, drivers)| (*cell, drivers.len()))
            .collect()
    }

    pub fn clear(&self) {
        let mut cells = self.cells.write();
        cells.drivers_by_cell.clear();
        cells.driver_to_cell.clear();
    }
}

impl Default for DriverSpatialIndex {
    fn default() -> Self {
        Self::with_config(GridConfig::default())
    }
}
