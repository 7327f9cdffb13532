//! Hexagonal grid indexing on top of H3.
//!
//! This module provides:
//!
//! - **Cell**: validated 64-bit H3 address at one of three fixed resolutions
//! - **Point ↔ cell conversion** and canonical hex string round-trips
//! - **Grid disk / ring queries**: cells within (or exactly at) K grid steps
//! - **Grid distance and paths** between cells
//! - **Radius coverage**: k-ring approximation of a circle
//! - **HexGrid**: a resolution plus an owned LRU cache of k-ring results
//!
//! Default resolution is 8 (~0.46 km edge), suitable for driver proximity search.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use h3o::{CellIndex, LatLng, Resolution};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::GridConfig;
use crate::error::{GeoError, Result};
use crate::geometry::{self, Point};

/// Radius coverage never expands fewer than this many rings.
const MIN_COVER_RINGS: u32 = 1;
/// Upper bound on rings expanded by radius coverage and proximity queries.
pub const MAX_COVER_RINGS: u32 = 10;

/// The three grid granularities used across the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridResolution {
    /// H3 resolution 7, ~1.22 km edge.
    City,
    /// H3 resolution 8, ~0.46 km edge.
    #[default]
    Neighborhood,
    /// H3 resolution 9, ~0.17 km edge.
    Block,
}

impl GridResolution {
    pub fn h3(self) -> Resolution {
        match self {
            GridResolution::City => Resolution::Seven,
            GridResolution::Neighborhood => Resolution::Eight,
            GridResolution::Block => Resolution::Nine,
        }
    }

    /// Approximate hexagon edge length in kilometres.
    pub fn edge_length_km(self) -> f64 {
        match self {
            GridResolution::City => 1.22,
            GridResolution::Neighborhood => 0.46,
            GridResolution::Block => 0.17,
        }
    }

    fn from_h3(resolution: Resolution) -> Option<Self> {
        match resolution {
            Resolution::Seven => Some(GridResolution::City),
            Resolution::Eight => Some(GridResolution::Neighborhood),
            Resolution::Nine => Some(GridResolution::Block),
            _ => None,
        }
    }
}

/// A hex grid address.
///
/// Always holds a valid H3 cell index at one of the [`GridResolution`]s.
/// Serializes as its canonical lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(CellIndex);

impl Cell {
    pub fn resolution(self) -> GridResolution {
        // Construction only admits the three supported resolutions.
        GridResolution::from_h3(self.0.resolution()).unwrap_or_default()
    }

    pub fn as_u64(self) -> u64 {
        u64::from(self.0)
    }

    fn index(self) -> CellIndex {
        self.0
    }
}

impl TryFrom<u64> for Cell {
    type Error = GeoError;

    fn try_from(value: u64) -> Result<Self> {
        let index = CellIndex::try_from(value)
            .map_err(|e| GeoError::InvalidCellFormat(format!("{value:#x}: {e}")))?;
        if GridResolution::from_h3(index.resolution()).is_none() {
            return Err(GeoError::InvalidCellFormat(format!(
                "{value:#x}: unsupported resolution {}",
                u8::from(index.resolution())
            )));
        }
        Ok(Cell(index))
    }
}

impl From<Cell> for u64 {
    fn from(cell: Cell) -> Self {
        cell.as_u64()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.as_u64())
    }
}

impl FromStr for Cell {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GeoError::InvalidCellFormat(s.to_string()));
        }
        let raw = u64::from_str_radix(s, 16)
            .map_err(|_| GeoError::InvalidCellFormat(s.to_string()))?;
        Cell::try_from(raw)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Cell containing `point` at `resolution`.
pub fn point_to_cell(point: &Point, resolution: GridResolution) -> Result<Cell> {
    if !point.is_valid() {
        return Err(GeoError::InvalidCoordinates {
            lat: point.lat,
            lng: point.lng,
        });
    }
    let ll = LatLng::new(point.lat, point.lng).map_err(|_| GeoError::InvalidCoordinates {
        lat: point.lat,
        lng: point.lng,
    })?;
    Ok(Cell(ll.to_cell(resolution.h3())))
}

/// Centre of the cell. Lossy: the original point is not recoverable.
pub fn cell_to_point(cell: Cell) -> Point {
    let ll = LatLng::from(cell.index());
    Point::new(ll.lat(), ll.lng())
}

pub fn cell_to_string(cell: Cell) -> String {
    cell.to_string()
}

pub fn string_to_cell(s: &str) -> Result<Cell> {
    s.parse()
}

/// All cells within `k` grid steps of `cell`, centre included.
///
/// Yields `3k² + 3k + 1` cells away from pentagons.
pub fn k_ring(cell: Cell, k: u32) -> Vec<Cell> {
    cell.index()
        .grid_disk::<Vec<_>>(k)
        .into_iter()
        .map(Cell)
        .collect()
}

/// Cells at exactly `k` grid steps from `cell`.
pub fn ring(cell: Cell, k: u32) -> Vec<Cell> {
    if k == 0 {
        return vec![cell];
    }
    let inner: HashSet<Cell> = k_ring(cell, k - 1).into_iter().collect();
    k_ring(cell, k)
        .into_iter()
        .filter(|c| !inner.contains(c))
        .collect()
}

/// Grid steps between two cells, or `None` when H3 cannot relate them
/// (different resolutions, too far apart, or across a pentagon distortion).
pub fn grid_distance(a: Cell, b: Cell) -> Option<u32> {
    a.index()
        .grid_distance(b.index())
        .ok()
        .and_then(|d| u32::try_from(d).ok())
}

/// Cells on a shortest grid path from `from` to `to`, both ends included.
pub fn grid_path(from: Cell, to: Cell) -> Option<Vec<Cell>> {
    from.index().grid_path_cells(to.index()).ok().and_then(|path| {
        let cells: Vec<Cell> = path.filter_map(|cell| cell.ok()).map(Cell).collect();
        if cells.is_empty() {
            None
        } else {
            Some(cells)
        }
    })
}

/// Ring count needed so that `k * edge_length >= radius_km`, clamped to `[1, 10]`.
pub fn rings_for_radius(radius_km: f64, resolution: GridResolution) -> u32 {
    let needed = (radius_km / resolution.edge_length_km()).ceil();
    if needed.is_nan() || needed < MIN_COVER_RINGS as f64 {
        MIN_COVER_RINGS
    } else if needed > MAX_COVER_RINGS as f64 {
        MAX_COVER_RINGS
    } else {
        needed as u32
    }
}

/// Cells approximating a circle of `radius_km` around `center`.
///
/// Over-covers at the ring boundary and caps the radius at ten rings.
pub fn cover_radius(
    center: &Point,
    radius_km: f64,
    resolution: GridResolution,
) -> Result<Vec<Cell>> {
    let origin = point_to_cell(center, resolution)?;
    Ok(k_ring(origin, rings_for_radius(radius_km, resolution)))
}

/// Vertices of the cell's hexagon (or pentagon) outline.
pub fn cell_boundary(cell: Cell) -> Vec<Point> {
    cell.index()
        .boundary()
        .iter()
        .map(|ll| Point::new(ll.lat(), ll.lng()))
        .collect()
}

/// True when the two cells share an edge. Cells at different resolutions are never neighbors.
pub fn are_neighbors(a: Cell, b: Cell) -> bool {
    a.index().is_neighbor_with(b.index()).unwrap_or(false)
}

/// Ancestor of `cell` at a coarser resolution, `None` if `resolution` is finer.
pub fn cell_to_parent(cell: Cell, resolution: GridResolution) -> Option<Cell> {
    cell.index().parent(resolution.h3()).map(Cell)
}

/// Haversine distance between two cell centres.
pub fn distance_km_between_cells(a: Cell, b: Cell) -> f64 {
    geometry::distance(&cell_to_point(a), &cell_to_point(b))
}

/// Initial bearing from the centre of `from` to the centre of `to`.
pub fn bearing_between_cells(from: Cell, to: Cell) -> f64 {
    geometry::bearing(&cell_to_point(from), &cell_to_point(to))
}

/// Grid disk cache for proximity search and heatmap radius queries.
struct GridDiskCache {
    cache: Mutex<LruCache<(Cell, u32), Vec<Cell>>>,
}

impl GridDiskCache {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn get_or_compute(&self, origin: Cell, k: u32) -> Vec<Cell> {
        let mut cache = self.cache.lock();
        cache.get_or_insert((origin, k), || k_ring(origin, k)).clone()
    }
}

impl fmt::Debug for GridDiskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("GridDiskCache")
            .field("len", &cache.len())
            .field("cap", &cache.cap())
            .finish()
    }
}

/// A grid at a fixed resolution with its own k-ring cache.
///
/// Each index structure owns one; nothing is shared process-wide.
#[derive(Debug)]
pub struct HexGrid {
    resolution: GridResolution,
    disk_cache: Option<GridDiskCache>,
}

impl HexGrid {
    pub fn new(resolution: GridResolution) -> Self {
        Self::with_config(GridConfig::default().with_resolution(resolution))
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self {
            resolution: config.resolution,
            disk_cache: NonZeroUsize::new(config.disk_cache_capacity).map(GridDiskCache::new),
        }
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    pub fn point_to_cell(&self, point: &Point) -> Result<Cell> {
        point_to_cell(point, self.resolution)
    }

    /// Cached [`k_ring`].
    pub fn k_ring(&self, origin: Cell, k: u32) -> Vec<Cell> {
        debug_assert_eq!(
            origin.resolution(),
            self.resolution,
            "origin resolution must match HexGrid resolution"
        );
        match &self.disk_cache {
            Some(cache) => cache.get_or_compute(origin, k),
            None => k_ring(origin, k),
        }
    }

    /// Cached [`cover_radius`] at this grid's resolution.
    pub fn cover_radius(&self, center: &Point, radius_km: f64) -> Result<Vec<Cell>> {
        let origin = self.point_to_cell(center)?;
        Ok(self.k_ring(origin, rings_for_radius(radius_km, self.resolution)))
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::with_config(GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf_cell(resolution: GridResolution) -> Cell {
        point_to_cell(&Point::new(37.7749, -122.4194), resolution).expect("valid point")
    }

    #[test]
    fn k_ring_sizes_follow_hexagonal_numbers() {
        let resolutions = [
            GridResolution::City,
            GridResolution::Neighborhood,
            GridResolution::Block,
        ];
        for resolution in resolutions {
            let origin = sf_cell(resolution);
            for k in 0..=3u32 {
                let expected = (3 * k * k + 3 * k + 1) as usize;
                assert_eq!(k_ring(origin, k).len(), expected, "k={k} at {resolution:?}");
            }
        }
    }

    #[test]
    fn ring_contains_only_cells_at_exact_distance() {
        let origin = sf_cell(GridResolution::Neighborhood);
        assert_eq!(ring(origin, 0), vec![origin]);
        for k in 1..=3u32 {
            let cells = ring(origin, k);
            assert_eq!(cells.len(), (6 * k) as usize);
            for cell in cells {
                assert_eq!(grid_distance(origin, cell), Some(k));
            }
        }
    }

    #[test]
    fn string_round_trip_is_lossless() {
        let cell = sf_cell(GridResolution::Block);
        let s = cell_to_string(cell);
        assert_eq!(string_to_cell(&s).expect("parse"), cell);
        assert_eq!(s, s.to_lowercase());
    }

    #[test]
    fn malformed_strings_are_rejected() {
        for bad in ["", "xyz", "8a1fb46622dffff", "0", "8828308281fffff0ab", " 88283082"] {
            assert!(
                matches!(string_to_cell(bad), Err(GeoError::InvalidCellFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn cell_center_lies_within_one_cell_of_point() {
        let p = Point::new(37.7749, -122.4194);
        let cell = point_to_cell(&p, GridResolution::Neighborhood).expect("cell");
        let center = cell_to_point(cell);
        let diameter = 2.0 * GridResolution::Neighborhood.edge_length_km();
        assert!(geometry::distance(&p, &center) <= diameter);
    }

    #[test]
    fn invalid_point_is_rejected() {
        let err = point_to_cell(&Point::new(91.0, 0.0), GridResolution::City);
        assert!(matches!(err, Err(GeoError::InvalidCoordinates { .. })));
    }

    #[test]
    fn grid_path_spans_distance() {
        let origin = sf_cell(GridResolution::Neighborhood);
        let target = ring(origin, 3)[0];
        let path = grid_path(origin, target).expect("path");
        assert_eq!(path.len(), 4);
        assert_eq!(path.first(), Some(&origin));
        assert_eq!(path.last(), Some(&target));
        for pair in path.windows(2) {
            assert!(are_neighbors(pair[0], pair[1]));
        }
    }

    #[test]
    fn cover_radius_clamps_ring_count() {
        assert_eq!(rings_for_radius(0.0, GridResolution::Neighborhood), 1);
        assert_eq!(rings_for_radius(0.9, GridResolution::Neighborhood), 2);
        assert_eq!(rings_for_radius(500.0, GridResolution::Block), 10);

        let center = Point::new(37.7749, -122.4194);
        let cells = cover_radius(&center, 1.0, GridResolution::Neighborhood).expect("cover");
        assert_eq!(cells.len(), 37);
    }

    #[test]
    fn parent_is_coarser_and_contains_child_center() {
        let child = sf_cell(GridResolution::Block);
        let parent = cell_to_parent(child, GridResolution::City).expect("parent");
        assert_eq!(parent.resolution(), GridResolution::City);
        assert!(cell_to_parent(parent, GridResolution::Block).is_none());
    }

    #[test]
    fn boundary_has_six_vertices() {
        assert_eq!(cell_boundary(sf_cell(GridResolution::Neighborhood)).len(), 6);
    }

    #[test]
    fn bearing_between_cells_reverses_by_half_turn() {
        let origin = sf_cell(GridResolution::Neighborhood);
        let neighbor = ring(origin, 1)[0];
        let out = bearing_between_cells(origin, neighbor);
        let back = bearing_between_cells(neighbor, origin);
        assert!((0.0..360.0).contains(&out));
        assert!(((out - back).abs() - 180.0).abs() < 0.01);
        assert_eq!(out, geometry::bearing(&cell_to_point(origin), &cell_to_point(neighbor)));
    }

    #[test]
    fn cached_k_ring_matches_uncached() {
        let grid = HexGrid::new(GridResolution::Neighborhood);
        let origin = sf_cell(GridResolution::Neighborhood);
        assert_eq!(grid.k_ring(origin, 2), k_ring(origin, 2));
        assert_eq!(grid.k_ring(origin, 2), k_ring(origin, 2));

        let uncached = HexGrid::with_config(GridConfig::default().with_disk_cache_capacity(0));
        assert_eq!(uncached.k_ring(origin, 1).len(), 7);
    }

    #[test]
    fn cell_serializes_as_hex_string() {
        let cell = sf_cell(GridResolution::Neighborhood);
        let json = serde_json::to_string(&cell).expect("serialize");
        assert_eq!(json, format!("\"{cell}\""));
        let back: Cell = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cell);
    }
}
