//! Test helpers for common test setup and utilities.
//!
//! This module provides shared fixtures to reduce duplication across test files.

use crate::geometry::Point;
use crate::polygon::Polygon;
use crate::spatial::{point_to_cell, ring, Cell, GridResolution};

/// Downtown San Francisco, the reference location used across tests.
pub const SF_LAT: f64 = 37.7749;
pub const SF_LNG: f64 = -122.4194;

pub fn sf_point() -> Point {
    Point::new(SF_LAT, SF_LNG)
}

/// Cell containing [`sf_point`] at `resolution`.
///
/// # Panics
///
/// Panics if the reference point cannot be indexed (should never happen).
pub fn sf_cell(resolution: GridResolution) -> Cell {
    point_to_cell(&sf_point(), resolution).expect("reference point should be indexable")
}

/// A cell exactly `k` grid steps from [`sf_cell`].
///
/// # Panics
///
/// Never in practice: every ring around the reference cell is non-empty.
pub fn sf_cell_at_distance(resolution: GridResolution, k: u32) -> Cell {
    ring(sf_cell(resolution), k)[0]
}

/// Square `[(0,0), (0,10), (10,10), (10,0)]` in (lat, lng).
pub fn square_polygon() -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 0.0),
    ])
}
