#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ride_geo::geohash::Direction;
use ride_geo::{BoundingBox, Point};

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniform point anywhere on the globe, poles excluded.
pub fn random_point(rng: &mut StdRng) -> Point {
    Point::new(rng.gen_range(-85.0..85.0), rng.gen_range(-180.0..180.0))
}

/// Uniform point inside a ~10 km box around downtown San Francisco.
pub fn random_sf_point(rng: &mut StdRng) -> Point {
    Point::new(rng.gen_range(37.73..37.82), rng.gen_range(-122.47..-122.37))
}

fn lng_edges_meet(west_max: f64, east_min: f64) -> bool {
    west_max == east_min || (west_max == 180.0 && east_min == -180.0)
}

/// Checks that `neighbor` sits on the `direction` side of `source`, sharing an
/// edge (cardinal) or a corner (diagonal). Both boxes come from hashes of the
/// same length, so edges compare exactly.
pub fn is_adjacent_in_direction(
    source: &BoundingBox,
    neighbor: &BoundingBox,
    direction: Direction,
) -> bool {
    let (north, south, east, west) = match direction {
        Direction::N => (true, false, false, false),
        Direction::NE => (true, false, true, false),
        Direction::E => (false, false, true, false),
        Direction::SE => (false, true, true, false),
        Direction::S => (false, true, false, false),
        Direction::SW => (false, true, false, true),
        Direction::W => (false, false, false, true),
        Direction::NW => (true, false, false, true),
    };
    // Latitude does not wrap: a move across a pole stays in the same row.
    let north = north && source.max_lat < 90.0;
    let south = south && source.min_lat > -90.0;

    let lat_ok = if north {
        neighbor.min_lat == source.max_lat
    } else if south {
        neighbor.max_lat == source.min_lat
    } else {
        neighbor.min_lat == source.min_lat && neighbor.max_lat == source.max_lat
    };
    let lng_ok = if east {
        lng_edges_meet(source.max_lng, neighbor.min_lng)
    } else if west {
        lng_edges_meet(neighbor.max_lng, source.min_lng)
    } else {
        neighbor.min_lng == source.min_lng && neighbor.max_lng == source.max_lng
    };
    lat_ok && lng_ok
}
