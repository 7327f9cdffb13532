//! Base-32 geohash codec: encode/decode, neighbors, and area coverage.
//!
//! Bits alternate longitude/latitude starting with longitude, five bits per
//! character. Neighbor lookup uses the classic border/neighbor substitution
//! tables, indexed by whether the hash length is even or odd, and recurses
//! into the parent hash when a move crosses the parent's border.

use std::collections::BTreeSet;

use crate::error::{GeoError, Result};
use crate::geometry::{self, BoundingBox, Point};

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

pub const MIN_PRECISION: usize = 1;
pub const MAX_PRECISION: usize = 12;

/// Samples per axis when covering a bounding box.
const COVER_SAMPLES: usize = 10;

/// Radii above this get one extra neighbor layer in [`cover_radius`].
const WIDE_RADIUS_KM: f64 = 5.0;

// Tables are indexed [even length, odd length]. Verified against
// integer bit arithmetic for every hash up to three characters.
const NEIGHBOR_N: [&[u8; 32]; 2] = [
    b"p0r21436x8zb9dcf5h7kjnmqesgutwvy",
    b"bc01fg45238967deuvhjyznpkmstqrwx",
];
const NEIGHBOR_S: [&[u8; 32]; 2] = [
    b"14365h7k9dcfesgujnmqp0r2twvyx8zb",
    b"238967debc01fg45kmstqrwxuvhjyznp",
];
const NEIGHBOR_E: [&[u8; 32]; 2] = [
    b"bc01fg45238967deuvhjyznpkmstqrwx",
    b"p0r21436x8zb9dcf5h7kjnmqesgutwvy",
];
const NEIGHBOR_W: [&[u8; 32]; 2] = [
    b"238967debc01fg45kmstqrwxuvhjyznp",
    b"14365h7k9dcfesgujnmqp0r2twvyx8zb",
];

const BORDER_N: [&[u8]; 2] = [b"prxz", b"bcfguvyz"];
const BORDER_S: [&[u8]; 2] = [b"028b", b"0145hjnp"];
const BORDER_E: [&[u8]; 2] = [b"bcfguvyz", b"prxz"];
const BORDER_W: [&[u8]; 2] = [b"0145hjnp", b"028b"];

/// Compass direction of a neighboring hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// Clockwise from north; the order of [`neighbors`].
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];
}

#[derive(Clone, Copy)]
enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    fn tables(self) -> (&'static [&'static [u8; 32]; 2], &'static [&'static [u8]; 2]) {
        match self {
            Cardinal::North => (&NEIGHBOR_N, &BORDER_N),
            Cardinal::South => (&NEIGHBOR_S, &BORDER_S),
            Cardinal::East => (&NEIGHBOR_E, &BORDER_E),
            Cardinal::West => (&NEIGHBOR_W, &BORDER_W),
        }
    }
}

fn char_index(c: u8) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    BASE32.iter().position(|&b| b == c)
}

/// Geohash of `point` with `precision` characters, clamped to `[1, 12]`.
pub fn encode(point: &Point, precision: usize) -> String {
    let precision = precision.clamp(MIN_PRECISION, MAX_PRECISION);
    let mut hash = String::with_capacity(precision);
    let (mut lat_lo, mut lat_hi) = (-90.0_f64, 90.0_f64);
    let (mut lng_lo, mut lng_hi) = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;
    let mut bit = 0;
    let mut ch = 0usize;

    while hash.len() < precision {
        if even_bit {
            let mid = (lng_lo + lng_hi) / 2.0;
            if point.lng >= mid {
                ch = (ch << 1) | 1;
                lng_lo = mid;
            } else {
                ch <<= 1;
                lng_hi = mid;
            }
        } else {
            let mid = (lat_lo + lat_hi) / 2.0;
            if point.lat >= mid {
                ch = (ch << 1) | 1;
                lat_lo = mid;
            } else {
                ch <<= 1;
                lat_hi = mid;
            }
        }
        even_bit = !even_bit;
        bit += 1;
        if bit == 5 {
            hash.push(BASE32[ch] as char);
            bit = 0;
            ch = 0;
        }
    }
    hash
}

/// Bounding box of a geohash.
///
/// Characters outside the alphabet are skipped rather than rejected. A hash
/// with no recognizable character at all is an error.
pub fn decode_bounds(hash: &str) -> Result<BoundingBox> {
    let (mut lat_lo, mut lat_hi) = (-90.0_f64, 90.0_f64);
    let (mut lng_lo, mut lng_hi) = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;
    let mut decoded_any = false;

    for idx in hash.bytes().filter_map(char_index) {
        decoded_any = true;
        for shift in (0..5).rev() {
            let on = (idx >> shift) & 1 == 1;
            if even_bit {
                let mid = (lng_lo + lng_hi) / 2.0;
                if on {
                    lng_lo = mid;
                } else {
                    lng_hi = mid;
                }
            } else {
                let mid = (lat_lo + lat_hi) / 2.0;
                if on {
                    lat_lo = mid;
                } else {
                    lat_hi = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    if !decoded_any {
        return Err(GeoError::InvalidGeohash(hash.to_string()));
    }
    Ok(BoundingBox::new(lat_lo, lat_hi, lng_lo, lng_hi))
}

/// Centre of the geohash's bounding box.
pub fn decode(hash: &str) -> Result<Point> {
    Ok(decode_bounds(hash)?.center())
}

/// Shortest precision whose cells are no wider than roughly `radius_km`.
pub fn precision_for_radius(radius_km: f64) -> usize {
    match radius_km {
        r if r > 5000.0 => 1,
        r if r > 625.0 => 2,
        r if r > 156.0 => 3,
        r if r > 39.0 => 4,
        r if r > 4.9 => 5,
        r if r > 1.2 => 6,
        r if r > 0.153 => 7,
        r if r > 0.038 => 8,
        _ => 9,
    }
}

/// Lowercases and checks every character against the alphabet.
fn normalize(hash: &str) -> Result<String> {
    let in_alphabet = hash.bytes().all(|b| char_index(b).is_some());
    if hash.is_empty() || hash.len() > MAX_PRECISION || !in_alphabet {
        return Err(GeoError::InvalidGeohash(hash.to_string()));
    }
    Ok(hash.to_ascii_lowercase())
}

/// Table-driven single step. `hash` must be normalized and non-empty.
/// Latitude steps wrap around the poles here; [`adjacent`] decides whether
/// to take them.
fn step(hash: &str, cardinal: Cardinal) -> String {
    let (neighbor, border) = cardinal.tables();
    let last = hash.as_bytes()[hash.len() - 1];
    let parity = hash.len() % 2;
    let mut parent = hash[..hash.len() - 1].to_string();

    if border[parity].contains(&last) && !parent.is_empty() {
        parent = step(&parent, cardinal);
    }
    // `last` is in the alphabet, so it is in every permutation table.
    let pos = neighbor[parity].iter().position(|&c| c == last).unwrap_or(0);
    parent.push(BASE32[pos] as char);
    parent
}

/// Neighboring hash in `direction`, same length as `hash`.
///
/// Longitude wraps across the antimeridian. Latitude does not wrap: when a
/// move would cross a pole, only its east/west component is applied (so the
/// north neighbor of a hash touching the north pole is the hash itself).
pub fn adjacent(hash: &str, direction: Direction) -> Result<String> {
    let hash = normalize(hash)?;
    let bounds = decode_bounds(&hash)?;
    let at_north_pole = bounds.max_lat >= 90.0;
    let at_south_pole = bounds.min_lat <= -90.0;

    let (lat_move, lng_move) = match direction {
        Direction::N => (Some(Cardinal::North), None),
        Direction::NE => (Some(Cardinal::North), Some(Cardinal::East)),
        Direction::E => (None, Some(Cardinal::East)),
        Direction::SE => (Some(Cardinal::South), Some(Cardinal::East)),
        Direction::S => (Some(Cardinal::South), None),
        Direction::SW => (Some(Cardinal::South), Some(Cardinal::West)),
        Direction::W => (None, Some(Cardinal::West)),
        Direction::NW => (Some(Cardinal::North), Some(Cardinal::West)),
    };
    let lat_move = lat_move.filter(|m| match m {
        Cardinal::North => !at_north_pole,
        Cardinal::South => !at_south_pole,
        _ => true,
    });

    let mut result = hash;
    if let Some(m) = lat_move {
        result = step(&result, m);
    }
    if let Some(m) = lng_move {
        result = step(&result, m);
    }
    Ok(result)
}

/// The eight neighbors of `hash`, clockwise from north.
pub fn neighbors(hash: &str) -> Result<[String; 8]> {
    let mut out: [String; 8] = Default::default();
    for (slot, direction) in out.iter_mut().zip(Direction::ALL) {
        *slot = adjacent(hash, direction)?;
    }
    Ok(out)
}

/// `hash` (normalized) followed by its eight neighbors.
pub fn neighbors_with_center(hash: &str) -> Result<Vec<String>> {
    let center = normalize(hash)?;
    let mut cells = Vec::with_capacity(9);
    cells.extend(neighbors(&center)?);
    cells.insert(0, center);
    Ok(cells)
}

/// Hashes hit by a 10×10 sample grid across `bbox`, sorted and deduplicated.
///
/// A heuristic: boxes much larger than the cell size may leave gaps between
/// samples, and edge cells may extend past the box.
pub fn cover_bounding_box(bbox: &BoundingBox, precision: usize) -> Vec<String> {
    let lat_step = (bbox.max_lat - bbox.min_lat) / (COVER_SAMPLES - 1) as f64;
    let lng_step = (bbox.max_lng - bbox.min_lng) / (COVER_SAMPLES - 1) as f64;
    let mut hashes = BTreeSet::new();
    for i in 0..COVER_SAMPLES {
        for j in 0..COVER_SAMPLES {
            let sample = Point::new(
                bbox.min_lat + lat_step * i as f64,
                bbox.min_lng + lng_step * j as f64,
            );
            hashes.insert(encode(&sample, precision));
        }
    }
    hashes.into_iter().collect()
}

/// Hashes covering a circle: the centre hash at [`precision_for_radius`]
/// plus its neighbors, with one more neighbor layer for radii over 5 km.
pub fn cover_radius(center: &Point, radius_km: f64) -> Vec<String> {
    let precision = precision_for_radius(radius_km);
    let center_hash = encode(center, precision);
    let mut hashes: BTreeSet<String> = BTreeSet::new();

    // Freshly encoded hashes are always well-formed.
    let first_layer = neighbors_with_center(&center_hash).unwrap_or_else(|_| vec![center_hash]);
    if radius_km > WIDE_RADIUS_KM {
        for hash in &first_layer {
            if let Ok(layer) = neighbors_with_center(hash) {
                hashes.extend(layer);
            }
        }
    }
    hashes.extend(first_layer);
    hashes.into_iter().collect()
}

/// Cheap circle test for a hash: its centre lies within `radius_km`.
pub fn center_within(hash: &str, center: &Point, radius_km: f64) -> bool {
    decode(hash)
        .map(|p| geometry::distance(center, &p) <= radius_km)
        .unwrap_or(false)
}
