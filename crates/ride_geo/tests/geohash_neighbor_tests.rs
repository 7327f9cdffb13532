mod support;

use rand::Rng;
use ride_geo::geohash::{self, Direction};
use ride_geo::Point;

use support::{is_adjacent_in_direction, random_point, seeded_rng};

fn assert_neighbors_adjacent(hash: &str) {
    let source = geohash::decode_bounds(hash).expect("source bounds");
    let neighbors = geohash::neighbors(hash).expect("neighbors");
    assert_eq!(neighbors.len(), 8);
    for (neighbor, direction) in neighbors.iter().zip(Direction::ALL) {
        assert_eq!(neighbor.len(), hash.len(), "{hash} {direction:?}");
        let bounds = geohash::decode_bounds(neighbor).expect("neighbor bounds");
        assert!(
            is_adjacent_in_direction(&source, &bounds, direction),
            "{neighbor} is not {direction:?} of {hash}: {source:?} vs {bounds:?}"
        );
    }
}

#[test]
fn neighbors_share_edges_at_boundaries() {
    let boundary_points = [
        Point::new(0.0, 0.0),
        Point::new(-0.000001, -0.000001),
        Point::new(0.000001, 179.999999),
        Point::new(-0.000001, -179.999999),
        Point::new(45.0, 180.0),
        Point::new(89.99, 10.0),
        Point::new(-89.99, -10.0),
        Point::new(37.7749, -122.4194),
    ];
    for point in boundary_points {
        for precision in 1..=12 {
            assert_neighbors_adjacent(&geohash::encode(&point, precision));
        }
    }
}

#[test]
fn neighbors_share_edges_for_random_hashes() {
    let mut rng = seeded_rng(42);
    for _ in 0..500 {
        let point = random_point(&mut rng);
        let precision = rng.gen_range(1..=12);
        assert_neighbors_adjacent(&geohash::encode(&point, precision));
    }
}

#[test]
fn polar_hashes_still_have_eight_neighbors() {
    for hash in ["z", "b", "zz", "00", "upbp", "pbpbpb"] {
        assert_neighbors_adjacent(hash);
    }
}

#[test]
fn decoded_center_stays_in_encoded_cell() {
    let mut rng = seeded_rng(7);
    for _ in 0..500 {
        let point = random_point(&mut rng);
        let precision = rng.gen_range(1..=12);
        let hash = geohash::encode(&point, precision);
        let bounds = geohash::decode_bounds(&hash).expect("bounds");
        assert!(bounds.contains(&point));
        assert!(bounds.contains(&geohash::decode(&hash).expect("center")));
        // Prefixes nest: a shorter hash's box contains the longer one.
        if precision > 1 {
            let parent = geohash::decode_bounds(&hash[..precision - 1]).expect("parent");
            assert!(parent.min_lat <= bounds.min_lat && parent.max_lat >= bounds.max_lat);
            assert!(parent.min_lng <= bounds.min_lng && parent.max_lng >= bounds.max_lng);
        }
    }
}
