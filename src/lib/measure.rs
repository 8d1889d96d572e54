use super::geo::Coordinate;
use geo::prelude::*;
use geo_types::Point;
use itertools::Itertools;

fn point(coord: Coordinate) -> Point<f64> {
    Point::new(coord.lng, coord.lat)
}

/// Great-circle length of a path in metres.
pub fn path_length(path: &[Coordinate]) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| point(*a).haversine_distance(&point(*b)))
        .sum()
}
