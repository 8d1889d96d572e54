use super::geo::{BoundingBox, Coordinate};
use super::items::Region;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Geographic center of India, the fallback view.
pub const INDIA_CENTER: Coordinate = Coordinate {
    lat: 20.5937,
    lng: 78.9629,
};
pub const INDIA_ZOOM: u8 = 5;

/// (minimum span in degrees, zoom), widest first.
const ZOOM_BREAKPOINTS: &[(f64, u8)] = &[(20., 4), (10., 5), (5., 6), (2., 7), (1., 8), (0.5, 9)];
const MAX_ZOOM: u8 = 10;

/// Smallest box covering every vertex of every region, or `None` for no
/// regions or no vertices.
pub fn compute_bounds(regions: &[Region]) -> Option<BoundingBox> {
    regions
        .iter()
        .filter_map(|region| region.bounds)
        .fold1(|a, b| a.union(&b))
}

/// Map zoom level for a box; larger spans get lower (wider) zoom.
pub fn zoom_for(bounds: &BoundingBox) -> u8 {
    let span = bounds.longer_span();
    ZOOM_BREAKPOINTS
        .iter()
        .find(|(min_span, _)| span > *min_span)
        .map_or(MAX_ZOOM, |(_, zoom)| *zoom)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
    pub bounds: Option<BoundingBox>,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            center: INDIA_CENTER,
            zoom: INDIA_ZOOM,
            bounds: None,
        }
    }
}

pub fn fit_viewport(regions: &[Region]) -> Viewport {
    match compute_bounds(regions) {
        Some(bounds) => Viewport {
            center: bounds.center(),
            zoom: zoom_for(&bounds),
            bounds: Some(bounds),
        },
        None => Viewport::default(),
    }
}
