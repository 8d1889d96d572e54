use super::geo::{Polygon, Ring};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PolygonCoordinates = Vec<Vec<(f64, f64)>>;

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: PolygonCoordinates,
    },
    MultiPolygon {
        coordinates: Vec<PolygonCoordinates>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    Feature {
        properties: HashMap<String, String>,
        geometry: Geometry,
    },
    FeatureCollection {
        features: Vec<Entity>,
    },
}

fn ring_coordinates(ring: &Ring) -> Vec<(f64, f64)> {
    ring.vertices().iter().map(|&coord| coord.into()).collect()
}

/// Rings back in GeoJSON `[lng, lat]` order, exterior first.
impl From<&Polygon> for PolygonCoordinates {
    fn from(polygon: &Polygon) -> Self {
        std::iter::once(&polygon.exterior)
            .chain(polygon.holes.iter())
            .map(ring_coordinates)
            .collect()
    }
}
