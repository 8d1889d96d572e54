use super::geo::{BoundingBox, RegionGeometry};
use super::geojson::{Entity, Geometry, PolygonCoordinates};
use super::index::RegionSet;
use serde::{Deserialize, Serialize};
use serde_json::to_string;
use std::error::Error;
use std::io::Write;

pub trait Output {
    fn write_geojson(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>>;
    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>>;
}

#[derive(Serialize, Deserialize)]
struct JSONRegion {
    id: String,
    name: String,
    kind: String,
    bbox: Option<BoundingBox>,
}

fn to_geometry(geometry: &RegionGeometry) -> Geometry {
    match geometry {
        RegionGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon {
            coordinates: polygons.iter().map(PolygonCoordinates::from).collect(),
        },
        _ => {
            let polygons = geometry.polygons();
            Geometry::Polygon {
                coordinates: polygons.first().map(PolygonCoordinates::from).unwrap_or_default(),
            }
        }
    }
}

impl Output for RegionSet {
    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        for region in self.regions() {
            let json_region = JSONRegion {
                id: region.id.to_string(),
                name: region.name.to_string(),
                kind: region.geometry.kind().to_string(),
                bbox: region.bounds,
            };
            let json = to_string(&json_region)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    fn write_geojson(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        let features = self
            .regions()
            .iter()
            .map(|region| {
                let properties = vec![
                    (String::from("st_nm"), region.name.to_string()),
                    (String::from("id"), region.id.to_string()),
                ]
                .into_iter()
                .collect();
                Entity::Feature {
                    geometry: to_geometry(&region.geometry),
                    properties,
                }
            })
            .collect();
        let feature_collection = Entity::FeatureCollection { features };
        let string = to_string(&feature_collection)?;
        writeln!(writer, "{}", string)?;
        Ok(())
    }
}

#[cfg(test)]
mod output {
    use super::*;
    use crate::geo::{Coordinate, Polygon, Ring};
    use crate::items::Region;
    use crate::loader::parse_boundaries;
    use crate::LoaderConfig;

    fn create_set() -> RegionSet {
        let ring = Ring::new(vec![
            Coordinate::new(10., 70.),
            Coordinate::new(10., 80.),
            Coordinate::new(20., 80.),
            Coordinate::new(20., 70.),
        ]);
        let state = Region::new("TestState", RegionGeometry::Polygon(Polygon::new(ring, vec![])));
        let zone = Region::rectangle("Zone", BoundingBox::new(1., 2., 3., 4.));
        RegionSet::new(vec![state, zone])
    }

    #[test]
    fn json_lines() {
        let mut out = Vec::new();
        create_set().write_json_lines(&mut out).unwrap();
        let string = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = string.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""name":"TestState""#));
        assert!(lines[0].contains(r#""minLat":10.0"#));
        assert!(lines[1].contains(r#""kind":"Rectangle""#));
    }

    #[test]
    fn geojson_reloads() {
        let mut out = Vec::new();
        create_set().write_geojson(&mut out).unwrap();
        let string = String::from_utf8(out).unwrap();
        assert!(string.contains("[70.0,10.0]"));

        let regions = parse_boundaries(&string, &LoaderConfig::default()).unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions[0].contains(Coordinate::new(15., 75.)));
        assert!(regions[1].contains(Coordinate::new(1.5, 3.5)));
    }
}
