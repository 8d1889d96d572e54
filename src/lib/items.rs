use super::geo::{BoundingBox, Coordinate, RegionGeometry};
use super::normalize::normalize;
use smartstring::alias::String;

/// A named access boundary, e.g. an Indian state.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Normalized name, the key user access lists resolve against.
    pub id: String,
    pub name: String,
    pub geometry: RegionGeometry,
    pub bounds: Option<BoundingBox>,
}

impl Region {
    pub fn new(name: &str, geometry: RegionGeometry) -> Self {
        let bounds = geometry.bounds();
        Region {
            id: normalize(name).into(),
            name: name.into(),
            geometry,
            bounds,
        }
    }

    pub fn rectangle(name: &str, bounds: BoundingBox) -> Self {
        Region::new(name, RegionGeometry::Rectangle(bounds))
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        match self.bounds {
            Some(bounds) if bounds.contains(coord) => self.geometry.contains(coord),
            _ => false,
        }
    }

    pub fn centroid(&self) -> Option<Coordinate> {
        self.geometry.centroid()
    }

    /// Fold another geometry with the same name into this region.
    pub fn merge(&mut self, geometry: RegionGeometry) {
        let mut polygons = self.geometry.polygons();
        polygons.extend(geometry.polygons());
        self.geometry = RegionGeometry::MultiPolygon(polygons);
        self.bounds = self.geometry.bounds();
    }
}

#[cfg(test)]
mod region {
    use super::*;
    use crate::geo::{Polygon, Ring};
    use approx::*;

    fn square(lat: f64, lng: f64, size: f64) -> RegionGeometry {
        let vertices = vec![
            Coordinate::new(lat, lng),
            Coordinate::new(lat, lng + size),
            Coordinate::new(lat + size, lng + size),
            Coordinate::new(lat + size, lng),
        ];
        RegionGeometry::Polygon(Polygon::new(Ring::new(vertices), vec![]))
    }

    #[test]
    fn id_is_normalized() {
        let region = Region::new("Tamilnadu", square(10., 77., 2.));
        assert_eq!(region.id.as_str(), "Tamil Nadu");
        assert_eq!(region.name.as_str(), "Tamilnadu");
    }

    #[test]
    fn bounds_follow_geometry() {
        let region = Region::new("TestState", square(10., 70., 10.));
        assert_eq!(region.bounds, Some(BoundingBox::new(10., 20., 70., 80.)));
    }

    #[test]
    fn empty_geometry_contains_nothing() {
        let region = Region::new("Nowhere", RegionGeometry::MultiPolygon(vec![]));
        assert_eq!(region.bounds, None);
        assert!(!region.contains(Coordinate::new(0., 0.)));
    }

    #[test]
    fn merge_builds_multi_polygon() {
        let mut region = Region::new("Islands", square(10., 92., 1.));
        region.merge(square(13., 93., 1.));
        assert_eq!(region.geometry.kind(), "MultiPolygon");
        assert_eq!(region.geometry.part_count(), 2);
        assert!(region.contains(Coordinate::new(10.5, 92.5)));
        assert!(region.contains(Coordinate::new(13.5, 93.5)));
        assert!(!region.contains(Coordinate::new(12., 93.)));
        assert_eq!(region.bounds, Some(BoundingBox::new(10., 14., 92., 94.)));
    }

    #[test]
    fn merged_rectangle_keeps_its_edges() {
        let mut region = Region::rectangle("Zone", BoundingBox::new(10., 20., 70., 80.));
        assert!(region.contains(Coordinate::new(10., 70.)));
        region.merge(square(30., 70., 1.));
        assert_eq!(region.geometry.kind(), "MultiPolygon");
        assert!(region.contains(Coordinate::new(10., 70.)));
        assert!(region.contains(Coordinate::new(20., 75.)));
        assert!(region.contains(Coordinate::new(31., 71.)));
        assert!(!region.contains(Coordinate::new(9.9, 70.)));
    }

    #[test]
    fn centroid_of_square() {
        let region = Region::new("TestState", square(10., 70., 10.));
        let centroid = region.centroid().unwrap();
        assert!(region.contains(centroid));
        assert_relative_eq!(centroid.lat, 15., epsilon = 1e-9);
    }
}
