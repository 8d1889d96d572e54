use geo::prelude::*;
use geo_types::{LineString, MultiPolygon as GeoMultiPolygon, Point, Polygon as GeoPolygon};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }
}

/// GeoJSON and rstar points are `[lng, lat]`.
impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lng, coord.lat]
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coord: Coordinate) -> Self {
        (coord.lng, coord.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Coordinate {
            lat: point.lat(),
            lng: point.lng(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    fn around(coord: Coordinate) -> Self {
        BoundingBox::new(coord.lat, coord.lat, coord.lng, coord.lng)
    }

    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let first = BoundingBox::around(*coords.next()?);
        Some(coords.fold(first, |mut bbox, coord| {
            bbox.extend(*coord);
            bbox
        }))
    }

    pub fn extend(&mut self, coord: Coordinate) {
        self.min_lat = self.min_lat.min(coord.lat);
        self.max_lat = self.max_lat.max(coord.lat);
        self.min_lng = self.min_lng.min(coord.lng);
        self.max_lng = self.max_lng.max(coord.lng);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
            && coord.lng >= self.min_lng
            && coord.lng <= self.max_lng
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.min_lat + self.max_lat) / 2.,
            lng: (self.min_lng + self.max_lng) / 2.,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn longer_span(&self) -> f64 {
        self.lat_span().max(self.lng_span())
    }

    /// Corners in `[lng, lat]` order, south-west first.
    pub fn sw_ne(&self) -> ([f64; 2], [f64; 2]) {
        ([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }

    fn corners(&self) -> Vec<Coordinate> {
        vec![
            Coordinate::new(self.min_lat, self.min_lng),
            Coordinate::new(self.min_lat, self.max_lng),
            Coordinate::new(self.max_lat, self.max_lng),
            Coordinate::new(self.max_lat, self.min_lng),
            Coordinate::new(self.min_lat, self.min_lng),
        ]
    }
}

const EDGE_EPSILON: f64 = 1e-12;

/// A closed ring of vertices, first == last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    pub fn new(mut vertices: Vec<Coordinate>) -> Self {
        if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            if first != last {
                let first = *first;
                vertices.push(first);
            }
        }
        Ring(vertices)
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.0
    }

    /// A triangle needs four vertices once closed.
    pub fn is_degenerate(&self) -> bool {
        self.0.len() < 4
    }

    /// Crossing-number test with a ray cast towards +infinity longitude.
    /// Points exactly on an edge may land on either side.
    pub fn contains(&self, coord: Coordinate) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let crossings = self
            .0
            .iter()
            .tuple_windows()
            .filter(|(a, b)| {
                if (a.lat > coord.lat) == (b.lat > coord.lat) {
                    return false;
                }
                let intersect_lng = (b.lng - a.lng) * (coord.lat - a.lat) / (b.lat - a.lat) + a.lng;
                coord.lng < intersect_lng
            })
            .count();
        crossings % 2 == 1
    }

    /// The point lies on one of the ring's edges.
    pub fn on_boundary(&self, coord: Coordinate) -> bool {
        self.0.iter().tuple_windows().any(|(a, b)| {
            let cross = (b.lng - a.lng) * (coord.lat - a.lat) - (b.lat - a.lat) * (coord.lng - a.lng);
            cross.abs() <= EDGE_EPSILON
                && coord.lat >= a.lat.min(b.lat)
                && coord.lat <= a.lat.max(b.lat)
                && coord.lng >= a.lng.min(b.lng)
                && coord.lng <= a.lng.max(b.lng)
        })
    }

    fn to_line_string(&self) -> LineString<f64> {
        self.0
            .iter()
            .map(|&coord| <(f64, f64)>::from(coord))
            .collect::<Vec<_>>()
            .into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Polygon { exterior, holes }
    }

    /// Closed containment: points on the outline count as inside, like
    /// `BoundingBox::contains`, so a rectangle keeps its edges once it is
    /// stored as a polygon.
    pub fn contains(&self, coord: Coordinate) -> bool {
        if self.exterior.is_degenerate() {
            return false;
        }
        let in_exterior = self.exterior.contains(coord) || self.exterior.on_boundary(coord);
        in_exterior
            && !self
                .holes
                .iter()
                .any(|hole| hole.contains(coord) && !hole.on_boundary(coord))
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_coordinates(self.exterior.vertices())
    }

    fn to_geo(&self) -> GeoPolygon<f64> {
        let holes = self.holes.iter().map(Ring::to_line_string).collect();
        GeoPolygon::new(self.exterior.to_line_string(), holes)
    }
}

/// Region shapes, normalized once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Rectangle(BoundingBox),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl RegionGeometry {
    pub fn kind(&self) -> &'static str {
        match self {
            RegionGeometry::Rectangle(_) => "Rectangle",
            RegionGeometry::Polygon(_) => "Polygon",
            RegionGeometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// The polygons making up this geometry. A rectangle yields its outline.
    pub fn polygons(&self) -> Vec<Polygon> {
        match self {
            RegionGeometry::Rectangle(bbox) => {
                vec![Polygon::new(Ring::new(bbox.corners()), vec![])]
            }
            RegionGeometry::Polygon(polygon) => vec![polygon.clone()],
            RegionGeometry::MultiPolygon(polygons) => polygons.clone(),
        }
    }

    /// Number of parts tested independently; see `part_contains`.
    pub fn part_count(&self) -> usize {
        match self {
            RegionGeometry::Rectangle(_) | RegionGeometry::Polygon(_) => 1,
            RegionGeometry::MultiPolygon(polygons) => polygons.len(),
        }
    }

    pub fn part_bounds(&self, part: usize) -> Option<BoundingBox> {
        match self {
            RegionGeometry::Rectangle(bbox) if part == 0 => Some(*bbox),
            RegionGeometry::Polygon(polygon) if part == 0 => polygon.bounds(),
            RegionGeometry::MultiPolygon(polygons) => polygons.get(part)?.bounds(),
            _ => None,
        }
    }

    pub fn part_contains(&self, part: usize, coord: Coordinate) -> bool {
        match self {
            RegionGeometry::Rectangle(bbox) => part == 0 && bbox.contains(coord),
            RegionGeometry::Polygon(polygon) => part == 0 && polygon.contains(coord),
            RegionGeometry::MultiPolygon(polygons) => polygons
                .get(part)
                .map_or(false, |polygon| polygon.contains(coord)),
        }
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        (0..self.part_count()).any(|part| self.part_contains(part, coord))
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        (0..self.part_count())
            .filter_map(|part| self.part_bounds(part))
            .fold1(|a, b| a.union(&b))
    }

    pub fn centroid(&self) -> Option<Coordinate> {
        let point = match self {
            RegionGeometry::Rectangle(bbox) => return Some(bbox.center()),
            RegionGeometry::Polygon(polygon) => polygon.to_geo().centroid(),
            RegionGeometry::MultiPolygon(polygons) => {
                let multi_polygon: GeoMultiPolygon<f64> =
                    polygons.iter().map(Polygon::to_geo).collect::<Vec<_>>().into();
                multi_polygon.centroid()
            }
        }?;
        Some(point.into())
    }
}
