use super::access::UserAccess;
use super::geo::Coordinate;
use super::items::Region;
use super::normalize::normalize;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashSet;
use tracing::warn;

/// Envelope of one polygon of one region.
struct PartEnvelope {
    region: usize,
    part: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for PartEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope.clone()
    }
}

/// The regions of one boundary source, indexed by polygon envelope.
///
/// Immutable once built; share it behind an `Arc` and query from any thread.
pub struct RegionSet {
    regions: Vec<Region>,
    tree: RTree<PartEnvelope>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        let parts = regions
            .iter()
            .enumerate()
            .flat_map(|(region_idx, region)| {
                let geometry = &region.geometry;
                (0..geometry.part_count()).filter_map(move |part| {
                    let (sw, ne) = geometry.part_bounds(part)?.sw_ne();
                    Some(PartEnvelope {
                        region: region_idx,
                        part,
                        envelope: AABB::from_corners(sw, ne),
                    })
                })
            })
            .collect();
        let tree = RTree::bulk_load(parts);
        RegionSet { regions, tree }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        let id = normalize(name);
        self.regions.iter().find(|region| region.id.as_str() == id)
    }

    fn granted_indices(&self, access: &UserAccess) -> HashSet<usize> {
        let ids: HashSet<String> = access.region_ids.iter().map(|id| normalize(id)).collect();
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, region)| ids.contains(region.id.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Regions the access grants. Bypass users get every region. Ids
    /// matching no region are reported and grant nothing.
    pub fn resolve(&self, access: &UserAccess) -> Vec<&Region> {
        if access.grants_everything() {
            return self.regions.iter().collect();
        }
        for id in access.region_ids.iter() {
            if self.get(id).is_none() {
                warn!(region = id.as_str(), "region id matches no loaded boundary");
            }
        }
        let granted = self.granted_indices(access);
        self.regions
            .iter()
            .enumerate()
            .filter(|(idx, _)| granted.contains(idx))
            .map(|(_, region)| region)
            .collect()
    }

    /// Regions containing the coordinate, regardless of access.
    pub fn regions_at(&self, coord: Coordinate) -> Vec<&Region> {
        let mut found: Vec<usize> = self
            .candidates(coord)
            .filter(|entry| self.part_contains(entry, coord))
            .map(|entry| entry.region)
            .collect();
        found.sort_unstable();
        found.dedup();
        found.into_iter().map(|idx| &self.regions[idx]).collect()
    }

    fn candidates(&self, coord: Coordinate) -> impl Iterator<Item = &PartEnvelope> {
        let point: [f64; 2] = coord.into();
        self.tree.locate_in_envelope_intersecting(&AABB::from_point(point))
    }

    fn part_contains(&self, entry: &PartEnvelope, coord: Coordinate) -> bool {
        self.regions[entry.region]
            .geometry
            .part_contains(entry.part, coord)
    }

    /// Same answer as `access::is_accessible` over `regions()`, but only
    /// ray-casts polygons whose envelope holds the point.
    pub fn is_accessible(&self, coord: Coordinate, access: &UserAccess) -> bool {
        if access.grants_everything() {
            return true;
        }
        let granted = self.granted_indices(access);
        if granted.is_empty() {
            return false;
        }
        self.candidates(coord)
            .filter(|entry| granted.contains(&entry.region))
            .any(|entry| self.part_contains(entry, coord))
    }

    pub fn check_many(&self, coords: &[Coordinate], access: &UserAccess) -> Vec<bool> {
        if access.grants_everything() {
            return vec![true; coords.len()];
        }
        let granted = self.granted_indices(access);
        coords
            .par_iter()
            .map(|&coord| {
                self.candidates(coord)
                    .filter(|entry| granted.contains(&entry.region))
                    .any(|entry| self.part_contains(entry, coord))
            })
            .collect()
    }
}

#[cfg(test)]
mod region_set {
    use super::*;
    use crate::access::is_accessible;
    use crate::geo::{BoundingBox, Polygon, RegionGeometry, Ring};

    fn rectangle_polygon(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Polygon {
        let vertices = vec![
            Coordinate::new(min_lat, min_lng),
            Coordinate::new(min_lat, max_lng),
            Coordinate::new(max_lat, max_lng),
            Coordinate::new(max_lat, min_lng),
        ];
        Polygon::new(Ring::new(vertices), vec![])
    }

    fn create_set() -> RegionSet {
        let test_state = Region::new(
            "TestState",
            RegionGeometry::Polygon(rectangle_polygon(10., 20., 70., 80.)),
        );
        let islands = Region::new(
            "Islands",
            RegionGeometry::MultiPolygon(vec![
                rectangle_polygon(10., 12., 90., 92.),
                rectangle_polygon(14., 16., 90., 92.),
            ]),
        );
        let zone = Region::rectangle("Zone", BoundingBox::new(18., 25., 78., 85.));
        RegionSet::new(vec![test_state, islands, zone])
    }

    #[test]
    fn indexes_every_part() {
        let set = create_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.tree.size(), 4);
    }

    #[test]
    fn lookup_by_any_spelling() {
        let set = create_set();
        assert!(set.get("test state").is_some());
        assert!(set.get("Test   State").is_some());
        assert!(set.get("Atlantis").is_none());
    }

    #[test]
    fn test_state_scenario() {
        let set = create_set();
        let access = UserAccess::regions(vec!["TestState"]);
        assert!(set.is_accessible(Coordinate::new(15., 75.), &access));
        assert!(!set.is_accessible(Coordinate::new(5., 75.), &access));
    }

    #[test]
    fn multi_polygon_union() {
        let set = create_set();
        let access = UserAccess::regions(vec!["Islands"]);
        assert!(set.is_accessible(Coordinate::new(11., 91.), &access));
        assert!(set.is_accessible(Coordinate::new(15., 91.), &access));
        assert!(!set.is_accessible(Coordinate::new(13., 91.), &access));
    }

    #[test]
    fn overlapping_regions() {
        let set = create_set();
        let names: Vec<&str> = set
            .regions_at(Coordinate::new(19., 79.))
            .iter()
            .map(|region| region.name.as_str())
            .collect();
        assert_eq!(names, vec!["TestState", "Zone"]);

        let access = UserAccess::regions(vec!["Zone"]);
        assert!(set.is_accessible(Coordinate::new(19., 79.), &access));
        assert!(!set.is_accessible(Coordinate::new(15., 75.), &access));
    }

    #[test]
    fn matches_linear_scan() {
        let set = create_set();
        let accesses = vec![
            UserAccess::default(),
            UserAccess::admin(),
            UserAccess::regions(vec!["TestState"]),
            UserAccess::regions(vec!["Islands", "Zone"]),
            UserAccess::regions(vec!["Atlantis"]),
        ];
        let coords: Vec<Coordinate> = (0..30)
            .flat_map(|lat| (65..95).map(move |lng| Coordinate::new(lat as f64 + 0.5, lng as f64 + 0.5)))
            .collect();
        for access in accesses.iter() {
            let batch = set.check_many(&coords, access);
            for (coord, indexed) in coords.iter().zip(batch) {
                let scanned = is_accessible(*coord, access, set.regions());
                assert_eq!(indexed, scanned, "{:?}", coord);
                assert_eq!(set.is_accessible(*coord, access), scanned, "{:?}", coord);
            }
        }
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let set = create_set();
        let access = UserAccess::regions(vec!["Atlantis", "zone"]);
        let resolved = set.resolve(&access);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name.as_str(), "Zone");
        assert_eq!(set.resolve(&UserAccess::all_country()).len(), 3);
    }
}
