use super::bounds::{fit_viewport, Viewport};
use super::geo::Coordinate;
use super::items::Region;
use super::loader::BoundaryCache;
use super::normalize::{is_country_wide, normalize};
use super::store::{Role, UserRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// What a signed-in user may touch. Built once per session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAccess {
    pub is_admin: bool,
    pub is_all_country: bool,
    pub region_ids: BTreeSet<String>,
}

impl UserAccess {
    pub fn admin() -> Self {
        UserAccess {
            is_admin: true,
            ..Default::default()
        }
    }

    pub fn all_country() -> Self {
        UserAccess {
            is_all_country: true,
            ..Default::default()
        }
    }

    pub fn regions<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        UserAccess {
            region_ids: ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn grants_everything(&self) -> bool {
        self.is_admin || self.is_all_country
    }
}

impl From<&UserRecord> for UserAccess {
    fn from(record: &UserRecord) -> Self {
        let is_all_country = record.all_country
            || record
                .assigned_regions
                .iter()
                .any(|region| is_country_wide(region));
        let region_ids = record
            .assigned_regions
            .iter()
            .filter(|region| !is_country_wide(region))
            .cloned()
            .collect();
        UserAccess {
            is_admin: record.role == Role::Admin,
            is_all_country,
            region_ids,
        }
    }
}

/// Whether `access` permits an action at `coord`.
///
/// Admins and all-country users pass unconditionally. Everyone else needs
/// the point inside at least one polygon of at least one granted region.
/// An empty region list or empty geometry never grants anything.
///
/// ```
/// use region_access::{is_accessible, Coordinate, Region, UserAccess};
/// use region_access::geo::BoundingBox;
///
/// let regions = vec![Region::rectangle("TestState", BoundingBox::new(10., 20., 70., 80.))];
/// let access = UserAccess::regions(vec!["TestState"]);
/// assert!(is_accessible(Coordinate::new(15., 75.), &access, &regions));
/// assert!(!is_accessible(Coordinate::new(5., 75.), &access, &regions));
/// ```
pub fn is_accessible(coord: Coordinate, access: &UserAccess, regions: &[Region]) -> bool {
    if access.grants_everything() {
        return true;
    }
    let ids: HashSet<String> = access.region_ids.iter().map(|id| normalize(id)).collect();
    regions
        .iter()
        .filter(|region| ids.contains(region.id.as_str()))
        .any(|region| region.contains(coord))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied,
    /// Boundaries are not loaded yet, so access cannot be verified.
    Pending,
}

impl Decision {
    pub fn allows(self) -> bool {
        self == Decision::Granted
    }
}

/// Checks map interactions of one session against its boundary cache.
///
/// Fails closed: until boundaries are published every restricted user
/// gets `Decision::Pending`, which does not allow the action.
pub struct AccessGate {
    cache: Arc<BoundaryCache>,
    access: UserAccess,
}

impl AccessGate {
    pub fn new(cache: Arc<BoundaryCache>, access: UserAccess) -> Self {
        AccessGate { cache, access }
    }

    pub fn access(&self) -> &UserAccess {
        &self.access
    }

    pub fn decide(&self, coord: Coordinate) -> Decision {
        if self.access.grants_everything() {
            return Decision::Granted;
        }
        let decision = match self.cache.loaded() {
            None => Decision::Pending,
            Some(set) if set.is_accessible(coord, &self.access) => Decision::Granted,
            Some(_) => Decision::Denied,
        };
        debug!(lat = coord.lat, lng = coord.lng, ?decision, "access decision");
        decision
    }

    pub fn allows(&self, coord: Coordinate) -> bool {
        self.decide(coord).allows()
    }

    /// Decisions for many coordinates, checked in parallel.
    pub fn decide_many(&self, coords: &[Coordinate]) -> Vec<Decision> {
        if self.access.grants_everything() {
            return vec![Decision::Granted; coords.len()];
        }
        match self.cache.loaded() {
            None => vec![Decision::Pending; coords.len()],
            Some(set) => set
                .check_many(coords, &self.access)
                .into_iter()
                .map(|accessible| {
                    if accessible {
                        Decision::Granted
                    } else {
                        Decision::Denied
                    }
                })
                .collect(),
        }
    }

    /// First vertex of a drawing (distance points, polygon vertices)
    /// that may not be placed, with its decision.
    pub fn validate_path(&self, coords: &[Coordinate]) -> Option<(usize, Decision)> {
        coords
            .iter()
            .map(|&coord| self.decide(coord))
            .enumerate()
            .find(|(_, decision)| !decision.allows())
    }

    /// Viewport framing the granted regions, or the country default when
    /// nothing narrower applies or boundaries are not loaded.
    pub fn viewport(&self) -> Viewport {
        match self.cache.loaded() {
            Some(set) if !self.access.grants_everything() => {
                let regions: Vec<Region> = set.resolve(&self.access).into_iter().cloned().collect();
                fit_viewport(&regions)
            }
            _ => Viewport::default(),
        }
    }
}


#[cfg(test)]
mod user_access {
    use super::*;

    fn record(role: Role, regions: &[&str]) -> UserRecord {
        UserRecord {
            username: "asha".into(),
            role,
            assigned_regions: regions.iter().map(|r| r.to_string()).collect(),
            all_country: false,
        }
    }

    #[test]
    fn admin_role() {
        let access = UserAccess::from(&record(Role::Admin, &[]));
        assert!(access.is_admin);
        assert!(access.grants_everything());
    }

    #[test]
    fn country_wide_assignment() {
        let access = UserAccess::from(&record(Role::User, &["all-india", "Kerala"]));
        assert!(!access.is_admin);
        assert!(access.is_all_country);
        assert_eq!(access.region_ids.len(), 1);
    }

    #[test]
    fn restricted_user() {
        let access = UserAccess::from(&record(Role::User, &["Kerala", "Goa"]));
        assert!(!access.grants_everything());
        assert!(access.region_ids.contains("Goa"));
    }
}
