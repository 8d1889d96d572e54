//! Region-restricted access checks for map interactions.
//!
//! Boundaries come from a GeoJSON FeatureCollection of state polygons.
//! A user's assigned region names are normalized against the boundary
//! names, and every coordinate a map tool wants to commit (a marker, a
//! polygon vertex, a distance point) is tested with ray casting against
//! the granted regions.

pub use self::access::{is_accessible, AccessGate, Decision, UserAccess};
pub use self::bounds::{compute_bounds, fit_viewport, zoom_for, Viewport};
pub use self::config::LoaderConfig;
pub use self::error::{BoundaryLoadError, ConfigError, StoreError};
pub use self::geo::{BoundingBox, Coordinate};
pub use self::index::RegionSet;
pub use self::items::Region;
pub use self::loader::{load_boundaries, BoundaryCache, BoundarySource};
pub use self::normalize::normalize;

pub mod access;
pub mod bounds;
pub mod config;
mod error;
pub mod geo;
mod geojson;
mod index;
mod items;
pub mod loader;
pub mod measure;
pub mod normalize;
pub mod output;
pub mod store;
