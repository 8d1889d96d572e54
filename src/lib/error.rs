use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryLoadError {
    #[error("could not read boundary file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("boundary request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    #[error("boundary request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("malformed boundary GeoJSON: {0}")]
    Malformed(#[from] geojson::Error),
    #[error("boundary GeoJSON must be a FeatureCollection")]
    NotFeatureCollection,
    #[error("boundary FeatureCollection has no features")]
    NoFeatures,
    #[error("no feature carries a name and a Polygon or MultiPolygon geometry")]
    NoUsableFeatures,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("user store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
