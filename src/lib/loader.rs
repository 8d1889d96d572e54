use super::config::LoaderConfig;
use super::error::BoundaryLoadError;
use super::geo::{Coordinate, Polygon, RegionGeometry, Ring};
use super::index::RegionSet;
use super::items::Region;
use super::normalize::normalize;
use geojson::{Feature, GeoJson, Value};
use std::convert::Infallible;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BoundarySource {
    File(PathBuf),
    Url(String),
    /// GeoJSON text already in memory.
    Inline(String),
}

impl FromStr for BoundarySource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(BoundarySource::Url(s.into()))
        } else {
            Ok(BoundarySource::File(s.into()))
        }
    }
}

fn http_error(url: &str, timeout: Duration, source: reqwest::Error) -> BoundaryLoadError {
    if source.is_timeout() {
        BoundaryLoadError::Timeout {
            url: url.into(),
            secs: timeout.as_secs(),
        }
    } else {
        BoundaryLoadError::Http {
            url: url.into(),
            source,
        }
    }
}

fn fetch(url: &str, timeout: Duration) -> Result<String, BoundaryLoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| http_error(url, timeout, e))?;
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|e| http_error(url, timeout, e))
}

fn read_source(source: &BoundarySource, config: &LoaderConfig) -> Result<String, BoundaryLoadError> {
    match source {
        BoundarySource::File(path) => {
            fs::read_to_string(path).map_err(|source| BoundaryLoadError::Io {
                path: path.clone(),
                source,
            })
        }
        BoundarySource::Url(url) => fetch(url, config.timeout()),
        BoundarySource::Inline(text) => Ok(text.clone()),
    }
}

fn feature_name(feature: &Feature, keys: &[String]) -> Option<String> {
    let properties = feature.properties.as_ref()?;
    keys.iter()
        .filter_map(|key| properties.get(key)?.as_str())
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(String::from)
}

/// GeoJSON positions are `[lng, lat, ...]`.
fn ring(positions: &[Vec<f64>]) -> Option<Ring> {
    let vertices = positions
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] => Some(Coordinate::new(*lat, *lng)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Ring::new(vertices))
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    let holes = holes.iter().map(|h| ring(h)).collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(ring(exterior)?, holes))
}

fn geometry(value: &Value) -> Option<RegionGeometry> {
    match value {
        Value::Polygon(rings) => polygon(rings).map(RegionGeometry::Polygon),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| polygon(rings))
            .collect::<Option<Vec<_>>>()
            .map(RegionGeometry::MultiPolygon),
        _ => None,
    }
}

/// Parse a GeoJSON FeatureCollection into regions.
///
/// Features sharing a normalized name are merged into one MultiPolygon
/// region. Features without a name or without a (Multi)Polygon geometry
/// are skipped.
pub fn parse_boundaries(text: &str, config: &LoaderConfig) -> Result<Vec<Region>, BoundaryLoadError> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        _ => return Err(BoundaryLoadError::NotFeatureCollection),
    };
    if collection.features.is_empty() {
        return Err(BoundaryLoadError::NoFeatures);
    }

    let mut regions: Vec<Region> = vec![];
    for (idx, feature) in collection.features.iter().enumerate() {
        let name = match feature_name(feature, &config.name_properties) {
            Some(name) => name,
            None => {
                warn!(feature = idx, "skipping feature without a name property");
                continue;
            }
        };
        let geometry = match feature.geometry.as_ref().and_then(|g| geometry(&g.value)) {
            Some(geometry) => geometry,
            None => {
                warn!(feature = idx, name = name.as_str(), "skipping feature without a polygon geometry");
                continue;
            }
        };
        let id = normalize(&name);
        match regions.iter_mut().find(|region| region.id.as_str() == id) {
            Some(region) => {
                debug!(name = name.as_str(), "merging feature into existing region");
                region.merge(geometry);
            }
            None => regions.push(Region::new(&name, geometry)),
        }
    }

    if regions.is_empty() {
        return Err(BoundaryLoadError::NoUsableFeatures);
    }
    Ok(regions)
}

pub fn load_boundaries(
    source: &BoundarySource,
    config: &LoaderConfig,
) -> Result<RegionSet, BoundaryLoadError> {
    let text = read_source(source, config)?;
    let regions = parse_boundaries(&text, config)?;
    info!(regions = regions.len(), "loaded boundaries");
    Ok(RegionSet::new(regions))
}

/// Loads one boundary source at most once per session.
///
/// Nothing is published until a load completes, so a failed or abandoned
/// load leaves the cache empty and a later `load` retries.
pub struct BoundaryCache {
    source: BoundarySource,
    config: LoaderConfig,
    published: RwLock<Option<Arc<RegionSet>>>,
    loading: Mutex<()>,
}

impl BoundaryCache {
    pub fn new(source: BoundarySource, config: LoaderConfig) -> Self {
        BoundaryCache {
            source,
            config,
            published: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &BoundarySource {
        &self.source
    }

    pub fn loaded(&self) -> Option<Arc<RegionSet>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn load(&self) -> Result<Arc<RegionSet>, BoundaryLoadError> {
        if let Some(set) = self.loaded() {
            return Ok(set);
        }
        let _guard = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = self.loaded() {
            return Ok(set);
        }
        let set = Arc::new(load_boundaries(&self.source, &self.config)?);
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&set));
        Ok(set)
    }
}



#[cfg(test)]
mod fetch {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 512];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
    }

    /// Serve one connection with `respond`, returning the URL to fetch.
    fn serve_once<F>(respond: F) -> String
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                respond(stream);
            }
        });
        format!("http://{}/india.json", addr)
    }

    fn config(timeout_secs: u64) -> LoaderConfig {
        LoaderConfig {
            timeout_secs,
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn silent_server_times_out() {
        let url = serve_once(|mut stream| {
            read_request(&mut stream);
            thread::sleep(Duration::from_secs(5));
        });
        let result = load_boundaries(&BoundarySource::Url(url.clone()), &config(1));
        match result {
            Err(BoundaryLoadError::Timeout { url: failed, secs }) => {
                assert_eq!(failed, url);
                assert_eq!(secs, 1);
            }
            other => panic!("expected a timeout, got {:?}", other.map(|set| set.len())),
        }
    }

    #[test]
    fn error_status_is_http_error() {
        let url = serve_once(|mut stream| {
            read_request(&mut stream);
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        });
        let result = load_boundaries(&BoundarySource::Url(url), &config(5));
        assert!(matches!(result, Err(BoundaryLoadError::Http { .. })));
    }

    #[test]
    fn fetched_boundaries_load() {
        let body = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "properties": {"st_nm": "Goa"},
            "geometry": {"type": "Polygon", "coordinates": [[[73.7, 14.9], [74.3, 14.9], [74.3, 15.8], [73.7, 15.8], [73.7, 14.9]]]}
        }]}"#;
        let url = serve_once(move |mut stream| {
            read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        });
        let set = load_boundaries(&BoundarySource::Url(url), &config(5)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.regions_at(Coordinate::new(15.49, 73.83)).len(), 1);
    }
}
