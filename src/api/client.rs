use std::time::Duration;

use tracing::debug;

use crate::config::GeocoderConfig;
use crate::domain::{Coordinate, GeocodeResult};
use crate::error::GeocodeError;
use crate::parse;

use super::url::{GeocodeOptions, forward_url, reverse_url};

const USER_AGENT: &str = concat!("geoquery/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bound on nested lookups triggered by placemarks without coordinates.
/// The upstream service client had no such bound and could loop if the
/// service kept answering with unresolved placemarks.
const MAX_LOOKUP_DEPTH: usize = 2;

/// Blocking HTTP GET abstraction.
///
/// The client only needs the response body as text; connection handling,
/// redirects, and timeouts belong to the implementation.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String, GeocodeError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<String, GeocodeError> {
        (**self).get(url)
    }
}

/// Default transport backed by a blocking reqwest client.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, GeocodeError> {
        // HTTP-level status codes are not distinguished from success here;
        // only the JSON payload's internal status field is checked, by the
        // JSON parser.
        Ok(self.client.get(url).send()?.text()?)
    }
}

/// Client for the legacy Google Maps HTTP geocoder.
///
/// Fully synchronous: each call issues exactly one blocking GET (plus, on
/// the XML/KML path, bounded nested lookups for placemarks that arrive
/// without coordinates) and returns when the transport does. There is no
/// retry, caching, or shared mutable state; the configuration is read
/// only and the client can be used freely from multiple call sites.
pub struct Geocoder<T = HttpTransport> {
    config: GeocoderConfig,
    transport: T,
}

impl Geocoder<HttpTransport> {
    /// Build a client over the default HTTP transport.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let transport = HttpTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Geocoder<T> {
    /// Build a client over a caller-supplied transport.
    pub fn with_transport(config: GeocoderConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Forward-geocode a free-text address, expecting exactly one result.
    ///
    /// Any other result count fails with
    /// [`GeocodeError::Cardinality`].
    pub fn geocode(
        &self,
        query: &str,
        options: &GeocodeOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.geocode_at_depth(query, options, 0)
    }

    /// Forward-geocode a free-text address, returning every result the
    /// service sent, in document order. The list may be empty.
    pub fn geocode_all(
        &self,
        query: &str,
        options: &GeocodeOptions,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = forward_url(&self.config, query, options)?;
        self.fetch_parsed(&url, 0)
    }

    /// Reverse-geocode a coordinate to its first matching placemark.
    ///
    /// The service may answer a reverse lookup with any number of
    /// placemarks, so no exactly-one check applies; an empty answer fails
    /// with [`GeocodeError::NoResults`] rather than indexing past the
    /// end.
    pub fn reverse(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError> {
        let mut results = self.reverse_all(coordinate)?;
        if results.is_empty() {
            return Err(GeocodeError::NoResults);
        }
        Ok(results.remove(0))
    }

    /// Reverse-geocode a coordinate, returning every result.
    pub fn reverse_all(&self, coordinate: Coordinate) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = reverse_url(&self.config, coordinate)?;
        self.fetch_parsed(&url, 0)
    }

    fn geocode_at_depth(
        &self,
        query: &str,
        options: &GeocodeOptions,
        depth: usize,
    ) -> Result<GeocodeResult, GeocodeError> {
        let url = forward_url(&self.config, query, options)?;
        let results = self.fetch_parsed(&url, depth)?;
        if results.len() != 1 {
            return Err(GeocodeError::Cardinality {
                found: results.len(),
            });
        }
        results.into_iter().next().ok_or(GeocodeError::NoResults)
    }

    fn fetch_parsed(&self, url: &str, depth: usize) -> Result<Vec<GeocodeResult>, GeocodeError> {
        debug!(url, "fetching");
        let body = self.transport.get(url)?;
        let resolver = ClientResolver {
            geocoder: self,
            depth,
        };
        parse::parse_body(&body, self.config.output, &resolver)
    }
}

/// The XML/KML parser's fallback capability, wired to the client's own
/// forward geocode with a running depth count.
struct ClientResolver<'a, T> {
    geocoder: &'a Geocoder<T>,
    depth: usize,
}

impl<T: Transport> parse::Resolver for ClientResolver<'_, T> {
    fn resolve(&self, query: &str) -> Result<Coordinate, GeocodeError> {
        if self.depth >= MAX_LOOKUP_DEPTH {
            return Err(GeocodeError::RecursionLimit(MAX_LOOKUP_DEPTH));
        }
        debug!(query, depth = self.depth, "resolving uncoordinated placemark");
        let result = self
            .geocoder
            .geocode_at_depth(query, &GeocodeOptions::default(), self.depth + 1)?;
        Ok(result.coordinate)
    }
}
