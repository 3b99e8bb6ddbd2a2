//! Response-body parsers, one per output format the service can emit.
//!
//! Dispatch is a total match over [`OutputFormat`]: there is no fallback
//! path, and the CSV variant fails here rather than pretending to parse.

pub mod js;
pub mod json;
pub mod kml;

pub use kml::Resolver;

use crate::config::OutputFormat;
use crate::domain::GeocodeResult;
use crate::error::GeocodeError;

/// Decode a raw response body according to the configured output format.
///
/// `resolver` is only consulted by the XML/KML path, for placemarks that
/// arrive without coordinates.
pub fn parse_body(
    body: &str,
    format: OutputFormat,
    resolver: &dyn Resolver,
) -> Result<Vec<GeocodeResult>, GeocodeError> {
    match format {
        OutputFormat::Xml | OutputFormat::Kml => kml::parse(body, resolver),
        OutputFormat::Json => json::parse(body),
        OutputFormat::Js => js::parse(body),
        OutputFormat::Csv => Err(GeocodeError::CsvUnsupported),
    }
}
