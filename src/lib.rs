//! geoquery - Client for the legacy Google Maps HTTP geocoder

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod parse;

pub use api::{GeocodeOptions, Geocoder, Transport};
pub use config::{GeocoderConfig, OutputFormat};
pub use domain::{Coordinate, GeocodeResult, PlaceDetails};
pub use error::GeocodeError;
