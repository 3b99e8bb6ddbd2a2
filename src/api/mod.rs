pub mod client;
pub mod url;

pub use client::{Geocoder, HttpTransport, Transport};
pub use url::{GeocodeOptions, forward_url, reverse_url};
