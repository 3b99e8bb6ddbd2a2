use thiserror::Error;

/// Errors produced by the geocoding client.
///
/// Every failure surfaces to the caller as-is: there is no retry,
/// backoff, or local recovery anywhere in this crate.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Output format tag not recognized when building the configuration
    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    /// CSV output exists on the service side but has no parser here
    #[error("csv output is not supported")]
    CsvUnsupported,

    /// The address format string must contain exactly one `%s` slot
    #[error("format string must contain exactly one '%s' placeholder (found {slots})")]
    Template { slots: usize },

    /// The JSON payload reported a non-200 internal status code
    #[error("unexpected status returned from the geocoder: {0}")]
    Status(i64),

    /// Exactly one result was requested but the response held another count
    #[error("didn't find exactly one placemark (found {found})")]
    Cardinality { found: usize },

    /// A reverse lookup expecting a result got an empty response
    #[error("no placemarks in response")]
    NoResults,

    /// Network, DNS, or timeout failure from the HTTP layer
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Payload that could not be interpreted even under the lenient rules
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A placemark without coordinates chained nested lookups too deep
    #[error("placemark lookup recursed past depth {0}")]
    RecursionLimit(usize),
}
