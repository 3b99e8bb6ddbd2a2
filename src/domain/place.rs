/// A latitude/longitude pair in decimal degrees.
///
/// No normalization or range validation is performed; values pass through
/// exactly as the service returned them.
pub type Coordinate = (f64, f64);

/// Extra address detail carried only by the JSON output format.
///
/// Every field is independently optional: the service omits any level of
/// the nested address structure freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDetails {
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    /// Service accuracy indicator, 0 (unknown) through 9 (premise)
    pub accuracy: Option<u8>,
}

/// A single geocoding result: a place label and its coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Resolved address or place name. Absent when the service returns a
    /// coordinate with no resolvable label.
    pub label: Option<String>,
    /// (latitude, longitude) in decimal degrees
    pub coordinate: Coordinate,
    /// Populated by the JSON parser only
    pub details: Option<PlaceDetails>,
}

impl GeocodeResult {
    pub fn new(label: Option<String>, coordinate: Coordinate) -> Self {
        Self {
            label,
            coordinate,
            details: None,
        }
    }
}
