//! JSON response parser.
//!
//! Unlike the XML path, malformed JSON fails loudly: this format carries
//! its own status envelope and is expected to be machine-readable.

use serde::Deserialize;

use crate::domain::{GeocodeResult, PlaceDetails};
use crate::error::GeocodeError;

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(rename = "Status")]
    status: Status,
    #[serde(rename = "Placemark", default)]
    placemarks: Vec<Placemark>,
}

#[derive(Debug, Deserialize)]
struct Status {
    code: i64,
}

#[derive(Debug, Deserialize)]
struct Placemark {
    address: Option<String>,
    #[serde(rename = "Point")]
    point: Point,
    #[serde(rename = "AddressDetails")]
    details: Option<AddressDetails>,
}

#[derive(Debug, Deserialize)]
struct Point {
    /// Wire order is `[longitude, latitude, altitude?]`
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct AddressDetails {
    #[serde(rename = "Accuracy")]
    accuracy: Option<u8>,
    #[serde(rename = "Country")]
    country: Option<Country>,
}

#[derive(Debug, Deserialize)]
struct Country {
    #[serde(rename = "AdministrativeArea")]
    administrative_area: Option<AdministrativeArea>,
}

#[derive(Debug, Deserialize)]
struct AdministrativeArea {
    #[serde(rename = "AdministrativeAreaName")]
    name: Option<String>,
    #[serde(rename = "Locality")]
    locality: Option<Locality>,
}

#[derive(Debug, Deserialize)]
struct Locality {
    #[serde(rename = "LocalityName")]
    name: Option<String>,
}

const STATUS_OK: i64 = 200;

/// Parse every placemark in the response, in document order.
pub fn parse(body: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
    let response: Response =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    // The payload's internal status is authoritative; the HTTP status of
    // the response that carried it is not consulted.
    if response.status.code != STATUS_OK {
        return Err(GeocodeError::Status(response.status.code));
    }

    response
        .placemarks
        .into_iter()
        .map(parse_placemark)
        .collect()
}

fn parse_placemark(placemark: Placemark) -> Result<GeocodeResult, GeocodeError> {
    let coordinate = match placemark.point.coordinates.as_slice() {
        [lon, lat, ..] => (*lat, *lon),
        other => {
            return Err(GeocodeError::Parse(format!(
                "expected at least two coordinate components, got {}",
                other.len()
            )));
        }
    };

    let area = placemark
        .details
        .as_ref()
        .and_then(|d| d.country.as_ref())
        .and_then(|c| c.administrative_area.as_ref());
    let details = PlaceDetails {
        locality: area
            .and_then(|a| a.locality.as_ref())
            .and_then(|l| l.name.clone()),
        administrative_area: area.and_then(|a| a.name.clone()),
        accuracy: placemark.details.as_ref().and_then(|d| d.accuracy),
    };

    Ok(GeocodeResult {
        label: placemark.address,
        coordinate,
        details: Some(details),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "name": "1600 Amphitheatre Parkway",
        "Status": {"code": 200, "request": "geocode"},
        "Placemark": [{
            "id": "p1",
            "address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
            "AddressDetails": {
                "Accuracy": 8,
                "Country": {
                    "CountryName": "USA",
                    "AdministrativeArea": {
                        "AdministrativeAreaName": "CA",
                        "Locality": {"LocalityName": "Mountain View"}
                    }
                }
            },
            "Point": {"coordinates": [-122.084, 37.422, 0]}
        }]
    }"#;

    #[test]
    fn test_full_placemark() {
        let results = parse(FULL_RESPONSE).unwrap();
        assert_eq!(results.len(), 1);

        let result = &results[0];
        assert_eq!(
            result.label.as_deref(),
            Some("1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA")
        );
        assert_eq!(result.coordinate, (37.422, -122.084));

        let details = result.details.as_ref().unwrap();
        assert_eq!(details.locality.as_deref(), Some("Mountain View"));
        assert_eq!(details.administrative_area.as_deref(), Some("CA"));
        assert_eq!(details.accuracy, Some(8));
    }

    #[test]
    fn test_non_200_status_is_an_error() {
        let body = r#"{"Status": {"code": 602}, "Placemark": [{"address": "x", "Point": {"coordinates": [1.0, 2.0]}}]}"#;
        let err = parse(body).unwrap_err();
        assert!(matches!(err, GeocodeError::Status(602)));
    }

    #[test]
    fn test_missing_address_details_is_not_a_failure() {
        let body = r#"{"Status": {"code": 200}, "Placemark": [{"address": "somewhere", "Point": {"coordinates": [-0.1, 51.5]}}]}"#;
        let results = parse(body).unwrap();
        let details = results[0].details.as_ref().unwrap();
        assert_eq!(details.locality, None);
        assert_eq!(details.administrative_area, None);
        assert_eq!(details.accuracy, None);
    }

    #[test]
    fn test_partially_nested_address_details() {
        // The Country level is present but the AdministrativeArea below it
        // is not; every lookup degrades to None independently.
        let body = r#"{"Status": {"code": 200}, "Placemark": [{
            "address": "somewhere",
            "AddressDetails": {"Accuracy": 4, "Country": {"CountryName": "UK"}},
            "Point": {"coordinates": [-0.1, 51.5]}
        }]}"#;
        let results = parse(body).unwrap();
        let details = results[0].details.as_ref().unwrap();
        assert_eq!(details.locality, None);
        assert_eq!(details.administrative_area, None);
        assert_eq!(details.accuracy, Some(4));
    }

    #[test]
    fn test_empty_placemark_list() {
        let body = r#"{"Status": {"code": 200}}"#;
        assert!(parse(body).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_fails_loudly() {
        let err = parse("{not json").unwrap_err();
        assert!(matches!(err, GeocodeError::Parse(_)));
    }

    #[test]
    fn test_short_coordinate_array_fails() {
        let body = r#"{"Status": {"code": 200}, "Placemark": [{"Point": {"coordinates": [1.0]}}]}"#;
        let err = parse(body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse(_)));
    }
}
