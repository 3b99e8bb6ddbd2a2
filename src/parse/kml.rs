//! XML/KML response parser.
//!
//! KML is the same document shape as the XML output under a different
//! content-type label, so both formats land here. The policy for broken
//! input is deliberately lenient: a document the XML reader rejects
//! counts as zero placemarks rather than a hard failure.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::warn;

use crate::domain::{Coordinate, GeocodeResult};
use crate::error::GeocodeError;

/// Capability to forward-geocode a place name discovered inside a
/// placemark that carried no coordinates of its own.
///
/// In production this is the client's own `geocode` operation; tests
/// substitute a canned implementation.
pub trait Resolver {
    fn resolve(&self, query: &str) -> Result<Coordinate, GeocodeError>;
}

/// Parse every `Placemark` in the document, in document order.
pub fn parse(body: &str, resolver: &dyn Resolver) -> Result<Vec<GeocodeResult>, GeocodeError> {
    let placemarks = match collect_placemarks(body) {
        Ok(placemarks) => placemarks,
        Err(e) => {
            warn!(error = %e, "discarding malformed xml response");
            Vec::new()
        }
    };

    placemarks
        .into_iter()
        .map(|placemark| resolve_placemark(placemark, resolver))
        .collect()
}

#[derive(Debug, Default)]
struct RawPlacemark {
    address: Option<String>,
    name: Option<String>,
    coordinates: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Address,
    Name,
    Coordinates,
}

fn collect_placemarks(body: &str) -> Result<Vec<RawPlacemark>, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut placemarks = Vec::new();
    let mut buf = Vec::new();
    let mut current: Option<RawPlacemark> = None;
    let mut in_point = false;
    let mut capture: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Placemark" => {
                    current = Some(RawPlacemark::default());
                    in_point = false;
                }
                b"Point" if current.is_some() => in_point = true,
                b"address" if current.is_some() => capture = Some(Field::Address),
                b"name" if current.is_some() => capture = Some(Field::Name),
                b"coordinates" if in_point => capture = Some(Field::Coordinates),
                _ => capture = None,
            },
            Event::Text(e) => {
                if let (Some(placemark), Some(field)) = (current.as_mut(), capture)
                    && let Ok(text) = e.unescape()
                {
                    let slot = match field {
                        Field::Address => &mut placemark.address,
                        Field::Name => &mut placemark.name,
                        Field::Coordinates => &mut placemark.coordinates,
                    };
                    // first non-empty occurrence wins
                    if slot.is_none() && !text.is_empty() {
                        *slot = Some(text.into_owned());
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"Placemark" => {
                    if let Some(placemark) = current.take() {
                        placemarks.push(placemark);
                    }
                    in_point = false;
                }
                b"Point" => {
                    in_point = false;
                    capture = None;
                }
                _ => capture = None,
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(placemarks)
}

fn resolve_placemark(
    placemark: RawPlacemark,
    resolver: &dyn Resolver,
) -> Result<GeocodeResult, GeocodeError> {
    let label = placemark.address.or(placemark.name);

    if let Some(text) = placemark.coordinates.as_deref() {
        let coordinate = parse_coordinates(text)?;
        return Ok(GeocodeResult::new(label, coordinate));
    }

    // The service occasionally returns a named placemark with no Point.
    // Resolve the name through a nested forward lookup.
    match label {
        Some(name) => {
            let coordinate = resolver.resolve(&name)?;
            Ok(GeocodeResult::new(Some(name), coordinate))
        }
        None => Err(GeocodeError::Parse(
            "placemark has neither coordinates nor a name".to_string(),
        )),
    }
}

/// Wire order is `longitude,latitude[,altitude]`; altitude is ignored and
/// the pair is flipped to `(latitude, longitude)` on the way out.
fn parse_coordinates(text: &str) -> Result<Coordinate, GeocodeError> {
    let mut parts = text.split(',').map(str::trim);
    let lon = parts.next().and_then(|v| v.parse::<f64>().ok());
    let lat = parts.next().and_then(|v| v.parse::<f64>().ok());
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(GeocodeError::Parse(format!(
            "bad coordinate text: {text:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoResolver;

    impl Resolver for NoResolver {
        fn resolve(&self, query: &str) -> Result<Coordinate, GeocodeError> {
            panic!("unexpected fallback lookup for {query:?}");
        }
    }

    struct FixedResolver(Coordinate);

    impl Resolver for FixedResolver {
        fn resolve(&self, _query: &str) -> Result<Coordinate, GeocodeError> {
            Ok(self.0)
        }
    }

    const SINGLE_PLACEMARK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <name>1600 Amphitheatre Parkway</name>
  <Placemark id="p1">
    <address>1600 Amphitheatre Pkwy, Mountain View, CA</address>
    <Point><coordinates>-122.084,37.422,0</coordinates></Point>
  </Placemark>
</Response></kml>"#;

    #[test]
    fn test_single_placemark_flips_coordinate_order() {
        let results = parse(SINGLE_PLACEMARK, &NoResolver).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].label.as_deref(),
            Some("1600 Amphitheatre Pkwy, Mountain View, CA")
        );
        assert_eq!(results[0].coordinate, (37.422, -122.084));
    }

    #[test]
    fn test_response_name_is_not_a_placemark_label() {
        // The top-level <name> echoes the query; only text inside a
        // Placemark element may label a result.
        let results = parse(SINGLE_PLACEMARK, &NoResolver).unwrap();
        assert_ne!(results[0].label.as_deref(), Some("1600 Amphitheatre Parkway"));
    }

    #[test]
    fn test_malformed_xml_yields_zero_results() {
        let results = parse("<kml><Placemark><broken", &NoResolver).unwrap();
        assert!(results.is_empty());

        let results = parse("not xml at all", &NoResolver).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_multiple_placemarks_in_document_order() {
        let body = r#"<kml><Response>
  <Placemark><name>First</name><Point><coordinates>1.0,2.0</coordinates></Point></Placemark>
  <Placemark><name>Second</name><Point><coordinates>3.0,4.0</coordinates></Point></Placemark>
</Response></kml>"#;
        let results = parse(body, &NoResolver).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label.as_deref(), Some("First"));
        assert_eq!(results[0].coordinate, (2.0, 1.0));
        assert_eq!(results[1].label.as_deref(), Some("Second"));
        assert_eq!(results[1].coordinate, (4.0, 3.0));
    }

    #[test]
    fn test_address_preferred_over_name() {
        let body = r#"<kml><Placemark>
  <name>short name</name>
  <address>full address</address>
  <Point><coordinates>0.5,1.5</coordinates></Point>
</Placemark></kml>"#;
        let results = parse(body, &NoResolver).unwrap();
        assert_eq!(results[0].label.as_deref(), Some("full address"));
    }

    #[test]
    fn test_uncoordinated_placemark_uses_resolver() {
        let body = r#"<kml><Placemark><name>Somewhere</name></Placemark></kml>"#;
        let results = parse(body, &FixedResolver((51.5, -0.1))).unwrap();
        assert_eq!(results[0].label.as_deref(), Some("Somewhere"));
        assert_eq!(results[0].coordinate, (51.5, -0.1));
    }

    #[test]
    fn test_placemark_with_nothing_is_a_parse_error() {
        let body = r#"<kml><Placemark></Placemark></kml>"#;
        let err = parse(body, &NoResolver).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse(_)));
    }

    #[test]
    fn test_altitude_component_ignored() {
        assert_eq!(parse_coordinates("-122.084,37.422,1200").unwrap(), (37.422, -122.084));
        assert_eq!(parse_coordinates("-122.084,37.422").unwrap(), (37.422, -122.084));
    }

    #[test]
    fn test_bad_coordinate_text_fails() {
        assert!(matches!(
            parse_coordinates("only-one-piece").unwrap_err(),
            GeocodeError::Parse(_)
        ));
    }
}
