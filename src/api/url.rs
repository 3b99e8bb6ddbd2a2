use url::form_urlencoded;

use crate::config::GeocoderConfig;
use crate::domain::Coordinate;
use crate::error::GeocodeError;

/// Optional forward-geocode parameters.
///
/// The viewport hint is only forwarded when *both* center and span are
/// set; a lone half is dropped without comment, matching the service's
/// own expectations.
#[derive(Debug, Clone, Default)]
pub struct GeocodeOptions {
    /// Country-level bias, e.g. `uk` (the service's `gl` parameter)
    pub language_code: Option<String>,
    /// Whether the request originates from a device with a location sensor
    pub sensor: bool,
    /// Viewport center as (latitude, longitude)
    pub viewport_center: Option<(f64, f64)>,
    /// Viewport span as (latitude delta, longitude delta)
    pub viewport_span: Option<(f64, f64)>,
}

/// Substitute `value` into a `%s` template.
///
/// Exactly one slot is expected; a template with zero or several slots is
/// a configuration mistake and fails rather than producing a mangled
/// query.
pub fn apply_format(template: &str, value: &str) -> Result<String, GeocodeError> {
    let slots = template.matches("%s").count();
    if slots != 1 {
        return Err(GeocodeError::Template { slots });
    }
    Ok(template.replacen("%s", value, 1))
}

fn base_url(config: &GeocoderConfig) -> String {
    format!(
        "http://{}/{}",
        config.domain.trim_matches('/'),
        config.resource.trim_matches('/')
    )
}

/// The API key only means anything to the HTTP geocoder resource; other
/// resources ignore it, so it is omitted for them.
fn wants_api_key(resource: &str) -> bool {
    resource.trim_end_matches('/').ends_with("geo")
}

fn append_api_key(config: &GeocoderConfig, params: &mut form_urlencoded::Serializer<'_, String>) {
    if wants_api_key(&config.resource)
        && let Some(key) = &config.api_key
    {
        params.append_pair("key", key);
    }
}

/// Build the request URL for a forward (text to coordinate) lookup.
pub fn forward_url(
    config: &GeocoderConfig,
    query: &str,
    options: &GeocodeOptions,
) -> Result<String, GeocodeError> {
    let q = apply_format(&config.format_string, query)?;

    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", &q);
    params.append_pair("output", config.output.as_str());
    params.append_pair("sensor", if options.sensor { "true" } else { "false" });
    if let Some(gl) = &options.language_code {
        params.append_pair("gl", gl);
    }
    if let (Some(center), Some(span)) = (options.viewport_center, options.viewport_span) {
        params.append_pair("ll", &format!("{},{}", center.0, center.1));
        params.append_pair("spn", &format!("{},{}", span.0, span.1));
    }
    append_api_key(config, &mut params);

    Ok(format!("{}?{}", base_url(config), params.finish()))
}

/// Build the request URL for a reverse (coordinate to address) lookup.
///
/// The format template is applied to the latitude and longitude
/// separately and the two are joined with a comma. Applying a single-slot
/// template twice looks odd but is the convention the service grew up
/// with, preserved here.
pub fn reverse_url(config: &GeocoderConfig, coordinate: Coordinate) -> Result<String, GeocodeError> {
    let (lat, lon) = coordinate;
    let q = format!(
        "{},{}",
        apply_format(&config.format_string, &lat.to_string())?,
        apply_format(&config.format_string, &lon.to_string())?
    );

    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", &q);
    params.append_pair("output", config.output.as_str());
    append_api_key(config, &mut params);

    Ok(format!("{}?{}", base_url(config), params.finish()))
}
