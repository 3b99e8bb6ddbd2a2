//! JavaScript-literal response parser.
//!
//! The `js` output is the inline script of the Google Maps page itself,
//! not a machine-readable format. This parser pattern-matches a
//! `markers: [...]` sub-expression out of the script and is therefore
//! best-effort and unstable: any change to the page script can break it.
//! It exists because the page interface sometimes returns better results
//! than the HTTP geocoder for restricted regions such as the UK.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::GeocodeResult;
use crate::error::GeocodeError;

static MARKERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{markers: (\[.*?\]),\s*polylines:").unwrap());

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s,]lat:\s*(-?\d+\.\d+).*?[\s,]lng:\s*(-?\d+\.\d+).*?[\s,]laddr:\s*'((?:[^'\\]|\\.)*)'")
        .unwrap()
});

// Everything before the first " (" whose parenthetical contains an '@';
// the service appends metadata to labels in that form.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)(?: \(.*?@|$)").unwrap());

/// Extract every marker record from the script payload, in source order.
///
/// A payload with no recognizable markers block simply has zero results;
/// this format has no failure status to report.
pub fn parse(body: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
    let markers = MARKERS_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str());

    MARKER_RE.captures_iter(markers).map(parse_marker).collect()
}

fn parse_marker(caps: regex::Captures<'_>) -> Result<GeocodeResult, GeocodeError> {
    let lat = number(&caps, 1)?;
    let lng = number(&caps, 2)?;
    let label = caps
        .get(3)
        .map(|m| strip_label_metadata(m.as_str()))
        .filter(|label| !label.is_empty());

    Ok(GeocodeResult::new(label, (lat, lng)))
}

fn number(caps: &regex::Captures<'_>, group: usize) -> Result<f64, GeocodeError> {
    caps.get(group)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse("bad numeric field in marker".to_string()))
}

fn strip_label_metadata(label: &str) -> String {
    ADDRESS_RE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| label.to_string(), |m| m.as_str().to_string())
}
