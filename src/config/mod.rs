use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::GeocodeError;

/// Response format requested from the service via the `output` parameter.
///
/// The tag set is fixed by the service; anything else is rejected when the
/// configuration is built, never at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Kml,
    Json,
    Js,
    /// Accepted by the service but deliberately unparsed here
    Csv,
}

impl OutputFormat {
    /// Lower-cased tag as it appears in the query string.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Kml => "kml",
            OutputFormat::Json => "json",
            OutputFormat::Js => "js",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "kml" => Ok(OutputFormat::Kml),
            "json" => Ok(OutputFormat::Json),
            "js" => Ok(OutputFormat::Js),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(GeocodeError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_domain() -> String {
    "maps.google.com".to_string()
}

fn default_resource() -> String {
    "maps/geo".to_string()
}

fn default_format_string() -> String {
    "%s".to_string()
}

/// Immutable client configuration, constructed once and reused for every
/// call.
///
/// `domain` can point at a regional host (e.g. `maps.google.co.uk`) when
/// geocoding addresses in that region. `resource` defaults to the
/// documented HTTP geocoder path `maps/geo`; `maps` also works but its
/// use for plain geocoding is undocumented. `format_string` wraps every
/// query before it is sent, e.g. `"%s, Mountain View, CA"`.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Required by the service for the `maps/geo` resource only
    pub api_key: Option<String>,
    pub domain: String,
    pub resource: String,
    pub format_string: String,
    pub output: OutputFormat,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            domain: default_domain(),
            resource: default_resource(),
            format_string: default_format_string(),
            // kml works against both the maps and maps/geo resources
            output: OutputFormat::Kml,
        }
    }
}

/// Optional TOML file configuration, merged under CLI flags.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub format_string: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub sensor: Option<bool>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("geoquery.toml"));
    paths.push(PathBuf::from(".geoquery.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("geoquery").join("config.toml"));
        paths.push(config_dir.join("geoquery.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".geoquery.toml"));
        paths.push(home.join(".config").join("geoquery").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_round_trip() {
        for tag in ["xml", "kml", "json", "js", "csv"] {
            let format: OutputFormat = tag.parse().unwrap();
            assert_eq!(format.as_str(), tag);
        }
    }

    #[test]
    fn test_output_format_case_insensitive() {
        assert_eq!("KML".parse::<OutputFormat>().unwrap(), OutputFormat::Kml);
    }

    #[test]
    fn test_unknown_output_format() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, GeocodeError::UnknownFormat(tag) if tag == "yaml"));
    }

    #[test]
    fn test_default_config() {
        let config = GeocoderConfig::default();
        assert_eq!(config.domain, "maps.google.com");
        assert_eq!(config.resource, "maps/geo");
        assert_eq!(config.format_string, "%s");
        assert_eq!(config.output, OutputFormat::Kml);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_file_config_parses() {
        let toml = r#"
            api_key = "abc123"
            domain = "maps.google.co.uk"
            output = "json"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.domain.as_deref(), Some("maps.google.co.uk"));
        assert_eq!(config.output.as_deref(), Some("json"));
        assert!(config.resource.is_none());
    }
}
