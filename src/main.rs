use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod domain;
mod error;
mod parse;

use api::{GeocodeOptions, Geocoder, forward_url, reverse_url};
use config::{FileConfig, GeocoderConfig, OutputFormat};
use domain::GeocodeResult;

/// Geocode addresses through the legacy Google Maps HTTP geocoder
///
/// Examples:
///   # Forward geocode with the default KML output
///   geoquery "1600 Amphitheatre Parkway, Mountain View, CA"
///
///   # Reverse geocode a coordinate
///   geoquery --lat 37.422 --lon -122.084
///
///   # JSON output with an API key, listing every match
///   geoquery -k $KEY -f json --all "Springfield"
///
///   # Print the request URL without issuing it
///   geoquery --url-only "10 Downing St, London"
#[derive(Parser, Debug)]
#[command(name = "geoquery")]
#[command(version, about, long_about = None)]
struct Args {
    /// Free-text address to geocode (omit when using --lat/--lon)
    query: Option<String>,

    /// Path to config file (optional, auto-searches geoquery.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Latitude for a reverse lookup (use with --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for a reverse lookup (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Google Maps API key (required by the service for the maps/geo resource)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Maps domain to query, e.g. maps.google.co.uk
    #[arg(long)]
    domain: Option<String>,

    /// HTTP resource path: maps/geo (documented) or maps
    #[arg(long)]
    resource: Option<String>,

    /// Address template with one %s slot, e.g. "%s, Mountain View, CA"
    #[arg(long)]
    format_string: Option<String>,

    /// Output format: xml, kml, json, js, or csv
    #[arg(short = 'f', long)]
    output: Option<String>,

    /// Country-level bias code passed as gl, e.g. uk
    #[arg(long)]
    gl: Option<String>,

    /// Mark the request as coming from a location-sensor device
    #[arg(long)]
    sensor: bool,

    /// Viewport center as lat,lon (only applied together with --spn)
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    ll: Option<String>,

    /// Viewport span as lat-delta,lon-delta (only applied together with --ll)
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    spn: Option<String>,

    /// List every match instead of requiring exactly one
    #[arg(long)]
    all: bool,

    /// Print the request URL without issuing it
    #[arg(long)]
    url_only: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn parse_pair(value: &str) -> Result<(f64, f64)> {
    let (a, b) = value
        .split_once(',')
        .with_context(|| format!("expected lat,lon but got {value:?}"))?;
    Ok((
        a.trim().parse().context("bad latitude component")?,
        b.trim().parse().context("bad longitude component")?,
    ))
}

fn print_result(result: &GeocodeResult) {
    let label = result.label.as_deref().unwrap_or("(unnamed)");
    println!(
        "{}\t{},{}",
        label, result.coordinate.0, result.coordinate.1
    );
    if let Some(details) = &result.details {
        if let Some(locality) = &details.locality {
            println!("  locality: {locality}");
        }
        if let Some(area) = &details.administrative_area {
            println!("  administrative area: {area}");
        }
        if let Some(accuracy) = details.accuracy {
            println!("  accuracy: {accuracy}");
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "geoquery=debug"
    } else {
        "geoquery=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let file_config = file_config.unwrap_or_default();

    let defaults = GeocoderConfig::default();
    let output_tag = args
        .output
        .or(file_config.output)
        .unwrap_or_else(|| defaults.output.as_str().to_string());
    let output = OutputFormat::from_str(&output_tag)?;

    let config = GeocoderConfig {
        api_key: args.api_key.or(file_config.api_key),
        domain: args.domain.or(file_config.domain).unwrap_or(defaults.domain),
        resource: args
            .resource
            .or(file_config.resource)
            .unwrap_or(defaults.resource),
        format_string: args
            .format_string
            .or(file_config.format_string)
            .unwrap_or(defaults.format_string),
        output,
    };

    let options = GeocodeOptions {
        language_code: args.gl.or(file_config.language_code),
        sensor: args.sensor || file_config.sensor.unwrap_or(false),
        viewport_center: args.ll.as_deref().map(parse_pair).transpose()?,
        viewport_span: args.spn.as_deref().map(parse_pair).transpose()?,
    };

    let reverse_coord = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    };
    if args.query.is_none() && reverse_coord.is_none() {
        bail!("Provide an address query, or --lat and --lon for a reverse lookup");
    }
    if args.query.is_some() && reverse_coord.is_some() {
        bail!("Provide either an address query or --lat/--lon, not both");
    }

    if args.url_only {
        let url = match (&args.query, reverse_coord) {
            (Some(query), _) => forward_url(&config, query, &options)?,
            (None, Some(coord)) => reverse_url(&config, coord)?,
            _ => unreachable!(),
        };
        println!("{url}");
        return Ok(());
    }

    let geocoder = Geocoder::new(config)?;

    if let Some(query) = &args.query {
        if args.all {
            let results = geocoder.geocode_all(query, &options)?;
            for result in &results {
                print_result(result);
            }
            eprintln!("{} result(s)", results.len());
        } else {
            print_result(&geocoder.geocode(query, &options)?);
        }
    } else if let Some(coord) = reverse_coord {
        if args.all {
            let results = geocoder.reverse_all(coord)?;
            for result in &results {
                print_result(result);
            }
            eprintln!("{} result(s)", results.len());
        } else {
            print_result(&geocoder.reverse(coord)?);
        }
    }

    Ok(())
}
