//! CLI tool to check an existing route polyline against the bridge dataset.
//!
//! Reads one "lat,lon" pair per line and asks the RouteSafe API for a
//! clearance verdict without planning a new route.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

/// Check a route polyline for low-bridge conflicts
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// RouteSafe server URL
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// File with one "lat,lon" pair per line
    #[arg(long)]
    route_file: PathBuf,

    /// Vehicle height in metres
    #[arg(long)]
    height: f64,
}

/// Parse "lat,lon" lines into the [lon, lat] pairs the API expects.
fn parse_route(text: &str) -> Result<Vec<[f64; 2]>> {
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (lat, lon) = line
            .split_once(',')
            .with_context(|| format!("Line {} is not 'lat,lon'", number + 1))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .with_context(|| format!("Bad latitude on line {}", number + 1))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .with_context(|| format!("Bad longitude on line {}", number + 1))?;
        pairs.push([lon, lat]);
    }
    if pairs.len() < 2 {
        bail!("Route file needs at least 2 points");
    }
    Ok(pairs)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.route_file)
        .with_context(|| format!("Failed to read {}", args.route_file.display()))?;
    let route = parse_route(&text)?;

    println!(
        "Checking {} route points against the bridge dataset...",
        route.len()
    );

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/route/check", args.url))
        .json(&serde_json::json!({
            "route": route,
            "vehicle_height_m": args.height,
        }))
        .send()
        .await
        .context("Failed to reach RouteSafe server")?;

    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .context("Failed to parse check response")?;

    if !status.is_success() {
        bail!(
            "Check failed ({}): {}",
            status,
            payload["error"].as_str().unwrap_or("unknown error")
        );
    }

    let result = &payload["bridge_result"];
    println!(
        "Risk: {} (severity: {})",
        result["risk_level"].as_str().unwrap_or("?"),
        result["severity"].as_str().unwrap_or("?")
    );

    if let Some(bridge) = result["nearest_bridge"].as_object() {
        println!(
            "Nearest bridge: {:.0} m away, {:.2} m clearance at ({:.5}, {:.5})",
            bridge["distance_m"].as_f64().unwrap_or(0.0),
            bridge["height_m"].as_f64().unwrap_or(0.0),
            bridge["lat"].as_f64().unwrap_or(0.0),
            bridge["lon"].as_f64().unwrap_or(0.0)
        );
    } else {
        println!("No bridges in the dataset.");
    }

    if let Some(conflicts) = result["conflicts"].as_array() {
        for conflict in conflicts {
            println!(
                "  CONFLICT: bridge at ({:.5}, {:.5}), clearance {:.2} m, {:.0} m from route",
                conflict["lat"].as_f64().unwrap_or(0.0),
                conflict["lon"].as_f64().unwrap_or(0.0),
                conflict["height_m"].as_f64().unwrap_or(0.0),
                conflict["distance_m"].as_f64().unwrap_or(0.0)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_route;

    #[test]
    fn parses_lat_lon_lines_into_lon_lat_pairs() {
        let text = "53.7580, -1.6020\n# comment\n\n53.4800, -2.2500\n";
        let route = parse_route(text).unwrap();
        assert_eq!(route.len(), 2);
        assert!((route[0][0] + 1.6020).abs() < 1e-9);
        assert!((route[0][1] - 53.7580).abs() < 1e-9);
    }

    #[test]
    fn rejects_single_point_files() {
        assert!(parse_route("53.7580,-1.6020\n").is_err());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_route("53.7580 -1.6020\n53.48,-2.25\n").is_err());
    }
}
