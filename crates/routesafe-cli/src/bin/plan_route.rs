//! CLI tool to plan an HGV route between two postcodes.
//!
//! Calls the RouteSafe API and prints the planned route with its
//! bridge clearance verdict.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;

/// Plan an HGV route with low-bridge avoidance
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// RouteSafe server URL
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Start postcode
    #[arg(long)]
    start: String,

    /// Destination postcode
    #[arg(long)]
    dest: String,

    /// Vehicle height in metres
    #[arg(long)]
    height: f64,

    /// Vehicle registration (reserved for DVLA height lookup)
    #[arg(long)]
    reg: Option<String>,

    /// Keep the direct route even when it passes a conflicting bridge
    #[arg(long)]
    no_avoid: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let body = serde_json::json!({
        "start_postcode": args.start,
        "dest_postcode": args.dest,
        "vehicle_height_m": args.height,
        "avoid_low_bridges": !args.no_avoid,
        "vehicle_reg": args.reg,
    });

    println!("Requesting route {} -> {}...", args.start, args.dest);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/route", args.url))
        .json(&body)
        .send()
        .await
        .context("Failed to reach RouteSafe server")?;

    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .context("Failed to parse route response")?;

    if !status.is_success() {
        bail!(
            "Route request failed ({}): {}",
            status,
            payload["error"].as_str().unwrap_or("unknown error")
        );
    }

    println!(
        "Distance: {:.1} km, duration: {:.0} min",
        payload["metrics"]["distance_km"].as_f64().unwrap_or(0.0),
        payload["metrics"]["duration_min"].as_f64().unwrap_or(0.0)
    );
    println!(
        "Bridge risk: {} (severity: {})",
        payload["bridge_result"]["risk_level"]
            .as_str()
            .unwrap_or("?"),
        payload["bridge_result"]["severity"].as_str().unwrap_or("?")
    );

    if let Some(bridge) = payload["bridge_result"]["nearest_bridge"].as_object() {
        println!(
            "Nearest bridge: {:.0} m from the route, {:.2} m clearance at ({:.5}, {:.5})",
            bridge["distance_m"].as_f64().unwrap_or(0.0),
            bridge["height_m"].as_f64().unwrap_or(0.0),
            bridge["lat"].as_f64().unwrap_or(0.0),
            bridge["lon"].as_f64().unwrap_or(0.0)
        );
    }

    let conflicts = payload["bridge_result"]["conflicts"]
        .as_array()
        .map(|list| list.len())
        .unwrap_or(0);
    if conflicts > 0 {
        println!("Conflicting bridges on the direct route: {}", conflicts);
    }

    println!(
        "Recommended route: {} (alternate: {})",
        payload["recommended_route"].as_str().unwrap_or("main"),
        payload["alternate_status"]["status"]
            .as_str()
            .unwrap_or("not_needed")
    );

    if payload["alt_route"].is_object() {
        let points = payload["alt_route"]["coords"]
            .as_array()
            .map(|list| list.len())
            .unwrap_or(0);
        println!("Alternate geometry: {} points", points);
    }

    Ok(())
}
