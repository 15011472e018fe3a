//! Bridge dataset loading.

use routesafe_core::{Obstacle, ObstacleCatalog};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BridgeRecord {
    lat: f64,
    lon: f64,
    height_m: f64,
}

/// Load the bridge dataset from a CSV file.
///
/// A missing or unreadable file yields an empty catalog so the server can
/// still plan routes, just without any clearance checks.
pub fn load_catalog(path: &str) -> ObstacleCatalog {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(err) => {
            tracing::warn!("Bridge dataset {} unavailable: {}", path, err);
            return ObstacleCatalog::default();
        }
    };

    let mut entries = Vec::new();
    let mut malformed = 0usize;
    for record in reader.deserialize::<BridgeRecord>() {
        match record {
            Ok(record) => entries.push(Obstacle::new(record.lat, record.lon, record.height_m)),
            Err(_) => malformed += 1,
        }
    }

    let catalog = ObstacleCatalog::new(entries);
    let skipped = malformed + catalog.skipped_entries();
    if skipped > 0 {
        tracing::warn!("Skipped {} unusable rows in {}", skipped, path);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "routesafe-{}-{}.csv",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).expect("write csv");
        path
    }

    #[test]
    fn loads_well_formed_rows() {
        let path = write_temp_csv(
            "well-formed",
            "lat,lon,height_m\n53.7400,-1.5000,4.6\n53.7500,-1.5100,5.2\n",
        );
        let catalog = load_catalog(path.to_str().unwrap());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.skipped_entries(), 0);
        fs::remove_file(path).ok();
    }

    #[test]
    fn skips_malformed_and_invalid_rows() {
        let path = write_temp_csv(
            "bad-rows",
            "lat,lon,height_m\n53.7400,-1.5000,4.6\nnot,a,number\n91.0,-1.5,4.0\n53.75,-1.51,-2.0\n",
        );
        let catalog = load_catalog(path.to_str().unwrap());
        // One parse failure plus two rows with out-of-range values.
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skipped_entries(), 2);
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_yields_empty_catalog() {
        let catalog = load_catalog("/nonexistent/bridges.csv");
        assert!(catalog.is_empty());
    }
}
