//! Position-fix loaders.
//!
//! # CSV format
//!
//! ```csv
//! vehicle_id,lon,lat,speed_kmh
//! truck-7,26.1025,44.4268,42.5
//! ```
//!
//! # JSON format
//!
//! An array of vehicle payloads as the telemetry API stores them.  Only
//! `id`, `location.ox` (longitude), `location.oy` (latitude) and `GPSSpeed`
//! (km/h, default 0) are read; other fields are ignored.
//!
//! ```json
//! [{"id": "truck-7", "location": {"ox": 26.1025, "oy": 44.4268}, "GPSSpeed": 42.5}]
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use vsl_core::GeoFix;

use crate::{SweepError, SweepResult};

// ── CSV ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FixRecord {
    vehicle_id: String,
    lon:        f64,
    lat:        f64,
    speed_kmh:  f64,
}

/// Load fixes from a CSV file.
pub fn load_fixes_csv(path: &Path) -> SweepResult<Vec<GeoFix>> {
    load_fixes_reader(std::fs::File::open(path)?)
}

/// Like [`load_fixes_csv`] but accepts any `Read` source.
pub fn load_fixes_reader<R: Read>(reader: R) -> SweepResult<Vec<GeoFix>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut fixes = Vec::new();
    for result in csv_reader.deserialize::<FixRecord>() {
        let row = result?;
        fixes.push(checked(row.vehicle_id, row.lon, row.lat, row.speed_kmh)?);
    }
    Ok(fixes)
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Vehicle ids arrive as strings from most clients and as numbers from some.
#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadId {
    Text(String),
    Number(serde_json::Number),
}

impl PayloadId {
    fn into_string(self) -> String {
        match self {
            PayloadId::Text(s) => s,
            PayloadId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct PayloadLocation {
    ox: f64,
    oy: f64,
}

#[derive(Deserialize)]
struct VehiclePayload {
    id:       PayloadId,
    location: PayloadLocation,
    #[serde(rename = "GPSSpeed", default)]
    gps_speed: f64,
}

/// Load fixes from a JSON file holding an array of vehicle payloads.
pub fn load_fixes_json(path: &Path) -> SweepResult<Vec<GeoFix>> {
    parse_fixes_json(&std::fs::read_to_string(path)?)
}

/// Like [`load_fixes_json`] but parses an in-memory document.
pub fn parse_fixes_json(json: &str) -> SweepResult<Vec<GeoFix>> {
    let payloads: Vec<VehiclePayload> = serde_json::from_str(json)?;
    payloads
        .into_iter()
        .map(|p| checked(p.id.into_string(), p.location.ox, p.location.oy, p.gps_speed))
        .collect()
}

fn checked(vehicle_id: String, lon: f64, lat: f64, speed_kmh: f64) -> SweepResult<GeoFix> {
    if vehicle_id.is_empty() {
        return Err(SweepError::InvalidFix { vehicle_id, reason: "empty vehicle id" });
    }
    if !(lon.is_finite() && lat.is_finite()) {
        return Err(SweepError::InvalidFix { vehicle_id, reason: "non-finite coordinates" });
    }
    if !speed_kmh.is_finite() {
        return Err(SweepError::InvalidFix { vehicle_id, reason: "non-finite speed" });
    }
    Ok(GeoFix::new(vehicle_id, lon, lat, speed_kmh))
}
