//! Input file loading.

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use rnep_core::{Coordinate, FlightPath, PipelineRules};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Flight path file: a named list of `[lon, lat]` or `[lon, lat, alt]`
/// vertices.
#[derive(Debug, Clone, Deserialize)]
pub struct PathFile {
    pub name: String,
    pub coordinates: Vec<Coordinate>,
    /// Altitude for vertices without one, in meters
    #[serde(default)]
    pub default_altitude_m: Option<f64>,
}

impl PathFile {
    pub fn into_flight_path(
        self,
        source_file: Option<String>,
        rules: &PipelineRules,
    ) -> rnep_core::Result<FlightPath> {
        let default_altitude = self.default_altitude_m.unwrap_or(rules.default_altitude_m);
        FlightPath::new(self.name, source_file, self.coordinates, Some(default_altitude))
    }
}

/// Read and parse a JSON file no larger than `max_size` bytes.
pub fn read_json<T: DeserializeOwned>(path: &Path, max_size: u64) -> Result<T> {
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to open {}", path.display()))?;
    if metadata.len() > max_size {
        bail!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            metadata.len(),
            max_size
        );
    }

    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse a departure time given as `HH:MM` or `HH:MM:SS`.
pub fn parse_departure(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("invalid departure time '{value}', expected HH:MM[:SS]"))
}
