//! Result output for the binaries.

use anyhow::{Context, Result};
use geo::MultiPolygon;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Every ring of every polygon as `[lon, lat]` pairs, exteriors first
/// within each polygon.
pub fn polygon_rings(polygons: &MultiPolygon<f64>) -> Vec<Vec<[f64; 2]>> {
    polygons
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// Pretty-print `value` to `output`, or to stdout when no file is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
