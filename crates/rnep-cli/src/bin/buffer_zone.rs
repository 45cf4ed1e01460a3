//! Print the buffer zone around a flight path.

use anyhow::Context;
use clap::Parser;
use geo::{Geometry, LineString};
use rnep_cli::{init_tracing, polygon_rings, read_json, write_json, PathFile, Settings};
use rnep_core::{create_buffer_zone, Crs, PipelineRules};
use std::path::PathBuf;

/// Buffer a flight path by a distance in meters
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Flight path JSON file
    #[arg(long)]
    path: PathBuf,

    /// Buffer distance in meters
    #[arg(long)]
    distance_m: f64,

    /// Reference system of the path coordinates
    #[arg(long, default_value = "EPSG:4326")]
    crs: Crs,

    /// Pipeline rules JSON file
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Write the rings here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::from_env()?;
    init_tracing(settings.log_level, args.json_logs)?;

    let rules: PipelineRules = match &args.rules {
        Some(file) => read_json(file, settings.max_upload_size)?,
        None => PipelineRules::default(),
    };

    let path_file: PathFile = read_json(&args.path, settings.max_upload_size)?;
    let name = path_file.name.clone();
    // Projected coordinates skip the lat/lon range checks.
    let line: LineString<f64> = if args.crs.is_geographic() {
        path_file
            .into_flight_path(None, &rules)
            .context("invalid flight path")?
            .line_string()
    } else {
        path_file
            .coordinates
            .iter()
            .map(|c| (c.lon, c.lat))
            .collect()
    };

    let buffer = create_buffer_zone(
        &Geometry::LineString(line),
        args.distance_m,
        args.crs,
        &rules,
    )
    .context("failed to buffer flight path")?;

    tracing::info!(
        path = %name,
        distance_m = args.distance_m,
        crs = %args.crs,
        polygons = buffer.0.len(),
        "Buffer zone built"
    );

    write_json(&polygon_rings(&buffer), args.output.as_deref())
}
