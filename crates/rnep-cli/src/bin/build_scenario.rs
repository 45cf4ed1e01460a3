//! Build a validated flight scenario and print its evaluation input.
//!
//! Reads a flight path file and an aircraft profile, attaches ETAs for the
//! requested departure, validates the result and emits the standardized
//! evaluation input JSON.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use rnep_cli::{init_tracing, parse_departure, read_json, write_json, PathFile, Settings};
use rnep_core::{
    Aircraft, ConstantSpeedPolicy, EvaluationInput, PipelineRules, ScenarioBuilder,
    ScenarioRequest,
};
use std::path::PathBuf;

/// Build a flight scenario from a path and an aircraft profile
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Flight path JSON file
    #[arg(long)]
    path: PathBuf,

    /// Aircraft profile JSON file
    #[arg(long)]
    aircraft: PathBuf,

    /// Flight date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Departure time (HH:MM or HH:MM:SS, UTC)
    #[arg(long)]
    departure: String,

    /// Scenario name
    #[arg(long)]
    name: String,

    /// Scenario description
    #[arg(long)]
    description: Option<String>,

    /// Fly every leg at this speed (km/h) instead of the phase-based policy
    #[arg(long)]
    constant_speed: Option<f64>,

    /// Pipeline rules JSON file
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Write the evaluation input here instead of stdout
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
    let source_file = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let path = path_file
        .into_flight_path(source_file, &rules)
        .context("invalid flight path")?;

    let aircraft: Aircraft = read_json(&args.aircraft, settings.max_upload_size)?;
    aircraft.validate().context("invalid aircraft profile")?;

    let request = ScenarioRequest {
        name: args.name,
        description: args.description,
        flight_date: args.date,
        departure_time: parse_departure(&args.departure)?,
        aircraft_id: aircraft.id.clone(),
        flight_path_id: path.id,
    };

    let builder = match args.constant_speed {
        Some(kmh) => ScenarioBuilder::new(ConstantSpeedPolicy(kmh)),
        None => ScenarioBuilder::default(),
    }
    .with_rules(rules);

    let now = Utc::now();
    let mut scenario = builder
        .build_at(&request, &path, &aircraft, now)
        .context("failed to build scenario")?;
    scenario
        .mark_ready(&aircraft, now)
        .context("scenario failed validation")?;

    tracing::info!(
        scenario_id = %scenario.id,
        total_distance_km = path.total_distance,
        duration_s = ?scenario.total_duration().map(|d| d.num_seconds()),
        "Scenario ready"
    );

    let input = EvaluationInput::from_scenario(&scenario, &aircraft)?;
    write_json(&input, args.output.as_deref())
}
