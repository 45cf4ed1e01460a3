//! Core data models for flight paths, aircraft and scenarios.

use crate::error::{Result, ScenarioError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub const MIN_ALTITUDE_M: f64 = 0.0;
pub const MAX_ALTITUDE_M: f64 = 10_000.0;

/// 3D position with latitude, longitude and altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Altitude in meters
    pub alt: f64,
}

impl Position {
    /// Create a position, rejecting values outside the valid ranges.
    pub fn new(lat: f64, lon: f64, alt: f64) -> Result<Self> {
        let position = Self { lat, lon, alt };
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("lat", self.lat, -90.0, 90.0)?;
        check_range("lon", self.lon, -180.0, 180.0)?;
        check_range("alt", self.alt, MIN_ALTITUDE_M, MAX_ALTITUDE_M)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails the range check as well.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ScenarioError::InvalidPosition {
            field,
            value,
            min,
            max,
            index: None,
        })
    }
}

/// Waypoint in a flight path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Sequence-derived identifier (WP001, WP002, ...)
    pub id: String,
    /// Zero-based order in the flight path
    pub sequence: usize,
    pub position: Position,
    /// Distance from the previous waypoint in kilometers (0 for the first)
    #[serde(default)]
    pub distance_from_previous: f64,
}

/// Waypoint annotated with an estimated time of arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointWithEta {
    #[serde(flatten)]
    pub waypoint: Waypoint,
    pub estimated_arrival_time: DateTime<Utc>,
    /// Speed in km/h
    #[serde(default)]
    pub speed: f64,
}

impl WaypointWithEta {
    pub fn sequence(&self) -> usize {
        self.waypoint.sequence
    }

    pub fn position(&self) -> &Position {
        &self.waypoint.position
    }
}

/// Input coordinate in (lon, lat[, alt]) order, WGS84 degrees and meters.
///
/// Serialized as a 2- or 3-element array, the way GeoJSON stores vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: None }
    }

    pub fn with_altitude(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt: Some(alt),
        }
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [lon, lat] => Ok(Self::new(*lon, *lat)),
            [lon, lat, alt] => Ok(Self::with_altitude(*lon, *lat, *alt)),
            other => Err(format!(
                "coordinate must have 2 or 3 values, got {}",
                other.len()
            )),
        }
    }
}

impl From<Coordinate> for Vec<f64> {
    fn from(coord: Coordinate) -> Self {
        match coord.alt {
            Some(alt) => vec![coord.lon, coord.lat, alt],
            None => vec![coord.lon, coord.lat],
        }
    }
}

/// Flight path imported from a line geometry.
///
/// Constructed through `FlightPath::new` so that the waypoint count and
/// total distance invariants hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPath {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub source_file: Option<String>,
    /// Line geometry vertices
    pub geometry: Vec<Coordinate>,
    pub waypoints: Vec<Waypoint>,
    /// Total distance in kilometers
    pub total_distance: f64,
    pub imported_at: DateTime<Utc>,
}

/// Aircraft performance and evaluation profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Aircraft model identifier
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    /// Cruise speed in km/h
    pub cruise_speed: f64,
    /// Maximum speed in km/h
    pub max_speed: f64,
    /// Climb rate in m/min
    pub climb_rate: f64,
    /// Descent rate in m/min
    pub descent_rate: f64,
    /// Maximum altitude in meters
    pub max_altitude: f64,
    /// Range in kilometers
    pub range: f64,
    /// Noise level per flight phase name
    #[serde(default)]
    pub noise_profile: BTreeMap<String, f64>,
    /// Free-form parameters consumed by risk algorithms
    #[serde(default)]
    pub risk_parameters: serde_json::Map<String, serde_json::Value>,
}

impl Aircraft {
    /// Check the performance profile.
    ///
    /// All performance figures must be positive and the maximum speed must
    /// be strictly greater than the cruise speed.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("cruise_speed", self.cruise_speed),
            ("max_speed", self.max_speed),
            ("climb_rate", self.climb_rate),
            ("descent_rate", self.descent_rate),
            ("max_altitude", self.max_altitude),
            ("range", self.range),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(self.profile_error(field, format!("{value} must be positive")));
            }
        }
        self.check_speed_envelope()
    }

    /// Max speed must exceed cruise speed.
    pub fn check_speed_envelope(&self) -> Result<()> {
        if self.max_speed > self.cruise_speed {
            Ok(())
        } else {
            Err(self.profile_error(
                "max_speed",
                format!(
                    "max speed {} km/h must be greater than cruise speed {} km/h",
                    self.max_speed, self.cruise_speed
                ),
            ))
        }
    }

    fn profile_error(&self, field: &'static str, reason: String) -> ScenarioError {
        ScenarioError::InvalidAircraftProfile {
            aircraft_id: self.id.clone(),
            field,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Built but not yet validated
    #[default]
    Draft,
    /// Validated, ready for evaluation
    Ready,
    /// Evaluation request issued
    Evaluating,
    /// All requested evaluation types have results
    Completed,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Draft => "draft",
            ScenarioStatus::Ready => "ready",
            ScenarioStatus::Evaluating => "evaluating",
            ScenarioStatus::Completed => "completed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// An abandoned evaluation may fall back from evaluating to ready.
    /// Nothing leaves completed.
    pub fn can_transition_to(&self, next: ScenarioStatus) -> bool {
        matches!(
            (self, next),
            (ScenarioStatus::Draft, ScenarioStatus::Ready)
                | (ScenarioStatus::Ready, ScenarioStatus::Evaluating)
                | (ScenarioStatus::Evaluating, ScenarioStatus::Completed)
                | (ScenarioStatus::Evaluating, ScenarioStatus::Ready)
        )
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create a flight scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub flight_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub aircraft_id: String,
    pub flight_path_id: Uuid,
}

/// Flight scenario combining date, time, aircraft and path.
///
/// The ETA sequence and status are only changed through the builder and
/// the lifecycle methods; amending a scenario means building a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightScenario {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub flight_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub aircraft_id: String,
    pub flight_path_id: Uuid,
    pub(crate) waypoints_with_eta: Vec<WaypointWithEta>,
    pub(crate) status: ScenarioStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlightScenario {
    pub fn waypoints_with_eta(&self) -> &[WaypointWithEta] {
        &self.waypoints_with_eta
    }

    pub fn status(&self) -> ScenarioStatus {
        self.status
    }

    /// Departure timestamp (ETA of the first waypoint).
    pub fn departure(&self) -> Option<DateTime<Utc>> {
        self.waypoints_with_eta
            .first()
            .map(|wp| wp.estimated_arrival_time)
    }

    /// ETA of the final waypoint.
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        self.waypoints_with_eta
            .last()
            .map(|wp| wp.estimated_arrival_time)
    }

    pub fn total_duration(&self) -> Option<chrono::Duration> {
        Some(self.arrival_time()? - self.departure()?)
    }

    /// Move to `next`, enforcing the lifecycle.
    pub(crate) fn transition_to(&mut self, next: ScenarioStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ScenarioError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::info!(
            scenario_id = %self.id,
            from = %self.status,
            to = %next,
            "Scenario status changed"
        );
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// Progress state of an evaluation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Running => "running",
            EvaluationStatus::Completed => "completed",
            EvaluationStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, EvaluationStatus::Completed | EvaluationStatus::Failed)
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to run one or more evaluation types against a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub evaluation_types: Vec<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub status: EvaluationStatus,
    /// Fraction of requested types finished, 0.0 to 1.0
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl EvaluationRequest {
    pub fn new(scenario_id: Uuid, evaluation_types: Vec<String>, requested_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scenario_id,
            evaluation_types,
            requested_at,
            status: EvaluationStatus::Pending,
            progress: 0.0,
            error_message: None,
            completed_at: None,
        }
    }
}

/// Stored output of one evaluation type for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub id: Uuid,
    pub evaluation_request_id: Uuid,
    pub evaluation_type: String,
    pub algorithm_version: String,
    pub output_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
